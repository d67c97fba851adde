//! Field extraction for listing cards and detail pages.
//!
//! Each field is an ordered chain of [`Probe`]s; the first probe yielding a value
//! wins. A locator that matches nothing makes its probe yield nothing, so a missing
//! element only ever costs the field it was meant for. Faults other than "not found"
//! are returned to the caller, which decides whether the listing survives.

use crate::config::Selectors;
use crate::parsers::detail::{feature_pair, is_category_label, join_features};
use crate::parsers::{clean_seller, parse_price, split_characteristics};
use crate::results::{DetailFields, ListingSummary};
use crate::session::{Element, Locator, Scope, SessionError};
use crate::utils::{collapse_whitespace, non_empty, resolve_href};
use url::Url;

/// How the text of a matched element becomes a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    Trim,
    CollapseWhitespace,
    Seller,
}

impl Cleanup {
    fn apply(self, text: &str) -> Option<String> {
        match self {
            Cleanup::Trim => non_empty(text),
            Cleanup::CollapseWhitespace => non_empty(&collapse_whitespace(text)),
            Cleanup::Seller => clean_seller(text),
        }
    }
}

/// One way of reading a field
#[derive(Debug, Clone, Copy)]
pub enum Probe<'a> {
    /// Text of the first match
    Text(&'a Locator, Cleanup),
    /// Attribute of the first match
    Attr(&'a Locator, &'a str),
    /// Attribute of the first match as an absolute URL, resolved against the page
    UrlAttr(&'a Locator, &'a str, &'a Url),
    /// Description part of a marker-split text block
    MarkerDescription(&'a Locator),
    /// Feature lines of a marker-split text block
    MarkerFeatures(&'a Locator),
    /// Every label/value row of a table as `Label: Value` pairs
    TablePairs(&'a TableLocators<'a>),
    /// Value of the first table row whose label names the category
    TableCategory(&'a TableLocators<'a>),
}

/// Locators describing a label/value table
#[derive(Debug, Clone, Copy)]
pub struct TableLocators<'a> {
    pub table: &'a Locator,
    pub row: &'a Locator,
    pub label: &'a Locator,
    pub value: &'a Locator,
}

/// Text of the first element matching `locator`, if any
pub async fn text_of<S: Scope>(
    scope: &S,
    locator: &Locator,
) -> Result<Option<String>, SessionError> {
    match scope.find(locator).await? {
        Some(element) => Ok(Some(element.text().await?)),
        None => Ok(None),
    }
}

/// Evaluate a single probe
pub async fn probe<S: Scope>(
    scope: &S,
    candidate: &Probe<'_>,
) -> Result<Option<String>, SessionError> {
    match *candidate {
        Probe::Text(locator, cleanup) => {
            Ok(text_of(scope, locator).await?.and_then(|t| cleanup.apply(&t)))
        }
        Probe::Attr(locator, name) => match scope.find(locator).await? {
            Some(element) => Ok(element.attr(name).await?.and_then(|v| non_empty(&v))),
            None => Ok(None),
        },
        Probe::UrlAttr(locator, name, base) => match scope.find(locator).await? {
            Some(element) => Ok(element
                .attr(name)
                .await?
                .and_then(|value| resolve_href(base, &value))),
            None => Ok(None),
        },
        Probe::MarkerDescription(locator) => Ok(text_of(scope, locator)
            .await?
            .and_then(|raw| split_characteristics(&raw).description)),
        Probe::MarkerFeatures(locator) => Ok(text_of(scope, locator)
            .await?
            .and_then(|raw| split_characteristics(&raw).features)),
        Probe::TablePairs(table) => {
            let mut pairs = Vec::new();
            for (label, value) in table_rows(scope, table).await? {
                if let Some(pair) = feature_pair(&label, &value) {
                    pairs.push(pair);
                }
            }
            Ok(join_features(pairs))
        }
        Probe::TableCategory(table) => Ok(table_rows(scope, table)
            .await?
            .into_iter()
            .find(|(label, value)| is_category_label(label) && !value.trim().is_empty())
            .map(|(_, value)| value.trim().to_string())),
    }
}

/// Evaluate probes in order and return the first value found
pub async fn first_present<S: Scope>(
    scope: &S,
    chain: &[Probe<'_>],
) -> Result<Option<String>, SessionError> {
    for candidate in chain {
        if let Some(value) = probe(scope, candidate).await? {
            return Ok(Some(value));
        }
    }
    ::log::trace!("No probe of {:?} produced a value", chain);
    Ok(None)
}

/// Label/value text of every row that has both cells
async fn table_rows<S: Scope>(
    scope: &S,
    table: &TableLocators<'_>,
) -> Result<Vec<(String, String)>, SessionError> {
    let Some(body) = scope.find(table.table).await? else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    for row in body.find_all(table.row).await? {
        let label = row.find(table.label).await?;
        let value = row.find(table.value).await?;
        if let (Some(label), Some(value)) = (label, value) {
            rows.push((label.text().await?, value.text().await?));
        }
    }
    Ok(rows)
}

/// Reads listing and detail fields using the configured locators
pub struct FieldExtractor<'a> {
    selectors: &'a Selectors,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(selectors: &'a Selectors) -> Self {
        Self { selectors }
    }

    /// Locators of the detail page's features table
    fn table(&self) -> TableLocators<'a> {
        TableLocators {
            table: &self.selectors.features_table,
            row: &self.selectors.table_row,
            label: &self.selectors.table_label,
            value: &self.selectors.table_value,
        }
    }

    /// Fields of one listing card. `base` is the catalog page URL links resolve against.
    pub async fn listing_summary<E: Element>(
        &self,
        card: &E,
        base: &Url,
    ) -> Result<ListingSummary, SessionError> {
        let s = self.selectors;

        let product_name = first_present(card, &[Probe::Text(&s.card_name, Cleanup::Trim)]).await?;
        let seller_name = first_present(
            card,
            &[
                Probe::Text(&s.card_seller, Cleanup::Seller),
                Probe::Text(&s.card_seller_block, Cleanup::Seller),
            ],
        )
        .await?;
        let discount_text = first_present(
            card,
            &[Probe::Text(&s.card_promo, Cleanup::CollapseWhitespace)],
        )
        .await?;

        let integer = text_of(card, &s.card_price_integer).await?.unwrap_or_default();
        let cents = text_of(card, &s.card_price_cents).await?.unwrap_or_default();
        let price_eur = parse_price(&integer, &cents);

        let image_url = first_present(
            card,
            &[
                Probe::UrlAttr(&s.card_image, "data-src", base),
                Probe::UrlAttr(&s.card_image, "src", base),
            ],
        )
        .await?;
        let page_url = first_present(card, &[Probe::UrlAttr(&s.card_link, "href", base)]).await?;

        Ok(ListingSummary {
            seller_name,
            product_name,
            discount_text,
            price_eur,
            page_url,
            image_url,
        })
    }

    /// Description, features and category of the detail page loaded in `page`.
    ///
    /// The features table is preferred; without one the features come from the
    /// "Characteristics:" section of the description block.
    pub async fn detail_fields<S: Scope>(&self, page: &S) -> Result<DetailFields, SessionError> {
        let s = self.selectors;
        let table = self.table();

        let description =
            first_present(page, &[Probe::MarkerDescription(&s.detail_description)]).await?;
        let features = first_present(
            page,
            &[
                Probe::TablePairs(&table),
                Probe::MarkerFeatures(&s.detail_description),
            ],
        )
        .await?;
        let category = first_present(
            page,
            &[
                Probe::Text(&s.category_cell, Cleanup::Trim),
                Probe::TableCategory(&table),
            ],
        )
        .await?;

        Ok(DetailFields {
            description,
            features,
            category,
        })
    }
}
