use crate::results::ListingRecord;
use serde::{Deserialize, Serialize};

/// Kind of promotion a discount caption advertises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromoKind {
    /// "-20%"
    Percent,
    /// "-5€"
    Euro,
    /// A caption with neither sign
    Other,
    /// No caption
    None,
}

impl PromoKind {
    pub fn classify(discount_text: Option<&str>) -> Self {
        match discount_text {
            None => PromoKind::None,
            Some(text) if text.contains('%') => PromoKind::Percent,
            Some(text) if text.contains('€') => PromoKind::Euro,
            Some(_) => PromoKind::Other,
        }
    }
}

/// Promotion filter offered to record consumers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromoFilter {
    #[default]
    All,
    Percent,
    Euro,
    None,
}

impl PromoFilter {
    pub fn accepts(&self, discount_text: Option<&str>) -> bool {
        let kind = PromoKind::classify(discount_text);
        match self {
            PromoFilter::All => true,
            PromoFilter::Percent => kind == PromoKind::Percent,
            PromoFilter::Euro => kind == PromoKind::Euro,
            PromoFilter::None => kind == PromoKind::None,
        }
    }
}

/// Filters stored records the way the deals viewer does
#[derive(Debug, Clone, Default)]
pub struct DealFilter {
    /// Case-insensitive text searched in name, description and features
    pub query: Option<String>,
    /// Case-insensitive part of the seller name
    pub seller: Option<String>,
    pub promo: PromoFilter,
}

impl DealFilter {
    pub fn matches(&self, record: &ListingRecord) -> bool {
        let contains = |field: &Option<String>, needle: &str| {
            field
                .as_deref()
                .is_some_and(|value| value.to_lowercase().contains(needle))
        };

        let query_ok = match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => {
                let q = q.to_lowercase();
                contains(&record.product_name, &q)
                    || contains(&record.description, &q)
                    || contains(&record.features, &q)
            }
        };

        let seller_ok = match self.seller.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(s) => contains(&record.seller_name, &s.to_lowercase()),
        };

        query_ok && seller_ok && self.promo.accepts(record.discount_text.as_deref())
    }
}
