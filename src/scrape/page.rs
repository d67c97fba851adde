use crate::config::ScraperConfig;
use crate::results::ListingRecord;
use crate::scrape::detail::DetailResolver;
use crate::scrape::extractor::FieldExtractor;
use crate::session::{Scope, Session, SessionError};
use chrono::Utc;
use url::Url;

/// Turns the listings of the current catalog page into records
pub struct PageWalker<'a, S: Session> {
    session: &'a S,
    config: &'a ScraperConfig,
    extractor: FieldExtractor<'a>,
    details: DetailResolver<'a, S>,
}

impl<'a, S: Session> PageWalker<'a, S> {
    pub fn new(session: &'a S, config: &'a ScraperConfig) -> Self {
        Self {
            session,
            config,
            extractor: FieldExtractor::new(&config.selectors),
            details: DetailResolver::new(session, config),
        }
    }

    /// Records for every listing on the current page, in page order.
    ///
    /// A listing that faults is skipped. Errors are returned only when the page
    /// cannot be enumerated or the session is no longer usable.
    pub async fn scrape_current_page(&self) -> Result<Vec<ListingRecord>, SessionError> {
        // Card links are relative to the catalog page
        let base = self.session.current_url().await?;
        let cards = self
            .session
            .find_all(&self.config.selectors.listing_cards)
            .await?;
        ::log::debug!("Found {} listings on {}", cards.len(), base);

        let mut records = Vec::with_capacity(cards.len());
        for (index, card) in cards.iter().enumerate() {
            match self.scrape_listing(card, &base).await {
                Ok(record) => records.push(record),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => ::log::warn!("Skipping listing {} on {}: {}", index + 1, base, e),
            }
        }
        Ok(records)
    }

    /// Card fields first, then the detail page they link to
    async fn scrape_listing(
        &self,
        card: &S::Element,
        base: &Url,
    ) -> Result<ListingRecord, SessionError> {
        let summary = self.extractor.listing_summary(card, base).await?;
        let details = self.details.resolve(summary.page_url.as_deref()).await?;
        Ok(ListingRecord::new(summary, details, Utc::now()))
    }
}
