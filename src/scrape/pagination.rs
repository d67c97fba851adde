use crate::config::ScraperConfig;
use crate::session::{Element, Scope, Session, SessionError, wait_for, wait_until};
use crate::utils::fingerprint;

/// Moves the catalog to its next page.
///
/// The site exposes no page number, so progress is confirmed by watching the
/// first listing's text change.
pub struct Paginator<'a, S: Session> {
    session: &'a S,
    config: &'a ScraperConfig,
}

impl<'a, S: Session> Paginator<'a, S> {
    pub fn new(session: &'a S, config: &'a ScraperConfig) -> Self {
        Self { session, config }
    }

    /// Text prefix of the first listing, `None` when there is no listing
    pub async fn first_listing_fingerprint(&self) -> Result<Option<String>, SessionError> {
        let first = self
            .session
            .find(&self.config.selectors.listing_cards)
            .await?;
        match first {
            Some(card) => Ok(Some(fingerprint(
                &card.text().await?,
                self.config.fingerprint_len,
            ))),
            None => Ok(None),
        }
    }

    /// Go to the next page.
    ///
    /// `Ok(false)` when there is no next page or the page turn could not be
    /// confirmed; both end the catalog walk.
    pub async fn advance(&self) -> Result<bool, SessionError> {
        let selectors = &self.config.selectors;
        let timeouts = &self.config.timeouts;

        let before = self.first_listing_fingerprint().await?.unwrap_or_default();

        // The pagination bar is only rendered once the end of the list is reached
        self.session.scroll_to_bottom().await?;
        tokio::time::sleep(timeouts.scroll_settle()).await;

        let Some(next_item) = self.session.find(&selectors.next_item).await? else {
            ::log::info!("No next-page control, last page reached");
            return Ok(false);
        };

        let class = next_item.attr("class").await?.unwrap_or_default();
        if class.to_lowercase().contains("disabled") {
            ::log::info!("Next-page control disabled, last page reached");
            return Ok(false);
        }

        let Some(next) = next_item.find(&selectors.next_anchor).await? else {
            ::log::info!("Next-page control has nothing to click");
            return Ok(false);
        };

        self.session.scroll_into_view(&next).await?;
        tokio::time::sleep(timeouts.click_settle()).await;
        // Script click; overlays intercept native clicks here
        self.session.activate(&next).await?;

        let before = &before;
        let changed = wait_until(timeouts.pagination(), timeouts.poll(), move || async move {
            match self.first_listing_fingerprint().await {
                Ok(Some(now)) => now != *before,
                Ok(None) => false,
                Err(e) => {
                    ::log::trace!("Fingerprint unavailable while paging: {}", e);
                    false
                }
            }
        })
        .await;
        if !changed {
            ::log::warn!(
                "Listings unchanged {:?} after clicking next",
                timeouts.pagination()
            );
            return Ok(false);
        }

        let listings = wait_for(
            self.session,
            &selectors.listing_cards,
            timeouts.wait(),
            timeouts.poll(),
        )
        .await?;
        if listings.is_none() {
            ::log::warn!("No listings appeared on the new page");
            return Ok(false);
        }

        Ok(true)
    }
}
