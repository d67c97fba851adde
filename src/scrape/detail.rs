use crate::config::ScraperConfig;
use crate::results::DetailFields;
use crate::scrape::extractor::FieldExtractor;
use crate::session::{Session, SessionError, wait_for};

/// A detail tab opened beside the catalog tab
///
/// Must be handed back through [`DetailTab::release`], which closes it and
/// re-activates the catalog tab.
struct DetailTab<T> {
    origin: T,
    tab: T,
}

impl<T: Clone + std::fmt::Debug> DetailTab<T> {
    async fn open<S: Session<Tab = T>>(session: &S) -> Result<Self, SessionError> {
        let origin = session.current_tab().await?;
        let tab = session.open_tab().await?;
        ::log::trace!("Opened detail tab {:?} from {:?}", tab, origin);
        Ok(Self { origin, tab })
    }

    /// Close the detail tab and return to the catalog tab.
    ///
    /// Closing may fail if the tab already died; only failing to get back to the
    /// catalog tab is reported.
    async fn release<S: Session<Tab = T>>(self, session: &S) -> Result<(), SessionError> {
        match session.switch_to(&self.tab).await {
            Ok(()) => {
                if let Err(e) = session.close_tab().await {
                    ::log::warn!("Failed to close detail tab {:?}: {}", self.tab, e);
                }
            }
            Err(e) => ::log::warn!("Detail tab {:?} is already gone: {}", self.tab, e),
        }

        session.switch_to(&self.origin).await.map_err(|e| {
            SessionError::ContextLost(format!(
                "cannot return to catalog tab {:?}: {}",
                self.origin, e
            ))
        })
    }
}

/// Loads detail pages in a separate tab and reads their fields
pub struct DetailResolver<'a, S: Session> {
    session: &'a S,
    config: &'a ScraperConfig,
    extractor: FieldExtractor<'a>,
}

impl<'a, S: Session> DetailResolver<'a, S> {
    pub fn new(session: &'a S, config: &'a ScraperConfig) -> Self {
        Self {
            session,
            config,
            extractor: FieldExtractor::new(&config.selectors),
        }
    }

    /// Detail fields for the listing at `page_url`.
    ///
    /// Navigation faults degrade to absent fields. The only error is failing to
    /// restore the catalog tab afterwards, which leaves the session unusable.
    pub async fn resolve(&self, page_url: Option<&str>) -> Result<DetailFields, SessionError> {
        let Some(url) = page_url else {
            return Ok(DetailFields::default());
        };

        let tab = match DetailTab::open(self.session).await {
            Ok(tab) => tab,
            Err(e) => {
                ::log::warn!("Could not open a tab for {}: {}", url, e);
                return Ok(DetailFields::default());
            }
        };

        let fields = self.load(&tab.tab, url).await;
        // Released before looking at the outcome
        tab.release(self.session).await?;

        match fields {
            Ok(fields) => Ok(fields),
            Err(e) => {
                ::log::warn!("Detail page {} unavailable: {}", url, e);
                Ok(DetailFields::default())
            }
        }
    }

    /// Load `url` into the detail tab and read it; a missing description only delays
    async fn load(&self, tab: &S::Tab, url: &str) -> Result<DetailFields, SessionError> {
        self.session.switch_to(tab).await?;
        self.session.goto(url).await?;

        let timeouts = &self.config.timeouts;
        let description = wait_for(
            self.session,
            &self.config.selectors.detail_description,
            timeouts.wait(),
            timeouts.poll(),
        )
        .await?;
        if description.is_none() {
            ::log::debug!("No description block on {}", url);
        }

        self.extractor.detail_fields(self.session).await
    }
}
