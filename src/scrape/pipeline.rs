use crate::config::ScraperConfig;
use crate::error::Error;
use crate::results::{RunReport, RunStatus};
use crate::scrape::page::PageWalker;
use crate::scrape::pagination::Paginator;
use crate::session::{Element, Scope, Session, wait_for};
use crate::store::Sink;

/// Where the pipeline currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    /// Site root loaded, consent prompt handled
    Homepage,
    /// Deals catalog reached through the menu
    CategoryLanding,
    /// Scraping the given 1-based catalog page
    ScrapePage(usize),
    /// Trying to move past the given page
    MaybeAdvance(usize),
    Terminated,
}

/// Drives a session from the site root through the deals catalog
pub struct Pipeline<'a, S: Session> {
    session: S,
    config: &'a ScraperConfig,
    stage: Stage,
}

impl<'a, S: Session> Pipeline<'a, S> {
    pub fn new(session: S, config: &'a ScraperConfig) -> Self {
        Self {
            session,
            config,
            stage: Stage::Init,
        }
    }

    /// Current stage, `Init` until `run` starts
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        ::log::debug!("Pipeline {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Scrape up to `max_pages` catalog pages into `sink`, one batch per page.
    ///
    /// The session is closed before returning, whatever the outcome.
    pub async fn run<K: Sink>(mut self, sink: &mut K, max_pages: usize) -> RunReport {
        let mut pages = 0;
        let mut records = 0;

        let status = match self.walk(sink, max_pages, &mut pages, &mut records).await {
            Ok(status) => status,
            Err(e) => {
                ::log::error!("Pipeline stopped during {:?}: {}", self.stage, e);
                RunStatus::Failed(e.to_string())
            }
        };

        self.enter(Stage::Terminated);
        if let Err(e) = self.session.close().await {
            ::log::warn!("Failed to close the browser session: {}", e);
        }

        ::log::info!(
            "Pipeline finished: {} pages, {} records, {:?}",
            pages,
            records,
            status
        );
        RunReport {
            pages,
            records,
            status,
        }
    }

    /// Everything between opening the site and the last page; `run` handles cleanup
    async fn walk<K: Sink>(
        &mut self,
        sink: &mut K,
        max_pages: usize,
        pages: &mut usize,
        records: &mut usize,
    ) -> Result<RunStatus, Error> {
        self.open_homepage().await?;
        self.open_deals().await?;

        loop {
            if *pages >= max_pages {
                return Ok(RunStatus::BudgetExhausted);
            }

            self.enter(Stage::ScrapePage(*pages + 1));
            let batch = PageWalker::new(&self.session, self.config)
                .scrape_current_page()
                .await?;
            // One batch per page, flushed before paging on
            let stored = sink.append(&batch)?;
            *pages += 1;
            *records += batch.len();
            ::log::info!(
                "Page {}: {} listings scraped, {} stored",
                *pages,
                batch.len(),
                stored
            );

            if *pages >= max_pages {
                return Ok(RunStatus::BudgetExhausted);
            }

            self.enter(Stage::MaybeAdvance(*pages));
            if !Paginator::new(&self.session, self.config).advance().await? {
                return Ok(RunStatus::CatalogEnd);
            }
        }
    }

    /// Load the site root and wait for the navigation menu
    async fn open_homepage(&mut self) -> Result<(), Error> {
        self.enter(Stage::Homepage);
        let selectors = &self.config.selectors;
        let timeouts = &self.config.timeouts;

        ::log::info!("Opening {}", self.config.start_url);
        self.session.goto(&self.config.start_url).await?;
        self.dismiss_consent().await;

        wait_for(
            &self.session,
            &selectors.menu_button,
            timeouts.wait(),
            timeouts.poll(),
        )
        .await?
        .ok_or(Error::MissingElement("navigation menu"))?;
        Ok(())
    }

    /// Accept the cookie prompt if one shows up
    async fn dismiss_consent(&self) {
        let timeouts = &self.config.timeouts;
        let button = wait_for(
            &self.session,
            &self.config.selectors.consent_button,
            timeouts.consent(),
            timeouts.poll(),
        )
        .await;

        match button {
            Ok(Some(button)) => match button.click().await {
                Ok(()) => {
                    ::log::debug!("Cookie prompt dismissed");
                    tokio::time::sleep(timeouts.consent_settle()).await;
                }
                Err(e) => ::log::debug!("Cookie prompt click failed: {}", e),
            },
            Ok(None) => ::log::debug!("No cookie prompt"),
            Err(e) => ::log::debug!("Cookie prompt lookup failed: {}", e),
        }
    }

    /// Open the menu, follow the deals entry and wait for the first listings
    async fn open_deals(&mut self) -> Result<(), Error> {
        self.enter(Stage::CategoryLanding);
        let selectors = &self.config.selectors;
        let timeouts = &self.config.timeouts;

        let menu = self
            .session
            .find(&selectors.menu_button)
            .await?
            .ok_or(Error::MissingElement("navigation menu"))?;
        menu.click().await?;

        let deals = wait_for(
            &self.session,
            &selectors.deals_link,
            timeouts.wait(),
            timeouts.poll(),
        )
        .await?
        .ok_or(Error::MissingElement("deals menu entry"))?;
        deals.click().await?;

        wait_for(
            &self.session,
            &selectors.listing_container,
            timeouts.wait(),
            timeouts.poll(),
        )
        .await?
        .ok_or(Error::MissingElement("deals listing"))?;
        wait_for(
            &self.session,
            &selectors.listing_cards,
            timeouts.wait(),
            timeouts.poll(),
        )
        .await?
        .ok_or(Error::MissingElement("deals listings"))?;

        ::log::info!("Deals catalog reached");
        Ok(())
    }
}
