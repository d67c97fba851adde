pub mod config;
pub mod error;
pub mod parsers;
pub mod results;
pub mod scrape;
pub mod session;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::ScraperConfig;
pub use error::{Error, Result};
pub use results::{ListingRecord, RunReport, RunStatus};
pub use scrape::Pipeline;
pub use store::{MemorySink, Sink, SqliteStore};

use std::path::Path;

/// Builder for a deals scrape against a live browser
pub struct Harvest {
    config: ScraperConfig,
    max_pages: Option<usize>,
}

impl Harvest {
    /// Create a builder from a configuration
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            config,
            max_pages: None,
        }
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(ScraperConfig::from_file(path)?))
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(config_str: &str) -> Result<Self> {
        Ok(Self::new(ScraperConfig::from_json(config_str)?))
    }

    /// Set the page budget, overriding the configured one
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Run the browser without a window
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Connect to WebDriver and run the pipeline into `sink`.
    ///
    /// Connection failure is an error; everything after it is reported in the
    /// returned [`RunReport`].
    pub async fn run<K: Sink>(self, sink: &mut K) -> Result<RunReport> {
        let config = self.config.with_env_overrides();
        let max_pages = self.max_pages.unwrap_or(config.max_pages);

        ::log::info!(
            "Scraping up to {} pages from {} via {}",
            max_pages,
            config.start_url,
            config.webdriver_url
        );
        let session = session::webdriver::connect(&config).await?;
        Ok(Pipeline::new(session, &config).run(sink, max_pages).await)
    }
}
