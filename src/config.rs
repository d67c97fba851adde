use crate::error::Error;
use crate::session::Locator;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for a deals scrape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Site root the pipeline opens first
    #[serde(default = "default_start_url")]
    pub start_url: String,

    /// Run the browser without a window
    #[serde(default)]
    pub headless: bool,

    /// User agent override for the browser
    #[serde(default)]
    pub user_agent: Option<String>,

    /// SQLite database receiving the records
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Page budget when none is given on the command line
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Characters of the first listing used to detect a page change
    #[serde(default = "default_fingerprint_len")]
    pub fingerprint_len: usize,

    #[serde(default)]
    pub timeouts: Timeouts,

    #[serde(default)]
    pub selectors: Selectors,
}

/// Bounded waits, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeouts {
    /// Element waits: landing page, listings, detail description
    #[serde(default = "default_wait_ms")]
    pub wait: u64,

    /// Wait for the cookie consent prompt
    #[serde(default = "default_wait_ms")]
    pub consent: u64,

    /// Wait for the first listing to change after a page turn
    #[serde(default = "default_pagination_ms")]
    pub pagination: u64,

    /// Interval between polls
    #[serde(default = "default_poll_ms")]
    pub poll: u64,

    /// Pause after scrolling to the bottom of the page
    #[serde(default = "default_scroll_settle_ms")]
    pub scroll_settle: u64,

    /// Pause between scrolling the next control into view and clicking it
    #[serde(default = "default_click_settle_ms")]
    pub click_settle: u64,

    /// Pause after dismissing the consent prompt
    #[serde(default = "default_scroll_settle_ms")]
    pub consent_settle: u64,
}

/// Every locator the pipeline uses. Card, row and pagination-anchor locators are
/// relative to their parent element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// Cookie consent accept button
    pub consent_button: Locator,
    /// Opens the navigation menu
    pub menu_button: Locator,
    /// Menu entry leading to the deals catalog
    pub deals_link: Locator,
    pub listing_container: Locator,
    /// One match per listing card
    pub listing_cards: Locator,

    // Relative to a listing card
    pub card_name: Locator,
    pub card_seller: Locator,
    pub card_seller_block: Locator,
    pub card_promo: Locator,
    pub card_price_integer: Locator,
    pub card_price_cents: Locator,
    pub card_image: Locator,
    pub card_link: Locator,

    /// Pagination item holding the next-page link; carries `disabled` on the last page
    pub next_item: Locator,
    /// Relative to `next_item`
    pub next_anchor: Locator,

    /// Text block holding the description and, on some pages, the characteristics
    pub detail_description: Locator,
    pub features_table: Locator,
    /// Fixed-position cell that usually holds the category
    pub category_cell: Locator,
    // Relative to the features table, then to a row
    pub table_row: Locator,
    pub table_label: Locator,
    pub table_value: Locator,
}

impl Default for Selectors {
    fn default() -> Self {
        let detail = "main > div > div > div:nth-of-type(3)";
        let table = format!("{detail} > section:nth-of-type(2) > div:nth-of-type(1) > table > tbody");
        Self {
            consent_button: Locator::xpath(
                "//button[contains(., 'Accepter') or contains(., 'accepter') \
                 or contains(., 'J’accepte') or contains(., \"J'accepte\")]",
            ),
            menu_button: Locator::css("app-navbar-menu-button > div"),
            deals_link: Locator::css(
                "app-sidenav-sections > ul:nth-of-type(1) > li:nth-of-type(2) > a",
            ),
            listing_container: Locator::css("app-template-result-list > ul"),
            listing_cards: Locator::css("app-template-result-list > ul > li"),

            card_name: Locator::css("app-product-card-label > div > a"),
            card_seller: Locator::css("app-product-card-seller > p > span"),
            card_seller_block: Locator::css("app-product-card-seller"),
            card_promo: Locator::css("app-product-promo > div > div"),
            card_price_integer: Locator::css("app-product-price div#price div.price-unit"),
            card_price_cents: Locator::css("app-product-price div#price span.price-cents"),
            card_image: Locator::css("app-lazy-image > img"),
            card_link: Locator::css("a[href]"),

            next_item: Locator::css("li.pagination-next"),
            next_anchor: Locator::css("a"),

            detail_description: Locator::css(&format!(
                "{detail} > section:nth-of-type(1) > div"
            )),
            category_cell: Locator::css(&format!("{table} > tr:nth-of-type(14) > td")),
            features_table: Locator::css(&table),
            table_row: Locator::css("tr"),
            table_label: Locator::css("th"),
            table_value: Locator::css("td"),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            wait: default_wait_ms(),
            consent: default_wait_ms(),
            pagination: default_pagination_ms(),
            poll: default_poll_ms(),
            scroll_settle: default_scroll_settle_ms(),
            click_settle: default_click_settle_ms(),
            consent_settle: default_scroll_settle_ms(),
        }
    }
}

impl Timeouts {
    /// Element wait as a duration
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait)
    }

    /// Consent prompt wait as a duration
    pub fn consent(&self) -> Duration {
        Duration::from_millis(self.consent)
    }

    /// Page change wait as a duration
    pub fn pagination(&self) -> Duration {
        Duration::from_millis(self.pagination)
    }

    /// Poll interval as a duration
    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll)
    }

    /// Pause after scrolling as a duration
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle)
    }

    /// Pause before clicking next as a duration
    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle)
    }

    /// Pause after the consent click as a duration
    pub fn consent_settle(&self) -> Duration {
        Duration::from_millis(self.consent_settle)
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_start_url() -> String {
    "https://www.e.leclerc/".to_string()
}

fn default_db_path() -> String {
    "leclerc_deals.db".to_string()
}

fn default_max_pages() -> usize {
    5
}

fn default_fingerprint_len() -> usize {
    60
}

fn default_wait_ms() -> u64 {
    10_000
}

fn default_pagination_ms() -> u64 {
    12_000
}

fn default_poll_ms() -> u64 {
    250
}

fn default_scroll_settle_ms() -> u64 {
    500
}

fn default_click_settle_ms() -> u64 {
    200
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            start_url: default_start_url(),
            headless: false,
            user_agent: None,
            db_path: default_db_path(),
            max_pages: default_max_pages(),
            fingerprint_len: default_fingerprint_len(),
            timeouts: Timeouts::default(),
            selectors: Selectors::default(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply the `WEBDRIVER_URL` environment override, if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }
}
