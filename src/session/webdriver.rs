use crate::config::ScraperConfig;
use crate::session::{Element, Locator, Scope, Session, SessionError};
use async_trait::async_trait;
use fantoccini::wd::{Capabilities, WindowHandle};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use url::Url;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36";

/// A browser driven over the WebDriver protocol
#[derive(Clone)]
pub struct WebDriverSession {
    client: Client,
}

/// An element of a WebDriver-backed page
#[derive(Clone)]
pub struct WebDriverElement(fantoccini::elements::Element);

/// Builds the Chrome capabilities for a session
fn capabilities(config: &ScraperConfig) -> Capabilities {
    let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--start-maximized".to_string(),
        format!("--user-agent={}", user_agent),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
    }

    let mut caps = Capabilities::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

/// Connects to the configured WebDriver server, trying common local ports if it is unreachable
pub async fn connect(config: &ScraperConfig) -> Result<WebDriverSession, SessionError> {
    let caps = capabilities(config);

    let first_error = match ClientBuilder::native()
        .capabilities(caps.clone())
        .connect(&config.webdriver_url)
        .await
    {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", config.webdriver_url);
            return Ok(WebDriverSession { client });
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                config.webdriver_url,
                e
            );
            e
        }
    };

    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4444", // Selenium / geckodriver default
        "http://127.0.0.1:4444",
    ];

    for url in fallback_urls.iter() {
        if *url == config.webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native()
            .capabilities(caps.clone())
            .connect(url)
            .await
        {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(WebDriverSession { client });
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(first_error.into())
}

impl WebDriverSession {
    /// Wrap an already connected client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl Scope for WebDriverSession {
    type Element = WebDriverElement;

    async fn find(&self, locator: &Locator) -> Result<Option<WebDriverElement>, SessionError> {
        match self.client.find(locator.as_fantoccini()).await {
            Ok(element) => Ok(Some(WebDriverElement(element))),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<WebDriverElement>, SessionError> {
        let elements = self.client.find_all(locator.as_fantoccini()).await?;
        Ok(elements.into_iter().map(WebDriverElement).collect())
    }
}

#[async_trait(?Send)]
impl Scope for WebDriverElement {
    type Element = WebDriverElement;

    async fn find(&self, locator: &Locator) -> Result<Option<WebDriverElement>, SessionError> {
        match self.0.find(locator.as_fantoccini()).await {
            Ok(element) => Ok(Some(WebDriverElement(element))),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<WebDriverElement>, SessionError> {
        let elements = self.0.find_all(locator.as_fantoccini()).await?;
        Ok(elements.into_iter().map(WebDriverElement).collect())
    }
}

#[async_trait(?Send)]
impl Element for WebDriverElement {
    async fn text(&self) -> Result<String, SessionError> {
        Ok(self.0.text().await?.trim().to_string())
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, SessionError> {
        Ok(self.0.attr(name).await?)
    }

    async fn click(&self) -> Result<(), SessionError> {
        self.0.click().await?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl Session for WebDriverSession {
    type Tab = WindowHandle;

    async fn goto(&self, url: &str) -> Result<(), SessionError> {
        // A dead session stays fatal; anything else is this page's problem
        self.client.goto(url).await.map_err(|e| match SessionError::from(e) {
            fatal if fatal.is_fatal() => fatal,
            other => SessionError::Navigation {
                url: url.to_string(),
                reason: other.to_string(),
            },
        })
    }

    async fn current_url(&self) -> Result<Url, SessionError> {
        Ok(self.client.current_url().await?)
    }

    async fn scroll_to_bottom(&self) -> Result<(), SessionError> {
        self.client
            .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await?;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &WebDriverElement) -> Result<(), SessionError> {
        let arg = serde_json::to_value(&element.0)?;
        self.client
            .execute("arguments[0].scrollIntoView()", vec![arg])
            .await?;
        Ok(())
    }

    async fn activate(&self, element: &WebDriverElement) -> Result<(), SessionError> {
        let arg = serde_json::to_value(&element.0)?;
        self.client.execute("arguments[0].click()", vec![arg]).await?;
        Ok(())
    }

    async fn current_tab(&self) -> Result<WindowHandle, SessionError> {
        Ok(self.client.window().await?)
    }

    async fn open_tab(&self) -> Result<WindowHandle, SessionError> {
        let created = self.client.new_window(true).await?;
        Ok(created.handle)
    }

    async fn switch_to(&self, tab: &WindowHandle) -> Result<(), SessionError> {
        self.client.switch_to_window(tab.clone()).await?;
        Ok(())
    }

    async fn close_tab(&self) -> Result<(), SessionError> {
        self.client.close_window().await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), SessionError> {
        // Ends the WebDriver session, which also quits the browser
        self.client.clone().close().await?;
        Ok(())
    }
}
