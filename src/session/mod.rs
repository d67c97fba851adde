pub mod snapshot;
pub mod webdriver;

use async_trait::async_trait;
use fantoccini::error::{CmdError, ErrorStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A declarative reference to an element of the current document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "lowercase")]
pub enum Locator {
    /// CSS selector
    Css(String),
    /// XPath expression
    #[serde(rename = "xpath")]
    XPath(String),
}

impl Locator {
    pub fn css(selector: &str) -> Self {
        Locator::Css(selector.to_string())
    }

    pub fn xpath(expression: &str) -> Self {
        Locator::XPath(expression.to_string())
    }

    /// Borrow as a fantoccini locator
    pub fn as_fantoccini(&self) -> fantoccini::Locator<'_> {
        match self {
            Locator::Css(s) => fantoccini::Locator::Css(s),
            Locator::XPath(s) => fantoccini::Locator::XPath(s),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css:{}", s),
            Locator::XPath(s) => write!(f, "xpath:{}", s),
        }
    }
}

/// Faults raised by an automation backend
///
/// A lookup that finds nothing is not a fault; it is reported as `Ok(None)`
/// or an empty list by [`Scope`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("webdriver command failed: {0}")]
    Command(#[source] CmdError),

    #[error("could not start a webdriver session: {0}")]
    Connect(#[from] fantoccini::error::NewSessionError),

    #[error("invalid locator {0}")]
    InvalidLocator(Locator),

    #[error("locator {0} is not supported by this session")]
    UnsupportedLocator(Locator),

    #[error("stale element reference")]
    StaleElement,

    #[error("no such window")]
    NoSuchWindow,

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("browsing context lost: {0}")]
    ContextLost(String),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// Faults after which the automation context can no longer be trusted
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::ContextLost(_) | SessionError::NoSuchWindow
        )
    }
}

/// Sorts WebDriver failures by what they mean for the session
impl From<CmdError> for SessionError {
    fn from(e: CmdError) -> Self {
        let classified = match &e {
            CmdError::Standard(wd) => match wd.error {
                ErrorStatus::StaleElementReference => Some(SessionError::StaleElement),
                ErrorStatus::NoSuchWindow => Some(SessionError::NoSuchWindow),
                ErrorStatus::InvalidSessionId => {
                    Some(SessionError::ContextLost(format!("session ended: {}", wd.message)))
                }
                _ => None,
            },
            CmdError::Lost(io) => Some(SessionError::ContextLost(format!(
                "connection to webdriver lost: {}",
                io
            ))),
            _ => None,
        };
        classified.unwrap_or(SessionError::Command(e))
    }
}

/// Something elements can be looked up in: the whole document or an element subtree
#[async_trait(?Send)]
pub trait Scope {
    type Element: Element;

    /// First element matching `locator`, `None` when nothing matches
    async fn find(&self, locator: &Locator) -> Result<Option<Self::Element>, SessionError>;

    /// Every element matching `locator`, in document order
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Element>, SessionError>;
}

/// A handle on one rendered element
#[async_trait(?Send)]
pub trait Element: Scope<Element = Self> + Clone {
    /// Rendered text, trimmed
    async fn text(&self) -> Result<String, SessionError>;

    /// Value of attribute `name`, `None` when the element does not carry it
    async fn attr(&self, name: &str) -> Result<Option<String>, SessionError>;

    /// Native click, as a user would
    async fn click(&self) -> Result<(), SessionError>;
}

/// The browsing capability the pipeline drives
#[async_trait(?Send)]
pub trait Session: Scope {
    /// Handle on one browsing context (tab or window)
    type Tab: Clone + fmt::Debug;

    /// Load `url` in the active tab
    async fn goto(&self, url: &str) -> Result<(), SessionError>;

    /// URL of the document in the active tab
    async fn current_url(&self) -> Result<Url, SessionError>;

    /// Scroll the active tab to the end of the document, triggering lazy content
    async fn scroll_to_bottom(&self) -> Result<(), SessionError>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<(), SessionError>;

    /// Trigger the element's action from script, bypassing overlays
    async fn activate(&self, element: &Self::Element) -> Result<(), SessionError>;

    /// The active tab
    async fn current_tab(&self) -> Result<Self::Tab, SessionError>;

    /// Open a blank tab without switching to it
    async fn open_tab(&self) -> Result<Self::Tab, SessionError>;

    /// Make `tab` the active tab
    async fn switch_to(&self, tab: &Self::Tab) -> Result<(), SessionError>;

    /// Close the active tab; a tab must be switched to before the next command
    async fn close_tab(&self) -> Result<(), SessionError>;

    /// Release the automation context
    async fn close(&self) -> Result<(), SessionError>;
}

/// Polls `scope` until `locator` matches or `timeout` elapses.
///
/// Returns `Ok(None)` on timeout. Faults other than "not found" end the wait early.
pub async fn wait_for<S: Scope + ?Sized>(
    scope: &S,
    locator: &Locator,
    timeout: Duration,
    poll: Duration,
) -> Result<Option<S::Element>, SessionError> {
    let waited = tokio::time::timeout(timeout, async {
        loop {
            if let Some(element) = scope.find(locator).await? {
                return Ok(element);
            }
            tokio::time::sleep(poll).await;
        }
    })
    .await;

    match waited {
        Ok(Ok(element)) => Ok(Some(element)),
        Ok(Err(e)) => Err(e),
        Err(_) => {
            ::log::debug!("Timed out after {:?} waiting for {}", timeout, locator);
            Ok(None)
        }
    }
}

/// Polls `check` until it yields `true` or `timeout` elapses; returns whether it did.
pub async fn wait_until<F, Fut>(timeout: Duration, poll: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(timeout, async {
        while !check().await {
            tokio::time::sleep(poll).await;
        }
    })
    .await
    .is_ok()
}
