//! Offline session replaying stored HTML documents.
//!
//! Documents are keyed by absolute URL. Each tab holds one document; clicking an
//! anchor (or anything inside one) navigates the active tab to the anchor's target,
//! the way a browser follows a link. Only CSS locators are understood.
//!
//! Elements carrying a `data-stale` attribute (or sitting inside one) fault on every
//! access, which lets fixtures model a listing that detaches mid-extraction.
//! Pages registered with [`SnapshotSession::closing_other_tabs`] close every other
//! tab when loaded, like a crashed or script-closed window.

use crate::session::{Element, Locator, Scope, Session, SessionError};
use async_trait::async_trait;
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use url::Url;

const STALE_MARKER: &str = "data-stale";

#[derive(Clone)]
struct Tab {
    url: Option<Url>,
    doc: Rc<Html>,
}

impl Tab {
    fn blank() -> Self {
        Self {
            url: None,
            doc: Rc::new(Html::new_document()),
        }
    }
}

#[derive(Default)]
struct State {
    pages: HashMap<String, Rc<Html>>,
    /// Pages whose loading closes every other tab
    closers: HashSet<String>,
    tabs: Vec<Option<Tab>>,
    active: usize,
    clicks: usize,
    closed: bool,
}

impl State {
    fn active_tab(&self) -> Result<&Tab, SessionError> {
        if self.closed {
            return Err(SessionError::NoSuchWindow);
        }
        self.tabs
            .get(self.active)
            .and_then(Option::as_ref)
            .ok_or(SessionError::NoSuchWindow)
    }

    fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        let parsed = Url::parse(url)?;
        let doc = self
            .pages
            .get(parsed.as_str())
            .cloned()
            .ok_or_else(|| SessionError::Navigation {
                url: url.to_string(),
                reason: "no stored document".to_string(),
            })?;

        if self.closed {
            return Err(SessionError::NoSuchWindow);
        }
        let tab = self
            .tabs
            .get_mut(self.active)
            .and_then(Option::as_mut)
            .ok_or(SessionError::NoSuchWindow)?;
        ::log::trace!("Snapshot tab {} now at {}", self.active, parsed);
        let closes_others = self.closers.contains(parsed.as_str());
        tab.url = Some(parsed);
        tab.doc = doc;

        if closes_others {
            let active = self.active;
            for (index, tab) in self.tabs.iter_mut().enumerate() {
                if index != active {
                    *tab = None;
                }
            }
        }
        Ok(())
    }
}

/// Session over a fixed set of HTML documents
#[derive(Clone)]
pub struct SnapshotSession {
    state: Rc<RefCell<State>>,
}

/// Element of a stored document
#[derive(Clone)]
pub struct SnapshotElement {
    state: Rc<RefCell<State>>,
    doc: Rc<Html>,
    node: NodeId,
}

/// Handle on a snapshot tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotTab(usize);

impl Default for SnapshotSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSession {
    /// Create a session with one blank tab and no stored documents
    pub fn new() -> Self {
        let state = State {
            tabs: vec![Some(Tab::blank())],
            ..State::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Store a document under `url`
    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.add_page(url, html);
        self
    }

    pub fn add_page(&self, url: &str, html: &str) {
        let key = match Url::parse(url) {
            Ok(parsed) => parsed.to_string(),
            Err(_) => url.to_string(),
        };
        self.state
            .borrow_mut()
            .pages
            .insert(key, Rc::new(Html::parse_document(html)));
    }

    /// Make loading `url` close every tab but the one it is loaded in
    pub fn closing_other_tabs(self, url: &str) -> Self {
        let key = match Url::parse(url) {
            Ok(parsed) => parsed.to_string(),
            Err(_) => url.to_string(),
        };
        self.state.borrow_mut().closers.insert(key);
        self
    }

    /// Number of clicks performed, including script-triggered ones
    pub fn clicks(&self) -> usize {
        self.state.borrow().clicks
    }

    /// Number of tabs still open
    pub fn open_tabs(&self) -> usize {
        self.state.borrow().tabs.iter().flatten().count()
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    fn selector(locator: &Locator) -> Result<Selector, SessionError> {
        match locator {
            Locator::Css(css) => {
                Selector::parse(css).map_err(|_| SessionError::InvalidLocator(locator.clone()))
            }
            Locator::XPath(_) => Err(SessionError::UnsupportedLocator(locator.clone())),
        }
    }

    fn element(&self, doc: &Rc<Html>, element: ElementRef<'_>) -> SnapshotElement {
        SnapshotElement {
            state: Rc::clone(&self.state),
            doc: Rc::clone(doc),
            node: element.id(),
        }
    }
}

impl SnapshotElement {
    fn with_ref<T>(
        &self,
        f: impl FnOnce(ElementRef<'_>) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let element = self
            .doc
            .tree
            .get(self.node)
            .and_then(ElementRef::wrap)
            .ok_or(SessionError::StaleElement)?;

        let stale = std::iter::once(element)
            .chain(element.ancestors().filter_map(ElementRef::wrap))
            .any(|e| e.value().attr(STALE_MARKER).is_some());
        if stale {
            return Err(SessionError::StaleElement);
        }
        f(element)
    }

    fn select(&self, locator: &Locator) -> Result<Vec<SnapshotElement>, SessionError> {
        let selector = SnapshotSession::selector(locator)?;
        self.with_ref(|element| {
            Ok(element
                .select(&selector)
                .map(|found| SnapshotElement {
                    state: Rc::clone(&self.state),
                    doc: Rc::clone(&self.doc),
                    node: found.id(),
                })
                .collect())
        })
    }

    /// Target of the nearest enclosing anchor, if any
    fn link_target(&self) -> Result<Option<String>, SessionError> {
        self.with_ref(|element| {
            Ok(std::iter::once(element)
                .chain(element.ancestors().filter_map(ElementRef::wrap))
                .find(|e| e.value().name() == "a")
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string))
        })
    }
}

#[async_trait(?Send)]
impl Scope for SnapshotSession {
    type Element = SnapshotElement;

    async fn find(&self, locator: &Locator) -> Result<Option<SnapshotElement>, SessionError> {
        Ok(self.find_all(locator).await?.into_iter().next())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<SnapshotElement>, SessionError> {
        let selector = Self::selector(locator)?;
        let doc = Rc::clone(&self.state.borrow().active_tab()?.doc);
        let found = doc
            .select(&selector)
            .map(|element| self.element(&doc, element))
            .collect();
        Ok(found)
    }
}

#[async_trait(?Send)]
impl Scope for SnapshotElement {
    type Element = SnapshotElement;

    async fn find(&self, locator: &Locator) -> Result<Option<SnapshotElement>, SessionError> {
        Ok(self.select(locator)?.into_iter().next())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<SnapshotElement>, SessionError> {
        self.select(locator)
    }
}

#[async_trait(?Send)]
impl Element for SnapshotElement {
    async fn text(&self) -> Result<String, SessionError> {
        self.with_ref(|element| Ok(element.text().collect::<String>().trim().to_string()))
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, SessionError> {
        self.with_ref(|element| Ok(element.value().attr(name).map(str::to_string)))
    }

    async fn click(&self) -> Result<(), SessionError> {
        let target = self.link_target()?;
        let mut state = self.state.borrow_mut();
        state.clicks += 1;

        let Some(href) = target else {
            return Ok(());
        };
        let base = state
            .active_tab()?
            .url
            .clone()
            .ok_or_else(|| SessionError::Navigation {
                url: href.clone(),
                reason: "relative link on a blank tab".to_string(),
            })?;
        let resolved = base.join(&href)?;
        state.navigate(resolved.as_str())
    }
}

#[async_trait(?Send)]
impl Session for SnapshotSession {
    type Tab = SnapshotTab;

    async fn goto(&self, url: &str) -> Result<(), SessionError> {
        self.state.borrow_mut().navigate(url)
    }

    async fn current_url(&self) -> Result<Url, SessionError> {
        let state = self.state.borrow();
        state
            .active_tab()?
            .url
            .clone()
            .ok_or_else(|| SessionError::Navigation {
                url: "about:blank".to_string(),
                reason: "tab has not been navigated".to_string(),
            })
    }

    async fn scroll_to_bottom(&self) -> Result<(), SessionError> {
        self.state.borrow().active_tab().map(|_| ())
    }

    async fn scroll_into_view(&self, element: &SnapshotElement) -> Result<(), SessionError> {
        element.with_ref(|_| Ok(()))
    }

    async fn activate(&self, element: &SnapshotElement) -> Result<(), SessionError> {
        element.click().await
    }

    async fn current_tab(&self) -> Result<SnapshotTab, SessionError> {
        let state = self.state.borrow();
        state.active_tab()?;
        Ok(SnapshotTab(state.active))
    }

    async fn open_tab(&self) -> Result<SnapshotTab, SessionError> {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return Err(SessionError::NoSuchWindow);
        }
        state.tabs.push(Some(Tab::blank()));
        Ok(SnapshotTab(state.tabs.len() - 1))
    }

    async fn switch_to(&self, tab: &SnapshotTab) -> Result<(), SessionError> {
        let mut state = self.state.borrow_mut();
        let open = !state.closed && matches!(state.tabs.get(tab.0), Some(Some(_)));
        if !open {
            return Err(SessionError::NoSuchWindow);
        }
        state.active = tab.0;
        Ok(())
    }

    async fn close_tab(&self) -> Result<(), SessionError> {
        let mut state = self.state.borrow_mut();
        state.active_tab()?;
        let active = state.active;
        state.tabs[active] = None;
        Ok(())
    }

    async fn close(&self) -> Result<(), SessionError> {
        let mut state = self.state.borrow_mut();
        state.closed = true;
        state.tabs.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "https://shop.test/";

    fn session() -> SnapshotSession {
        SnapshotSession::new()
            .with_page(
                ROOT,
                r#"<html><body>
                    <p class="intro">Hello <b>there</b></p>
                    <a id="next" href="/second"><span>Next</span></a>
                    <div data-stale="1"><span class="gone">x</span></div>
                </body></html>"#,
            )
            .with_page(
                "https://shop.test/second",
                "<html><body><p class=\"intro\">Second</p></body></html>",
            )
    }

    #[tokio::test]
    async fn test_find_and_text() {
        let s = session();
        s.goto(ROOT).await.unwrap();
        let intro = s.find(&Locator::css("p.intro")).await.unwrap().unwrap();
        assert_eq!(intro.text().await.unwrap(), "Hello there");
        assert!(s.find(&Locator::css("p.missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_click_inside_anchor_navigates() {
        let s = session();
        s.goto(ROOT).await.unwrap();
        let span = s.find(&Locator::css("#next span")).await.unwrap().unwrap();
        span.click().await.unwrap();
        assert_eq!(
            s.current_url().await.unwrap().as_str(),
            "https://shop.test/second"
        );
        assert_eq!(s.clicks(), 1);
    }

    #[tokio::test]
    async fn test_stale_and_unknown_pages() {
        let s = session();
        s.goto(ROOT).await.unwrap();
        let gone = s.find(&Locator::css(".gone")).await.unwrap().unwrap();
        assert!(matches!(gone.text().await, Err(SessionError::StaleElement)));
        assert!(matches!(
            s.goto("https://shop.test/nowhere").await,
            Err(SessionError::Navigation { .. })
        ));
        assert!(matches!(
            s.find(&Locator::xpath("//p")).await,
            Err(SessionError::UnsupportedLocator(_))
        ));
    }

    #[tokio::test]
    async fn test_tabs() {
        let s = session();
        s.goto(ROOT).await.unwrap();
        let main = s.current_tab().await.unwrap();
        let tab = s.open_tab().await.unwrap();
        s.switch_to(&tab).await.unwrap();
        s.goto("https://shop.test/second").await.unwrap();
        s.close_tab().await.unwrap();
        assert!(matches!(
            s.find(&Locator::css("p")).await,
            Err(SessionError::NoSuchWindow)
        ));
        s.switch_to(&main).await.unwrap();
        assert_eq!(s.current_url().await.unwrap().as_str(), ROOT);
        assert_eq!(s.open_tabs(), 1);
    }

    #[tokio::test]
    async fn test_closing_page_leaves_only_its_tab() {
        let s = session().closing_other_tabs("https://shop.test/second");
        s.goto(ROOT).await.unwrap();
        let main = s.current_tab().await.unwrap();
        let tab = s.open_tab().await.unwrap();
        s.switch_to(&tab).await.unwrap();
        s.goto("https://shop.test/second").await.unwrap();

        assert_eq!(s.open_tabs(), 1);
        assert!(matches!(
            s.switch_to(&main).await,
            Err(SessionError::NoSuchWindow)
        ));
    }
}
