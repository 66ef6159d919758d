//! Route table and the per-request router.
//!
//! The [`RouteTable`] is immutable and shared by every request. Each
//! application instance owns a [`Router`] that records a pending navigation
//! on [`Router::push`] and commits it in [`Router::ready`] once every
//! navigation guard has run.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::head::PageMeta;
use super::store::StateStore;
use super::view::View;
use crate::catalog::NovelSource;
use crate::error::{GuardError, RouteError};
use crate::i18n::LocaleTable;

/// Builds the page view for a matched route.
pub type PageFn = fn(&RouteMatch) -> View;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    /// Matches all remaining segments, including none.
    CatchAll(String),
}

/// A named route pattern such as `/:lang/novel/:novel`.
#[derive(Debug, Clone)]
pub struct RouteDef {
    name: &'static str,
    segments: Vec<Segment>,
    meta: PageMeta,
    page: PageFn,
}

impl RouteDef {
    pub fn new(name: &'static str, pattern: &str, page: PageFn) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if let Some(p) = s.strip_prefix(':') {
                    Segment::Param(p.to_string())
                } else if let Some(p) = s.strip_prefix('*') {
                    Segment::CatchAll(p.to_string())
                } else {
                    Segment::Static(s.to_string())
                }
            })
            .collect();
        Self {
            name,
            segments,
            meta: PageMeta::default(),
            page,
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: PageMeta) -> Self {
        self.meta = meta;
        self
    }

    fn match_path(&self, parts: &[&str]) -> Option<HashMap<String, String>> {
        let mut params = HashMap::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::CatchAll(name) => {
                    params.insert(name.clone(), parts.get(i..).unwrap_or_default().join("/"));
                    return Some(params);
                }
                Segment::Static(s) => {
                    if parts.get(i) != Some(&s.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), (*parts.get(i)?).to_string());
                }
            }
        }
        (parts.len() == self.segments.len()).then_some(params)
    }
}

/// A resolved navigation target.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub name: &'static str,
    /// Path without query string.
    pub path: String,
    /// Path plus query string, as pushed.
    pub full_path: String,
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub meta: PageMeta,
    page: PageFn,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Build the view for this route's page.
    pub fn page(&self) -> View {
        (self.page)(self)
    }
}

/// Shared state handed to navigation guards.
#[derive(Clone, Copy)]
pub struct GuardContext<'a> {
    pub store: &'a StateStore,
    pub catalog: &'a dyn NovelSource,
    pub locales: &'a LocaleTable,
}

impl std::fmt::Debug for GuardContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardContext")
            .field("store", self.store)
            .finish_non_exhaustive()
    }
}

/// Runs before a navigation is committed. Guards may load data into the
/// store; an error aborts the navigation.
#[async_trait]
pub trait NavigationGuard: Send + Sync {
    async fn before_each(&self, to: &RouteMatch, cx: GuardContext<'_>) -> Result<(), GuardError>;
}

/// Immutable route table plus its global guards.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
    guards: Vec<Arc<dyn NavigationGuard>>,
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes)
            .field("guards", &self.guards.len())
            .finish()
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route; earlier routes take precedence.
    #[must_use]
    pub fn route(mut self, def: RouteDef) -> Self {
        self.routes.push(def);
        self
    }

    #[must_use]
    pub fn guard(mut self, guard: impl NavigationGuard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Match `url` (path plus optional query) against the table.
    pub fn resolve(&self, url: &str) -> Result<RouteMatch, RouteError> {
        let base = Url::parse("http://localhost/").map_err(|e| RouteError::NoMatch(e.to_string()))?;
        let parsed = base
            .join(url)
            .map_err(|_| RouteError::NoMatch(url.to_string()))?;

        let path = parsed.path().to_string();
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let query: HashMap<String, String> = parsed.query_pairs().into_owned().collect();
        let full_path = match parsed.query() {
            Some(q) => format!("{path}?{q}"),
            None => path.clone(),
        };

        self.routes
            .iter()
            .find_map(|def| {
                def.match_path(&parts).map(|params| RouteMatch {
                    name: def.name,
                    path: path.clone(),
                    full_path: full_path.clone(),
                    params,
                    query: query.clone(),
                    meta: def.meta.clone(),
                    page: def.page,
                })
            })
            .ok_or(RouteError::NoMatch(path))
    }
}

/// Request-scoped router.
#[derive(Debug)]
pub struct Router {
    table: Arc<RouteTable>,
    pending: Option<String>,
    current: Option<RouteMatch>,
}

impl Router {
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self {
            table,
            pending: None,
            current: None,
        }
    }

    /// Record a navigation to `url`; it is resolved by [`Router::ready`].
    pub fn push(&mut self, url: impl Into<String>) {
        self.pending = Some(url.into());
    }

    /// Resolve the pending navigation, run guards, and commit it.
    pub async fn ready(&mut self, cx: GuardContext<'_>) -> Result<&RouteMatch, RouteError> {
        let url = self.pending.take().ok_or(RouteError::NotPushed)?;
        let to = self.table.resolve(&url)?;

        for guard in &self.table.guards {
            guard.before_each(&to, cx).await?;
        }

        tracing::debug!(route = to.name, path = %to.path, "Route resolved");
        Ok(self.current.insert(to))
    }

    pub fn current(&self) -> Option<&RouteMatch> {
        self.current.as_ref()
    }
}
