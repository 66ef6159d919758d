//! The server render function shared by both entry points.
//!
//! [`render`] takes a URL, the asset manifest, the request context, and the
//! immutable [`RenderEnv`]; it creates an isolated [`App`], resolves the
//! route, serializes the UI tree, and derives preload links, head tags, and
//! the dehydrated state from that single render.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use axum_extra::extract::cookie::Cookie;

use crate::app::App;
use crate::app::head::SiteMeta;
use crate::app::router::RouteTable;
use crate::app::store::dehydrate;
use crate::app::view::render_to_string;
use crate::app::RenderContext;
use crate::catalog::NovelSource;
use crate::error::{Result, RouteError, SsrError};
use crate::i18n::LocaleTable;
use crate::manifest::Manifest;
use crate::pages;
use crate::preload::render_preload_links;

/// Platform bindings made available to components (edge target only).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformEnv {
    vars: HashMap<String, String>,
}

impl PlatformEnv {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Request context handed to the renderer.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    /// Path plus query string.
    pub url: String,
    pub cookies: HashMap<String, String>,
    pub headers: HeaderMap,
    pub env: Option<Arc<PlatformEnv>>,
}

impl RenderRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cookies(mut self, cookies: HashMap<String, String>) -> Self {
        self.cookies = cookies;
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_env(mut self, env: Option<Arc<PlatformEnv>>) -> Self {
        self.env = env;
        self
    }
}

/// Parse a `Cookie` request header into a name → value map. Malformed
/// pairs are ignored.
pub fn parse_cookie_header(value: &str) -> HashMap<String, String> {
    Cookie::split_parse(value)
        .filter_map(std::result::Result::ok)
        .map(|c| (c.name().to_string(), c.value().to_string()))
        .collect()
}

/// Output of one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderResult {
    pub html: String,
    pub preload_links: String,
    pub head_tags: String,
    pub state: String,
    pub locale: String,
}

/// Immutable configuration injected into every render.
#[derive(Clone)]
pub struct RenderEnv {
    pub locales: Arc<LocaleTable>,
    pub routes: Arc<RouteTable>,
    pub catalog: Arc<dyn NovelSource>,
    pub site: SiteMeta,
    /// Deadline for route resolution plus render; `None` waits forever.
    pub render_timeout: Option<Duration>,
}

impl std::fmt::Debug for RenderEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderEnv")
            .field("routes", &self.routes)
            .field("site", &self.site)
            .field("render_timeout", &self.render_timeout)
            .finish_non_exhaustive()
    }
}

impl RenderEnv {
    /// Environment serving the site's own routes.
    pub fn new(locales: Arc<LocaleTable>, catalog: Arc<dyn NovelSource>, site: SiteMeta) -> Self {
        Self {
            locales,
            routes: Arc::new(pages::routes()),
            catalog,
            site,
            render_timeout: None,
        }
    }

    #[must_use]
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = Arc::new(routes);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.render_timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(crate) fn for_tests(catalog: Arc<dyn NovelSource>) -> Self {
        let locales = LocaleTable::builtin().unwrap();
        let site = SiteMeta {
            title: "Novel Hall".to_string(),
            base_url: "https://novels.example".to_string(),
            keywords: "novels".to_string(),
            description: "Read novels online".to_string(),
            image: "/static/icon.png".to_string(),
        };
        Self::new(Arc::new(locales), catalog, site)
    }
}

/// Render `url` into a [`RenderResult`].
///
/// Route failures surface as [`SsrError::RouteResolution`], component
/// failures as [`SsrError::Render`], and an expired deadline as
/// [`SsrError::Timeout`].
pub async fn render(
    url: &str,
    manifest: &Manifest,
    request: &RenderRequest,
    env: &RenderEnv,
) -> Result<RenderResult> {
    let started = Instant::now();
    let work = render_app(url, manifest, request, env);
    let result = match env.render_timeout {
        Some(deadline) => tokio::time::timeout(deadline, work)
            .await
            .unwrap_or_else(|_elapsed| Err(SsrError::Timeout(deadline))),
        None => work.await,
    };
    metrics::histogram!("ssr_render_duration_seconds").record(started.elapsed().as_secs_f64());
    result
}

async fn render_app(
    url: &str,
    manifest: &Manifest,
    request: &RenderRequest,
    env: &RenderEnv,
) -> Result<RenderResult> {
    let mut app = App::create(env);
    app.navigate(url, env)
        .await
        .map_err(|source| SsrError::RouteResolution {
            url: url.to_string(),
            source,
        })?;

    let route = app.router.current().ok_or_else(|| SsrError::RouteResolution {
        url: url.to_string(),
        source: RouteError::NotPushed,
    })?;
    let locale = env.locales.normalize(route.param("lang"));

    let cx = RenderContext {
        request,
        route,
        store: &app.store,
        head: &app.head,
        locales: &env.locales,
        locale,
    };
    let rendered = render_to_string(&pages::root(), &cx).await?;

    Ok(RenderResult {
        preload_links: render_preload_links(&rendered.modules, manifest),
        head_tags: app.head.render_tags(),
        state: dehydrate(&app.store),
        locale: locale.to_string(),
        html: rendered.html,
    })
}
