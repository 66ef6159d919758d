//! Development middleware.
//!
//! Every request re-reads the shell through a [`DevHost`], so edits to
//! `index.html` or the manifest show up without a restart. Errors are always
//! reported in full: this surface is for developers only.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use crate::error::{DevHostError, SsrError, report};
use crate::manifest::Manifest;
use crate::render::{RenderEnv, RenderRequest, render};
use crate::template::{SlotMode, Template};

/// Query key that asks for the bare client shell.
pub const CLIENT_ENTRY_PARAM: &str = "client_entry";

/// Source of the per-request shell and manifest.
#[async_trait]
pub trait DevHost: Send + Sync {
    /// The shell for `url`, with dev-time client tooling injected.
    async fn transform_index_html(&self, url: &str) -> Result<String, DevHostError>;

    /// The current asset manifest.
    async fn manifest(&self) -> Result<Manifest, DevHostError>;
}

/// Reads `index.html` and the manifest from disk on every request.
#[derive(Debug, Clone)]
pub struct FsDevHost {
    index_html: PathBuf,
    manifest: PathBuf,
    client_script: String,
}

impl FsDevHost {
    pub fn new(
        index_html: impl Into<PathBuf>,
        manifest: impl Into<PathBuf>,
        client_script: impl Into<String>,
    ) -> Self {
        Self {
            index_html: index_html.into(),
            manifest: manifest.into(),
            client_script: client_script.into(),
        }
    }

    fn inject_client(&self, shell: &str) -> String {
        let tag = format!(r#"<script type="module" src="{}"></script>"#, self.client_script);
        match shell.find("<head>") {
            Some(pos) => {
                let at = pos + "<head>".len();
                format!("{}{}{}", &shell[..at], tag, &shell[at..])
            }
            None => format!("{tag}{shell}"),
        }
    }
}

#[async_trait]
impl DevHost for FsDevHost {
    async fn transform_index_html(&self, url: &str) -> Result<String, DevHostError> {
        let shell = tokio::fs::read_to_string(&self.index_html)
            .await
            .map_err(|source| DevHostError::Io {
                path: self.index_html.display().to_string(),
                source,
            })?;
        debug!(url, path = %self.index_html.display(), "Shell reloaded");
        Ok(self.inject_client(&shell))
    }

    async fn manifest(&self) -> Result<Manifest, DevHostError> {
        Ok(Manifest::load_or_empty(&self.manifest).await?)
    }
}

/// Fetches the transformed shell from a running bundler dev server.
#[derive(Debug, Clone)]
pub struct ProxyDevHost {
    client: reqwest::Client,
    base_url: String,
}

impl ProxyDevHost {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DevHost for ProxyDevHost {
    async fn transform_index_html(&self, url: &str) -> Result<String, DevHostError> {
        let target = format!("{}{}", self.base_url, url);
        let res = self
            .client
            .get(&target)
            .header(header::ACCEPT, "text/html")
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(DevHostError::Status {
                status: res.status().as_u16(),
                url: target,
            });
        }
        Ok(res.text().await?)
    }

    /// The bundler serves modules on demand, so there is nothing to preload.
    async fn manifest(&self) -> Result<Manifest, DevHostError> {
        Ok(Manifest::default())
    }
}

/// State shared by dev request handlers.
#[derive(Clone)]
pub struct DevState {
    pub host: Arc<dyn DevHost>,
    pub env: Arc<RenderEnv>,
}

impl std::fmt::Debug for DevState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevState").field("env", &self.env).finish_non_exhaustive()
    }
}

/// Router answering `GET|POST *` with a fresh render.
pub fn router(state: DevState) -> Router {
    Router::new()
        .route("/", get(dev_handler).post(dev_handler))
        .route("/{*path}", get(dev_handler).post(dev_handler))
        .with_state(state)
}

fn has_client_entry(uri: &Uri) -> bool {
    uri.query().is_some_and(|q| {
        url::form_urlencoded::parse(q.as_bytes()).any(|(key, _)| key == CLIENT_ENTRY_PARAM)
    })
}

async fn dev_handler(
    State(state): State<DevState>,
    jar: CookieJar,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let url = uri.path_and_query().map_or("/", |pq| pq.as_str()).to_string();
    let cookies: HashMap<String, String> = jar
        .iter()
        .map(|c| (c.name().to_string(), c.value().to_string()))
        .collect();
    let request = RenderRequest::new(url.clone())
        .with_cookies(cookies)
        .with_headers(headers);

    let response = match serve(&state, &url, has_client_entry(&uri), &request).await {
        Ok(html) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            html,
        )
            .into_response(),
        Err(err) => {
            let detail = report(&err);
            warn!(name: "dev.render.failed", url = %url, error = %detail, "Dev render failed");
            metrics::counter!("ssr_render_failures_total", "target" => "dev").increment(1);
            (StatusCode::INTERNAL_SERVER_ERROR, detail).into_response()
        }
    };
    metrics::counter!(
        "ssr_requests_total",
        "target" => "dev",
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);
    response
}

async fn serve(
    state: &DevState,
    url: &str,
    client_entry: bool,
    request: &RenderRequest,
) -> Result<String, SsrError> {
    let shell = state.host.transform_index_html(url).await?;
    if client_entry {
        return Ok(shell);
    }

    let manifest = state.host.manifest().await?;
    let rendered = render(url, &manifest, request, &state.env).await?;
    let template = Template::new(shell, SlotMode::Lenient)?;
    Ok(template.compose(&rendered))
}
