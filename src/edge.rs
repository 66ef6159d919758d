//! Production request handler.
//!
//! Works from a precompiled shell and manifest. Users never see a broken
//! page: when rendering fails the unrendered shell is served with 200 and the
//! client app takes over. Only requests whose URL carries the debug marker
//! get the error detail, with a 500.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{debug, error, info};

use crate::error::{SsrError, report};
use crate::i18n::{LocaleResolution, resolve_locale};
use crate::manifest::Manifest;
use crate::pages::NOT_FOUND_MARKER;
use crate::render::{PlatformEnv, RenderEnv, RenderRequest, parse_cookie_header, render};
use crate::template::Template;

/// Default URL substring that opts a request into error detail.
pub const DEFAULT_DEBUG_MARKER: &str = "debug";

/// Renders requests against the built client.
#[derive(Debug, Clone)]
pub struct EdgeHandler {
    template: Arc<Template>,
    manifest: Arc<Manifest>,
    env: Arc<RenderEnv>,
    platform_env: Option<Arc<PlatformEnv>>,
    debug_marker: String,
}

impl EdgeHandler {
    pub fn new(template: Template, manifest: Manifest, env: RenderEnv) -> Self {
        Self {
            template: Arc::new(template),
            manifest: Arc::new(manifest),
            env: Arc::new(env),
            platform_env: None,
            debug_marker: DEFAULT_DEBUG_MARKER.to_string(),
        }
    }

    #[must_use]
    pub fn with_platform_env(mut self, env: PlatformEnv) -> Self {
        self.platform_env = Some(Arc::new(env));
        self
    }

    #[must_use]
    pub fn with_debug_marker(mut self, marker: impl Into<String>) -> Self {
        self.debug_marker = marker.into();
        self
    }

    /// Answer one request.
    pub async fn handle(&self, req: Request) -> Response {
        let (parts, _body) = req.into_parts();
        let response = self.respond(&parts).await;
        metrics::counter!(
            "ssr_requests_total",
            "target" => "edge",
            "status" => response.status().as_u16().to_string()
        )
        .increment(1);
        response
    }

    async fn respond(&self, req: &Parts) -> Response {
        let uri = &req.uri;
        let url = uri.path_and_query().map_or("/", |pq| pq.as_str());
        let accept_language = req
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());

        let resolution = resolve_locale(uri.path(), uri.query(), accept_language, &self.env.locales);
        if let LocaleResolution::Redirect { locale, location } = resolution {
            info!(name: "edge.redirect", url = %url, locale = %locale, location = %location, "Locale redirect");
            return redirect(&location);
        }

        let cookies = req
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(parse_cookie_header)
            .unwrap_or_default();
        let request = RenderRequest::new(url)
            .with_cookies(cookies)
            .with_headers(req.headers.clone())
            .with_env(self.platform_env.clone());

        match render(url, &self.manifest, &request, &self.env).await {
            Ok(rendered) => {
                let status = if rendered.html.contains(NOT_FOUND_MARKER) {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::OK
                };
                debug!(url = %url, status = status.as_u16(), "Rendered");
                html(status, self.template.compose(&rendered))
            }
            Err(err) => self.on_error(url, &err),
        }
    }

    fn on_error(&self, url: &str, err: &SsrError) -> Response {
        let detail = report(err);
        metrics::counter!("ssr_render_failures_total", "target" => "edge").increment(1);

        if !self.debug_marker.is_empty() && url.contains(&self.debug_marker) {
            error!(name: "edge.render.failed", url = %url, error = %detail, "Render failed, returning detail");
            return (StatusCode::INTERNAL_SERVER_ERROR, detail).into_response();
        }
        error!(name: "edge.render.fallback", url = %url, error = %detail, "Render failed, serving shell");
        html(StatusCode::OK, self.template.raw().to_string())
    }
}

fn html(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/html; charset=utf-8")], body).into_response()
}

fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, value)]).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

/// Router sending every `GET` to `handler`. Other methods get 405.
pub fn router(handler: Arc<EdgeHandler>) -> Router {
    Router::new().fallback_service(get(edge_fallback).with_state(handler))
}

async fn edge_fallback(State(handler): State<Arc<EdgeHandler>>, req: Request) -> Response {
    handler.handle(req).await
}
