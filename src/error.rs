//! Error types for the render pipeline.
//!
//! Route and render failures propagate unhandled out of the inner components;
//! the entry points (`dev`, `edge`) are the only place that turns them into
//! user-visible responses.

use std::fmt::Write as _;
use std::time::Duration;

use thiserror::Error;

use crate::template::TemplateError;

/// A navigation guard refused or failed the navigation.
#[derive(Error, Debug)]
pub enum GuardError {
    /// The guard could not load data the route needs.
    #[error("failed to load {what}: {message}")]
    Load {
        /// What was being loaded (e.g. `novel 42`).
        what: String,
        /// Underlying failure.
        message: String,
    },

    /// The guard aborted navigation.
    #[error("navigation aborted: {0}")]
    Aborted(String),
}

/// The router could not commit a navigation.
#[derive(Error, Debug)]
pub enum RouteError {
    /// No route pattern matches the path.
    #[error("no route matches {0}")]
    NoMatch(String),

    /// `ready` was awaited without a prior `push`.
    #[error("no navigation pending")]
    NotPushed,

    #[error(transparent)]
    Guard(#[from] GuardError),
}

/// A component failed while being serialized.
#[derive(Error, Debug)]
#[error("component `{component}` failed to render: {message}")]
pub struct RenderError {
    /// Module id of the failing component.
    pub component: String,
    /// Failure detail.
    pub message: String,
}

impl RenderError {
    pub fn new(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the novel data source.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend-specific failure.
    #[error("catalog backend error: {0}")]
    Backend(String),
}

/// Errors raised while loading the asset manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a dev host while transforming the shell.
#[derive(Error, Debug)]
pub enum DevHostError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("dev server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Top-level pipeline error.
#[derive(Error, Debug)]
pub enum SsrError {
    /// The router could not resolve the URL or a guard failed.
    #[error("route resolution failed for {url}")]
    RouteResolution {
        url: String,
        #[source]
        source: RouteError,
    },

    /// The UI tree could not be serialized.
    #[error("render failed")]
    Render(#[from] RenderError),

    /// Route resolution plus render exceeded the configured deadline.
    #[error("render exceeded deadline of {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    DevHost(#[from] DevHostError),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, SsrError>;

/// Flatten an error and its source chain into a multi-line report.
pub fn report(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, "\n  caused by: {cause}");
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_walks_source_chain() {
        let err = SsrError::RouteResolution {
            url: "/en/novel/9".to_string(),
            source: RouteError::Guard(GuardError::Load {
                what: "novel 9".to_string(),
                message: "backend down".to_string(),
            }),
        };

        let text = report(&err);
        assert!(text.starts_with("route resolution failed for /en/novel/9"));
        assert!(text.contains("caused by: failed to load novel 9: backend down"));
    }

    #[test]
    fn test_render_error_display() {
        let err = SsrError::from(RenderError::new("pages/home", "boom"));
        let text = report(&err);
        assert!(text.contains("component `pages/home` failed to render: boom"));
    }
}
