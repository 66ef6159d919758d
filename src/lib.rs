//! Server-side rendering for a multilingual novel reading site.
//!
//! Every request gets its own application instance: the router resolves the
//! URL, navigation guards load novel data into a reactive store, and the UI
//! tree is serialized to HTML. The result is spliced into the client build's
//! HTML shell together with preload links, head tags, and the dehydrated
//! state the client hydrates from.
//!
//! # Architecture
//!
//! - **Locale resolution**: path prefix, then `Accept-Language`, then the
//!   fallback locale; unprefixed paths are redirected
//! - **Render pipeline**: per-request [`app::App`], async component walk,
//!   module tracking for preloads
//! - **Entry points**: a dev middleware that reloads the shell per request
//!   and a production edge handler that degrades to the bare shell on failure
//!
//! # Modules
//!
//! - [`i18n`]: locale table, translations, and locale resolution
//! - [`app`]: application instances, router, state store, head, views
//! - [`pages`]: site routes and page components
//! - [`render`]: the render function shared by both entry points
//! - [`preload`]: preload link generation from the asset manifest
//! - [`template`]: typed HTML shell slots
//! - [`dev`] / [`edge`]: HTTP entry points

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod app;
pub mod catalog;
pub mod config;
pub mod dev;
pub mod edge;
pub mod error;
pub mod i18n;
pub mod manifest;
pub mod pages;
pub mod preload;
pub mod render;
pub mod server;
pub mod telemetry;
pub mod template;

pub use error::{Result, SsrError};
pub use render::{RenderEnv, RenderRequest, RenderResult, render};
