//! Per-request application instances.
//!
//! An [`App`] bundles a router, a reactive state store, and document head
//! state. One is created for every render and dropped when the render
//! returns, so concurrent requests never observe each other's state.
//!
//! # Modules
//!
//! - [`router`]: route table, guards, and the request-scoped router
//! - [`store`]: reactive state container and dehydration
//! - [`head`]: document head state and meta bindings
//! - [`view`]: UI tree, components, and the HTML serializer

pub mod head;
pub mod router;
pub mod store;
pub mod view;

use std::sync::Arc;

use head::Head;
use router::{GuardContext, RouteMatch, Router};
use store::StateStore;

use crate::error::RouteError;
use crate::i18n::LocaleTable;
use crate::render::{RenderEnv, RenderRequest};

/// An isolated application instance.
#[derive(Debug)]
pub struct App {
    pub router: Router,
    pub store: StateStore,
    pub head: Head,
}

impl App {
    /// Create a fresh instance; nothing mutable is shared with other
    /// instances.
    pub fn create(env: &RenderEnv) -> Self {
        Self {
            router: Router::new(Arc::clone(&env.routes)),
            store: StateStore::new(),
            head: Head::new(env.site.clone()),
        }
    }

    /// Push `url` into the router and wait until the navigation is
    /// committed, then bind the head to the resolved route.
    pub async fn navigate(&mut self, url: &str, env: &RenderEnv) -> Result<(), RouteError> {
        let cx = GuardContext {
            store: &self.store,
            catalog: env.catalog.as_ref(),
            locales: &env.locales,
        };
        self.router.push(url);
        let to = self.router.ready(cx).await?;
        self.head.set_route(&to.path, to.meta.clone());
        Ok(())
    }
}

/// Everything a component can see while rendering.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub request: &'a RenderRequest,
    pub route: &'a RouteMatch,
    pub store: &'a StateStore,
    pub head: &'a Head,
    pub locales: &'a LocaleTable,
    /// Active locale id.
    pub locale: &'a str,
}

impl std::fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("route", &self.route.name)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl RenderContext<'_> {
    /// Translate `key` in the active locale.
    pub fn t(&self, key: &str, args: &[&dyn std::fmt::Display]) -> String {
        self.locales.t(self.locale, key, args)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.request.cookies.get(name).map(String::as_str)
    }

    /// A platform binding, when the host provided an environment.
    pub fn env(&self, name: &str) -> Option<&str> {
        self.request.env.as_deref().and_then(|env| env.get(name))
    }

    /// Prefix an in-app path with the active locale.
    pub fn href(&self, path: &str) -> String {
        format!("/{}{}", self.locale, path)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for rendering components outside the full pipeline.

    use super::*;
    use crate::catalog::{SAMPLE, StaticCatalog};

    pub(crate) struct Fixture {
        pub env: RenderEnv,
        pub app: App,
        pub request: RenderRequest,
    }

    impl Fixture {
        /// Build an app with the sample catalog and navigate it to `url`.
        pub async fn new(url: &str) -> Self {
            let catalog = StaticCatalog::from_json(SAMPLE).unwrap();
            let env = RenderEnv::for_tests(Arc::new(catalog));
            let mut app = App::create(&env);
            app.navigate(url, &env).await.unwrap();
            Self {
                env,
                app,
                request: RenderRequest::new(url),
            }
        }

        pub fn context(&self) -> RenderContext<'_> {
            let route = self.app.router.current().unwrap();
            RenderContext {
                request: &self.request,
                route,
                store: &self.app.store,
                head: &self.app.head,
                locales: &self.env.locales,
                locale: self.env.locales.normalize(route.param("lang")),
            }
        }
    }
}
