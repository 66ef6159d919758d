//! Site routes and page components.
//!
//! # Routes
//!
//! | name | pattern | page |
//! |---|---|---|
//! | `root` | `/` | novel list |
//! | `home` | `/:lang` | novel list |
//! | `novel` | `/:lang/novel/:novel` | table of contents |
//! | `chapter` | `/:lang/novel/:novel/:chapter` | chapter reader |
//! | `not-found` | `/:lang/*rest` | 404 page |
//!
//! Route data is loaded by [`PrefetchGuard`] before render and read back by
//! the pages from the state store, so the client hydrates from exactly what
//! the server rendered.

mod chapter;
mod home;
mod layout;
mod novel;
mod not_found;
mod prefetch;

pub use chapter::ChapterPage;
pub use home::HomePage;
pub use layout::{ANNOUNCEMENT_BINDING, Layout};
pub use not_found::{NOT_FOUND_MARKER, NotFoundPage};
pub use novel::NovelPage;
pub use prefetch::{PrefetchGuard, keys};

use crate::app::router::{RouteDef, RouteMatch, RouteTable};
use crate::app::view::View;

/// The site's route table.
pub fn routes() -> RouteTable {
    RouteTable::new()
        .route(RouteDef::new("root", "/", home_page))
        .route(RouteDef::new("home", "/:lang", home_page))
        .route(RouteDef::new("novel", "/:lang/novel/:novel", novel_page))
        .route(RouteDef::new(
            "chapter",
            "/:lang/novel/:novel/:chapter",
            chapter_page,
        ))
        .route(RouteDef::new("not-found", "/:lang/*rest", not_found_page))
        .guard(PrefetchGuard)
}

/// Root of the UI tree.
pub fn root() -> View {
    View::component(Layout)
}

fn home_page(_: &RouteMatch) -> View {
    View::component(HomePage)
}

fn novel_page(_: &RouteMatch) -> View {
    View::component(NovelPage)
}

fn chapter_page(_: &RouteMatch) -> View {
    View::component(ChapterPage)
}

fn not_found_page(_: &RouteMatch) -> View {
    View::component(NotFoundPage)
}
