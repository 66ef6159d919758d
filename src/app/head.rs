//! Document head state and meta bindings.
//!
//! Meta values resolve in three layers: site defaults, then the current
//! route's meta, then whatever the rendered page sets through
//! [`Head::use_meta`]. The resolved values drive the `<title>` and the
//! description/keywords/OpenGraph tags.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Deserialize;

use super::view::escape_html;

/// A partial set of page meta values. `None` leaves the lower layer in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageMeta {
    pub title: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
}

impl PageMeta {
    /// Overlay `other` on top of `self`.
    #[must_use]
    pub fn merged(mut self, other: &PageMeta) -> Self {
        let pick = |lower: &mut Option<String>, upper: &Option<String>| {
            if upper.is_some() {
                lower.clone_from(upper);
            }
        };
        pick(&mut self.title, &other.title);
        pick(&mut self.keywords, &other.keywords);
        pick(&mut self.description, &other.description);
        pick(&mut self.image, &other.image);
        pick(&mut self.url, &other.url);
        self
    }
}

/// Site-wide meta defaults, taken from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMeta {
    pub title: String,
    pub base_url: String,
    pub keywords: String,
    pub description: String,
    /// Default OpenGraph image (the site icon).
    pub image: String,
}

impl SiteMeta {
    fn as_page_meta(&self) -> PageMeta {
        PageMeta {
            title: Some(self.title.clone()),
            keywords: Some(self.keywords.clone()),
            description: Some(self.description.clone()),
            image: Some(self.image.clone()),
            url: None,
        }
    }
}

#[derive(Debug, Default)]
struct HeadState {
    route_path: String,
    route_meta: PageMeta,
    page_meta: PageMeta,
}

/// Request-scoped document head.
#[derive(Debug, Clone)]
pub struct Head {
    site: SiteMeta,
    state: Arc<Mutex<HeadState>>,
}

impl Head {
    pub fn new(site: SiteMeta) -> Self {
        Self {
            site,
            state: Arc::default(),
        }
    }

    pub fn site(&self) -> &SiteMeta {
        &self.site
    }

    /// Bind the head to the route the router committed.
    pub fn set_route(&self, path: &str, meta: PageMeta) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.route_path = path.to_string();
        state.route_meta = meta;
    }

    /// Set page-level meta values; later calls overlay earlier ones.
    pub fn use_meta(&self, meta: PageMeta) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let merged = std::mem::take(&mut state.page_meta).merged(&meta);
        state.page_meta = merged;
    }

    /// Fully resolved meta values.
    pub fn resolved(&self) -> PageMeta {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut meta = self
            .site
            .as_page_meta()
            .merged(&state.route_meta)
            .merged(&state.page_meta);

        if meta.image.as_deref().is_none_or(str::is_empty) {
            meta.image = Some(self.site.image.clone());
        }
        if meta.url.as_deref().is_none_or(str::is_empty) {
            meta.url = Some(format!(
                "{}{}",
                self.site.base_url.trim_end_matches('/'),
                state.route_path
            ));
        }
        meta
    }

    /// Serialize the head into HTML tags.
    pub fn render_tags(&self) -> String {
        let meta = self.resolved();
        let mut html = String::new();

        if let Some(title) = meta.title.as_deref().filter(|t| !t.is_empty()) {
            html.push_str("<title>");
            html.push_str(&escape_html(title));
            html.push_str("</title>\n");
        }

        let tags = [
            ("description", &meta.description),
            ("keywords", &meta.keywords),
            ("og:title", &meta.title),
            ("og:description", &meta.description),
            ("og:image", &meta.image),
            ("og:url", &meta.url),
        ];
        for (name, content) in tags {
            let Some(content) = content.as_deref().filter(|c| !c.is_empty()) else {
                continue;
            };
            html.push_str(&format!(
                r#"<meta name="{}" content="{}">"#,
                name,
                escape_html(content)
            ));
            html.push('\n');
        }

        html
    }
}
