use async_trait::async_trait;

use crate::app::RenderContext;
use crate::app::view::{Component, View, el};
use crate::error::RenderError;

/// Platform binding holding a site-wide banner.
pub const ANNOUNCEMENT_BINDING: &str = "announcement";

/// Site chrome: header with locale switcher, the routed page, footer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Layout;

/// Strip the locale segment from `path`, keeping a leading slash.
fn unlocalized(path: &str, lang: Option<&str>) -> String {
    let rest = lang
        .and_then(|l| path.strip_prefix('/').and_then(|p| p.strip_prefix(l)))
        .unwrap_or(path);
    if rest.starts_with('/') {
        rest.to_string()
    } else {
        format!("/{rest}")
    }
}

#[async_trait]
impl Component for Layout {
    fn module_id(&self) -> &'static str {
        "components/layout"
    }

    async fn render(&self, cx: &RenderContext<'_>) -> Result<View, RenderError> {
        let theme = match cx.cookie("theme") {
            Some("light") => "light",
            _ => "dark",
        };
        let site_title = cx.head.site().title.clone();
        let lang = cx.route.param("lang").filter(|l| cx.locales.is_supported(&l.to_lowercase()));
        let path = unlocalized(&cx.route.path, lang);

        let switcher = el("nav").class("locale-switcher").children(cx.locales.iter().map(|l| {
            let link = el("a")
                .attr("href", format!("/{}{}", l.id, path))
                .attr("hreflang", l.id.clone())
                .attr("title", l.name.clone());
            let link = if l.id == cx.locale {
                link.class("active")
            } else {
                link
            };
            link.child(l.short_name.as_str()).into()
        }));

        let header = el("header").class("site-header").children([
            el("a")
                .class("brand")
                .attr("href", cx.href("/"))
                .child(site_title)
                .into(),
            el("a")
                .attr("href", cx.href("/"))
                .child(cx.t("nav.home", &[]))
                .into(),
            switcher.into(),
        ]);

        let announcement: View = match cx.env(ANNOUNCEMENT_BINDING) {
            Some(text) if !text.is_empty() => el("p").class("announcement").child(text).into(),
            _ => View::empty(),
        };

        Ok(el("div")
            .attr("id", "app-shell")
            .class(format!("theme-{theme}"))
            .child(header)
            .child(announcement)
            .child(el("main").attr("id", "page").child(cx.route.page()))
            .child(el("footer").child(cx.t("footer.powered", &[])))
            .into())
    }
}
