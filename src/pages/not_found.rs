use async_trait::async_trait;

use crate::app::RenderContext;
use crate::app::head::PageMeta;
use crate::app::view::{Component, View, el};
use crate::error::RenderError;

/// Text the edge handler looks for to answer with a 404 status.
pub const NOT_FOUND_MARKER: &str = "404 -";

#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundPage;

#[async_trait]
impl Component for NotFoundPage {
    fn module_id(&self) -> &'static str {
        "pages/not-found"
    }

    async fn render(&self, cx: &RenderContext<'_>) -> Result<View, RenderError> {
        let title = cx.t("not_found.title", &[]);
        cx.head.use_meta(PageMeta {
            title: Some(title.clone()),
            ..PageMeta::default()
        });

        Ok(el("section")
            .class("not-found")
            .child(el("h1").child(format!("{NOT_FOUND_MARKER} {title}")))
            .child(
                el("a")
                    .attr("href", cx.href("/"))
                    .child(cx.t("not_found.back", &[])),
            )
            .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::Fixture;
    use crate::app::view::render_to_string;

    #[tokio::test]
    async fn test_marker_is_locale_independent() {
        for (url, title) in [("/en/x/y", "Page not found"), ("/zh/x", "页面不存在")] {
            let fixture = Fixture::new(url).await;
            let cx = fixture.context();
            let out = render_to_string(&View::component(NotFoundPage), &cx)
                .await
                .unwrap();
            assert!(out.html.contains(&format!("<h1>404 - {title}</h1>")));
            assert_eq!(cx.head.resolved().title.as_deref(), Some(title));
        }
    }
}
