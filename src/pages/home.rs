use async_trait::async_trait;

use super::keys;
use crate::app::RenderContext;
use crate::app::head::PageMeta;
use crate::app::view::{Component, View, el};
use crate::catalog::NovelSummary;
use crate::error::RenderError;

/// The novel list.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomePage;

#[async_trait]
impl Component for HomePage {
    fn module_id(&self) -> &'static str {
        "pages/home"
    }

    async fn render(&self, cx: &RenderContext<'_>) -> Result<View, RenderError> {
        let title = cx.t("home.title", &[]);
        cx.head.use_meta(PageMeta {
            title: Some(title.clone()),
            ..PageMeta::default()
        });

        let novels: Vec<NovelSummary> = cx.store.get_as(keys::NOVELS).unwrap_or_default();
        let body: View = if novels.is_empty() {
            el("p").class("empty").child(cx.t("home.empty", &[])).into()
        } else {
            el("ul")
                .class("novel-list")
                .children(novels.iter().map(|n| {
                    el("li")
                        .child(
                            el("a")
                                .attr("href", cx.href(&format!("/novel/{}", n.id)))
                                .child(n.title.as_str()),
                        )
                        .child(
                            el("span")
                                .class("author")
                                .child(cx.t("novel.author", &[&n.author])),
                        )
                        .child(
                            el("span")
                                .class("count")
                                .child(cx.t("home.chapter_count", &[&n.chapter_count])),
                        )
                        .into()
                }))
                .into()
        };

        Ok(el("section")
            .class("home")
            .child(el("h1").child(title))
            .child(body)
            .into())
    }
}
