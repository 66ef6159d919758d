use async_trait::async_trait;

use super::{NotFoundPage, keys};
use crate::app::RenderContext;
use crate::app::head::PageMeta;
use crate::app::view::{Component, View, el};
use crate::catalog::Novel;
use crate::error::RenderError;

/// A novel's table of contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct NovelPage;

#[async_trait]
impl Component for NovelPage {
    fn module_id(&self) -> &'static str {
        "pages/novel"
    }

    async fn render(&self, cx: &RenderContext<'_>) -> Result<View, RenderError> {
        let Some(novel) = cx.store.get_as::<Novel>(keys::NOVEL) else {
            return Ok(View::component(NotFoundPage));
        };

        cx.head.use_meta(PageMeta {
            title: Some(novel.title.clone()),
            description: Some(novel.summary.clone()).filter(|s| !s.is_empty()),
            image: novel.cover.clone(),
            ..PageMeta::default()
        });

        let base = format!("/novel/{}", novel.id);
        let toc = el("ol").class("toc").children(novel.chapters.iter().map(|c| {
            el("li")
                .child(
                    el("a")
                        .attr("href", cx.href(&format!("{base}/{}", c.id)))
                        .child(c.title.as_str()),
                )
                .into()
        }));

        let mut article = el("article")
            .class("novel")
            .child(el("h1").child(novel.title.as_str()))
            .child(el("p").class("author").child(cx.t("novel.author", &[&novel.author])));
        if let Some(cover) = &novel.cover {
            article = article.child(
                el("img")
                    .class("cover")
                    .attr("src", cover.as_str())
                    .attr("alt", novel.title.as_str()),
            );
        }
        if !novel.summary.is_empty() {
            article = article.child(el("p").class("summary").child(novel.summary.as_str()));
        }
        if let Some(first) = novel.chapters.first() {
            article = article.child(
                el("a")
                    .class("start")
                    .attr("href", cx.href(&format!("{base}/{}", first.id)))
                    .child(cx.t("novel.start_reading", &[])),
            );
        }

        Ok(article
            .child(el("h2").child(cx.t("novel.chapters", &[])))
            .child(toc)
            .into())
    }
}
