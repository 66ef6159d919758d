use async_trait::async_trait;

use super::{NotFoundPage, keys};
use crate::app::RenderContext;
use crate::app::head::PageMeta;
use crate::app::view::{Component, View, el};
use crate::catalog::{Chapter, Novel};
use crate::error::RenderError;

/// Chapter reader with prev/next navigation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChapterPage;

#[async_trait]
impl Component for ChapterPage {
    fn module_id(&self) -> &'static str {
        "pages/chapter"
    }

    async fn render(&self, cx: &RenderContext<'_>) -> Result<View, RenderError> {
        let novel = cx.store.get_as::<Novel>(keys::NOVEL);
        let chapter = cx.store.get_as::<Chapter>(keys::CHAPTER);
        let (Some(novel), Some(chapter)) = (novel, chapter) else {
            return Ok(View::component(NotFoundPage));
        };

        cx.head.use_meta(PageMeta {
            title: Some(format!("{} - {}", chapter.title, novel.title)),
            description: chapter.paragraphs.first().cloned(),
            image: novel.cover.clone(),
            ..PageMeta::default()
        });

        let base = format!("/novel/{}", novel.id);
        let link = |id: &str, key: &str, class: &'static str| -> View {
            el("a")
                .class(class)
                .attr("href", cx.href(&format!("{base}/{id}")))
                .child(cx.t(key, &[]))
                .into()
        };

        let mut nav = Vec::with_capacity(3);
        if let Some(prev) = &chapter.prev {
            nav.push(link(prev, "chapter.prev", "prev"));
        }
        nav.push(
            el("a")
                .class("back")
                .attr("href", cx.href(&base))
                .child(cx.t("chapter.back", &[]))
                .into(),
        );
        if let Some(next) = &chapter.next {
            nav.push(link(next, "chapter.next", "next"));
        }

        Ok(el("article")
            .class("chapter")
            .child(el("h1").child(chapter.title.as_str()))
            .child(el("p").class("novel-title").child(novel.title.as_str()))
            .child(
                el("div")
                    .class("content")
                    .children(chapter.paragraphs.iter().map(|p| el("p").child(p.as_str()).into())),
            )
            .child(el("nav").class("chapter-nav").children(nav))
            .into())
    }
}
