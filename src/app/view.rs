//! Virtual UI tree and its serializer.
//!
//! Pages are built from [`View`] nodes. A [`Component`] is an async node that
//! produces more nodes when rendered; every component visited during the walk
//! contributes its module id to [`Rendered::modules`], which later drives
//! preload link generation.

use std::borrow::Cow;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use super::RenderContext;
use crate::error::RenderError;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// An async UI node.
#[async_trait]
pub trait Component: Send + Sync {
    /// Identifier of the client module implementing this component, as it
    /// appears in the asset manifest.
    fn module_id(&self) -> &'static str;

    async fn render(&self, cx: &RenderContext<'_>) -> Result<View, RenderError>;
}

/// A node in the UI tree.
pub enum View {
    Element(Element),
    /// Text content; escaped on output.
    Text(String),
    /// Pre-rendered markup; written verbatim.
    Raw(String),
    Fragment(Vec<View>),
    Component(Box<dyn Component>),
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Element(e) => e.fmt(f),
            Self::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Self::Raw(r) => f.debug_tuple("Raw").field(r).finish(),
            Self::Fragment(children) => f.debug_tuple("Fragment").field(children).finish(),
            Self::Component(c) => f.debug_tuple("Component").field(&c.module_id()).finish(),
        }
    }
}

impl View {
    pub fn empty() -> Self {
        Self::Fragment(Vec::new())
    }

    pub fn component(c: impl Component + 'static) -> Self {
        Self::Component(Box::new(c))
    }
}

impl From<Element> for View {
    fn from(e: Element) -> Self {
        Self::Element(e)
    }
}

impl From<String> for View {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for View {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<View>> for View {
    fn from(children: Vec<View>) -> Self {
        Self::Fragment(children)
    }
}

/// An HTML element with attributes and children.
#[derive(Debug)]
pub struct Element {
    tag: Cow<'static, str>,
    attrs: Vec<(Cow<'static, str>, String)>,
    children: Vec<View>,
}

/// Start building an element.
pub fn el(tag: impl Into<Cow<'static, str>>) -> Element {
    Element {
        tag: tag.into(),
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

impl Element {
    #[must_use]
    pub fn attr(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    #[must_use]
    pub fn child(mut self, child: impl Into<View>) -> Self {
        self.children.push(child.into());
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = View>) -> Self {
        self.children.extend(children);
        self
    }
}

/// Output of a render walk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    /// Module ids of visited components, in first-visit order.
    pub modules: Vec<String>,
}

/// Serialize `view` to HTML.
pub async fn render_to_string(
    view: &View,
    cx: &RenderContext<'_>,
) -> Result<Rendered, RenderError> {
    let mut out = Rendered::default();
    walk(view, cx, &mut out).await?;
    Ok(out)
}

fn walk<'a>(
    view: &'a View,
    cx: &'a RenderContext<'a>,
    out: &'a mut Rendered,
) -> BoxFuture<'a, Result<(), RenderError>> {
    async move {
        match view {
            View::Text(text) => out.html.push_str(&escape_html(text)),
            View::Raw(raw) => out.html.push_str(raw),
            View::Fragment(children) => {
                for child in children {
                    walk(child, cx, out).await?;
                }
            }
            View::Element(element) => {
                out.html.push('<');
                out.html.push_str(&element.tag);
                for (name, value) in &element.attrs {
                    out.html.push(' ');
                    out.html.push_str(name);
                    out.html.push_str("=\"");
                    out.html.push_str(&escape_html(value));
                    out.html.push('"');
                }
                out.html.push('>');

                if VOID_ELEMENTS.contains(&element.tag.as_ref()) {
                    return Ok(());
                }
                for child in &element.children {
                    walk(child, cx, out).await?;
                }
                out.html.push_str("</");
                out.html.push_str(&element.tag);
                out.html.push('>');
            }
            View::Component(component) => {
                let id = component.module_id();
                if !out.modules.iter().any(|m| m == id) {
                    out.modules.push(id.to_string());
                }
                let child = component.render(cx).await?;
                walk(&child, cx, out).await?;
            }
        }
        Ok(())
    }
    .boxed()
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::Fixture;

    struct Greeting;

    #[async_trait]
    impl Component for Greeting {
        fn module_id(&self) -> &'static str {
            "components/greeting"
        }

        async fn render(&self, cx: &RenderContext<'_>) -> Result<View, RenderError> {
            tokio::task::yield_now().await;
            Ok(el("p").child(cx.t("nav.home", &[])).into())
        }
    }

    struct Broken;

    #[async_trait]
    impl Component for Broken {
        fn module_id(&self) -> &'static str {
            "components/broken"
        }

        async fn render(&self, _cx: &RenderContext<'_>) -> Result<View, RenderError> {
            Err(RenderError::new(self.module_id(), "missing data"))
        }
    }

    #[tokio::test]
    async fn test_renders_elements_text_and_void_tags() {
        let fixture = Fixture::new("/en/").await;
        let cx = fixture.context();

        let view: View = el("div")
            .class("a\"b")
            .child("1 < 2 & 3")
            .child(el("br"))
            .child(View::Raw("<b>raw</b>".to_string()))
            .into();
        let out = render_to_string(&view, &cx).await.unwrap();

        assert_eq!(
            out.html,
            r#"<div class="a&quot;b">1 &lt; 2 &amp; 3<br><b>raw</b></div>"#
        );
        assert!(out.modules.is_empty());
    }

    #[tokio::test]
    async fn test_records_component_modules_once_in_order() {
        let fixture = Fixture::new("/ja/").await;
        let cx = fixture.context();

        let view = View::Fragment(vec![
            View::component(Greeting),
            el("hr").into(),
            View::component(Greeting),
        ]);
        let out = render_to_string(&view, &cx).await.unwrap();

        assert_eq!(out.html, "<p>ホーム</p><hr><p>ホーム</p>");
        assert_eq!(out.modules, vec!["components/greeting".to_string()]);
    }

    #[tokio::test]
    async fn test_component_failure_propagates() {
        let fixture = Fixture::new("/en/").await;
        let cx = fixture.context();

        let view: View = el("main")
            .child(View::component(Greeting))
            .child(View::component(Broken))
            .into();
        let err = render_to_string(&view, &cx).await.unwrap_err();
        assert_eq!(err.component, "components/broken");
    }

    #[test]
    fn test_escape_borrows_when_clean() {
        assert!(matches!(escape_html("plain"), Cow::Borrowed(_)));
        assert_eq!(escape_html("it's"), "it&#39;s");
    }
}
