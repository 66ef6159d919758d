//! HTML shell template with typed placeholder slots.
//!
//! The client build emits an `index.html` containing five fixed tokens. A
//! [`Template`] locates the first occurrence of each token once, then
//! [`Template::compose`] fills them from a [`RenderResult`] in a single
//! left-to-right pass.
//!
//! # Example
//!
//! ```rust
//! use novel_ssr::render::RenderResult;
//! use novel_ssr::template::{SlotMode, Template};
//!
//! let shell = r#"<html lang="zh"><head><!--preload-links--><!--head-tags--></head>
//! <body><div id="app"><!--app-html--></div>
//! <script>window.__SSR_STATE__ = null;//'<!--ssr-state-->'</script></body></html>"#;
//!
//! let template = Template::new(shell, SlotMode::Strict).unwrap();
//! let html = template.compose(&RenderResult {
//!     html: "<main>hi</main>".into(),
//!     locale: "en".into(),
//!     state: "{}".into(),
//!     ..Default::default()
//! });
//! assert!(html.starts_with(r#"<html lang="en">"#));
//! assert!(html.contains("<main>hi</main>"));
//! ```

use thiserror::Error;

use crate::render::RenderResult;

/// A placeholder in the HTML shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Language attribute on `<html>`.
    Lang,
    /// Rendered application markup.
    AppHtml,
    PreloadLinks,
    HeadTags,
    /// Inline-script assignment of the dehydrated state.
    State,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::Lang,
        Slot::AppHtml,
        Slot::PreloadLinks,
        Slot::HeadTags,
        Slot::State,
    ];

    /// Literal token that marks this slot in the shell.
    pub fn token(self) -> &'static str {
        match self {
            Slot::Lang => r#"lang="zh""#,
            Slot::AppHtml => "<!--app-html-->",
            Slot::PreloadLinks => "<!--preload-links-->",
            Slot::HeadTags => "<!--head-tags-->",
            Slot::State => "null;//'<!--ssr-state-->'",
        }
    }

    fn value(self, result: &RenderResult) -> String {
        match self {
            Slot::Lang => format!(r#"lang="{}""#, result.locale),
            Slot::AppHtml => result.html.clone(),
            Slot::PreloadLinks => result.preload_links.clone(),
            Slot::HeadTags => result.head_tags.clone(),
            Slot::State => result.state.clone(),
        }
    }
}

/// How strictly slot tokens are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotMode {
    /// Every slot must appear exactly once.
    Strict,
    /// Missing slots are skipped; only first occurrences are replaced.
    #[default]
    Lenient,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("shell is missing the {0:?} slot token")]
    MissingSlot(Slot),

    #[error("shell contains the {0:?} slot token more than once")]
    DuplicateSlot(Slot),

    #[error("slot tokens {0:?} and {1:?} overlap")]
    OverlappingSlots(Slot, Slot),
}

/// A parsed HTML shell.
#[derive(Debug, Clone)]
pub struct Template {
    shell: String,
    /// Slot positions, sorted by offset.
    slots: Vec<(usize, Slot)>,
}

impl Template {
    pub fn new(shell: impl Into<String>, mode: SlotMode) -> Result<Self, TemplateError> {
        let shell = shell.into();
        let mut slots = Vec::with_capacity(Slot::ALL.len());

        for slot in Slot::ALL {
            let token = slot.token();
            match shell.find(token) {
                Some(pos) => {
                    if mode == SlotMode::Strict && shell[pos + token.len()..].contains(token) {
                        return Err(TemplateError::DuplicateSlot(slot));
                    }
                    slots.push((pos, slot));
                }
                None if mode == SlotMode::Strict => return Err(TemplateError::MissingSlot(slot)),
                None => {}
            }
        }
        slots.sort_by_key(|(pos, _)| *pos);

        // Drop any slot whose token starts inside the previous one.
        let mut kept: Vec<(usize, Slot)> = Vec::with_capacity(slots.len());
        for (pos, slot) in slots {
            if let Some(&(prev_pos, prev)) = kept.last()
                && pos < prev_pos + prev.token().len()
            {
                if mode == SlotMode::Strict {
                    return Err(TemplateError::OverlappingSlots(prev, slot));
                }
                continue;
            }
            kept.push((pos, slot));
        }

        Ok(Self { shell, slots: kept })
    }

    /// The unmodified shell.
    pub fn raw(&self) -> &str {
        &self.shell
    }

    pub fn has_slot(&self, slot: Slot) -> bool {
        self.slots.iter().any(|(_, s)| *s == slot)
    }

    /// Substitute every located slot from `result`.
    pub fn compose(&self, result: &RenderResult) -> String {
        let extra: usize = result.html.len()
            + result.preload_links.len()
            + result.head_tags.len()
            + result.state.len();
        let mut out = String::with_capacity(self.shell.len() + extra);
        let mut cursor = 0;

        for &(pos, slot) in &self.slots {
            out.push_str(&self.shell[cursor..pos]);
            out.push_str(&slot.value(result));
            cursor = pos + slot.token().len();
        }
        out.push_str(&self.shell[cursor..]);
        out
    }
}
