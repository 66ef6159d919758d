//! Locales, translation tables, and locale resolution.
//!
//! The [`LocaleTable`] is built once at startup and shared read-only across
//! all requests. Translation tables ship inside the binary as YAML.
//!
//! # Example
//!
//! ```rust
//! use novel_ssr::i18n::LocaleTable;
//!
//! let locales = LocaleTable::builtin().unwrap();
//! assert_eq!(locales.fallback(), "en");
//! assert_eq!(locales.t("ja", "nav.home", &[]), "ホーム");
//! ```

pub mod accept_language;
pub mod resolver;

use std::collections::HashMap;
use std::fmt::Write as _;

pub use resolver::{LocaleResolution, resolve_locale};

/// Locale used when a key is missing from the active locale's table.
pub const BASE_LOCALE: &str = "zh";

/// Locale used when nothing else matches.
pub const FALLBACK_LOCALE: &str = "en";

/// A supported locale and its translation table.
#[derive(Debug, Clone)]
pub struct Locale {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub translation: HashMap<String, String>,
}

/// Immutable set of supported locales.
#[derive(Debug, Clone)]
pub struct LocaleTable {
    locales: Vec<Locale>,
    fallback: String,
}

impl LocaleTable {
    /// Build the table from the translation files embedded in the binary.
    pub fn builtin() -> Result<Self, serde_yaml::Error> {
        let table = [
            ("zh", "简体中文", "简", include_str!("../../locales/zh.yaml")),
            ("en", "English", "EN", include_str!("../../locales/en.yaml")),
            ("ja", "日本语", "日", include_str!("../../locales/ja.yaml")),
        ];

        let mut locales = Vec::with_capacity(table.len());
        for (id, name, short_name, yaml) in table {
            locales.push(Locale {
                id: id.to_string(),
                name: name.to_string(),
                short_name: short_name.to_string(),
                translation: serde_yaml::from_str(yaml)?,
            });
        }

        Ok(Self::new(locales, FALLBACK_LOCALE))
    }

    pub fn new(locales: Vec<Locale>, fallback: impl Into<String>) -> Self {
        Self {
            locales,
            fallback: fallback.into(),
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn get(&self, id: &str) -> Option<&Locale> {
        self.locales.iter().find(|l| l.id == id)
    }

    pub fn is_supported(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Supported locales in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Locale> {
        self.locales.iter()
    }

    /// Normalize a route `lang` parameter to a supported locale id.
    pub fn normalize<'a>(&'a self, lang: Option<&str>) -> &'a str {
        lang.map(str::to_lowercase)
            .and_then(|l| self.get(&l))
            .map_or(self.fallback.as_str(), |l| l.id.as_str())
    }

    /// Translate `key` for `locale`, falling back to the base locale and then
    /// to the key itself.
    pub fn t(&self, locale: &str, key: &str, args: &[&dyn std::fmt::Display]) -> String {
        let template = self
            .get(locale)
            .and_then(|l| l.translation.get(key))
            .or_else(|| self.get(BASE_LOCALE).and_then(|l| l.translation.get(key)))
            .map_or(key, String::as_str);
        sprintf(template, args)
    }
}

/// Minimal positional formatter: `%s` and `%d` consume the next argument,
/// `%%` is a literal percent. Missing arguments render as empty.
fn sprintf(template: &str, args: &[&dyn std::fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('s' | 'd') => {
                chars.next();
                if let Some(arg) = args.next() {
                    let _ = write!(out, "{arg}");
                }
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    out
}
