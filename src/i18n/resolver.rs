//! Locale resolution for incoming requests.

use super::{LocaleTable, accept_language};

/// Outcome of resolving the active locale for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleResolution {
    /// The path already carries a supported locale prefix.
    Matched(String),
    /// The path has no prefix; the client should be sent to `location`.
    Redirect { locale: String, location: String },
}

impl LocaleResolution {
    pub fn locale(&self) -> &str {
        match self {
            Self::Matched(locale) | Self::Redirect { locale, .. } => locale,
        }
    }
}

/// Return the supported locale prefixing `path`, if any.
///
/// The prefix must end at a segment boundary: `/en` and `/en/...` match,
/// `/english` does not.
pub fn path_locale<'a>(path: &str, locales: &'a LocaleTable) -> Option<&'a str> {
    locales.iter().map(|l| l.id.as_str()).find(|id| {
        path.strip_prefix('/')
            .and_then(|rest| rest.strip_prefix(id))
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Pick the best supported locale from an Accept-Language value.
pub fn negotiate<'a>(accept_language: Option<&str>, locales: &'a LocaleTable) -> Option<&'a str> {
    let header = accept_language?.trim();
    if header.is_empty() {
        return None;
    }
    accept_language::parse(header)
        .iter()
        .find_map(|tag| locales.get(&tag.code))
        .map(|l| l.id.as_str())
}

/// Resolve the active locale for `path` (without query) and `query`.
pub fn resolve_locale(
    path: &str,
    query: Option<&str>,
    accept_language: Option<&str>,
    locales: &LocaleTable,
) -> LocaleResolution {
    if let Some(locale) = path_locale(path, locales) {
        return LocaleResolution::Matched(locale.to_string());
    }

    let locale = negotiate(accept_language, locales).unwrap_or(locales.fallback());
    let mut location = format!("/{locale}{path}");
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        location.push('?');
        location.push_str(q);
    }

    LocaleResolution::Redirect {
        locale: locale.to_string(),
        location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LocaleTable {
        LocaleTable::builtin().unwrap()
    }

    #[test]
    fn test_prefixed_paths_match_without_redirect() {
        let locales = table();
        for id in ["zh", "en", "ja"] {
            for rest in ["", "/", "/novel/1", "/novel/1/2"] {
                let path = format!("/{id}{rest}");
                assert_eq!(
                    resolve_locale(&path, None, None, &locales),
                    LocaleResolution::Matched(id.to_string()),
                    "path {path}"
                );
            }
        }
    }

    #[test]
    fn test_prefix_requires_segment_boundary() {
        let locales = table();
        assert_eq!(path_locale("/english/novel", &locales), None);
        assert_eq!(path_locale("/ja", &locales), Some("ja"));
    }

    #[test]
    fn test_redirect_uses_accept_language() {
        let locales = table();
        let res = resolve_locale("/novel/3", None, Some("ja-JP,ja;q=0.9,en;q=0.8"), &locales);
        assert_eq!(
            res,
            LocaleResolution::Redirect {
                locale: "ja".to_string(),
                location: "/ja/novel/3".to_string(),
            }
        );
    }

    #[test]
    fn test_redirect_skips_unsupported_preferences() {
        let locales = table();
        let res = resolve_locale("/", None, Some("de-DE, fr;q=0.9, zh;q=0.5"), &locales);
        assert_eq!(res.locale(), "zh");
    }

    #[test]
    fn test_redirect_falls_back_and_keeps_query() {
        let locales = table();
        for header in [None, Some(""), Some("de, fr"), Some(";;;q==")] {
            let res = resolve_locale("/search", Some("q=wolf&page=2"), header, &locales);
            assert_eq!(
                res,
                LocaleResolution::Redirect {
                    locale: "en".to_string(),
                    location: "/en/search?q=wolf&page=2".to_string(),
                }
            );
        }
    }

    #[test]
    fn test_root_redirect() {
        let locales = table();
        let res = resolve_locale("/", Some(""), None, &locales);
        assert_eq!(
            res,
            LocaleResolution::Redirect {
                locale: "en".to_string(),
                location: "/en/".to_string(),
            }
        );
    }
}
