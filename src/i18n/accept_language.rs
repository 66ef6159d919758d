//! Accept-Language header parsing.
//!
//! The parser never fails: empty, malformed, or zero-quality entries are
//! dropped and the rest are returned by descending quality. Entries with
//! equal quality keep their header order.

/// One language range from an Accept-Language header.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageTag {
    /// Primary subtag, lowercased (e.g. `en`).
    pub code: String,
    /// Region subtag, uppercased (e.g. `US`).
    pub region: Option<String>,
    /// Quality factor in `(0.0, 1.0]`.
    pub quality: f32,
}

impl LanguageTag {
    /// Parse a single range such as `en-US;q=0.8`.
    ///
    /// Returns `None` for empty ranges, invalid subtags, and `q` values that
    /// are unparseable, out of range, or zero.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split(';');
        let range = parts.next()?.trim();
        if range.is_empty() {
            return None;
        }

        let mut subtags = range.split('-');
        let code = subtags.next()?.to_ascii_lowercase();
        if !is_valid_subtag(&code) && code != "*" {
            return None;
        }
        let region = match subtags.next() {
            Some(r) if is_valid_subtag(r) => Some(r.to_ascii_uppercase()),
            Some(_) => return None,
            None => None,
        };

        let mut quality = 1.0;
        for param in parts {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            if key.trim() != "q" {
                continue;
            }
            let q: f32 = value.trim().parse().ok()?;
            if !(0.0..=1.0).contains(&q) {
                return None;
            }
            quality = q;
        }

        if quality == 0.0 {
            return None;
        }

        Some(Self {
            code,
            region,
            quality,
        })
    }
}

fn is_valid_subtag(s: &str) -> bool {
    !s.is_empty() && s.len() <= 8 && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Parse a full Accept-Language header value, best preference first.
pub fn parse(header: &str) -> Vec<LanguageTag> {
    let mut tags: Vec<LanguageTag> = header.split(',').filter_map(LanguageTag::parse).collect();
    // Stable sort keeps header order for equal quality.
    tags.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    tags
}
