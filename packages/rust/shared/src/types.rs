//! Core domain types for extracted pages and query matches.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder title used when a page has no `<title>` element.
pub const NO_TITLE: &str = "No title";

/// Sentinel main text used when a page has neither `<main>` nor `<article>`.
pub const NO_MAIN_CONTENT: &str = "No main content found";

// ---------------------------------------------------------------------------
// Heading
// ---------------------------------------------------------------------------

/// A single `h1`–`h6` heading, kept in document order on its page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level, 1 through 6. Serialized as `"h1"`..`"h6"`.
    #[serde(default = "default_level", with = "heading_level")]
    pub level: u8,
    /// Heading text, trimmed, original case.
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

impl Heading {
    pub fn new(level: u8, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

fn default_level() -> u8 {
    1
}

/// Serde adapter storing a heading level as its tag name (`"h2"`).
mod heading_level {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(level: &u8, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("h{level}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
        struct LevelVisitor;

        impl Visitor<'_> for LevelVisitor {
            type Value = u8;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a heading tag like \"h2\" or a level number 1-6")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u8, E> {
                let digits = v.trim().trim_start_matches(['h', 'H']);
                match digits.parse::<u8>() {
                    Ok(n @ 1..=6) => Ok(n),
                    _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
                }
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u8, E> {
                match v {
                    1..=6 => Ok(v as u8),
                    _ => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
                }
            }

            fn visit_unit<E: de::Error>(self) -> Result<u8, E> {
                Ok(super::default_level())
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u8, E> {
                match v {
                    1..=6 => Ok(v as u8),
                    _ => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
                }
            }
        }

        d.deserialize_any(LevelVisitor)
    }
}

// ---------------------------------------------------------------------------
// PageRecord
// ---------------------------------------------------------------------------

/// Text features extracted from one fetched page.
///
/// Every field defaults when absent or `null` in a persisted store, so a
/// partial record loads with empty fields instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Source URL; also the key of the record in a content store.
    #[serde(default, rename = "url", deserialize_with = "null_as_default")]
    pub identifier: String,
    /// Text of the `<title>` element, or [`NO_TITLE`].
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Headings in document order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub headings: Vec<Heading>,
    /// Text of the primary content region, or [`NO_MAIN_CONTENT`].
    #[serde(default, rename = "content", deserialize_with = "null_as_default")]
    pub main_text: String,
    /// Non-empty `<p>` texts in document order.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub paragraphs: Vec<String>,
    /// Descriptive fields such as `description` and `keywords`.
    ///
    /// Non-string values in a stored record load as their JSON text; `null`
    /// loads as an empty string.
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: BTreeMap<String, String>,
    /// When the page was fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl PageRecord {
    /// Whether two records carry the same extracted content, ignoring fetch time.
    pub fn same_content(&self, other: &PageRecord) -> bool {
        self.identifier == other.identifier
            && self.title == other.title
            && self.headings == other.headings
            && self.main_text == other.main_text
            && self.paragraphs == other.paragraphs
            && self.metadata == other.metadata
    }
}

/// Read `null` as the field type's default.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Read a metadata map whose values may be any JSON scalar.
fn lenient_metadata<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, String>, D::Error> {
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(d)?;

    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, text)
        })
        .collect())
}

// ---------------------------------------------------------------------------
// MatchResult
// ---------------------------------------------------------------------------

/// One page's scored outcome for a query. Recomputed per query, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Page identifier (source URL).
    #[serde(rename = "url")]
    pub identifier: String,
    pub title: String,
    /// Keyword-overlap relevance; always at least 1 for returned matches.
    pub score: u32,
    /// Labels such as `title`, `heading: Installation`, `content`.
    pub matched_sections: Vec<String>,
    /// Excerpt of the main text around the first keyword hit.
    pub snippet: String,
}
