//! Data models for notemart.
//!
//! `NormalizedNote` is the single shape every search surface returns. The raw
//! shapes below it mirror what each source actually hands back, with every
//! field optional so normalization can apply its defaults.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// NORMALIZED TYPES
// =============================================================================

/// Provenance of a normalized note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteSource {
    /// User-submitted note from the local store.
    Local,
    /// Record from the external public repository.
    External,
}

impl NoteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteSource::Local => "local",
            NoteSource::External => "external",
        }
    }
}

impl fmt::Display for NoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A note reconciled from either source into one schema.
///
/// `id` is always the derived key (native id, else file URL, else
/// `title-ownerId`), so it doubles as the deduplication key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedNote {
    pub id: String,
    pub title: String,
    pub description: String,
    pub upload_date: Option<DateTime<Utc>>,
    pub language: String,
    pub file_url: Option<String>,
    pub owner_id: String,
    /// Zero whenever `is_free` is true.
    pub price: f64,
    pub is_free: bool,
    pub like_count: i64,
    pub source: NoteSource,
}

/// Lightweight projection of a note for type-ahead suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    pub snippet: String,
    pub is_free: bool,
    pub price: f64,
    pub source: NoteSource,
    pub file_url: Option<String>,
}

impl Suggestion {
    /// Project a note, cutting its description to `snippet_chars` characters.
    pub fn from_note(note: &NormalizedNote, snippet_chars: usize) -> Self {
        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            snippet: truncate_chars(&note.description, snippet_chars).to_string(),
            is_free: note.is_free,
            price: note.price,
            source: note.source,
            file_url: note.file_url.clone(),
        }
    }
}

/// Prefix of `text` holding at most `max_chars` characters.
///
/// Counts Unicode scalar values so multi-byte text is never cut mid code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

// =============================================================================
// LOCAL RECORDS
// =============================================================================

/// A note row as returned by the local store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalNoteRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub language: Option<String>,
    pub category: Option<String>,
    pub file_url: Option<String>,
    pub owner_id: Option<String>,
    pub price: Option<f64>,
    pub is_free: Option<bool>,
    pub like_count: Option<i64>,
}

// =============================================================================
// EXTERNAL RECORDS
// =============================================================================

/// A hit from the external record repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ExternalMetadata,
    /// Record creation timestamp, used when no publication date is given.
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<ExternalFile>,
}

/// Descriptive metadata of an external record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub publication_date: Option<String>,
    pub language: Option<String>,
}

/// A candidate attachment of an external record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalFile {
    /// Declared type (MIME type or bare extension).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Storage key, usually the original filename.
    pub key: Option<String>,
    pub filename: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub links: FileLinks,
}

impl ExternalFile {
    /// Direct link to the asset, preferring the canonical `self` link.
    pub fn download_url(&self) -> Option<&str> {
        [&self.links.self_link, &self.links.download]
            .into_iter()
            .filter_map(|url| url.as_deref())
            .find(|url| !url.is_empty())
    }
}

/// Links published for an external attachment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLinks {
    #[serde(rename = "self")]
    pub self_link: Option<String>,
    pub download: Option<String>,
}

/// Accept a JSON string or number; anything else becomes `None`.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
