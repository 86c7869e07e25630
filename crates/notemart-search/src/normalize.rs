//! Normalization of raw source records into [`NormalizedNote`].
//!
//! Both sources funnel through [`derive_key`] so the identifier assigned here
//! is the same key deduplication later compares on.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::trace;

use notemart_core::defaults::{EXTERNAL_LANGUAGE, EXTERNAL_OWNER, LOCAL_LANGUAGE, UNTITLED};
use notemart_core::{ExternalFile, ExternalRecord, LocalNoteRecord, NormalizedNote, NoteSource};

/// Derive the stable key of a record.
///
/// Native id if present and non-empty, else the resolved file URL, else
/// `title-ownerId`.
pub fn derive_key(
    native_id: Option<&str>,
    file_url: Option<&str>,
    title: &str,
    owner_id: &str,
) -> String {
    if let Some(id) = native_id.filter(|id| !id.trim().is_empty()) {
        return id.to_string();
    }
    if let Some(url) = file_url.filter(|url| !url.trim().is_empty()) {
        return url.to_string();
    }
    format!("{}-{}", title, owner_id)
}

/// Normalize a local note row.
pub fn normalize_local(record: LocalNoteRecord) -> NormalizedNote {
    let title = present(record.title).unwrap_or_else(|| UNTITLED.to_string());
    let owner_id = record.owner_id.unwrap_or_default();
    let file_url = present(record.file_url);
    let (price, is_free) = resolve_price(record.price, record.is_free);

    let id = derive_key(
        record.id.as_deref(),
        file_url.as_deref(),
        &title,
        &owner_id,
    );
    trace!(id = %id, source = "local", "Normalized record");

    NormalizedNote {
        id,
        title,
        description: record.description.unwrap_or_default(),
        upload_date: record.created_at,
        language: present(record.language).unwrap_or_else(|| LOCAL_LANGUAGE.to_string()),
        file_url,
        owner_id,
        price,
        is_free,
        like_count: record.like_count.unwrap_or(0),
        source: NoteSource::Local,
    }
}

/// Normalize an external repository hit.
///
/// External records are always free; the attachment is chosen with
/// [`select_document_file`].
pub fn normalize_external(record: ExternalRecord, document_format: &str) -> NormalizedNote {
    let file_url = select_document_file(&record.files, document_format)
        .and_then(ExternalFile::download_url)
        .map(str::to_string);
    let metadata = record.metadata;
    let title = present(metadata.title).unwrap_or_else(|| UNTITLED.to_string());
    let owner_id = present(record.owner).unwrap_or_else(|| EXTERNAL_OWNER.to_string());

    let upload_date = metadata
        .publication_date
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| record.created.as_deref().and_then(parse_timestamp));

    let id = derive_key(
        record.id.as_deref(),
        file_url.as_deref(),
        &title,
        &owner_id,
    );
    trace!(id = %id, source = "external", "Normalized record");

    NormalizedNote {
        id,
        title,
        description: metadata.description.unwrap_or_default(),
        upload_date,
        language: present(metadata.language).unwrap_or_else(|| EXTERNAL_LANGUAGE.to_string()),
        file_url,
        owner_id,
        price: 0.0,
        is_free: true,
        like_count: 0,
        source: NoteSource::External,
    }
}

/// Pick the attachment to link for an external record.
///
/// The first file whose declared type mentions `format`, or whose key or
/// filename ends in `.{format}`, wins. Without a match the first listed file
/// is used; an empty list yields `None`.
pub fn select_document_file<'a>(
    files: &'a [ExternalFile],
    format: &str,
) -> Option<&'a ExternalFile> {
    let format = format.to_lowercase();
    let extension = format!(".{}", format);
    let has_extension = |name: &Option<String>| {
        name.as_deref()
            .is_some_and(|n| n.to_lowercase().ends_with(&extension))
    };

    files
        .iter()
        .find(|file| {
            file.kind
                .as_deref()
                .is_some_and(|kind| kind.to_lowercase().contains(&format))
                || has_extension(&file.key)
                || has_extension(&file.filename)
        })
        .or_else(|| files.first())
}

/// Resolve `(price, is_free)` so a free note always carries price zero.
///
/// Free when flagged free, when no price is set, or when the price is not
/// positive.
pub fn resolve_price(price: Option<f64>, is_free: Option<bool>) -> (f64, bool) {
    let amount = price.filter(|p| p.is_finite()).unwrap_or(0.0);
    let free = is_free == Some(true) || amount <= 0.0;
    if free {
        (0.0, true)
    } else {
        (amount, false)
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
