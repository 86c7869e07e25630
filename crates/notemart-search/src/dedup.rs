//! Merging and key deduplication of normalized results.
//!
//! Local results are placed ahead of external ones, so on a key collision the
//! local normalization is the one kept.

use std::collections::HashSet;

use tracing::trace;

use notemart_core::NormalizedNote;

/// Keep the first note for each key, preserving order.
///
/// Returns the surviving notes and how many were dropped.
pub fn deduplicate_notes(notes: Vec<NormalizedNote>) -> (Vec<NormalizedNote>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(notes.len());
    let mut kept = Vec::with_capacity(notes.len());
    let mut dropped = 0usize;

    for note in notes {
        if seen.contains(&note.id) {
            trace!(id = %note.id, source = %note.source, "Dropping duplicate key");
            dropped += 1;
            continue;
        }
        seen.insert(note.id.clone());
        kept.push(note);
    }

    (kept, dropped)
}

/// Concatenate local before external, deduplicate, and truncate to `limit`.
pub fn merge_results(
    local: Vec<NormalizedNote>,
    external: Vec<NormalizedNote>,
    limit: usize,
) -> (Vec<NormalizedNote>, usize) {
    let mut combined = local;
    combined.extend(external);

    let (mut merged, dropped) = deduplicate_notes(combined);
    merged.truncate(limit);
    (merged, dropped)
}
