//! Local filters applied to the page already in memory.
//!
//! These never reach the gateway and never fail: a missing name or status is
//! matched as the empty string.

use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::format::status_label;
use crate::model::Candidate;

/// Caller-owned filter inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Free-text search over first and last name.
    pub search_term: String,
    /// Exact status keys to keep. Empty keeps everything.
    pub statuses: BTreeSet<String>,
}

/// Case-insensitive substring match on first name, last name, or
/// `"first last"`. A blank term keeps every row; any other term is matched
/// as given, surrounding whitespace included.
pub fn filter_by_search<'a>(rows: &'a [Candidate], term: &str) -> Cow<'a, [Candidate]> {
    if term.trim().is_empty() {
        return Cow::Borrowed(rows);
    }
    let needle = term.to_lowercase();
    Cow::Owned(
        rows.iter()
            .filter(|candidate| matches_search(candidate, &needle))
            .cloned()
            .collect(),
    )
}

fn matches_search(candidate: &Candidate, needle: &str) -> bool {
    let first = candidate.first_name.as_deref().unwrap_or_default().to_lowercase();
    let last = candidate.last_name.as_deref().unwrap_or_default().to_lowercase();
    first.contains(needle) || last.contains(needle) || format!("{first} {last}").contains(needle)
}

/// Keeps rows whose status key is in `statuses` (exact, case-sensitive).
pub fn filter_by_status<'a>(rows: &'a [Candidate], statuses: &BTreeSet<String>) -> Cow<'a, [Candidate]> {
    if statuses.is_empty() {
        return Cow::Borrowed(rows);
    }
    Cow::Owned(
        rows.iter()
            .filter(|candidate| statuses.contains(candidate.status.as_deref().unwrap_or_default()))
            .cloned()
            .collect(),
    )
}

/// Search first, then status.
pub fn apply_filters<'a>(rows: &'a [Candidate], filters: &FilterState) -> Cow<'a, [Candidate]> {
    match filter_by_search(rows, &filters.search_term) {
        Cow::Borrowed(rows) => filter_by_status(rows, &filters.statuses),
        Cow::Owned(rows) if filters.statuses.is_empty() => Cow::Owned(rows),
        Cow::Owned(rows) => Cow::Owned(filter_by_status(&rows, &filters.statuses).into_owned()),
    }
}

/// A selectable status: the exact key used for matching and its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOption {
    /// Status as stored on the candidate.
    pub key: String,
    /// Human-readable form of `key`.
    pub label: String,
}

/// Distinct status keys present in `rows`, in first-seen order.
pub fn status_options(rows: &[Candidate]) -> Vec<StatusOption> {
    let mut seen = BTreeSet::new();
    rows.iter()
        .filter_map(|candidate| candidate.status.as_deref())
        .filter(|status| !status.is_empty() && seen.insert(*status))
        .map(|status| StatusOption {
            key: status.to_string(),
            label: status_label(status),
        })
        .collect()
}
