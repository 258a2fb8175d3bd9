//! Display helpers. Matching code must use the raw status key, never these
//! labels.

use crate::model::Candidate;

/// "First Last" from whichever parts are present, or "Unknown".
pub fn display_name(candidate: &Candidate) -> String {
    let parts: Vec<&str> = [candidate.first_name.as_deref(), candidate.last_name.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        "Unknown".to_string()
    } else {
        parts.join(" ")
    }
}

/// Upper-cased first letters of first and last name, or "?".
pub fn initials(candidate: &Candidate) -> String {
    let first_char = |name: Option<&str>| {
        name.and_then(|n| n.chars().next())
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_default()
    };
    let out = format!(
        "{}{}",
        first_char(candidate.first_name.as_deref()),
        first_char(candidate.last_name.as_deref())
    );
    if out.is_empty() {
        "?".to_string()
    } else {
        out
    }
}

/// "SHORTLISTED" -> "Shortlisted".
pub fn status_label(status: &str) -> String {
    let lower = status.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Colour family for a status chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    /// Active, approved or applied.
    Success,
    /// Pending or shortlisted.
    Warning,
    /// Rejected.
    Error,
    /// Anything else, or no status.
    Default,
}

/// Case-insensitive tone for a raw status key.
pub fn status_tone(status: Option<&str>) -> StatusTone {
    let Some(status) = status else {
        return StatusTone::Default;
    };
    match status.to_lowercase().as_str() {
        "active" | "approved" | "applied" => StatusTone::Success,
        "pending" | "shortlisted" => StatusTone::Warning,
        "rejected" => StatusTone::Error,
        _ => StatusTone::Default,
    }
}

/// Most recent application first; undated rows keep their order at the end.
///
/// Dates are ISO-8601 strings, so lexicographic order is chronological.
pub fn sort_by_applied_date(candidates: &[Candidate]) -> Vec<Candidate> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| b.applied_date.cmp(&a.applied_date));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_falls_back_to_unknown() {
        assert_eq!(display_name(&Candidate::new("1")), "Unknown");
        let mut only_last = Candidate::new("2");
        only_last.last_name = Some("Doe".into());
        assert_eq!(display_name(&only_last), "Doe");
        assert_eq!(display_name(&Candidate::new("3").with_name("John", "Doe")), "John Doe");
    }

    #[test]
    fn test_initials_are_upper_cased() {
        assert_eq!(initials(&Candidate::new("1").with_name("jane", "smith")), "JS");
        assert_eq!(initials(&Candidate::new("2")), "?");
    }

    #[test]
    fn test_status_label_normalises_case() {
        assert_eq!(status_label("SHORTLISTED"), "Shortlisted");
        assert_eq!(status_label("active"), "Active");
        assert_eq!(status_label(""), "");
    }

    #[test]
    fn test_tone_is_case_insensitive() {
        assert_eq!(status_tone(Some("Active")), StatusTone::Success);
        assert_eq!(status_tone(Some("pending")), StatusTone::Warning);
        assert_eq!(status_tone(Some("REJECTED")), StatusTone::Error);
        assert_eq!(status_tone(Some("hired")), StatusTone::Default);
        assert_eq!(status_tone(None), StatusTone::Default);
    }

    #[test]
    fn test_undated_candidates_sort_last() {
        let rows = vec![
            Candidate::new("a"),
            Candidate::new("b").with_applied_date("2024-01-10"),
            Candidate::new("c").with_applied_date("2024-03-02"),
        ];
        let ids: Vec<_> = sort_by_applied_date(&rows).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }
}
