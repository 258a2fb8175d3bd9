use std::fmt::Write as _;

use candidates_core::format::{display_name, initials, status_label, status_tone, StatusTone};
use candidates_core::{CandidateDetail, DetailView, ErrorKind, ListViewState, TableBody};

fn status_cell(status: Option<&str>) -> String {
    let label = status.map(status_label).unwrap_or_else(|| "-".to_string());
    match status_tone(status) {
        StatusTone::Success => format!("+ {label}"),
        StatusTone::Warning => format!("~ {label}"),
        StatusTone::Error => format!("! {label}"),
        StatusTone::Default => format!("  {label}"),
    }
}

pub fn render_list(view: &ListViewState) -> String {
    let mut out = String::new();
    match view.body() {
        TableBody::Placeholder { rows } => {
            for _ in 0..rows {
                let _ = writeln!(out, "  {:<4} {:<28} {:<32} {}", "....", "..........", "..........", "......");
            }
        }
        TableBody::Failed { message } => {
            let kind = match view.error.as_ref().map(|e| e.kind()) {
                Some(ErrorKind::Remote) => "remote error",
                _ => "network error",
            };
            let _ = writeln!(out, "{kind}: {message}");
            let _ = writeln!(out, "type `retry` (browse) or run the command again");
        }
        TableBody::Empty => {
            let _ = writeln!(out, "No candidates found");
        }
        TableBody::Rows(rows) => {
            let _ = writeln!(out, "  {:<4} {:<28} {:<32} {}", "", "NAME", "EMAIL", "STATUS");
            for row in rows {
                let _ = writeln!(
                    out,
                    "  {:<4} {:<28} {:<32} {}",
                    initials(row),
                    display_name(row),
                    row.email.as_deref().unwrap_or("-"),
                    status_cell(row.status.as_deref()),
                );
            }
        }
    }
    if let Some(footer) = view.footer() {
        let from = footer.page * footer.page_size + 1;
        let to = footer.page * footer.page_size + view.rows.len();
        let of = match footer.count {
            Some(count) => count.to_string(),
            None => format!("more than {to}"),
        };
        let _ = writeln!(
            out,
            "page {} | {from}-{to} of {of} | {}{}",
            footer.page + 1,
            if footer.has_previous_page { "[prev] " } else { "" },
            if footer.has_next_page { "[next]" } else { "" },
        );
    }
    out
}

fn field(out: &mut String, label: &str, value: Option<&str>) {
    let _ = writeln!(out, "{label:<12} {}", value.unwrap_or("-"));
}

pub fn render_detail(detail: &DetailView) -> String {
    let mut out = String::new();
    match detail {
        DetailView::Idle => {
            let _ = writeln!(out, "No candidate selected");
        }
        DetailView::Loading => {
            let _ = writeln!(out, "Loading candidate...");
        }
        DetailView::Failed(error) => {
            let _ = writeln!(out, "Failed to load candidate: {error}");
        }
        DetailView::NotFound => {
            let _ = writeln!(out, "Candidate not found");
        }
        DetailView::Loaded(candidate) => write_detail(&mut out, candidate),
    }
    if detail.is_retryable() {
        let _ = writeln!(out, "run the command again to retry");
    }
    out
}

fn write_detail(out: &mut String, candidate: &CandidateDetail) {
    let summary = candidate.summary();
    let _ = writeln!(out, "[{}] {}", initials(&summary), display_name(&summary));
    field(out, "id", Some(&candidate.id));
    field(out, "status", Some(&status_cell(candidate.status.as_deref())));
    field(out, "email", candidate.email.as_deref());
    field(out, "phone", candidate.phone.as_deref());
    field(out, "role", candidate.role.as_deref());
    let experience = candidate.experience.map(|years| format!("{years} years"));
    field(out, "experience", experience.as_deref());
    field(out, "applied", candidate.applied_date.as_deref());

    let street = candidate.address.as_deref();
    let locality: Vec<&str> = [
        candidate.city.as_deref(),
        candidate.state.as_deref(),
        candidate.zip_code.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    let locality = (!locality.is_empty()).then(|| locality.join(", "));
    field(out, "address", street);
    if let Some(locality) = &locality {
        field(out, "", Some(locality));
    }
    field(out, "country", candidate.country.as_deref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use candidates_core::{Candidate, FetchError};

    fn view(rows: Vec<Candidate>, has_next_page: bool) -> ListViewState {
        ListViewState {
            total_count_estimate: rows.len(),
            all_fetched_rows: rows.clone(),
            rows,
            has_next_page,
            ..ListViewState::idle(10)
        }
    }

    #[test]
    fn test_rows_and_open_ended_footer() {
        let out = render_list(&view(
            vec![Candidate::new("1")
                .with_name("John", "Doe")
                .with_status("active")],
            true,
        ));
        assert!(out.contains("JD"));
        assert!(out.contains("John Doe"));
        assert!(out.contains("+ Active"));
        assert!(out.contains("1-1 of more than 1"));
        assert!(out.contains("[next]"));
    }

    #[test]
    fn test_loading_renders_placeholders_only() {
        let mut state = view(vec![Candidate::new("1")], false);
        state.loading = true;
        let out = render_list(&state);
        assert_eq!(out.lines().count(), 10);
        assert!(!out.contains("page"));
    }

    #[test]
    fn test_remote_error_is_labelled() {
        let mut state = view(Vec::new(), false);
        state.error = Some(FetchError::remote("Not Authorized"));
        assert!(render_list(&state).starts_with("remote error: Not Authorized"));
    }

    #[test]
    fn test_empty_is_distinct_from_error() {
        assert_eq!(render_list(&view(Vec::new(), false)), "No candidates found\n");
    }

    #[test]
    fn test_detail_lists_available_fields() {
        let out = render_detail(&DetailView::Loaded(CandidateDetail {
            id: "7".into(),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            city: Some("London".into()),
            experience: Some(12),
            ..CandidateDetail::default()
        }));
        assert!(out.starts_with("[AL] Ada Lovelace"));
        assert!(out.contains("12 years"));
        assert!(out.contains("London"));
        assert_eq!(render_detail(&DetailView::NotFound), "Candidate not found\n");
    }

    #[test]
    fn test_only_failed_detail_offers_retry() {
        let failed = render_detail(&DetailView::Failed(FetchError::Network("Network error".into())));
        assert!(failed.starts_with("Failed to load candidate: "));
        assert!(failed.ends_with("run the command again to retry\n"));
        assert_eq!(render_detail(&DetailView::Loading), "Loading candidate...\n");
        assert!(!render_detail(&DetailView::NotFound).contains("retry"));
    }
}
