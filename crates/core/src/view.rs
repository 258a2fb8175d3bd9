//! Published list state and its display projection.

use serde::Serialize;

use crate::error::FetchError;
use crate::filter::StatusOption;
use crate::model::Candidate;

/// Everything a display consumer needs, recomputed on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListViewState {
    /// Rows after local filtering.
    pub rows: Vec<Candidate>,
    /// The page as fetched, before local filtering.
    pub all_fetched_rows: Vec<Candidate>,
    /// A fetch is in flight.
    pub loading: bool,
    /// Failure of the last fetch, serialized as its message.
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<FetchError>,
    /// The server returned a token for a following page.
    pub has_next_page: bool,
    /// `rows.len() + page * page_size`; open-ended while `has_next_page`.
    pub total_count_estimate: usize,
    /// Zero-based page index.
    pub page: usize,
    /// Requested rows per page.
    pub page_size: usize,
    /// Status keys present in the fetched page.
    pub status_options: Vec<StatusOption>,
}

fn serialize_error<S: serde::Serializer>(error: &Option<FetchError>, s: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => s.serialize_some(&error.to_string()),
        None => s.serialize_none(),
    }
}

impl ListViewState {
    /// State before anything was requested.
    pub fn idle(page_size: usize) -> Self {
        Self {
            rows: Vec::new(),
            all_fetched_rows: Vec::new(),
            loading: false,
            error: None,
            has_next_page: false,
            total_count_estimate: 0,
            page: 0,
            page_size,
            status_options: Vec::new(),
        }
    }

    /// What the table body shows. Exactly one of the four states applies.
    pub fn body(&self) -> TableBody<'_> {
        if self.loading {
            TableBody::Placeholder {
                rows: self.page_size,
            }
        } else if let Some(error) = &self.error {
            TableBody::Failed {
                message: error.to_string(),
            }
        } else if self.rows.is_empty() {
            TableBody::Empty
        } else {
            TableBody::Rows(&self.rows)
        }
    }

    /// Pagination controls, shown only alongside real rows.
    pub fn footer(&self) -> Option<PaginationFooter> {
        if !matches!(self.body(), TableBody::Rows(_)) {
            return None;
        }
        Some(PaginationFooter {
            page: self.page,
            page_size: self.page_size,
            count: (!self.has_next_page).then_some(self.total_count_estimate),
            has_next_page: self.has_next_page,
            has_previous_page: self.page > 0,
        })
    }
}

/// Table body of a [`ListViewState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody<'a> {
    /// Loading: this many skeleton rows.
    Placeholder {
        /// Skeleton row count.
        rows: usize,
    },
    /// Error message with a retry action.
    Failed {
        /// Displayed error text.
        message: String,
    },
    /// Zero rows and no error.
    Empty,
    /// The filtered rows.
    Rows(&'a [Candidate]),
}

/// Pagination controls under the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationFooter {
    /// Zero-based page index.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// `None` renders as indeterminate ("more than ...").
    pub count: Option<usize>,
    /// Enables "next".
    pub has_next_page: bool,
    /// Enables "previous".
    pub has_previous_page: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_rows(n: usize) -> ListViewState {
        let rows: Vec<_> = (0..n).map(|i| Candidate::new(i.to_string())).collect();
        ListViewState {
            total_count_estimate: rows.len(),
            all_fetched_rows: rows.clone(),
            rows,
            ..ListViewState::idle(10)
        }
    }

    #[test]
    fn test_loading_shows_page_size_placeholders() {
        let view = ListViewState {
            loading: true,
            ..with_rows(3)
        };
        assert_eq!(view.body(), TableBody::Placeholder { rows: 10 });
        assert_eq!(view.footer(), None);
    }

    #[test]
    fn test_error_hides_rows_and_footer() {
        let view = ListViewState {
            error: Some(FetchError::Network("Network error".into())),
            ..with_rows(0)
        };
        assert_eq!(
            view.body(),
            TableBody::Failed {
                message: "Network error".into()
            }
        );
        assert_eq!(view.footer(), None);
    }

    #[test]
    fn test_empty_is_not_an_error() {
        assert_eq!(with_rows(0).body(), TableBody::Empty);
    }

    #[test]
    fn test_footer_count_is_open_ended_with_more_pages() {
        let mut view = with_rows(10);
        view.has_next_page = true;
        assert_eq!(view.footer().unwrap().count, None);

        view.has_next_page = false;
        assert_eq!(view.footer().unwrap().count, Some(10));
    }
}
