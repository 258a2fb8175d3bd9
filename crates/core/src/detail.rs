//! Single-candidate detail view.

use crate::error::FetchError;
use crate::model::CandidateDetail;

/// State of a single-candidate detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView {
    /// No id selected; nothing is fetched.
    Idle,
    /// A fetch for the selected id is in flight.
    Loading,
    /// The fetch failed; the view can be retried.
    Failed(FetchError),
    /// The gateway has no candidate with that id.
    NotFound,
    /// The fetched candidate.
    Loaded(CandidateDetail),
}

impl DetailView {
    /// Maps a gateway answer onto the settled view.
    pub fn from_result(result: Result<Option<CandidateDetail>, FetchError>) -> Self {
        match result {
            Ok(Some(detail)) => Self::Loaded(detail),
            Ok(None) => Self::NotFound,
            Err(error) => Self::Failed(error),
        }
    }

    /// Whether a retry action should be offered.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
