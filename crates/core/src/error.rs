//! Gateway, cursor and coordinator errors.

use thiserror::Error;

/// Failure of a single gateway call.
///
/// The message is what the user sees; it is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport-level failure: connection, HTTP status, undecodable body.
    #[error("{0}")]
    Network(String),
    /// The gateway answered with GraphQL `errors`, possibly alongside data.
    #[error("{}", .0.join("; "))]
    Remote(Vec<String>),
}

impl FetchError {
    /// Coarse classification for display.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Remote(_) => ErrorKind::Remote,
        }
    }

    /// Convenience constructor for a single remote message.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(vec![message.into()])
    }
}

/// Classification of [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// [`FetchError::Network`].
    Network,
    /// [`FetchError::Remote`].
    Remote,
}

/// A page was requested whose cursor has not been discovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// No earlier page has returned a token leading to `page`.
    #[error("page {page} has not been reached yet; fetch the pages before it first")]
    Undiscovered {
        /// Requested page.
        page: usize,
    },
    /// `page` lies beyond the confirmed last page `last`.
    #[error("page {page} is past the last page ({last})")]
    PastEnd {
        /// Requested page.
        page: usize,
        /// Confirmed last page.
        last: usize,
    },
}

/// Rejected coordinator operation. State is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// The target page cannot be fetched.
    #[error(transparent)]
    Cursor(#[from] CursorError),
    /// Page sizes start at 1.
    #[error("page size must be at least 1")]
    InvalidPageSize,
    /// `previous_page` on page 0.
    #[error("already on the first page")]
    NoPreviousPage,
}
