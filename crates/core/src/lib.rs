#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Candidate list coordination: models, pagination cursors, local filters and
//! the sans-IO list coordinator shared by the client shell and the CLI.

pub mod api;
pub mod coordinator;
pub mod cursor;
pub mod detail;
pub mod error;
pub mod filter;
pub mod format;
pub mod model;
pub mod view;

pub use coordinator::{Completion, FetchPhase, FetchRequest, ListCoordinator, NameFilter, RequestId};
pub use cursor::{CursorCache, CursorState, PageCursor};
pub use detail::DetailView;
pub use error::{CoordinatorError, CursorError, ErrorKind, FetchError};
pub use filter::{apply_filters, filter_by_search, filter_by_status, status_options, FilterState, StatusOption};
pub use model::{Candidate, CandidateDetail, Page};
pub use view::{ListViewState, PaginationFooter, TableBody};
