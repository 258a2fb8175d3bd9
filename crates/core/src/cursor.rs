//! Forward-only map from page index to continuation cursor.
//!
//! Page 0 is always fetched from the start. The cursor for page `n + 1` only
//! becomes known once page `n` has been fetched and returned a token, so the
//! set of known pages is always a prefix `0..=k`.

use crate::error::CursorError;

/// What to send to the gateway to fetch a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageCursor {
    /// Beginning of the sequence; no token is sent.
    Start,
    /// Resume after an opaque token.
    After(String),
}

impl PageCursor {
    /// The token to send, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Start => None,
            Self::After(token) => Some(token),
        }
    }
}

/// Lookup result distinguishing "not yet discovered" from "does not exist".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState<'a> {
    /// The page can be fetched with this cursor.
    Known(&'a PageCursor),
    /// The page may exist but its cursor has not been discovered yet.
    Unknown,
    /// The page lies beyond a confirmed last page.
    None,
}

/// Pagination cursor cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorCache {
    /// `cursors[i]` fetches page `i`. Never empty.
    cursors: Vec<PageCursor>,
    /// Highest page confirmed to have no successor.
    last_page: Option<usize>,
}

impl Default for CursorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorCache {
    /// Cache that only knows page 0.
    pub fn new() -> Self {
        Self {
            cursors: vec![PageCursor::Start],
            last_page: None,
        }
    }

    /// Cursor to send for `page`.
    pub fn cursor_for(&self, page: usize) -> Result<PageCursor, CursorError> {
        match self.state(page) {
            CursorState::Known(cursor) => Ok(cursor.clone()),
            CursorState::Unknown => Err(CursorError::Undiscovered { page }),
            CursorState::None => Err(CursorError::PastEnd {
                page,
                last: self.last_page.unwrap_or_default(),
            }),
        }
    }

    /// Whether `page` is fetchable, undiscovered, or past the end.
    pub fn state(&self, page: usize) -> CursorState<'_> {
        if let Some(cursor) = self.cursors.get(page) {
            return CursorState::Known(cursor);
        }
        match self.last_page {
            Some(last) if page > last => CursorState::None,
            _ => CursorState::Unknown,
        }
    }

    /// Records the outcome of a successful fetch of `page`.
    ///
    /// `next` is the token for `page + 1`, or `None` when `page` is the last
    /// one. A token that differs from the stored one invalidates everything
    /// discovered past `page`.
    pub fn record(&mut self, page: usize, next: Option<String>) -> Result<(), CursorError> {
        if page >= self.cursors.len() {
            return Err(CursorError::Undiscovered { page });
        }
        match next {
            Some(token) => {
                let next_cursor = PageCursor::After(token);
                if self.cursors.get(page + 1) != Some(&next_cursor) {
                    self.cursors.truncate(page + 1);
                    self.cursors.push(next_cursor);
                }
                if self.last_page.is_some_and(|last| last <= page) {
                    self.last_page = None;
                }
            }
            None => {
                self.cursors.truncate(page + 1);
                self.last_page = Some(page);
            }
        }
        Ok(())
    }

    /// Forgets everything but page 0.
    pub fn reset(&mut self) {
        self.cursors.truncate(1);
        self.last_page = None;
    }

    /// Number of pages whose cursor is known.
    pub fn known_pages(&self) -> usize {
        self.cursors.len()
    }

    /// Highest page known to have no successor, if one has been seen.
    pub fn last_page(&self) -> Option<usize> {
        self.last_page
    }
}
