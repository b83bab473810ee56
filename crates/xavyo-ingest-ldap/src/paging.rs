//! Paged-results cursor handling (RFC 2696).
//!
//! The crawl threads an immutable cursor through successive searches instead
//! of mutating one shared control object.

/// Opaque paging cookie issued by the server. Empty means "no more pages".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor(Vec<u8>);

impl PageCursor {
    pub fn new(cookie: impl Into<Vec<u8>>) -> Self {
        Self(cookie.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Paged-results control attached to an outgoing search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedControl {
    pub size: i32,
    pub cursor: PageCursor,
}

impl PagedControl {
    pub fn new(size: i32, cursor: PageCursor) -> Self {
        Self { size, cursor }
    }
}

/// Crawl state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagingState {
    /// Another search is due, carrying this cursor.
    Paging(PageCursor),
    /// The server signalled the last page, or the crawl failed.
    Done,
}

/// Why a page ended the crawl abnormally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagingFailure {
    /// The response carried no paged-results control.
    ControlMissing,
}

impl PagingState {
    /// State before the first search: paging with an empty cursor.
    pub fn start() -> Self {
        PagingState::Paging(PageCursor::default())
    }

    /// Transition after a page was processed, given the cursor the server
    /// returned (`None` when it sent no paging control).
    pub fn advance(returned: Option<PageCursor>) -> Result<Self, PagingFailure> {
        match returned {
            None => Err(PagingFailure::ControlMissing),
            Some(cursor) if cursor.is_empty() => Ok(PagingState::Done),
            Some(cursor) => Ok(PagingState::Paging(cursor)),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, PagingState::Done)
    }
}
