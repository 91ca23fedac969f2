use crate::api::{PageInfo, PageRequest};

/// Outcome of feeding a page's `PageInfo` back into a [`Paginator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    More,
    Done,
    /// The server reported more pages but gave no usable cursor.
    Stalled,
}

/// Cursor state of one pagination loop.
#[derive(Debug, Clone)]
pub struct Paginator {
    after: Option<String>,
    first: u32,
    inner_first: u32,
    finished: bool,
    pages: u32,
}

impl Paginator {
    pub fn new(first: u32, inner_first: u32) -> Self {
        Paginator {
            after: None,
            first,
            inner_first,
            finished: false,
            pages: 0,
        }
    }

    pub fn next_page(&self) -> Option<PageRequest> {
        if self.finished {
            return None;
        }
        Some(PageRequest::new(self.after.clone(), self.first, self.inner_first))
    }

    pub fn advance(&mut self, page_info: &PageInfo) -> Progress {
        self.pages += 1;
        if !page_info.has_next_page {
            self.finished = true;
            return Progress::Done;
        }
        match &page_info.end_cursor {
            Some(cursor) if self.after.as_ref() != Some(cursor) => {
                self.after = Some(cursor.clone());
                Progress::More
            }
            _ => {
                self.finished = true;
                Progress::Stalled
            }
        }
    }

    /// Number of pages fed back so far.
    pub fn pages(&self) -> u32 {
        self.pages
    }
}
