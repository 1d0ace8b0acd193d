use std::mem;
use std::sync::Arc;

use tracing::trace;

use super::file::HeapFile;
use super::page::HeapPage;
use crate::buffer::{AccessMode, PageCache};
use crate::common::{PageId, PageNo, Slot};
use crate::concurrency::TransactionId;
use crate::error::{DbResult, IteratorState};
use crate::tuple::Tuple;

enum CursorState {
    Closed,
    /// `slot` always refers to an existing tuple on `page`
    Open {
        page_no: PageNo,
        page: Arc<HeapPage>,
        slot: Slot,
    },
    Exhausted,
}

/// Sequential scan over all tuples of a heap file, in page and slot order.
///
/// The cursor starts closed. `open` positions it on the first tuple, skipping empty pages,
/// and every `next` moves it on to the following tuple. Pages are fetched read-only through
/// the page cache, which alone decides how long they stay cached; `close` only drops the
/// cursor's own reference to the current page.
///
/// Any error while fetching or decoding a page closes the cursor.
pub struct HeapFileCursor<'a> {
    heap_file: &'a HeapFile,
    page_cache: &'a dyn PageCache,
    tid: TransactionId,
    state: CursorState,
}

impl<'a> HeapFileCursor<'a> {
    pub(super) fn new(
        heap_file: &'a HeapFile,
        page_cache: &'a dyn PageCache,
        tid: TransactionId,
    ) -> Self {
        Self {
            heap_file,
            page_cache,
            tid,
            state: CursorState::Closed,
        }
    }

    /// Positions the cursor on the first tuple of the file, starting over from page 0.
    pub fn open(&mut self) -> DbResult<()> {
        self.state = CursorState::Closed;
        self.state = self.seek(0, None, 0)?;
        Ok(())
    }

    pub fn has_next(&self) -> bool {
        matches!(self.state, CursorState::Open { .. })
    }

    /// Returns the tuple under the cursor and moves on to the next one.
    pub fn next(&mut self) -> DbResult<Tuple> {
        let (page_no, page, slot) = match mem::replace(&mut self.state, CursorState::Closed) {
            CursorState::Open {
                page_no,
                page,
                slot,
            } => (page_no, page, slot),
            CursorState::Closed => return Err(IteratorState::NotOpen.into()),
            CursorState::Exhausted => {
                self.state = CursorState::Exhausted;
                return Err(IteratorState::Exhausted.into());
            }
        };

        let tuple = page.tuple(slot, self.heap_file.schema())?;
        self.state = self.seek(page_no, Some(page), slot + 1)?;
        Ok(tuple)
    }

    /// Restarts the scan from the first page, fetching the pages again.
    pub fn rewind(&mut self) -> DbResult<()> {
        if let CursorState::Closed = self.state {
            return Err(IteratorState::NotOpen.into());
        }
        self.close();
        self.open()
    }

    pub fn close(&mut self) {
        self.state = CursorState::Closed;
    }

    /// Drains the remaining tuples of an opened cursor.
    pub fn tuples(&mut self) -> Tuples<'_, 'a> {
        Tuples { cursor: self }
    }

    /// Finds the first tuple at or after `slot` on `page_no`, moving over to later pages
    /// until one has a tuple. `page` is the already fetched `page_no`, if any.
    /// The file size is only looked up once a new page is needed.
    fn seek(
        &self,
        mut page_no: PageNo,
        mut page: Option<Arc<HeapPage>>,
        mut slot: Slot,
    ) -> DbResult<CursorState> {
        let mut file_pages = None;
        loop {
            let current = match page.take() {
                Some(page) => page,
                None => {
                    let num_pages = match file_pages {
                        Some(num_pages) => num_pages,
                        None => *file_pages.insert(self.heap_file.num_pages()?),
                    };
                    if page_no >= num_pages {
                        trace!(table_id = self.heap_file.id(), num_pages, "scan exhausted");
                        return Ok(CursorState::Exhausted);
                    }
                    self.fetch(page_no)?
                }
            };
            if slot < current.slots() {
                return Ok(CursorState::Open {
                    page_no,
                    page: current,
                    slot,
                });
            }
            page_no += 1;
            slot = 0;
        }
    }

    fn fetch(&self, page_no: PageNo) -> DbResult<Arc<HeapPage>> {
        let page_id = PageId::new(self.heap_file.id(), page_no);
        trace!(%page_id, tid = %self.tid, "fetching page for scan");
        self.page_cache
            .fetch_page(self.tid, page_id, AccessMode::ReadOnly)
    }
}

/// Iterator over the remaining tuples of a cursor, see [`HeapFileCursor::tuples`].
pub struct Tuples<'c, 'a> {
    cursor: &'c mut HeapFileCursor<'a>,
}

impl Iterator for Tuples<'_, '_> {
    type Item = DbResult<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.has_next().then(|| self.cursor.next())
    }
}
