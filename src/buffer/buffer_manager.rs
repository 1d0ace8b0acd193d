use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace};

use super::clock_replacer::ClockReplacer;
use super::{AccessMode, PageCache, PoolPos};
use crate::catalog::Catalog;
use crate::common::PageId;
use crate::concurrency::TransactionId;
use crate::error::{DbResult, Error};
use crate::storage::heap::page::HeapPage;

struct PoolState {
    frames: Box<[Option<Arc<HeapPage>>]>,
    clock_replacer: ClockReplacer,
    page_id_to_pool_pos: HashMap<PageId, PoolPos>,
    /// frames pinned by each transaction, every frame at most once per transaction
    pins: HashMap<TransactionId, HashSet<PoolPos>>,
    aborted: HashSet<TransactionId>,
}

impl PoolState {
    /// Read-write pages stay in their frame until the transaction ends,
    /// read-only pages only count as recently used.
    fn pin(&mut self, tid: TransactionId, pool_pos: PoolPos, mode: AccessMode) {
        match mode {
            AccessMode::ReadWrite => {
                if self.pins.entry(tid).or_default().insert(pool_pos) {
                    self.clock_replacer.pin(pool_pos);
                }
            }
            AccessMode::ReadOnly => self.clock_replacer.touch(pool_pos),
        }
    }

    fn release(&mut self, tid: TransactionId) -> usize {
        let pinned = self.pins.remove(&tid).unwrap_or_default();
        for &pool_pos in &pinned {
            self.clock_replacer.unpin(pool_pos);
        }
        pinned.len()
    }
}

/// BufferManager caches pages of the tables attached to a catalog in a fixed pool of frames.
/// Frames fetched for writing stay pinned until their transaction completes or aborts.
/// Pages are handed out as shared pointers, so evicting a frame never invalidates a page
/// somebody still holds.
pub struct BufferManager<'a> {
    catalog: &'a Catalog,
    pool_size: usize,
    state: Mutex<PoolState>,
}

impl<'a> BufferManager<'a> {
    pub fn new(catalog: &'a Catalog, pool_size: usize) -> Self {
        let frames = (0..pool_size).map(|_| None).collect();
        Self {
            catalog,
            pool_size,
            state: Mutex::new(PoolState {
                frames,
                clock_replacer: ClockReplacer::new(pool_size),
                page_id_to_pool_pos: HashMap::new(),
                pins: HashMap::new(),
                aborted: HashSet::new(),
            }),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        // pool state is consistent between statements, a panic elsewhere doesn't invalidate it
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of pages currently cached.
    pub fn cached_pages(&self) -> usize {
        self.lock_state().page_id_to_pool_pos.len()
    }

    /// Unpins every frame the transaction fetched for writing and forgets about it,
    /// including a previous abort.
    pub fn transaction_complete(&self, tid: TransactionId) {
        let mut state = self.lock_state();
        let released = state.release(tid);
        state.aborted.remove(&tid);
        debug!(%tid, released, "transaction complete, released buffers");
    }

    /// Unpins the frames of the transaction and refuses all of its later fetches,
    /// until `transaction_complete` ends it.
    pub fn abort_transaction(&self, tid: TransactionId) {
        let mut state = self.lock_state();
        let released = state.release(tid);
        state.aborted.insert(tid);
        debug!(%tid, released, "transaction aborted, released buffers");
    }
}

impl PageCache for BufferManager<'_> {
    fn fetch_page(
        &self,
        tid: TransactionId,
        page_id: PageId,
        mode: AccessMode,
    ) -> DbResult<Arc<HeapPage>> {
        let mut state = self.lock_state();
        if state.aborted.contains(&tid) {
            return Err(Error::TransactionAborted(tid));
        }

        if let Some(&pool_pos) = state.page_id_to_pool_pos.get(&page_id) {
            if let Some(page) = state.frames[pool_pos].clone() {
                trace!(%tid, %page_id, ?mode, pool_pos, "page is cached");
                state.pin(tid, pool_pos, mode);
                return Ok(page);
            }
        }

        let pool_pos = state
            .clock_replacer
            .find_victim()
            .ok_or(Error::BufferPoolFull(self.pool_size))?;

        let heap_file = self.catalog.get(page_id.table_id())?;
        let page = Arc::new(heap_file.read_page(page_id.page_no())?);

        if let Some(evicted) = state.frames[pool_pos].replace(Arc::clone(&page)) {
            trace!(evicted = %evicted.page_id(), pool_pos, "evicting page");
            state.page_id_to_pool_pos.remove(&evicted.page_id());
        }
        state.page_id_to_pool_pos.insert(page_id, pool_pos);
        state.pin(tid, pool_pos, mode);
        trace!(%tid, %page_id, ?mode, pool_pos, "read page into buffer");

        Ok(page)
    }
}
