use std::sync::Arc;

use crate::common::PageId;
use crate::concurrency::TransactionId;
use crate::error::DbResult;
use crate::storage::heap::page::HeapPage;

pub mod buffer_manager;
mod clock_replacer;

type PoolPos = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

/// Source of materialized pages for scans.
/// Pins taken by a fetch belong to the transaction, callers never release them.
pub trait PageCache {
    fn fetch_page(
        &self,
        tid: TransactionId,
        page_id: PageId,
        mode: AccessMode,
    ) -> DbResult<Arc<HeapPage>>;
}
