use std::io;
use std::path::PathBuf;

use crate::common::{PageId, PageNo, TableId};
use crate::concurrency::TransactionId;

pub type DbResult<T, E = Error> = Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested page lies outside of `[0, num_pages)`.
    #[error("page {page_id} is out of range, table has {num_pages} pages")]
    PageOutOfRange { page_id: PageId, num_pages: PageNo },

    /// Seek or read against the backing file failed.
    #[error("io failure: {0}")]
    Io(#[from] io::Error),

    /// A cursor operation was called in a state which does not allow it.
    #[error("cursor {0}")]
    IteratorState(IteratorState),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("transaction {0} was aborted")]
    TransactionAborted(TransactionId),

    #[error("all {0} buffers are pinned")]
    BufferPoolFull(usize),

    /// The page header or one of its tuples could not be decoded.
    #[error("corrupted page {page_id}: {reason}")]
    CorruptedPage {
        page_id: PageId,
        reason: &'static str,
    },

    #[error("no heap file attached for table {0}")]
    UnknownTable(TableId),

    #[error("table id {table_id} of {} is already used by another file", .path.display())]
    DuplicateTableId { table_id: TableId, path: PathBuf },

    #[error("transaction id space is exhausted")]
    TransactionIdsExhausted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IteratorState {
    #[error("is not open")]
    NotOpen,
    #[error("is exhausted")]
    Exhausted,
}

impl From<IteratorState> for Error {
    fn from(state: IteratorState) -> Self {
        Error::IteratorState(state)
    }
}
