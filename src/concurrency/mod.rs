use std::fmt::Display;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{DbResult, Error};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(u32);

impl TransactionId {
    pub fn new(tid: u32) -> Self {
        Self(tid)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out transaction ids. Locking and visibility are left to the caller.
pub struct TransactionManager {
    next_tid: AtomicU32,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self {
            next_tid: AtomicU32::new(1),
        }
    }

    pub fn begin(&self) -> DbResult<TransactionId> {
        let tid = self
            .next_tid
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |val| {
                if val == u32::MAX {
                    None
                } else {
                    Some(val + 1)
                }
            })
            .map_err(|_| Error::TransactionIdsExhausted)?;
        Ok(TransactionId(tid))
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}
