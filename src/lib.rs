//! Heap-file table storage: tables stored as files of fixed-size slotted pages,
//! read through a transaction-aware buffer manager and scanned with a cursor.

pub mod buffer;
pub mod catalog;
pub mod common;
pub mod concurrency;
pub mod error;
pub mod printer;
pub mod storage;
pub mod tuple;
