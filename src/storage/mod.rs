pub(in crate::storage) mod common;
pub mod heap;
pub mod record_id;
