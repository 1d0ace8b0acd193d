use std::fmt::Display;

use crate::common::{PageId, Slot};

/// Identifies a tuple by the page it is stored on and its slot inside that page.
///
/// Equality and hashing are structural: the derived `Hash` feeds the page id and the
/// tuple number into the hasher one after another, so equal ids always hash equally.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    page_id: PageId,
    tuple_no: Slot,
}

impl RecordId {
    pub fn new(page_id: PageId, tuple_no: Slot) -> Self {
        Self { page_id, tuple_no }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn tuple_no(&self) -> Slot {
        self.tuple_no
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.page_id, self.tuple_no)
    }
}
