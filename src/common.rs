use std::fmt::Display;
use std::path::Path;

pub type TableId = u32;
pub type PageNo = u32;
/// Position of a tuple inside its page.
pub type Slot = u16;

pub const PAGE_SIZE: u16 = 4096;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    table_id: TableId,
    page_no: PageNo,
}

impl PageId {
    pub fn new(table_id: TableId, page_no: PageNo) -> Self {
        Self { table_id, page_no }
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn page_no(&self) -> PageNo {
        self.page_no
    }

    /// Byte offset of this page inside its heap file.
    pub fn offset(&self) -> u64 {
        self.page_no as u64 * PAGE_SIZE as u64
    }
}

impl Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.table_id, self.page_no)
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Derives a table id from the path of its backing file.
/// The result only depends on the path bytes, so it is the same across restarts.
pub fn table_id_for_path(path: &Path) -> TableId {
    let path = path.to_string_lossy();
    let hash = path.as_bytes().iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ *byte as u64).wrapping_mul(FNV_PRIME)
    });
    ((hash >> 32) ^ hash) as TableId
}
