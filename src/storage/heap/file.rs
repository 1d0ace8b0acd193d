use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{instrument, trace, warn};

use super::cursor::HeapFileCursor;
use super::page::HeapPage;
use crate::buffer::PageCache;
use crate::common::{table_id_for_path, PageId, PageNo, TableId, PAGE_SIZE};
use crate::concurrency::TransactionId;
use crate::error::{DbResult, Error};
use crate::tuple::schema::Schema;
use crate::tuple::Tuple;

/// HeapFile stores the tuples of one table, in no particular order, in a single file
/// of PAGE_SIZE pages. Page n starts at byte `n * PAGE_SIZE`.
#[derive(Debug)]
pub struct HeapFile {
    path: PathBuf,
    table_id: TableId,
    schema: Schema,
}

impl HeapFile {
    /// Creates a heap file backed by the file at `path`, which has to exist.
    /// The table id is derived from the canonical path of the file.
    pub fn new(path: impl AsRef<Path>, schema: Schema) -> DbResult<Self> {
        let path = path.as_ref().canonicalize()?;
        let table_id = table_id_for_path(&path);
        let size = path.metadata()?.len();
        let remainder = size % PAGE_SIZE as u64;
        if remainder != 0 {
            warn!(
                path = %path.display(),
                size,
                remainder,
                "heap file ends with a partial page, ignoring its trailing bytes"
            );
        }
        Ok(Self {
            path,
            table_id,
            schema,
        })
    }

    pub fn id(&self) -> TableId {
        self.table_id
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of complete pages in the file.
    /// Always reads the current file size, trailing bytes of a partial page don't count.
    pub fn num_pages(&self) -> DbResult<PageNo> {
        let size = self.path.metadata()?.len();
        Ok((size / PAGE_SIZE as u64) as PageNo)
    }

    /// Reads page `page_no` from disk.
    #[instrument(level = "trace", skip(self), fields(table_id = self.table_id))]
    pub fn read_page(&self, page_no: PageNo) -> DbResult<HeapPage> {
        let page_id = PageId::new(self.table_id, page_no);
        let mut file = File::open(&self.path)?;
        let size = file.metadata()?.len();
        let offset = page_id.offset();
        if offset + PAGE_SIZE as u64 > size {
            return Err(Error::PageOutOfRange {
                page_id,
                num_pages: (size / PAGE_SIZE as u64) as PageNo,
            });
        }

        trace!(offset, "reading page from disk");
        let mut data = vec![0u8; PAGE_SIZE as usize];
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut data)?;

        HeapPage::new(page_id, data)
    }

    pub fn write_page(&self, _page: &HeapPage) -> DbResult<()> {
        Err(Error::NotImplemented("HeapFile::write_page"))
    }

    pub fn insert_tuple(&self, _tid: TransactionId, _tuple: &Tuple) -> DbResult<Vec<PageId>> {
        Err(Error::NotImplemented("HeapFile::insert_tuple"))
    }

    pub fn delete_tuple(&self, _tid: TransactionId, _tuple: &Tuple) -> DbResult<Vec<PageId>> {
        Err(Error::NotImplemented("HeapFile::delete_tuple"))
    }

    /// Returns a closed cursor over all tuples of this file.
    /// Pages are fetched through `page_cache` on behalf of `tid`.
    pub fn scan<'a>(
        &'a self,
        page_cache: &'a dyn PageCache,
        tid: TransactionId,
    ) -> HeapFileCursor<'a> {
        HeapFileCursor::new(self, page_cache, tid)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{File, OpenOptions};
    use std::io::Write;

    use anyhow::Result;
    use tempfile::{tempdir, NamedTempFile};

    use super::HeapFile;
    use crate::common::{PageId, PAGE_SIZE};
    use crate::concurrency::TransactionId;
    use crate::error::Error;
    use crate::storage::heap::page::HeapPage;
    use crate::tuple::schema::{ColumnDefinition, Schema, TypeId};
    use crate::tuple::value::Value;
    use crate::tuple::Tuple;

    fn schema() -> Schema {
        Schema::new(vec![ColumnDefinition::new(
            TypeId::Integer,
            "value".to_owned(),
            0,
            true,
        )])
    }

    /// page n holds the tuples n * 10, n * 10 + 1, n * 10 + 2
    fn page_bytes(page_no: u32) -> Vec<u8> {
        let mut page = HeapPage::empty(PageId::new(0, page_no));
        for i in 0..3 {
            page.insert_tuple(&Tuple::new(vec![Value::Integer((page_no * 10 + i) as i32)]));
        }
        page.data().to_vec()
    }

    fn file_with_pages(pages: u32, trailing: usize) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        for page_no in 0..pages {
            file.write_all(&page_bytes(page_no))?;
        }
        file.write_all(&vec![0xab; trailing])?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn num_pages_rounds_down() -> Result<()> {
        let cases = [
            (0, 0),
            (0, 100),
            (1, 0),
            (2, 0),
            (2, 1),
            (3, PAGE_SIZE as usize - 1),
        ];
        for (pages, trailing) in cases {
            let file = file_with_pages(pages, trailing)?;
            let heap_file = HeapFile::new(file.path(), schema())?;
            assert_eq!(
                heap_file.num_pages()?,
                pages,
                "{pages} pages, {trailing} trailing bytes"
            );
        }
        Ok(())
    }

    #[test]
    fn num_pages_follows_file_growth() -> Result<()> {
        let file = file_with_pages(1, 0)?;
        let heap_file = HeapFile::new(file.path(), schema())?;
        assert_eq!(heap_file.num_pages()?, 1);

        let mut appender = OpenOptions::new().append(true).open(file.path())?;
        appender.write_all(&page_bytes(1))?;
        assert_eq!(heap_file.num_pages()?, 2);
        Ok(())
    }

    #[test]
    fn read_page_returns_the_page_bytes() -> Result<()> {
        let file = file_with_pages(3, 17)?;
        let heap_file = HeapFile::new(file.path(), schema())?;
        let contents = std::fs::read(file.path())?;

        for page_no in 0..3u32 {
            let page = heap_file.read_page(page_no)?;
            let start = page_no as usize * PAGE_SIZE as usize;
            assert_eq!(page.data(), &contents[start..start + PAGE_SIZE as usize]);
            assert_eq!(page.page_id(), PageId::new(heap_file.id(), page_no));

            let tuple = page.tuple(2, heap_file.schema())?;
            assert_eq!(tuple.values(), &[Value::Integer((page_no * 10 + 2) as i32)]);
        }
        Ok(())
    }

    #[test]
    fn read_page_out_of_range() -> Result<()> {
        // the trailing partial page is not a valid page either
        let file = file_with_pages(2, 100)?;
        let heap_file = HeapFile::new(file.path(), schema())?;

        for page_no in [2, 3, u32::MAX] {
            match heap_file.read_page(page_no) {
                Err(Error::PageOutOfRange { page_id, num_pages }) => {
                    assert_eq!(page_id.page_no(), page_no);
                    assert_eq!(num_pages, 2);
                }
                other => panic!("expected PageOutOfRange for {page_no}, got {other:?}"),
            }
        }
        Ok(())
    }

    #[test]
    fn read_corrupted_page() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(&[0u8; PAGE_SIZE as usize])?;
        file.flush()?;
        let heap_file = HeapFile::new(file.path(), schema())?;
        assert!(matches!(
            heap_file.read_page(0),
            Err(Error::CorruptedPage { .. })
        ));
        Ok(())
    }

    #[test]
    fn io_failures_are_reported() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("gone.dat");
        File::create(&path)?.write_all(&page_bytes(0))?;
        let heap_file = HeapFile::new(&path, schema())?;
        std::fs::remove_file(&path)?;

        assert!(matches!(heap_file.num_pages(), Err(Error::Io(_))));
        assert!(matches!(heap_file.read_page(0), Err(Error::Io(_))));

        let missing = HeapFile::new(dir.path().join("missing.dat"), schema());
        assert!(matches!(missing, Err(Error::Io(_))));
        Ok(())
    }

    #[test]
    fn table_id_is_stable_per_path() -> Result<()> {
        let file = file_with_pages(1, 0)?;
        let other = file_with_pages(1, 0)?;
        let a = HeapFile::new(file.path(), schema())?;
        let b = HeapFile::new(file.path(), schema())?;
        let c = HeapFile::new(other.path(), schema())?;
        assert_eq!(a.id(), a.id());
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        Ok(())
    }

    #[test]
    fn mutations_are_not_implemented() -> Result<()> {
        let file = file_with_pages(1, 0)?;
        let heap_file = HeapFile::new(file.path(), schema())?;
        let tid = TransactionId::new(1);
        let tuple = Tuple::new(vec![Value::Integer(1)]);
        let page = heap_file.read_page(0)?;

        assert!(matches!(
            heap_file.write_page(&page),
            Err(Error::NotImplemented(_))
        ));
        assert!(matches!(
            heap_file.insert_tuple(tid, &tuple),
            Err(Error::NotImplemented(_))
        ));
        assert!(matches!(
            heap_file.delete_tuple(tid, &tuple),
            Err(Error::NotImplemented(_))
        ));
        Ok(())
    }
}
