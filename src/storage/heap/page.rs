use lazy_static::lazy_static;

use super::tuple::{parse_heap_tuple, required_free_space, serialize_heap_tuple, MAX_TUPLE_SIZE};
use crate::common::{PageId, Slot, PAGE_SIZE};
use crate::error::{DbResult, Error};
use crate::storage::common::{PageHeader, TUPLE_SLOT_SIZE};
use crate::storage::record_id::RecordId;
use crate::tuple::schema::Schema;
use crate::tuple::Tuple;

lazy_static! {
    static ref EMPTY_HEAP_PAGE: [u8; PAGE_SIZE as usize] = {
        let mut data = [0u8; PAGE_SIZE as usize];
        let empty_header = PageHeader::empty();
        empty_header.serialize(&mut data);
        data
    };
}

/// A page of a heap file, materialized from PAGE_SIZE bytes.
/// Tuples are ordered by their slot.
#[derive(Clone, Debug)]
pub struct HeapPage {
    page_id: PageId,
    header: PageHeader,
    data: Box<[u8]>,
}

impl HeapPage {
    /// Wraps the raw bytes of a page read as `page_id`.
    /// Fails if there are not exactly PAGE_SIZE bytes or the page header is corrupted.
    pub fn new(page_id: PageId, data: Vec<u8>) -> DbResult<Self> {
        if data.len() != PAGE_SIZE as usize {
            return Err(Error::CorruptedPage {
                page_id,
                reason: "page does not have PAGE_SIZE bytes",
            });
        }
        let header =
            PageHeader::parse(&data).map_err(|reason| Error::CorruptedPage { page_id, reason })?;

        Ok(Self {
            page_id,
            header,
            data: data.into_boxed_slice(),
        })
    }

    /// A formatted page without any tuples.
    pub fn empty(page_id: PageId) -> Self {
        Self {
            page_id,
            header: PageHeader::empty(),
            data: Box::new(*EMPTY_HEAP_PAGE),
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of tuples stored on this page.
    pub fn slots(&self) -> Slot {
        self.header.slots()
    }

    pub fn free_space(&self) -> u16 {
        self.header.free_space()
    }

    /// Decodes the tuple stored at `slot` and stamps it with its record id.
    pub fn tuple(&self, slot: Slot, schema: &Schema) -> DbResult<Tuple> {
        let record_id = RecordId::new(self.page_id, slot);
        if slot >= self.slots() {
            return Err(self.corrupted("slot is out of range"));
        }
        let (offset, size) = PageHeader::tuple_slot(&self.data, slot)
            .ok_or_else(|| self.corrupted("slot array runs past the page end"))?;
        let start = offset as usize;
        let end = start + size as usize;
        if start < self.header.free_space_end() as usize || end > self.data.len() {
            return Err(self.corrupted("tuple lies outside of the tuple area"));
        }

        let values = parse_heap_tuple(&self.data[start..end], schema)
            .ok_or_else(|| self.corrupted("tuple does not match the schema"))?;
        Ok(Tuple::with_record_id(values, record_id))
    }

    /// Iterates over all tuples of this page in slot order.
    pub fn tuples<'a>(&'a self, schema: &'a Schema) -> impl Iterator<Item = DbResult<Tuple>> + 'a {
        (0..self.slots()).map(move |slot| self.tuple(slot, schema))
    }

    /// Appends a tuple to the page.
    /// Returns the slot of the tuple, or None if it does not fit into the page.
    pub fn insert_tuple(&mut self, tuple: &Tuple) -> Option<Slot> {
        if tuple.values().len() > u8::MAX as usize
            || tuple.values().iter().any(|value| !value.fits_encoding())
        {
            return None;
        }
        let required_size = required_free_space(tuple);
        if required_size > MAX_TUPLE_SIZE as usize {
            return None;
        }
        let required_size = required_size as u16;
        if self.header.free_space() < required_size + TUPLE_SLOT_SIZE {
            return None;
        }

        let (slot, tuple_start) = self.header.add_tuple_slot(&mut self.data, required_size);
        serialize_heap_tuple(&mut self.data[tuple_start as usize..], tuple);
        self.header.serialize(&mut self.data);
        Some(slot)
    }

    fn corrupted(&self, reason: &'static str) -> Error {
        Error::CorruptedPage {
            page_id: self.page_id,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::distributions::{Alphanumeric, DistString};
    use rand::Rng;

    use super::HeapPage;
    use crate::common::{PageId, PAGE_SIZE};
    use crate::error::{DbResult, Error};
    use crate::storage::record_id::RecordId;
    use crate::tuple::schema::{ColumnDefinition, Schema, TypeId};
    use crate::tuple::value::Value;
    use crate::tuple::Tuple;

    fn schema() -> Schema {
        Schema::new(vec![
            ColumnDefinition::new(TypeId::Integer, "id".to_owned(), 0, true),
            ColumnDefinition::new(TypeId::Text, "name".to_owned(), 1, false),
        ])
    }

    fn random_string() -> String {
        let mut rng = rand::thread_rng();
        let length = rng.gen_range(5..20);
        Alphanumeric.sample_string(&mut rng, length)
    }

    #[test]
    fn tuples_in_slot_order() -> DbResult<()> {
        let page_id = PageId::new(3, 1);
        let mut page = HeapPage::empty(page_id);
        let tuples = (0..20)
            .map(|i| {
                let name = if i % 3 == 0 {
                    Value::Null
                } else {
                    Value::String(random_string())
                };
                Tuple::new(vec![Value::Integer(i), name])
            })
            .collect::<Vec<_>>();
        for (i, tuple) in tuples.iter().enumerate() {
            assert_eq!(page.insert_tuple(tuple), Some(i as u16));
        }

        // materialize from the raw bytes, as a read from disk would
        let page = HeapPage::new(page_id, page.data().to_vec())?;
        assert_eq!(page.slots(), 20);

        let schema = schema();
        let read = page.tuples(&schema).collect::<DbResult<Vec<_>>>()?;
        for (slot, (read, written)) in read.iter().zip(&tuples).enumerate() {
            assert_eq!(read.values(), written.values());
            assert_eq!(read.record_id(), Some(RecordId::new(page_id, slot as u16)));
        }
        Ok(())
    }

    #[test]
    fn page_fills_up() {
        let mut page = HeapPage::empty(PageId::new(1, 0));
        let tuple = Tuple::new(vec![Value::Integer(1), Value::String("x".repeat(200))]);
        let mut inserted = 0;
        while page.insert_tuple(&tuple).is_some() {
            inserted += 1;
        }
        // 2 + 4 + 201 bytes per tuple plus a 4 byte slot
        assert_eq!(inserted, (PAGE_SIZE as usize - 4) / 211);
        assert!((page.free_space() as usize) < 211);
    }

    #[test]
    fn oversized_text_is_rejected() {
        let mut page = HeapPage::empty(PageId::new(1, 0));
        let tuple = Tuple::new(vec![Value::Integer(1), Value::String("x".repeat(300))]);
        assert_eq!(page.insert_tuple(&tuple), None);
        assert_eq!(page.slots(), 0);
    }

    #[test]
    fn reject_wrong_size_and_corrupted_header() {
        let page_id = PageId::new(1, 0);
        assert!(matches!(
            HeapPage::new(page_id, vec![0u8; 100]),
            Err(Error::CorruptedPage { .. })
        ));
        assert!(matches!(
            HeapPage::new(page_id, vec![0u8; PAGE_SIZE as usize]),
            Err(Error::CorruptedPage { page_id: id, .. }) if id == page_id
        ));
    }

    #[test]
    fn tuple_pointing_into_free_space() -> DbResult<()> {
        let page_id = PageId::new(1, 0);
        let mut page = HeapPage::empty(page_id);
        page.insert_tuple(&Tuple::new(vec![Value::Integer(1), Value::Null]));
        let mut data = page.data().to_vec();
        // point slot 0 at the middle of the free space
        data[4..6].copy_from_slice(&100u16.to_be_bytes());

        let page = HeapPage::new(page_id, data)?;
        assert!(matches!(
            page.tuple(0, &schema()),
            Err(Error::CorruptedPage { .. })
        ));
        assert!(page.tuple(1, &schema()).is_err());
        Ok(())
    }
}
