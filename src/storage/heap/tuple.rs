use crate::common::PAGE_SIZE;
use crate::storage::common::{Deserializer, PageHeader, Serializer, TUPLE_SLOT_SIZE};
use crate::tuple::schema::Schema;
use crate::tuple::value::Value;
use crate::tuple::Tuple;

const MAX_COLUMNS: usize = u8::MAX as usize;
const MAX_NULL_BITS_SIZE: usize = MAX_COLUMNS / 8 + 1;

// The maximum allowed size of a tuple and its header.
// There has to be enough space so that the PageHeader and a TupleSlot will fit.
pub const MAX_TUPLE_SIZE: u16 = PAGE_SIZE - PageHeader::SIZE - TUPLE_SLOT_SIZE;

const HAS_NULL_FLAG: u8 = 0x01;

/// Returns the size in bytes of the null bitmap
fn null_bitmap_size(column_count: usize) -> usize {
    (column_count + 7) / 8
}

struct HeapTupleHeader {
    flags: u8,
    user_data_start: u8,
    /// a bitmap, where a bit is set if the value is NULL
    /// is only present if the tuple has any NULL values
    null_bitmap: [u8; MAX_NULL_BITS_SIZE],
    // not serialized
    column_count: usize,
}

impl HeapTupleHeader {
    // flags (1 byte) and user_data_start (1 byte), without the null bitmap
    const CONSTANT_SIZE: usize = 2;

    fn from_bytes(bytes: &[u8], column_count: usize) -> Option<Self> {
        let mut deserializer = Deserializer::new(bytes);
        let flags = deserializer.deserialize_u8()?;
        let user_data_start = deserializer.deserialize_u8()?;

        let mut null_bitmap = [0u8; MAX_NULL_BITS_SIZE];
        if flags & HAS_NULL_FLAG != 0 {
            deserializer.copy_bytes(&mut null_bitmap, null_bitmap_size(column_count))?;
        }

        Some(Self {
            flags,
            user_data_start,
            null_bitmap,
            column_count,
        })
    }

    fn for_tuple(tuple: &Tuple) -> Self {
        let mut flags = 0;
        let mut null_bitmap = [0u8; MAX_NULL_BITS_SIZE];
        for (column, value) in tuple.values().iter().enumerate() {
            if value.is_null() {
                flags |= HAS_NULL_FLAG;
                null_bitmap[column / 8] |= 1 << (column % 8);
            }
        }
        let column_count = tuple.values().len();
        let user_data_start = Self::size(flags & HAS_NULL_FLAG != 0, column_count) as u8;

        Self {
            flags,
            user_data_start,
            null_bitmap,
            column_count,
        }
    }

    fn size(has_null: bool, column_count: usize) -> usize {
        if has_null {
            Self::CONSTANT_SIZE + null_bitmap_size(column_count)
        } else {
            Self::CONSTANT_SIZE
        }
    }

    fn has_null(&self) -> bool {
        self.flags & HAS_NULL_FLAG != 0
    }

    fn is_null(&self, column: u8) -> bool {
        let byte = self.null_bitmap[(column / 8) as usize];
        (byte & (1 << (column % 8))) != 0
    }

    fn serialize(&self, buffer: &mut [u8]) {
        let mut serializer = Serializer::new(buffer);
        serializer.serialize_u8(self.flags);
        serializer.serialize_u8(self.user_data_start);
        if self.has_null() {
            serializer.copy_bytes(&self.null_bitmap[..null_bitmap_size(self.column_count)]);
        }
    }
}

/// Decodes the tuple at the start of `bytes`.
/// Returns None if the encoded tuple does not fit into `bytes` or does not match the schema
pub fn parse_heap_tuple(bytes: &[u8], schema: &Schema) -> Option<Vec<Value>> {
    let header = HeapTupleHeader::from_bytes(bytes, schema.columns().len())?;

    let mut offset = header.user_data_start as usize;
    let mut values = Vec::with_capacity(schema.columns().len());
    for column in schema.columns() {
        let is_null = header.has_null() && header.is_null(column.column_offset());
        if is_null && column.not_null() {
            return None;
        }
        let value = Value::parse_value(bytes.get(offset..)?, column, is_null)?;
        offset += value.size();
        values.push(value);
    }

    Some(values)
}

/// Calculates how many bytes a serialized tuple, including its header would occupy
pub fn required_free_space(tuple: &Tuple) -> usize {
    let header_size = HeapTupleHeader::size(tuple.has_null(), tuple.values().len());
    let data_size: usize = tuple.values().iter().map(|val| val.size()).sum();
    header_size + data_size
}

/// Encodes a tuple into the buffer, which must hold at least `required_free_space(tuple)` bytes
pub fn serialize_heap_tuple(buffer: &mut [u8], tuple: &Tuple) {
    let header = HeapTupleHeader::for_tuple(tuple);
    let mut user_data_next_value = header.user_data_start as usize;
    for value in tuple.values().iter().filter(|value| !value.is_null()) {
        value.serialize_value(&mut buffer[user_data_next_value..]);
        user_data_next_value += value.size();
    }
    header.serialize(buffer);
}
