use crate::common::{Slot, PAGE_SIZE};

pub type TupleOffset = u16;
pub type TupleSize = u16;

pub type TupleSlot = (TupleOffset, TupleSize);

const U8_SIZE: usize = std::mem::size_of::<u8>();
const U16_SIZE: usize = std::mem::size_of::<u16>();
pub(in crate::storage) const TUPLE_SLOT_SIZE: u16 = std::mem::size_of::<TupleSlot>() as u16;

pub(in crate::storage) struct Serializer<'a> {
    buffer: &'a mut [u8],
    pos: usize,
}

impl<'a> Serializer<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    pub fn serialize_u8(&mut self, val: u8) {
        self.buffer[self.pos..self.pos + U8_SIZE].copy_from_slice(val.to_be_bytes().as_slice());
        self.pos += U8_SIZE;
    }

    pub fn serialize_u16(&mut self, val: u16) {
        self.buffer[self.pos..self.pos + U16_SIZE].copy_from_slice(val.to_be_bytes().as_slice());
        self.pos += U16_SIZE;
    }

    pub fn serialize_tuple_slot(&mut self, tuple_slot: TupleSlot) {
        let (offset, size) = tuple_slot;
        self.serialize_u16(offset);
        self.serialize_u16(size);
    }

    pub fn copy_bytes(&mut self, bytes: &[u8]) {
        self.buffer[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    pub fn end(self) -> usize {
        self.pos
    }
}

/// Reads big-endian values from a buffer.
/// Every read returns None once the buffer is exhausted, so corrupted pages never panic.
pub(in crate::storage) struct Deserializer<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> Deserializer<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    pub fn deserialize_u8(&mut self) -> Option<u8> {
        let val = *self.buffer.get(self.pos)?;
        self.pos += U8_SIZE;
        Some(val)
    }

    pub fn deserialize_u16(&mut self) -> Option<u16> {
        let bytes = self.buffer.get(self.pos..self.pos + U16_SIZE)?;
        self.pos += U16_SIZE;
        Some(u16::from_be_bytes(bytes.try_into().ok()?))
    }

    pub fn copy_bytes(&mut self, dest: &mut [u8], count: usize) -> Option<()> {
        let bytes = self.buffer.get(self.pos..self.pos + count)?;
        dest.get_mut(..count)?.copy_from_slice(bytes);
        self.pos += count;
        Some(())
    }
}

/// Header of a slotted page.
/// The slot array grows upwards from the header, tuples grow downwards from the page end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    free_space_start: u16,
    free_space_end: u16,
}

impl PageHeader {
    pub const SIZE: u16 = 4;

    pub fn empty() -> Self {
        Self {
            free_space_start: Self::SIZE,
            free_space_end: PAGE_SIZE,
        }
    }

    /// Parses and validates the header at the start of a page.
    /// Returns why the header is invalid if it cannot describe a page of PAGE_SIZE bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, &'static str> {
        let mut deserializer = Deserializer::new(bytes);
        let (free_space_start, free_space_end) = deserializer
            .deserialize_u16()
            .zip(deserializer.deserialize_u16())
            .ok_or("page too short for its header")?;

        if free_space_start < Self::SIZE
            || free_space_start > free_space_end
            || free_space_end > PAGE_SIZE
        {
            return Err("free space bounds are out of order");
        }
        if (free_space_start - Self::SIZE) % TUPLE_SLOT_SIZE != 0 {
            return Err("slot array is not a whole number of slots");
        }

        Ok(Self {
            free_space_start,
            free_space_end,
        })
    }

    pub fn free_space(&self) -> u16 {
        self.free_space_end - self.free_space_start
    }

    /// Start of the tuple area
    pub fn free_space_end(&self) -> u16 {
        self.free_space_end
    }

    pub fn slots(&self) -> Slot {
        (self.free_space_start - Self::SIZE) / TUPLE_SLOT_SIZE
    }

    /// Returns the start offset and its size of a tuple stored at tuple_slot
    pub fn tuple_slot(bytes: &[u8], tuple_slot: Slot) -> Option<TupleSlot> {
        let slot_offset = (Self::SIZE + tuple_slot * TUPLE_SLOT_SIZE) as usize;
        let mut deserializer = Deserializer::new(bytes.get(slot_offset..)?);
        let tuple_offset = deserializer.deserialize_u16()?;
        let tuple_size = deserializer.deserialize_u16()?;
        Some((tuple_offset, tuple_size))
    }

    /// Adds a new tuple slot to the page header.
    /// Returns the slot number and the start offset of the tuple on this page.
    /// The caller has to check that `free_space()` covers the tuple and its slot.
    pub fn add_tuple_slot(&mut self, buffer: &mut [u8], tuple_size: u16) -> (Slot, u16) {
        self.free_space_end -= tuple_size;
        let slot: TupleSlot = (self.free_space_end, tuple_size);
        let mut serializer = Serializer::new(&mut buffer[self.free_space_start as usize..]);
        serializer.serialize_tuple_slot(slot);
        self.free_space_start += serializer.end() as u16;
        (self.slots() - 1, self.free_space_end)
    }

    /// serializes this PageHeader to its bytes so that it can be persisted to disk.
    /// Returns how many bytes were written to the buffer
    pub fn serialize(self, buffer: &mut [u8]) -> usize {
        let mut serializer = Serializer::new(buffer);
        serializer.serialize_u16(self.free_space_start);
        serializer.serialize_u16(self.free_space_end);
        serializer.end()
    }
}

#[cfg(test)]
mod tests {
    use super::{PageHeader, TUPLE_SLOT_SIZE};
    use crate::common::PAGE_SIZE;

    #[test]
    fn add_slots() {
        let mut buffer = vec![0u8; PAGE_SIZE as usize];
        let mut header = PageHeader::empty();
        assert_eq!(header.slots(), 0);
        assert_eq!(header.free_space(), PAGE_SIZE - PageHeader::SIZE);

        assert_eq!(header.add_tuple_slot(&mut buffer, 10), (0, PAGE_SIZE - 10));
        assert_eq!(header.add_tuple_slot(&mut buffer, 6), (1, PAGE_SIZE - 16));
        header.serialize(&mut buffer);

        let parsed = PageHeader::parse(&buffer).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.slots(), 2);
        assert_eq!(
            parsed.free_space(),
            PAGE_SIZE - PageHeader::SIZE - 2 * TUPLE_SLOT_SIZE - 16
        );
        assert_eq!(PageHeader::tuple_slot(&buffer, 1), Some((PAGE_SIZE - 16, 6)));
    }

    #[test]
    fn reject_corrupted_headers() {
        // all zeroes: free_space_start lies inside the header
        assert!(PageHeader::parse(&[0u8; 8]).is_err());
        // start behind end
        assert!(PageHeader::parse(&[0, 12, 0, 8]).is_err());
        // end behind the page
        assert!(PageHeader::parse(&[0, 4, 0xff, 0xff]).is_err());
        // half a slot
        assert!(PageHeader::parse(&[0, 6, 0x10, 0]).is_err());
        assert!(PageHeader::parse(&[0, 4]).is_err());
    }
}
