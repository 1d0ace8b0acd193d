use std::fmt::Display;

use super::schema::{ColumnDefinition, TypeId};

#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Boolean(bool),
    Integer(i32),
    String(String),
    Null,
}

impl Value {
    /// parses a value from bytes.
    /// Returns None if the bytes end before the value does or don't encode a valid value
    pub fn parse_value(bytes: &[u8], column: &ColumnDefinition, is_null: bool) -> Option<Self> {
        if is_null {
            return Some(Value::Null);
        }
        let value = match column.type_id() {
            TypeId::Boolean => match bytes.first()? {
                0 => Value::Boolean(false),
                1 => Value::Boolean(true),
                _ => return None,
            },
            TypeId::Integer => {
                let val = i32::from_be_bytes(bytes.get(..4)?.try_into().ok()?);
                Value::Integer(val)
            }
            TypeId::Text => {
                let len = *bytes.first()? as usize;
                let slice = bytes.get(1..len + 1)?;
                Value::String(std::str::from_utf8(slice).ok()?.to_owned())
            }
        };
        Some(value)
    }

    /// Writes the value into the buffer. The buffer must hold at least `self.size()` bytes
    pub fn serialize_value(&self, buffer: &mut [u8]) {
        match self {
            Value::Boolean(b) => buffer[0] = *b as u8,
            Value::Integer(val) => {
                buffer[..std::mem::size_of::<i32>()].copy_from_slice(val.to_be_bytes().as_slice())
            }
            Value::String(val) => {
                let len = val.len();
                buffer[0] = len as u8;
                buffer[1..len + 1].copy_from_slice(val.as_bytes())
            }
            Value::Null => (),
        }
    }

    pub fn is_null(&self) -> bool {
        *self == Value::Null
    }

    /// Returns how many bytes a serialized value occupies
    pub fn size(&self) -> usize {
        match self {
            Value::Boolean(_) => std::mem::size_of::<bool>(),
            Value::Integer(_) => std::mem::size_of::<i32>(),
            Value::String(val) => std::mem::size_of::<u8>() + val.len(),
            Value::Null => 0,
        }
    }

    /// Text values are limited to what their length byte can address
    pub fn fits_encoding(&self) -> bool {
        match self {
            Value::String(val) => val.len() <= u8::MAX as usize,
            _ => true,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Boolean(val) => val.fmt(f),
            Value::Integer(val) => val.fmt(f),
            Value::String(val) => val.fmt(f),
            Value::Null => "NULL".fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::tuple::schema::{ColumnDefinition, TypeId};

    #[test]
    fn text_value_layout() {
        let mut buffer = [0u8; 16];
        let value = Value::String("heap".to_owned());
        value.serialize_value(&mut buffer);
        assert_eq!(&buffer[..5], &[4, b'h', b'e', b'a', b'p']);
        assert_eq!(value.size(), 5);

        let column = ColumnDefinition::new(TypeId::Text, "".to_owned(), 0, true);
        assert_eq!(Value::parse_value(&buffer, &column, false), Some(value));
    }

    #[test]
    fn truncated_bytes_are_rejected() {
        let integer_column = ColumnDefinition::new(TypeId::Integer, "".to_owned(), 0, true);
        assert_eq!(Value::parse_value(&[0, 0, 1], &integer_column, false), None);

        let text_column = ColumnDefinition::new(TypeId::Text, "".to_owned(), 0, true);
        assert_eq!(Value::parse_value(&[5, b'a', b'b'], &text_column, false), None);
        assert_eq!(Value::parse_value(&[1, 0xff], &text_column, false), None);
    }

    #[test]
    fn booleans_are_zero_or_one() {
        let column = ColumnDefinition::new(TypeId::Boolean, "".to_owned(), 0, true);
        assert_eq!(
            Value::parse_value(&[0], &column, false),
            Some(Value::Boolean(false))
        );
        assert_eq!(
            Value::parse_value(&[1], &column, false),
            Some(Value::Boolean(true))
        );
        for byte in [2, 0x80, 0xff] {
            assert_eq!(Value::parse_value(&[byte], &column, false), None);
        }
    }

    #[test]
    fn null_is_not_read_from_bytes() {
        let column = ColumnDefinition::new(TypeId::Integer, "".to_owned(), 0, false);
        assert_eq!(Value::parse_value(&[], &column, true), Some(Value::Null));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Integer(-3).to_string(), "-3");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert!(!Value::String("x".repeat(256)).fits_encoding());
    }
}
