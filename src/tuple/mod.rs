use self::value::Value;
use crate::storage::record_id::RecordId;

pub mod schema;
pub mod value;

#[derive(Clone, Debug, PartialEq)]
pub struct Tuple {
    values: Vec<Value>,
    /// where the tuple is stored, set once it has been read from a page
    record_id: Option<RecordId>,
}

impl Tuple {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            record_id: None,
        }
    }

    pub fn with_record_id(values: Vec<Value>, record_id: RecordId) -> Self {
        Self {
            values,
            record_id: Some(record_id),
        }
    }

    pub fn has_null(&self) -> bool {
        self.values.iter().any(|val| val.is_null())
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }
}
