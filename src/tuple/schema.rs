use std::{fmt::Display, str::FromStr};

use anyhow::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeId {
    Boolean,
    Integer,
    Text,
}

impl FromStr for TypeId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Boolean" => Ok(TypeId::Boolean),
            "Integer" => Ok(TypeId::Integer),
            "Text" => Ok(TypeId::Text),
            s => Err(Error::msg(format!("Invalid TypeId {}", s))),
        }
    }
}

impl Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDefinition {
    type_id: TypeId,
    column_name: String,
    column_offset: u8,
    not_null: bool,
}

impl ColumnDefinition {
    pub fn new(type_id: TypeId, column_name: String, column_offset: u8, not_null: bool) -> Self {
        Self {
            type_id,
            column_name,
            column_offset,
            not_null,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn column_offset(&self) -> u8 {
        self.column_offset
    }

    pub fn not_null(&self) -> bool {
        self.not_null
    }
}

/// Describes the columns of the tuples stored in a heap file.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    columns: Vec<ColumnDefinition>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnDefinition>) -> Self {
        Self { columns }
    }

    /// Builds a schema from `name:Type` specs, e.g. `id:Integer` or `nickname:Text?`.
    /// A trailing `?` makes the column nullable. Column offsets follow the order of the specs.
    pub fn parse_columns<S: AsRef<str>>(specs: &[S]) -> anyhow::Result<Self> {
        let mut columns = Vec::with_capacity(specs.len());
        for (offset, spec) in specs.iter().enumerate() {
            let spec = spec.as_ref();
            let (name, type_name) = spec
                .split_once(':')
                .ok_or_else(|| Error::msg(format!("Expected name:Type, got {spec}")))?;
            if name.is_empty() {
                return Err(Error::msg(format!("Missing column name in {spec}")));
            }
            let offset = u8::try_from(offset)
                .map_err(|_| Error::msg(format!("Too many columns, {spec} is out of range")))?;
            let (type_name, not_null) = match type_name.strip_suffix('?') {
                Some(type_name) => (type_name, false),
                None => (type_name, true),
            };
            columns.push(ColumnDefinition::new(
                type_name.parse()?,
                name.to_owned(),
                offset,
                not_null,
            ));
        }
        Ok(Self::new(columns))
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|col| col.column_name().eq(name))
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }
}
