use std::io::Write;

use anyhow::Result;

use crate::storage::heap::cursor::HeapFileCursor;
use crate::tuple::schema::{Schema, TypeId};

/// Prints the tuples of a scan as a table with right-aligned columns.
pub struct Printer<'a> {
    schema: &'a Schema,
    column_widths: Vec<usize>,
}

impl<'a> Printer<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        let column_widths = schema
            .columns()
            .iter()
            .map(|col| {
                let col_name_size = col.column_name().chars().count();
                match col.type_id() {
                    TypeId::Boolean => col_name_size.max("false".chars().count()),
                    TypeId::Integer => col_name_size.max(11),
                    TypeId::Text => col_name_size.max(25),
                }
            })
            .collect();

        Self {
            schema,
            column_widths,
        }
    }

    fn print_header(&self, writer: &mut impl Write) -> Result<()> {
        let col_names = self.schema.columns().iter().map(|col| col.column_name());
        let header = self
            .column_widths
            .iter()
            .zip(col_names)
            .map(|(width, name)| format!("{:>1$}", name, *width))
            .collect::<Vec<String>>()
            .join("|");
        writeln!(writer, "{header}")?;
        let separator_line = self
            .column_widths
            .iter()
            .map(|width| format!("{:-^1$}", '-', width))
            .collect::<Vec<String>>()
            .join("+");
        writeln!(writer, "{separator_line}")?;

        Ok(())
    }

    /// Prints every remaining tuple of an opened cursor.
    /// Returns how many tuples were printed.
    pub fn print_all_tuples(
        &self,
        cursor: &mut HeapFileCursor,
        writer: &mut impl Write,
    ) -> Result<usize> {
        self.print_header(writer)?;

        let mut count = 0;
        for tuple in cursor.tuples() {
            let tuple = tuple?;
            let line = self
                .column_widths
                .iter()
                .zip(tuple.values())
                .map(|(width, value)| format!("{:>1$}", value.to_string(), *width))
                .collect::<Vec<String>>()
                .join("|");
            writeln!(writer, "{line}")?;
            count += 1;
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use anyhow::Result;
    use tempfile::NamedTempFile;

    use super::Printer;
    use crate::buffer::buffer_manager::BufferManager;
    use crate::catalog::Catalog;
    use crate::common::PageId;
    use crate::concurrency::TransactionId;
    use crate::storage::heap::page::HeapPage;
    use crate::tuple::schema::Schema;
    use crate::tuple::value::Value;
    use crate::tuple::Tuple;

    #[test]
    fn prints_aligned_rows() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        let mut page = HeapPage::empty(PageId::new(0, 0));
        page.insert_tuple(&Tuple::new(vec![Value::Integer(1), Value::Boolean(true)]));
        page.insert_tuple(&Tuple::new(vec![Value::Integer(-20), Value::Null]));
        file.write_all(page.data())?;
        file.flush()?;

        let catalog = Catalog::new();
        let schema = Schema::parse_columns(&["id:Integer", "ok:Boolean?"])?;
        let heap_file = catalog.attach(file.path(), schema)?;
        let buffer_manager = BufferManager::new(&catalog, 1);
        let mut cursor = heap_file.scan(&buffer_manager, TransactionId::new(1));
        cursor.open()?;

        let mut output = vec![];
        let printer = Printer::new(heap_file.schema());
        let count = printer.print_all_tuples(&mut cursor, &mut output)?;
        assert_eq!(count, 2);

        let output = String::from_utf8(output)?;
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            [
                "         id|   ok",
                "-----------+-----",
                "          1| true",
                "        -20| NULL",
            ]
        );
        Ok(())
    }
}
