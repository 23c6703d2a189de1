//! Per-table CSV sinks
//!
//! Writes formatted rows to one CSV file per table, opening sinks lazily on
//! first write. The header is the table's frozen column order, written once;
//! every row follows in that order. Sinks are owned exclusively by the
//! writer: dropping it releases them on any exit path, and `finish` flushes
//! them so write errors surface instead of being swallowed.

use crate::error::{PipelineError, Result};
use crate::format::FormattedRow;
use crate::schema::TableSchema;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;

pub struct TableWriter<'a> {
    schema: &'a TableSchema,
    dest: PathBuf,
    sinks: HashMap<String, csv::Writer<File>>,
}

impl<'a> TableWriter<'a> {
    pub fn new(schema: &'a TableSchema, dest: impl Into<PathBuf>) -> Result<Self> {
        let dest = dest.into();
        std::fs::create_dir_all(&dest)?;
        Ok(TableWriter {
            schema,
            dest,
            sinks: HashMap::new(),
        })
    }

    /// Append one row to the table's sink, opening it (and writing the
    /// header) on first use. A table the schema pass never saw is fatal;
    /// unreachable under the two-pass protocol but checked anyway.
    pub fn write(&mut self, table_id: &str, row: &FormattedRow) -> Result<()> {
        let columns = self
            .schema
            .table(table_id)
            .ok_or_else(|| PipelineError::UnknownTable(table_id.to_string()))?;

        let sink = match self.sinks.entry(table_id.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let path = self.dest.join(format!("{table_id}.csv"));
                let mut sink = csv::Writer::from_path(&path)?;
                sink.write_record(columns.keys())?;
                entry.insert(sink)
            }
        };

        // The row was shaped by the same frozen schema, so its value order
        // matches the header.
        sink.write_record(row.values())?;
        Ok(())
    }

    /// Flush and release every open sink
    pub fn finish(mut self) -> Result<()> {
        for sink in self.sinks.values_mut() {
            sink.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::format::RecordFormatter;
    use crate::record::Record;
    use crate::schema::SchemaAccumulator;
    use crate::typemap::TypeMapper;
    use serde_json::json;

    #[test]
    fn test_header_once_then_rows() {
        let mapper = TypeMapper::default();
        let config = PipelineConfig::default();
        let raw = json!({
            "_dn": ["standard"],
            "__columns": ["id", "name"],
            "id": "id1",
            "name": "alpha",
            "_id_read_access": ["ops"],
            "_name_read_access": ["ops"]
        });

        let mut acc = SchemaAccumulator::new(&mapper, &config);
        let record = Record::from_value(&raw).unwrap();
        acc.add_record(&record);
        let schema = acc.finish();

        let dir = tempfile::tempdir().unwrap();
        let mut writer = TableWriter::new(&schema, dir.path()).unwrap();
        let formatter = RecordFormatter::new(&schema, &config);

        let row = formatter.format(&record).unwrap();
        writer.write("standard", &row).unwrap();
        writer.write("standard", &row).unwrap();
        writer.finish().unwrap();

        let content = std::fs::read_to_string(dir.path().join("standard.csv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id,name,read_access");
        assert_eq!(lines[1], "id1,alpha,{ops}");
    }

    #[test]
    fn test_unknown_table_is_fatal() {
        let schema = TableSchema::default();
        let dir = tempfile::tempdir().unwrap();
        let mut writer = TableWriter::new(&schema, dir.path()).unwrap();

        let err = writer.write("ghost", &FormattedRow::new()).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownTable(t) if t == "ghost"));
    }
}
