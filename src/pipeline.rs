//! Two-pass orchestration
//!
//! Pass 1 streams every record once and freezes the schema; pass 2 re-streams
//! the same source and writes schema-conformant rows. Pass 2 never starts
//! before pass 1 has consumed the whole input - its correctness depends on
//! the schema having seen every record. Any fatal error aborts the run;
//! artifacts from a failed run are not to be trusted.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::format::RecordFormatter;
use crate::schema::{emit_ddl, SchemaAccumulator, TableSchema};
use crate::stream::RecordStream;
use crate::typemap::TypeMapper;
use crate::writer::TableWriter;
use serde::Serialize;
use std::path::Path;

/// Counters reported after a successful run
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PipelineReport {
    pub tables: usize,
    pub records_scanned: usize,
    pub rows_written: usize,
}

pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    mapper: &'a TypeMapper,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig, mapper: &'a TypeMapper) -> Self {
        Pipeline { config, mapper }
    }

    /// Pass 1: consume the stream once and freeze the schema
    pub fn infer_schema(&self, stream: &RecordStream) -> Result<(TableSchema, usize)> {
        let mut acc = SchemaAccumulator::new(self.mapper, self.config);
        for batch in stream.batches()? {
            for record in batch? {
                acc.add_record(&record);
            }
        }
        let records = acc.records_seen();
        Ok((acc.finish(), records))
    }

    /// Pass 2: consume a fresh stream and write one CSV row per record
    pub fn write_tables(
        &self,
        stream: &RecordStream,
        schema: &TableSchema,
        dest_dir: &Path,
    ) -> Result<usize> {
        let formatter = RecordFormatter::new(schema, self.config);
        let mut writer = TableWriter::new(schema, dest_dir)?;
        let mut rows = 0usize;

        for batch in stream.batches()? {
            for record in batch? {
                let table_id = record.table_id(&self.config.separator);
                let row = formatter.format(&record)?;
                writer.write(&table_id, &row)?;
                rows += 1;
            }
        }

        writer.finish()?;
        Ok(rows)
    }

    /// Run both passes and write every artifact: the DDL script plus one CSV
    /// file per discovered table.
    pub fn run(
        &self,
        stream: &RecordStream,
        dest_dir: &Path,
        schema_path: &Path,
    ) -> Result<PipelineReport> {
        let (schema, records_scanned) = self.infer_schema(stream)?;

        std::fs::create_dir_all(dest_dir)?;
        std::fs::write(schema_path, emit_ddl(&schema, self.config))?;

        let rows_written = self.write_tables(stream, &schema, dest_dir)?;

        Ok(PipelineReport {
            tables: schema.len(),
            records_scanned,
            rows_written,
        })
    }
}
