//! # Crucible - node-record relational loader
//!
//! Ingests self-describing node records (line-delimited, optionally gzipped
//! JSON batches), infers a relational schema from them, and emits SQL DDL
//! plus per-table CSV files ready for bulk loading, with a row-level
//! read-access column computed for every row.
//!
//! The pipeline makes two strictly sequential passes over the input:
//!
//! 1. **Schema pass**: every record's table path and column manifest is
//!    folded into a per-table schema, with storage types resolved through a
//!    [`TypeMapper`]. The schema is then frozen.
//! 2. **Data pass**: the input is re-streamed and every record is formatted
//!    against the frozen schema - rows always carry exactly the frozen
//!    column set, with `NULL` placeholders for anything absent.
//!
//! ## Quick Start
//!
//! ```rust
//! use crucible::{PipelineConfig, Record, SchemaAccumulator, TypeMapper};
//! use serde_json::json;
//!
//! # fn main() -> crucible::Result<()> {
//! let config = PipelineConfig::default();
//! let mapper = TypeMapper::default();
//!
//! let record = Record::from_value(&json!({
//!     "_dn": ["standard"],
//!     "__columns": ["id", "hostname"],
//!     "id": "c0364f97-6104-5c89-85f6-fe3b88dee715",
//!     "hostname": "edge-01",
//!     "_id_type": "uuid",
//!     "_id_read_access": ["ops"],
//!     "_hostname_read_access": ["ops"]
//! }))?;
//!
//! let mut acc = SchemaAccumulator::new(&mapper, &config);
//! acc.add_record(&record);
//! let schema = acc.finish();
//!
//! assert_eq!(schema.table("standard").unwrap()["id"], "UUID");
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

pub mod access;
pub mod config;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod stream;
pub mod typemap;
pub mod writer;

// Re-export commonly used types for convenience
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use format::{FormattedRow, RecordFormatter};
pub use pipeline::{Pipeline, PipelineReport};
pub use record::{ColumnMeta, Record};
pub use schema::{SchemaAccumulator, TableSchema};
pub use stream::RecordStream;
pub use typemap::TypeMapper;
pub use writer::TableWriter;

/// Main entry point: run both passes over a source and write all artifacts
pub fn run_pipeline(
    source: impl Into<PathBuf>,
    dest_dir: &Path,
    schema_path: &Path,
    mapper: &TypeMapper,
    config: &PipelineConfig,
) -> Result<PipelineReport> {
    let stream = RecordStream::new(source);
    Pipeline::new(config, mapper).run(&stream, dest_dir, schema_path)
}
