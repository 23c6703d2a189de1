//! Schema accumulation and DDL emission
//!
//! Pass 1 of the pipeline streams every record through [`SchemaAccumulator`]
//! to build a frozen [`TableSchema`]; [`emit_ddl`] renders it as CREATE TABLE
//! statements.

pub mod accumulator;
pub mod emitter;

pub use accumulator::SchemaAccumulator;
pub use emitter::emit_ddl;

use indexmap::IndexMap;

/// Storage type of the synthetic linkage column
pub const LINKAGE_TYPE: &str = "UUID";

/// Storage type of the synthetic access-control column
pub const ACCESS_TYPE: &str = "TEXT[]";

/// Column name -> storage type, in first-insertion order
pub type ColumnTypes = IndexMap<String, String>;

/// The frozen per-table schema: table identifier -> column types, tables in
/// discovery order. Built in full during pass 1, read-only for pass 2.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    tables: IndexMap<String, ColumnTypes>,
}

impl TableSchema {
    pub(crate) fn from_tables(tables: IndexMap<String, ColumnTypes>) -> Self {
        TableSchema { tables }
    }

    pub fn table(&self, table_id: &str) -> Option<&ColumnTypes> {
        self.tables.get(table_id)
    }

    pub fn contains(&self, table_id: &str) -> bool {
        self.tables.contains_key(table_id)
    }

    /// Tables in the order they were first discovered
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ColumnTypes)> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
