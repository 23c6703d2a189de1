//! DDL emission
//!
//! Renders the frozen schema as one CREATE TABLE statement per table, in
//! discovery order, separated by a fixed delimiter line. Pure text
//! generation, no side effects.

use crate::config::PipelineConfig;
use crate::schema::{ColumnTypes, TableSchema};

/// Delimiter written between (and after) statements in the DDL artifact
pub const STATEMENT_DELIMITER: &str = "\n\n---\n\n";

/// Render the whole schema as DDL text
pub fn emit_ddl(schema: &TableSchema, config: &PipelineConfig) -> String {
    let mut out = String::new();
    for (table_id, columns) in schema.iter() {
        out.push_str(&create_table_sql(table_id, columns, config));
        out.push_str(STATEMENT_DELIMITER);
    }
    out
}

/// Table identifiers are dot-joined paths; SQL names use underscores
pub fn sql_table_name(table_id: &str) -> String {
    table_id.replace('.', "_")
}

fn create_table_sql(table_id: &str, columns: &ColumnTypes, config: &PipelineConfig) -> String {
    let is_root = table_id == config.root_table;
    let mut lines = Vec::with_capacity(columns.len() + 1);

    for (column, storage) in columns {
        let rendered = if is_root && *column == config.identity_column {
            format!("{storage} PRIMARY KEY")
        } else {
            storage.clone()
        };
        lines.push(format!("    \"{column}\" {rendered}"));
    }

    if !is_root {
        lines.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            config.linkage_column,
            sql_table_name(&config.root_table),
            config.identity_column
        ));
    }

    format!(
        "CREATE TABLE {} (\n{}\n);",
        sql_table_name(table_id),
        lines.join(",\n")
    )
}
