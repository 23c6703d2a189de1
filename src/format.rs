//! Record formatting against a frozen schema
//!
//! Every row starts as an all-NULL mapping shaped by its table's frozen
//! column set and is then selectively populated, so the emitted key set
//! always equals the schema's column set exactly.

use crate::access::resolve_access;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::record::Record;
use crate::schema::TableSchema;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeSet;

/// One schema-conformant row: every column of the table's frozen schema mapped
/// to a rendered value or the NULL placeholder, in schema order.
pub type FormattedRow = IndexMap<String, String>;

pub struct RecordFormatter<'a> {
    schema: &'a TableSchema,
    config: &'a PipelineConfig,
}

impl<'a> RecordFormatter<'a> {
    pub fn new(schema: &'a TableSchema, config: &'a PipelineConfig) -> Self {
        RecordFormatter { schema, config }
    }

    /// Format one record against the frozen schema for its table.
    ///
    /// Only columns declared in the record's own manifest are populated;
    /// schema columns the record never declared stay NULL, and declared
    /// columns the schema pass never saw are dropped silently.
    pub fn format(&self, record: &Record) -> Result<FormattedRow> {
        let table_id = record.table_id(&self.config.separator);
        let columns = self
            .schema
            .table(&table_id)
            .ok_or_else(|| PipelineError::UnknownTable(table_id.clone()))?;

        let mut row: FormattedRow = columns
            .keys()
            .map(|c| (c.clone(), self.config.null_placeholder.clone()))
            .collect();

        if table_id != self.config.root_table {
            if let Some(slot) = row.get_mut(&self.config.linkage_column) {
                *slot = match &record.identity {
                    Some(identity) => identity.clone(),
                    None => self.config.null_placeholder.clone(),
                };
            }
        }

        let access = resolve_access(record)?;
        if let Some(slot) = row.get_mut(&self.config.access_column) {
            *slot = self.render_group_set(&access);
        }

        for (name, meta) in &record.columns {
            // Populating through the frozen key set keeps the row's shape
            // equal to the schema; columns unseen in pass 1 are dropped.
            if let Some(slot) = row.get_mut(name) {
                *slot = self.render_value(meta.value.as_ref());
            }
        }

        Ok(row)
    }

    /// Render one raw value. Lists become a brace-delimited array literal,
    /// scalars render as themselves with no quoting (the output sink owns
    /// quoting and escaping), and anything absent renders as the placeholder.
    pub fn render_value(&self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => self.config.null_placeholder.clone(),
            Some(Value::Array(items)) => {
                if items.is_empty() {
                    return self.config.null_placeholder.clone();
                }
                let parts: Vec<String> = items.iter().map(|v| self.render_scalar(v)).collect();
                format!("{{{}}}", parts.join(", "))
            }
            Some(scalar) => self.render_scalar(scalar),
        }
    }

    fn render_scalar(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.trim().to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Null => self.config.null_placeholder.clone(),
            // Nested structures survive as compact JSON text
            other => other.to_string(),
        }
    }

    fn render_group_set(&self, groups: &BTreeSet<String>) -> String {
        if groups.is_empty() {
            return self.config.null_placeholder.clone();
        }
        let parts: Vec<&str> = groups.iter().map(String::as_str).collect();
        format!("{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaAccumulator;
    use crate::typemap::TypeMapper;
    use serde_json::json;

    fn build_schema(values: &[serde_json::Value], config: &PipelineConfig) -> TableSchema {
        let mapper = TypeMapper::default();
        let mut acc = SchemaAccumulator::new(&mapper, config);
        for v in values {
            acc.add_record(&Record::from_value(v).unwrap());
        }
        acc.finish()
    }

    #[test]
    fn test_row_key_set_equals_schema_exactly() {
        let config = PipelineConfig::default();
        // schema knows "a" and "b"; the formatted record declares only "a"
        // plus a column "c" the schema pass never saw
        let schema = build_schema(
            &[json!({
                "_dn": ["standard"],
                "__columns": ["a", "b"],
                "_a_read_access": [], "_b_read_access": []
            })],
            &config,
        );

        let record = Record::from_value(&json!({
            "_dn": ["standard"],
            "__columns": ["a", "c"],
            "a": "one",
            "c": "dropped",
            "_a_read_access": ["G1"],
            "_c_read_access": ["G1"]
        }))
        .unwrap();

        let row = RecordFormatter::new(&schema, &config).format(&record).unwrap();

        let keys: Vec<&String> = row.keys().collect();
        assert_eq!(keys, ["a", "b", "read_access"]);
        assert_eq!(row["a"], "one");
        assert_eq!(row["b"], "NULL");
        assert_eq!(row["read_access"], "{G1}");
    }

    #[test]
    fn test_linkage_column_carries_identity() {
        let config = PipelineConfig::default();
        let schema = build_schema(
            &[json!({"_dn": ["standard", "net"], "__columns": ["ip"], "_ip_read_access": []})],
            &config,
        );

        let record = Record::from_value(&json!({
            "_dn": ["standard", "net"],
            "__columns": ["ip"],
            "ip": "10.0.0.1",
            "_ip_read_access": ["net"],
            "common_id": "id1"
        }))
        .unwrap();

        let row = RecordFormatter::new(&schema, &config).format(&record).unwrap();
        assert_eq!(row["device_id"], "id1");
    }

    #[test]
    fn test_root_rows_have_no_linkage() {
        let config = PipelineConfig::default();
        let schema = build_schema(
            &[json!({"_dn": ["standard"], "__columns": ["id"], "_id_read_access": []})],
            &config,
        );

        let record = Record::from_value(&json!({
            "_dn": ["standard"],
            "__columns": ["id"],
            "id": "id1",
            "_id_read_access": ["ops"]
        }))
        .unwrap();

        let row = RecordFormatter::new(&schema, &config).format(&record).unwrap();
        assert!(!row.contains_key("device_id"));
    }

    #[test]
    fn test_unknown_table_is_fatal() {
        let config = PipelineConfig::default();
        let schema = TableSchema::default();

        let record = Record::from_value(&json!({
            "_dn": ["standard", "never_seen"],
            "__columns": []
        }))
        .unwrap();

        let err = RecordFormatter::new(&schema, &config).format(&record).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownTable(t) if t == "standard.never_seen"));
    }

    #[test]
    fn test_value_rendering() {
        let config = PipelineConfig::default();
        let schema = TableSchema::default();
        let fmt = RecordFormatter::new(&schema, &config);

        assert_eq!(fmt.render_value(Some(&json!(["x", "y"]))), "{x, y}");
        assert_eq!(fmt.render_value(Some(&json!([]))), "NULL");
        assert_eq!(fmt.render_value(Some(&json!("  padded  "))), "padded");
        assert_eq!(fmt.render_value(Some(&json!(42))), "42");
        assert_eq!(fmt.render_value(Some(&json!(true))), "true");
        assert_eq!(fmt.render_value(Some(&Value::Null)), "NULL");
        assert_eq!(fmt.render_value(None), "NULL");
    }
}
