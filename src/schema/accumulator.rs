//! Streaming schema accumulator
//!
//! Folds every record of pass 1 into a running per-table schema map. No
//! intermediate schemas, no merging: statistics accumulate in place and the
//! frozen schema is built once at the end.

use crate::config::PipelineConfig;
use crate::record::Record;
use crate::schema::{ColumnTypes, TableSchema, ACCESS_TYPE, LINKAGE_TYPE};
use crate::typemap::TypeMapper;
use indexmap::IndexMap;

pub struct SchemaAccumulator<'a> {
    mapper: &'a TypeMapper,
    config: &'a PipelineConfig,
    tables: IndexMap<String, ColumnTypes>,
    records_seen: usize,
}

impl<'a> SchemaAccumulator<'a> {
    pub fn new(mapper: &'a TypeMapper, config: &'a PipelineConfig) -> Self {
        SchemaAccumulator {
            mapper,
            config,
            tables: IndexMap::new(),
            records_seen: 0,
        }
    }

    /// Fold one record into the running schema.
    ///
    /// A new table starts empty (root) or pre-seeded with the linkage column
    /// (everything else). Each declared column is resolved and inserted;
    /// when two records disagree on a column's type the later record wins,
    /// silently, and column order stays at first insertion. The synthetic
    /// access column is ensured after every record.
    pub fn add_record(&mut self, record: &Record) {
        self.records_seen += 1;

        let config = self.config;
        let mapper = self.mapper;

        let table_id = record.table_id(&config.separator);
        let is_root = table_id == config.root_table;

        let columns = self.tables.entry(table_id).or_insert_with(|| {
            let mut columns = ColumnTypes::new();
            if !is_root {
                columns.insert(config.linkage_column.clone(), LINKAGE_TYPE.to_string());
            }
            columns
        });

        for (name, meta) in &record.columns {
            let storage = mapper.resolve(meta.base_type.as_deref(), meta.semantic_type.as_deref());
            columns.insert(name.clone(), storage.to_string());
        }

        columns
            .entry(config.access_column.clone())
            .or_insert_with(|| ACCESS_TYPE.to_string());
    }

    pub fn records_seen(&self) -> usize {
        self.records_seen
    }

    /// Freeze the accumulated schema
    pub fn finish(self) -> TableSchema {
        TableSchema::from_tables(self.tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(&value).unwrap()
    }

    fn accumulate(records: &[Record]) -> TableSchema {
        let mapper = TypeMapper::default();
        let config = PipelineConfig::default();
        let mut acc = SchemaAccumulator::new(&mapper, &config);
        for r in records {
            acc.add_record(r);
        }
        acc.finish()
    }

    #[test]
    fn test_root_table_gets_no_linkage_column() {
        let schema = accumulate(&[record(json!({
            "_dn": ["standard"],
            "__columns": ["id", "name"],
            "_id_type": "uuid"
        }))]);

        let standard = schema.table("standard").unwrap();
        assert!(!standard.contains_key("device_id"));
        assert_eq!(standard["id"], "UUID");
        assert_eq!(standard["name"], "TEXT");
        assert_eq!(standard["read_access"], ACCESS_TYPE);
    }

    #[test]
    fn test_non_root_table_is_seeded_with_linkage() {
        let schema = accumulate(&[record(json!({
            "_dn": ["standard", "net"],
            "__columns": ["ip"],
            "_ip_type": "string",
            "_ip_field_type": "ipv4"
        }))]);

        let net = schema.table("standard.net").unwrap();
        let columns: Vec<&String> = net.keys().collect();
        assert_eq!(columns, ["device_id", "ip", "read_access"]);
        assert_eq!(net["device_id"], LINKAGE_TYPE);
        assert_eq!(net["ip"], "CIDR");
    }

    #[test]
    fn test_column_union_across_records() {
        let schema = accumulate(&[
            record(json!({"_dn": ["standard"], "__columns": ["a"]})),
            record(json!({"_dn": ["standard"], "__columns": ["b"]})),
        ]);

        let standard = schema.table("standard").unwrap();
        let columns: Vec<&String> = standard.keys().collect();
        // access column keeps its first-insertion slot, after "a"
        assert_eq!(columns, ["a", "read_access", "b"]);
    }

    #[test]
    fn test_conflicting_types_last_write_wins() {
        let schema = accumulate(&[
            record(json!({"_dn": ["standard"], "__columns": ["x"], "_x_type": "integer"})),
            record(json!({"_dn": ["standard"], "__columns": ["x"], "_x_type": "uuid"})),
        ]);

        assert_eq!(schema.table("standard").unwrap()["x"], "UUID");
    }

    #[test]
    fn test_tables_kept_in_discovery_order() {
        let schema = accumulate(&[
            record(json!({"_dn": ["standard", "net"], "__columns": []})),
            record(json!({"_dn": ["standard"], "__columns": []})),
            record(json!({"_dn": ["standard", "os"], "__columns": []})),
        ]);

        let order: Vec<&String> = schema.iter().map(|(id, _)| id).collect();
        assert_eq!(order, ["standard.net", "standard", "standard.os"]);
    }

    #[test]
    fn test_configurable_root_table() {
        let mapper = TypeMapper::default();
        let config = PipelineConfig {
            root_table: "devices".to_string(),
            ..PipelineConfig::default()
        };
        let mut acc = SchemaAccumulator::new(&mapper, &config);
        acc.add_record(&record(json!({"_dn": ["devices"], "__columns": ["id"]})));
        let schema = acc.finish();

        assert!(!schema.table("devices").unwrap().contains_key("device_id"));
    }
}
