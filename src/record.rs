use crate::error::{PipelineError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-column attribute bundle recovered from a record's sidecar keys
/// (`_{column}_type`, `_{column}_field_type`, `_{column}_read_access`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Raw value for this column, if the record carried one
    pub value: Option<Value>,

    /// Base type name; resolution falls back to "string" when absent
    pub base_type: Option<String>,

    /// Semantic override type; wins over the base type when mapped
    pub semantic_type: Option<String>,

    /// Permission groups allowed to read this column
    pub read_access: Option<Vec<String>>,
}

/// One self-describing input record - a node observation that declares its own
/// table path and column manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Ordered name segments identifying the record's table
    pub path: Vec<String>,

    /// Declared columns, in manifest order, with their attribute bundles.
    /// This is the authoritative source of which attributes are
    /// schema-relevant; values outside the manifest are ignored.
    pub columns: IndexMap<String, ColumnMeta>,

    /// Stable identifier linking the record to the root table
    pub identity: Option<String>,
}

impl Record {
    pub fn from_value(value: &Value) -> Result<Record> {
        let Value::Object(obj) = value else {
            return Err(PipelineError::MalformedInput(
                "record is not a JSON object".into(),
            ));
        };
        Self::from_object(obj)
    }

    pub fn from_object(obj: &Map<String, Value>) -> Result<Record> {
        let path = match obj.get("_dn") {
            Some(Value::Array(segments)) => segments
                .iter()
                .map(|s| {
                    s.as_str().map(str::to_string).ok_or_else(|| {
                        PipelineError::MalformedInput("_dn segment is not a string".into())
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            _ => {
                return Err(PipelineError::MalformedInput(
                    "record has no _dn path".into(),
                ))
            }
        };
        if path.is_empty() {
            return Err(PipelineError::MalformedInput("record _dn is empty".into()));
        }

        // Absent manifest means "no declared columns", not an error
        let manifest: Vec<&str> = match obj.get("__columns") {
            Some(Value::Array(cols)) => cols.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };

        let mut columns = IndexMap::with_capacity(manifest.len());
        for name in manifest {
            let meta = ColumnMeta {
                value: obj.get(name).cloned(),
                base_type: string_key(obj, &format!("_{name}_type")),
                semantic_type: string_key(obj, &format!("_{name}_field_type")),
                read_access: obj
                    .get(&format!("_{name}_read_access"))
                    .and_then(Value::as_array)
                    .map(|groups| {
                        groups
                            .iter()
                            .filter_map(|g| g.as_str().map(str::to_string))
                            .collect()
                    }),
            };
            columns.insert(sql_column_name(name), meta);
        }

        let identity = obj
            .get("common_id")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Record {
            path,
            columns,
            identity,
        })
    }

    /// The dot-joined (or custom-separator-joined) table identifier.
    /// Segments are preserved as-is, no whitespace or case normalization.
    pub fn table_id(&self, separator: &str) -> String {
        self.path.join(separator)
    }
}

fn string_key(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Hyphenated source names are not valid unquoted SQL identifiers
pub fn sql_column_name(name: &str) -> String {
    name.replace('-', "_")
}
