use crate::error::Result;
use std::collections::HashMap;
use std::path::Path;

/// Storage type used when no mapping entry matches
pub const FALLBACK_TYPE: &str = "TEXT";

/// Base type assumed when a record declares none for a column
const DEFAULT_BASE_TYPE: &str = "string";

/// Resolves a (base type, semantic type) pair to a target storage type.
///
/// The mapping table is loaded once and immutable for the process lifetime.
/// Construct one instance and pass it by reference to whatever needs
/// resolution - there is deliberately no global.
///
/// Unknown type names are not an error: malformed or evolving input must not
/// halt ingestion, so anything unmapped degrades to [`FALLBACK_TYPE`].
#[derive(Debug, Clone)]
pub struct TypeMapper {
    map: HashMap<String, String>,
}

impl TypeMapper {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        TypeMapper {
            map: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load the mapping from a two-column CSV resource
    /// (source type name, storage type name), no header row.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut map = HashMap::new();
        for row in reader.records() {
            let row = row?;
            if let (Some(source), Some(storage)) = (row.get(0), row.get(1)) {
                map.insert(source.to_string(), storage.to_string());
            }
        }
        Ok(TypeMapper { map })
    }

    /// Resolve a storage type: the semantic override wins when it is mapped,
    /// then the base type, then the fallback.
    pub fn resolve(&self, base_type: Option<&str>, semantic_type: Option<&str>) -> &str {
        if let Some(semantic) = semantic_type {
            if let Some(storage) = self.map.get(semantic) {
                return storage;
            }
        }
        let base = base_type.unwrap_or(DEFAULT_BASE_TYPE);
        self.map.get(base).map(String::as_str).unwrap_or(FALLBACK_TYPE)
    }
}

impl Default for TypeMapper {
    fn default() -> Self {
        TypeMapper::from_pairs([
            ("integer", "INTEGER"),
            ("uuid", "UUID"),
            ("port", "INTEGER"),
            ("ipv4", "CIDR"),
            ("inserted", "TIMESTAMP"),
            ("updated", "TIMESTAMP"),
        ])
    }
}
