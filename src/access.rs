use crate::error::{PipelineError, Result};
use crate::record::Record;
use std::collections::BTreeSet;

/// Compute the row-level read-access set for a record: the intersection of the
/// per-column permission sets. A group may read the row only if it may read
/// every declared column.
///
/// A record with no declared columns resolves to the empty set ("no declared
/// readers", not "public"). A declared column with no read-access metadata at
/// all is a hard error: row-level security cannot be defaulted.
pub fn resolve_access(record: &Record) -> Result<BTreeSet<String>> {
    let mut resolved: Option<BTreeSet<String>> = None;

    for (name, meta) in &record.columns {
        let groups = meta.read_access.as_ref().ok_or_else(|| {
            PipelineError::MissingAccessMetadata {
                table: record.path.join("."),
                column: name.clone(),
            }
        })?;
        let groups: BTreeSet<String> = groups.iter().cloned().collect();

        resolved = Some(match resolved {
            None => groups,
            Some(acc) => acc.intersection(&groups).cloned().collect(),
        });
    }

    Ok(resolved.unwrap_or_default())
}
