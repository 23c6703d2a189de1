/// Configuration for the two-pass pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The root table identifier. The root table anchors every other table:
    /// it gets no linkage column, and its identity column is the target of
    /// every foreign key.
    pub root_table: String,

    /// Separator joining path segments into a table identifier
    pub separator: String,

    /// Synthetic column on non-root tables referencing the root identity
    pub linkage_column: String,

    /// Synthetic column holding the row's computed set of reader groups
    pub access_column: String,

    /// Column on the root table marked as its primary key
    pub identity_column: String,

    /// Rendered representation of "value absent"
    pub null_placeholder: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            root_table: String::from("standard"),
            separator: String::from("."),
            linkage_column: String::from("device_id"),
            access_column: String::from("read_access"),
            identity_column: String::from("id"),
            null_placeholder: String::from("NULL"),
        }
    }
}
