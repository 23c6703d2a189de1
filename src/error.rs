use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Fatal conditions that abort the whole run. The two-pass protocol assumes a
/// consistent schema snapshot, so there is no per-record recovery: skipping a
/// record would leave the schema and data artifacts out of sync.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A declared column carries no read-access metadata. Defaulting here
    /// would silently widen row-level access, so this is a hard error.
    #[error("column '{column}' in table '{table}' lacks read-access metadata")]
    MissingAccessMetadata { table: String, column: String },

    /// A record in the data pass named a table the schema pass never saw.
    /// Unreachable when both passes read the same source; checked anyway.
    #[error("table '{0}' is not present in the frozen schema")]
    UnknownTable(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}
