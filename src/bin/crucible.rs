//! crucible: infer a relational schema from node records and emit DDL + CSV
//!
//! Usage:
//!   # Single batch file (plain or gzipped)
//!   crucible records.jsonl.gz -o ./out
//!
//!   # Directory of UUID-named batch files
//!   crucible /data/standalone/node -o ./out
//!
//!   # Custom type map and root table
//!   crucible records.jsonl --type-map types.csv --root-table devices
//!
//!   # Schema pass only, no CSV artifacts
//!   crucible records.jsonl --schema-only

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use crucible::schema::emit_ddl;
use crucible::{Pipeline, PipelineConfig, RecordStream, TypeMapper};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "crucible")]
#[command(about = "Infer a relational schema from node records and emit DDL + CSV", long_about = None)]
struct Args {
    /// Input batch file or directory of UUID-named batch files (.gz supported)
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Directory for per-table CSV files
    #[arg(long, short = 'o', default_value = ".")]
    output_dir: PathBuf,

    /// Path for the DDL artifact (default: <output-dir>/init.sql)
    #[arg(long)]
    schema_out: Option<PathBuf>,

    /// Two-column CSV (source type, storage type) overriding the built-in type map
    #[arg(long)]
    type_map: Option<PathBuf>,

    /// Root table identifier: anchors foreign keys and gets no linkage column
    #[arg(long, default_value = "standard")]
    root_table: String,

    /// Run the schema pass and write DDL only; skip the data pass
    #[arg(long)]
    schema_only: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mapper = match &args.type_map {
        Some(path) => TypeMapper::from_csv_path(path)
            .with_context(|| format!("failed to load type map from {}", path.display()))?,
        None => TypeMapper::default(),
    };

    let config = PipelineConfig {
        root_table: args.root_table,
        ..PipelineConfig::default()
    };

    let schema_path = args
        .schema_out
        .unwrap_or_else(|| args.output_dir.join("init.sql"));

    let stream = RecordStream::new(&args.source);
    let pipeline = Pipeline::new(&config, &mapper);

    if args.schema_only {
        let (schema, records) = pipeline
            .infer_schema(&stream)
            .context("schema pass failed")?;
        if schema.is_empty() {
            eprintln!("Warning: no records found in input");
        }
        std::fs::create_dir_all(&args.output_dir)?;
        std::fs::write(&schema_path, emit_ddl(&schema, &config))
            .with_context(|| format!("failed to write {}", schema_path.display()))?;
        println!(
            "{} tables from {} records -> {}",
            schema.len(),
            records,
            schema_path.display()
        );
    } else {
        let report = pipeline
            .run(&stream, &args.output_dir, &schema_path)
            .context("pipeline failed")?;
        if report.tables == 0 {
            eprintln!("Warning: no records found in input");
        }
        println!(
            "{} tables, {} rows -> {} (schema: {})",
            report.tables,
            report.rows_written,
            args.output_dir.display(),
            schema_path.display()
        );
    }

    Ok(())
}
