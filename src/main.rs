use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use rust_schemascript::script::{write_routine_script, write_table};
use rust_schemascript::{
    generate_script, parse_catalog, write_output, CatalogDumps, CatalogQuery, GeneratedScript,
    InvalidTablePolicy, RoutineKind, ScriptOptions,
};

#[derive(Parser)]
#[command(name = "rust-schemascript")]
#[command(author, version, about = "Rebuild a SQL Server schema script from catalog query output")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the full schema script from a dump directory
    Script {
        /// Directory holding the catalog dumps (columns.txt, ...)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the script (defaults to <input>/schema.sql)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Database to USE at the top of the script
        #[arg(short, long)]
        database: Option<String>,

        /// Server name written to the header
        #[arg(long)]
        server: Option<String>,

        /// Header title
        #[arg(long, default_value = "Database Schema")]
        title: String,

        /// Field delimiter of the dumps
        #[arg(long, default_value = "|")]
        delimiter: char,

        /// Batch separator written after each batch
        #[arg(long, default_value = "GO")]
        batch_separator: String,

        /// Leave out the Generated: header line
        #[arg(long)]
        no_timestamp: bool,

        /// Skip tables that fail validation instead of aborting
        #[arg(long)]
        skip_invalid_tables: bool,
    },

    /// Generate a script holding only the stored procedures
    Procedures {
        #[arg(short, long)]
        input: PathBuf,

        /// Output path (defaults to <input>/stored_procedures.sql)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a script holding only the views
    Views {
        #[arg(short, long)]
        input: PathBuf,

        /// Output path (defaults to <input>/views.sql)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the statements of one table
    Table {
        #[arg(short, long)]
        input: PathBuf,

        /// Table name
        #[arg(short, long)]
        name: String,
    },

    /// Print the catalog queries whose output this tool consumes
    Queries {
        /// Only print one query (columns, primary-keys, foreign-keys, indexes, procedures, views)
        #[arg(short, long)]
        kind: Option<CatalogQuery>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Script {
            input,
            output,
            database,
            server,
            title,
            delimiter,
            batch_separator,
            no_timestamp,
            skip_invalid_tables,
        } => {
            let options = ScriptOptions {
                delimiter,
                batch_separator,
                database,
                server,
                title,
                generated_at: (!no_timestamp).then(|| chrono::Local::now().naive_local()),
                on_invalid_table: if skip_invalid_tables {
                    InvalidTablePolicy::Skip
                } else {
                    InvalidTablePolicy::Abort
                },
            };

            let dumps = CatalogDumps::load(&input)?;
            let script = generate_script(&dumps, &options)?;
            let output_path = output.unwrap_or_else(|| input.join("schema.sql"));
            write_output(&output_path, &script.text)?;

            print_summary(&script, &output_path);
        }
        Commands::Procedures { input, output } => {
            let output = output.unwrap_or_else(|| input.join("stored_procedures.sql"));
            write_routines(&input, &output, RoutineKind::Procedure)?;
        }
        Commands::Views { input, output } => {
            let output = output.unwrap_or_else(|| input.join("views.sql"));
            write_routines(&input, &output, RoutineKind::View)?;
        }
        Commands::Table { input, name } => {
            let dumps = CatalogDumps::load(&input)?;
            let snapshot = parse_catalog(&dumps, &ScriptOptions::default())?;
            let Some(table) = snapshot.table(&name) else {
                bail!("Table not found in catalog dumps: {}", name);
            };
            print!("{}", write_table(table)?.to_sql());
        }
        Commands::Queries { kind } => {
            let queries: Vec<CatalogQuery> = match kind {
                Some(kind) => vec![kind],
                None => CatalogQuery::ALL.to_vec(),
            };
            for query in queries {
                println!("-- {} -> {}", query, query.file_name());
                println!("{}\n", query.sql());
            }
        }
    }

    Ok(())
}

/// Install the stderr subscriber; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn write_routines(input: &Path, output: &Path, kind: RoutineKind) -> Result<()> {
    let options = ScriptOptions::default();
    let dumps = CatalogDumps::load(input)?;
    let snapshot = parse_catalog(&dumps, &options)?;
    let sql = write_routine_script(&snapshot, kind, &options);
    write_output(output, &sql)?;

    println!(
        "Wrote {} {}(s) to {}",
        snapshot.routines(kind).len(),
        kind.label().to_lowercase(),
        output.display()
    );
    Ok(())
}

fn print_summary(script: &GeneratedScript, output: &Path) {
    let summary = &script.summary;
    println!("Schema script written to {}", output.display());
    println!("  Tables:            {}", summary.tables);
    println!("  Stored procedures: {}", summary.procedures);
    println!("  Views:             {}", summary.views);
    println!("  Primary keys:      {}", summary.primary_keys);
    println!("  Foreign keys:      {}", summary.foreign_keys);
    println!("  Indexes:           {}", summary.indexes);

    if !script.skipped_tables.is_empty() {
        println!("Skipped {} table(s):", script.skipped_tables.len());
        for skipped in &script.skipped_tables {
            println!("  {}: {}", skipped.name, skipped.reason);
        }
    }
}
