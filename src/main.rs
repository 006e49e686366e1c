use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use partsxref::config::{get_partsxref_dir, load_config, save_config, XrefConfig};
use partsxref::db::Database;
use partsxref::engine::XrefEngine;
use partsxref::errors::{Result, XrefError};
use partsxref::store::SqliteRecordStore;
use partsxref::types::PartRecord;
use tracing_subscriber::EnvFilter;

/// Part number cross-reference lookup.
#[derive(Parser)]
#[command(name = "partsxref", about = "Part number cross-reference lookup")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config file and an empty database
    Init {
        /// Project path (default: current directory)
        path: Option<String>,
    },
    /// Append records from a JSON array file
    Import {
        /// JSON file containing an array of part records
        file: PathBuf,
        /// Project path
        #[arg(short, long)]
        path: Option<String>,
        /// Delete existing records first
        #[arg(long)]
        replace: bool,
    },
    /// Search for a part or reference number
    Search {
        /// Part or reference number
        query: String,
        /// Project path
        #[arg(short, long)]
        path: Option<String>,
        /// Rank exact, partial and similar identifiers
        #[arg(short, long)]
        fuzzy: bool,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// List every identifier linked to the given one
    Family {
        /// Part or reference number
        query: String,
        /// Project path
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Look a number up directly in the database, without building the graph
    Lookup {
        /// Part or reference number
        query: String,
        /// Project path
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Show record and graph statistics
    Status {
        /// Project path
        #[arg(short, long)]
        path: Option<String>,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Start the HTTP server
    Serve {
        /// Project path
        #[arg(short, long)]
        path: Option<String>,
        /// Listen address (overrides config and PORT)
        #[arg(short, long)]
        addr: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { path } => {
            let project_path = resolve_path(path);
            // Persist the file values only; overrides stay in the environment.
            save_config(&project_path, &load_config(&project_path)?)?;
            let config = load_project_config(&project_path)?;
            Database::initialize(&config.database_path(&project_path))?;
            println!(
                "Initialized partsxref at {}",
                get_partsxref_dir(&project_path).display()
            );
        }
        Commands::Import {
            file,
            path,
            replace,
        } => {
            let project_path = resolve_path(path);
            let config = load_project_config(&project_path)?;
            let contents = std::fs::read_to_string(&file)?;
            let records: Vec<PartRecord> = serde_json::from_str(&contents)?;
            let db = Database::initialize(&config.database_path(&project_path))?;
            if replace {
                db.clear()?;
            }
            let inserted = db.insert_records(&records)?;
            println!(
                "Imported {} records ({} total)",
                inserted,
                db.count_records()?
            );
        }
        Commands::Search {
            query,
            path,
            fuzzy,
            json,
        } => {
            let engine = open_engine(&resolve_path(path))?;
            engine.refresh()?;
            let response = engine.search(&query, fuzzy)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else if response.results.is_empty() {
                println!("No results found for '{}'", query);
            } else {
                println!("{} result(s)", response.count);
                for record in &response.results {
                    print_record(record);
                }
            }
        }
        Commands::Family { query, path } => {
            let engine = open_engine(&resolve_path(path))?;
            engine.refresh()?;
            let family = engine.family(&query)?;
            if family.is_empty() {
                println!("Unknown identifier '{}'", query);
            } else {
                for id in family.sorted() {
                    println!("{}", id);
                }
                if family.is_truncated() {
                    println!("(stopped after {} identifiers)", family.len());
                }
            }
        }
        Commands::Lookup { query, path } => {
            let engine = open_engine(&resolve_path(path))?;
            let records = engine.lookup(&query)?;
            if records.is_empty() {
                println!("No records for '{}'", query);
            }
            for record in &records {
                print_record(record);
            }
        }
        Commands::Status { path, json } => {
            let project_path = resolve_path(path);
            let engine = open_engine(&project_path)?;
            engine.refresh()?;
            let db_path = engine.config().database_path(&project_path);
            let mut stats = engine.stats();
            stats.db_size_bytes = Some(Database::open(&db_path)?.size()?);
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("partsxref status");
                println!("  Records:     {}", stats.record_count);
                println!("  Identifiers: {}", stats.identifier_count);
                println!("  Links:       {}", stats.edge_count);
                println!("  DB Size:     {} bytes", stats.db_size_bytes.unwrap_or(0));
                println!("  Fingerprint: {}", stats.fingerprint);
            }
        }
        Commands::Serve { path, addr } => {
            let project_path = resolve_path(path);
            let mut config = load_project_config(&project_path)?;
            if let Some(addr) = addr {
                config.listen_addr = addr;
            }
            let socket = config.socket_addr()?;
            let store = SqliteRecordStore::open(&config.database_path(&project_path));
            let engine = Arc::new(XrefEngine::from_store(store, config));
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(partsxref::server::serve(engine, socket))?;
        }
    }
    Ok(())
}

/// Loads the project's config file and applies environment overrides.
fn load_project_config(project_path: &Path) -> Result<XrefConfig> {
    let mut config = load_config(project_path)?;
    config.apply_env()?;
    Ok(config)
}

fn open_engine(project_path: &Path) -> Result<XrefEngine> {
    let config = load_project_config(project_path)?;
    let db_path = config.database_path(project_path);
    if !db_path.exists() {
        return Err(XrefError::Config {
            message: format!(
                "no database found at '{}'; run 'partsxref init' first",
                db_path.display()
            ),
        });
    }
    Ok(XrefEngine::from_store(SqliteRecordStore::open(&db_path), config))
}

fn print_record(record: &PartRecord) {
    let field = |value: &Option<String>| value.as_deref().unwrap_or("-").to_string();
    println!(
        "{} | {} | {} | {} | {}",
        field(&record.reference_number),
        field(&record.part_number),
        field(&record.make),
        field(&record.company),
        field(&record.description)
    );
}

/// Resolves an optional path argument to a `PathBuf`.
///
/// Defaults to the current working directory if no path is provided.
fn resolve_path(path: Option<String>) -> PathBuf {
    match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
