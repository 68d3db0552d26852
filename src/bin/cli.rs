//! rosterdb CLI
//!
//! Command-line interface for driving a rosterdb database.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use rosterdb::record::encode_record;
use rosterdb::{FieldQuery, Result, RosterError, Session, StudentRecord};

/// rosterdb CLI
#[derive(Parser, Debug)]
#[command(name = "rosterdb-cli")]
#[command(about = "Append-log student record store with an offset index")]
#[command(version)]
struct Args {
    /// Path to the database file
    #[arg(short, long)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new (empty) database
    Create,

    /// Add a record
    Add {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        group: String,
        #[arg(long)]
        level: u32,
        #[arg(long)]
        score: f64,
    },

    /// Get a record by id
    Get {
        /// The record id to look up
        id: u64,
    },

    /// Replace an existing record's payload
    Update {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        group: String,
        #[arg(long)]
        level: u32,
        #[arg(long)]
        score: f64,
    },

    /// Delete a record by id
    Remove {
        /// The record id to delete
        id: u64,
    },

    /// Find records by a single field
    Find {
        /// The field to match
        #[arg(value_enum)]
        field: FindField,

        /// The value to match (parsed per field)
        value: String,
    },

    /// List every record
    List,

    /// Empty the database, keeping the file
    Clear,

    /// Copy the database pair to its backup location
    Backup,

    /// Restore the database pair from a backup file
    Restore {
        /// Path to the backup data file
        from: PathBuf,
    },

    /// Delete the database files
    Wipe,
}

/// Searchable fields
#[derive(ValueEnum, Clone, Copy, Debug)]
enum FindField {
    Id,
    Name,
    Group,
    Level,
    Score,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,rosterdb=info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut session = Session::with_defaults();

    // `create` binds a fresh file; everything else opens an existing one
    match args.command {
        Commands::Create => {
            session.create(&args.db)?;
            println!("created {}", args.db.display());
            return Ok(());
        }
        _ => session.open(&args.db)?,
    }

    match args.command {
        Commands::Create => {} // handled above

        Commands::Add {
            id,
            name,
            group,
            level,
            score,
        } => {
            session.add(StudentRecord::new(id, name, group, level, score))?;
            println!("added record {}", id);
        }

        Commands::Get { id } => match session.get(id)? {
            Some(rec) => println!("{}", encode_record(&rec)?),
            None => println!("no record with id {}", id),
        },

        Commands::Update {
            id,
            name,
            group,
            level,
            score,
        } => {
            session.update(id, StudentRecord::new(id, name, group, level, score))?;
            println!("updated record {}", id);
        }

        Commands::Remove { id } => {
            session.remove(id)?;
            println!("removed record {}", id);
        }

        Commands::Find { field, value } => {
            let query = parse_query(field, &value)?;
            let results = session.find(&query)?;
            for rec in &results {
                println!("{}", encode_record(rec)?);
            }
            println!("{} record(s) matched", results.len());
        }

        Commands::List => {
            let records = session.all()?;
            for rec in &records {
                println!("{}", encode_record(rec)?);
            }
            println!("{} record(s)", records.len());
        }

        Commands::Clear => {
            session.clear()?;
            println!("cleared {}", args.db.display());
        }

        Commands::Backup => {
            let backup_path = session.backup()?;
            println!("backup written to {}", backup_path.display());
        }

        Commands::Restore { from } => {
            session.restore(&from)?;
            println!("restored from {}", from.display());
        }

        Commands::Wipe => {
            session.delete()?;
            println!("deleted {}", args.db.display());
        }
    }

    Ok(())
}

/// Parse a raw CLI value into a typed field query
fn parse_query(field: FindField, value: &str) -> Result<FieldQuery> {
    match field {
        FindField::Id => value
            .parse()
            .map(FieldQuery::Id)
            .map_err(|_| RosterError::Validation(format!("id must be an integer: {}", value))),
        FindField::Name => Ok(FieldQuery::Name(value.to_string())),
        FindField::Group => Ok(FieldQuery::Group(value.to_string())),
        FindField::Level => value
            .parse()
            .map(FieldQuery::Level)
            .map_err(|_| RosterError::Validation(format!("level must be an integer: {}", value))),
        FindField::Score => value
            .parse()
            .map(FieldQuery::Score)
            .map_err(|_| RosterError::Validation(format!("score must be a number: {}", value))),
    }
}
