//! slotfile CLI
//!
//! Command-line interface over a record file of notes.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use slotfile::record::{decode_with_id, encode_with_id};
use slotfile::{Config, Record, RecordId, RecordStore};
use tracing_subscriber::{fmt, EnvFilter};

/// slotfile CLI
#[derive(Parser, Debug)]
#[command(name = "slotfile-cli")]
#[command(about = "CLI for the slotfile record store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./dados")]
    data_dir: String,

    /// Data file name inside the data directory
    #[arg(short, long, default_value = "notes.db")]
    file: String,

    /// fsync after every write
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert a new note
    Insert {
        title: String,
        body: String,
    },

    /// List all notes in file order
    List,

    /// Show one note
    Get {
        id: RecordId,
    },

    /// Delete a note
    Delete {
        id: RecordId,
    },

    /// Replace a note's title and body
    Update {
        id: RecordId,
        title: String,
        body: String,
    },

    /// Print the file offset of a note's slot
    Locate {
        id: RecordId,
    },

    /// Show slot and space accounting
    Stats,

    /// Drop deleted slots and garbage
    Compact,
}

/// Demo record type
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Note {
    #[serde(skip)]
    id: RecordId,
    title: String,
    body: String,
}

impl Record for Note {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn encode(&self) -> slotfile::Result<Vec<u8>> {
        encode_with_id(self.id, self)
    }

    fn decode(&mut self, bytes: &[u8]) -> slotfile::Result<()> {
        let (id, note): (RecordId, Note) = decode_with_id(bytes)?;
        *self = Note { id, ..note };
        Ok(())
    }
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slotfile=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .file_name(&args.file)
        .sync_writes(args.sync)
        .build();

    match run(config, args.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Execute one command; `Ok(false)` means the target note was not found
fn run(config: Config, command: Commands) -> slotfile::Result<bool> {
    let mut store: RecordStore<Note> = RecordStore::open(config)?;

    let found = match command {
        Commands::Insert { title, body } => {
            let mut note = Note {
                id: 0,
                title,
                body,
            };
            let id = store.insert(&mut note)?;
            println!("{}", id);
            true
        }
        Commands::List => {
            for note in store.list()? {
                println!("{}\t{}\t{}", note.id, note.title, note.body);
            }
            true
        }
        Commands::Get { id } => match store.find(id)? {
            Some(note) => {
                println!("{}\t{}\t{}", note.id, note.title, note.body);
                true
            }
            None => not_found(id),
        },
        Commands::Delete { id } => store.delete(id)? || not_found(id),
        Commands::Update { id, title, body } => {
            let note = Note { id, title, body };
            store.update(&note)? || not_found(id)
        }
        Commands::Locate { id } => match store.locate(id)? {
            Some(address) => {
                println!("{}", address);
                true
            }
            None => not_found(id),
        },
        Commands::Stats => {
            let stats = store.stats()?;
            println!("active slots:     {}", stats.active);
            println!("deleted slots:    {}", stats.deleted);
            println!("payload bytes:    {}", stats.payload_bytes);
            println!("garbage bytes:    {}", stats.garbage_bytes);
            println!("dead slot bytes:  {}", stats.dead_bytes);
            println!("file length:      {}", stats.file_len);
            true
        }
        Commands::Compact => {
            let reclaimed = store.compact()?;
            println!("reclaimed {} bytes", reclaimed);
            true
        }
    };

    store.close()?;
    Ok(found)
}

fn not_found(id: RecordId) -> bool {
    eprintln!("note {} not found", id);
    false
}
