use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Source directory of game archives. Falls back to the `DATA` env var.
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Export destination directory for extracted banks.
    #[arg(long, global = true)]
    pub dest: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the archive header pass over the data directory and replace the archive table.
    InsertArchive {
        #[arg(long)]
        insert_deadline: Option<u64>,
    },
    /// Run the full pipeline and replace every managed table.
    Generate {
        #[arg(long)]
        generate_deadline: Option<u64>,
    },
    /// Export every soundbank found across the data directory.
    ExtractAllSoundbank {
        #[arg(long)]
        extract_deadline: Option<u64>,
    },
    /// Export a soundbank chosen from an interactive list.
    ExtractSoundbank {
        #[arg(long)]
        extract_deadline: Option<u64>,
    },
}
