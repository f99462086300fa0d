//! Command-line arguments

use clap::{Parser, Subcommand};
use galactic_fs::Backend;
use std::path::PathBuf;

/// galactic - browse and edit a GalacticFS ledger
#[derive(Parser, Debug)]
#[command(name = "galactic", version, about = "Browse and edit a GalacticFS ledger")]
pub struct Cli {
    /// Configuration file (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the configured ledger backend (memory, sqlite, rocksdb)
    #[arg(long, global = true, value_name = "BACKEND")]
    pub backend: Option<Backend>,

    /// Override the configured ledger name
    #[arg(long, global = true, value_name = "NAME")]
    pub name: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a file's content
    Cat { path: String },

    /// List a folder or the matches of a glob
    Ls {
        #[arg(default_value = "/")]
        path: String,

        /// Only show entries this many segments below the folder
        #[arg(short, long)]
        depth: Option<usize>,

        /// Print as an indented tree
        #[arg(short, long)]
        tree: bool,
    },

    /// Write a file from an argument or stdin
    Write {
        path: String,

        /// Content; read from stdin when omitted
        content: Option<String>,

        /// Append to the existing content
        #[arg(short, long)]
        append: bool,

        /// Fail if the file already exists
        #[arg(long)]
        no_overwrite: bool,
    },

    /// Create a folder
    Mkdir { path: String },

    /// Copy a file or folder
    Cp {
        from: String,
        to: String,

        #[arg(long)]
        no_overwrite: bool,
    },

    /// Move a file or folder
    Mv {
        from: String,
        to: String,

        #[arg(long)]
        no_overwrite: bool,
    },

    /// Delete a file or folder
    Rm { path: String },

    /// Show storage usage
    Info,

    /// Print changes to matching paths until interrupted
    Watch {
        #[arg(default_value = "*")]
        pattern: String,
    },
}
