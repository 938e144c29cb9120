//! Command-line argument structures and enums

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Manage a site's JSON page content and media directory", long_about = None)]
pub struct Cli {
    /// Site root directory
    #[arg(short, long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Config file (default: <root>/folio.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create folio.toml, an empty content document and the media directory
    Init {
        /// Overwrite an existing folio.toml with defaults
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Config,

    /// Print the content document
    Show {
        /// Print stored base names instead of servable image URLs
        #[arg(long)]
        raw: bool,

        /// Only print this page
        #[arg(short, long)]
        page: Option<String>,
    },

    /// Update one section: text fields, image uploads and image clears
    #[command(alias = "u")]
    Update {
        /// Page key (e.g. "home")
        page: String,

        /// Section key (e.g. "hero")
        section: String,

        /// Set a text field: --set title="Hello"
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// Upload an image into an image field: --image heroImage=./photo.jpg
        #[arg(short, long = "image", value_name = "FIELD=PATH")]
        image: Vec<String>,

        /// Clear an image field
        #[arg(long = "clear", value_name = "FIELD")]
        clear: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Audit the media directory against the content document
    Check {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Media directory commands
    #[command(alias = "m")]
    Media {
        #[command(subcommand)]
        command: MediaCommands,
    },
}

#[derive(Subcommand, Clone)]
pub enum MediaCommands {
    /// List files in the media directory
    #[command(alias = "ls")]
    List,

    /// Show which file a base name resolves to
    Resolve {
        /// Base name as stored in the content document
        base_name: String,
    },
}
