/// Clap argument definitions
mod args;

/// `check` command and media listing
mod check;

/// Config command handler
mod config;

/// `show` and `update` commands
mod content;

/// `init` command
mod init;

use clap::Parser;
use folio_core::fs::RealFileSystem;
use folio_core::site::Site;

pub use args::Cli;
use args::Commands;

/// Site handle used by every command.
pub type CliSite = Site<RealFileSystem>;

/// Main entry point for the CLI
pub fn run_cli() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let success = if let Commands::Init { force } = cli.command {
        init::handle_init(&cli.root, cli.config.as_deref(), force)
    } else {
        log::debug!("Opening site at {:?}", cli.root);
        match CliSite::open(RealFileSystem, &cli.root, cli.config.as_deref()) {
            Ok(site) => run_command(&site, cli.command),
            Err(e) => {
                eprintln!("✗ Could not open site at {}: {}", cli.root.display(), e);
                false
            }
        }
    };

    if !success {
        std::process::exit(1);
    }
}

/// Execute a command against an opened site.
/// Returns true on success, false on error
fn run_command(site: &CliSite, command: Commands) -> bool {
    match command {
        Commands::Config => config::handle_config(site),
        Commands::Show { raw, page } => content::handle_show(site, raw, page.as_deref()),
        Commands::Update {
            page,
            section,
            set,
            image,
            clear,
            json,
        } => content::handle_update(site, page, section, &set, &image, &clear, json),
        Commands::Check { json } => check::handle_check(site, json),
        Commands::Media { command } => check::handle_media_command(site, command),
        // Needs no site; dispatched in run_cli.
        Commands::Init { .. } => true,
    }
}
