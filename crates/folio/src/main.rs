//! `folio` - edit a site's page content and media from the terminal.

/// CLI module - command-line interface for folio
mod cli;

fn main() {
    cli::run_cli();
}
