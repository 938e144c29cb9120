//! `check` and `media` commands

use folio_core::audit::{AuditError, AuditReport, AuditWarning};

use crate::cli::CliSite;
use crate::cli::args::MediaCommands;

/// Audit the site and print the findings.
/// Fails (exit code 1) when image fields point at missing files.
pub fn handle_check(site: &CliSite, json: bool) -> bool {
    let report = match site.audit() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("✗ {}", e);
            return false;
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("✗ Could not serialize report: {}", e);
                return false;
            }
        }
    } else {
        print_report(&report);
    }
    report.is_ok()
}

fn print_report(report: &AuditReport) {
    println!("Checked {} media file(s)", report.files_checked);
    if !report.has_issues() {
        println!("✓ No issues found");
        return;
    }

    for error in &report.errors {
        match error {
            AuditError::MissingImage { field, base_name } => {
                println!("✗ {}: no media file for '{}'", field, base_name);
            }
        }
    }
    for warning in &report.warnings {
        match warning {
            AuditWarning::DuplicateBaseName { base_name, files } => {
                println!(
                    "⚠ Base name '{}' corresponds to files: {}",
                    base_name,
                    files.join(", ")
                );
            }
            AuditWarning::ShadowFile { file } => {
                println!("⚠ Superseded file awaiting cleanup: {}", file);
            }
        }
    }
}

/// Handle `folio media ...`
pub fn handle_media_command(site: &CliSite, command: MediaCommands) -> bool {
    let media = site.media_store();
    match command {
        MediaCommands::List => match media.list() {
            Ok(files) => {
                for file in files {
                    println!("{}", file);
                }
                true
            }
            Err(e) => {
                eprintln!("✗ Could not list {}: {}", media.dir().display(), e);
                false
            }
        },
        MediaCommands::Resolve { base_name } => match media.find_actual_file(&base_name) {
            Some(file) => {
                println!("{}/{}", site.config().url_prefix(), file);
                true
            }
            None => {
                eprintln!("✗ No media file for '{}'", base_name);
                false
            }
        },
    }
}
