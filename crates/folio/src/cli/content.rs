//! `show` and `update` commands

use std::path::Path;

use folio_core::fs::{FileSystem, RealFileSystem};
use folio_core::media::ImageType;
use folio_core::media::naming::split_extension;
use folio_core::update::{SectionUpdate, UploadedImage};

use crate::cli::CliSite;

/// Print the document (or one page) as pretty JSON
pub fn handle_show(site: &CliSite, raw: bool, page: Option<&str>) -> bool {
    let document = if raw {
        site.admin_content()
    } else {
        site.renderable_content()
    };
    let document = match document {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("✗ {}", e);
            return false;
        }
    };

    let output = match page {
        Some(key) => match document.page(key) {
            Some(page) => serde_json::to_string_pretty(page),
            None => {
                eprintln!("✗ Page '{}' not found", key);
                return false;
            }
        },
        None => serde_json::to_string_pretty(&document),
    };

    match output {
        Ok(json) => {
            println!("{}", json);
            true
        }
        Err(e) => {
            eprintln!("✗ Could not serialize content: {}", e);
            false
        }
    }
}

/// Apply a section update built from command-line flags
pub fn handle_update(
    site: &CliSite,
    page: String,
    section: String,
    set: &[String],
    images: &[String],
    clear: &[String],
    json: bool,
) -> bool {
    let update = match build_update(&RealFileSystem, page, section, set, images, clear) {
        Ok(update) => update,
        Err(message) => {
            eprintln!("✗ {}", message);
            return false;
        }
    };

    let outcome = site.update_section_outcome(&update);
    if json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("✗ Could not serialize result: {}", e),
        }
    } else if outcome.success {
        println!("✓ {}", outcome.message);
        if let Some(fields) = &outcome.updated_section {
            for (key, value) in fields {
                println!("  {}: {}", key, value);
            }
        }
    } else {
        eprintln!("✗ {}", outcome.message);
    }
    outcome.success
}

/// Split `key=value`. The value may itself contain `=`.
fn parse_assignment(arg: &str) -> Result<(&str, &str), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(format!("Expected FIELD=VALUE, got '{}'", arg)),
    }
}

fn build_update<FS: FileSystem>(
    fs: &FS,
    page: String,
    section: String,
    set: &[String],
    images: &[String],
    clear: &[String],
) -> Result<SectionUpdate, String> {
    let mut update = SectionUpdate::new(page, section);

    for arg in set {
        let (key, value) = parse_assignment(arg)?;
        update = update.with_field(key, value);
    }

    for key in clear {
        update = update.with_cleared_image(key.as_str());
    }

    for arg in images {
        let (key, path) = parse_assignment(arg)?;
        let path = Path::new(path);
        let bytes = fs
            .read_binary(path)
            .map_err(|e| format!("Could not read {}: {}", path.display(), e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Declared type comes from the extension; unknown ones are rejected by validation.
        let media_type = split_extension(&file_name)
            .1
            .and_then(ImageType::from_extension)
            .map(|t| t.mime())
            .unwrap_or("application/octet-stream");
        update = update.with_upload(UploadedImage::new(key, file_name, media_type, bytes));
    }

    Ok(update)
}
