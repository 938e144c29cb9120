//! `folio init`: scaffold a site root.

use std::path::Path;

use folio_core::config::{CONFIG_FILE_NAME, Config};
use folio_core::fs::{FileSystem, RealFileSystem};

/// Handle the init command
/// Returns true on success, false on error
pub fn handle_init(root: &Path, config_path: Option<&Path>, force: bool) -> bool {
    match init_site(&RealFileSystem, root, config_path, force) {
        Ok(created) => {
            println!("✓ Initialized folio site at {}", root.display());
            for path in created {
                println!("  Created {}", path);
            }
            true
        }
        Err(e) => {
            eprintln!("✗ Error initializing site: {}", e);
            false
        }
    }
}

/// Create whatever is missing: config file, content document, media directory.
/// Returns the paths created.
fn init_site<FS: FileSystem>(
    fs: &FS,
    root: &Path,
    config_path: Option<&Path>,
    force: bool,
) -> folio_core::error::Result<Vec<String>> {
    let mut created = Vec::new();
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(CONFIG_FILE_NAME));

    let config = if force || !fs.exists(&config_path) {
        let config = Config::default();
        config.save_to(fs, &config_path)?;
        created.push(config_path.display().to_string());
        config
    } else {
        Config::load_from(fs, &config_path)?
    };

    let content_file = config.content_file_in(root);
    if !fs.exists(&content_file) {
        if let Some(parent) = content_file.parent() {
            fs.create_dir_all(parent)?;
        }
        fs.write_file(&content_file, "{}\n")?;
        created.push(content_file.display().to_string());
    }

    let media_dir = config.media_dir_in(root);
    if !fs.is_dir(&media_dir) {
        fs.create_dir_all(&media_dir)?;
        created.push(media_dir.display().to_string());
    }

    Ok(created)
}
