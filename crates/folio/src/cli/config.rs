//! Config command handler

use crate::cli::CliSite;

/// Show the effective configuration with resolved paths
pub fn handle_config(site: &CliSite) -> bool {
    let config = site.config();
    println!("Folio Configuration");
    println!("===================");
    println!("Site root: {}", site.root().display());
    println!(
        "Content file: {}",
        site.content_store().path().display()
    );
    println!("Media directory: {}", site.media_store().dir().display());
    println!("Media URL prefix: {}", config.url_prefix());
    println!("Max upload size: {} bytes", config.max_upload_bytes);
    println!("Step timeout: {} ms", config.step_timeout_ms);
    true
}
