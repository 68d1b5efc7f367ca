//! `logres status` – show the located installation and pending updates.

use anyhow::Result;
use logres_core::select;
use std::path::Path;

use super::pending::resolve_pending;

pub async fn run_status(start_dir: &Path) -> Result<()> {
    let (installation, resolution) = resolve_pending(start_dir).await?;

    println!("Install dir: {}", installation.install_dir.display());
    println!("User:        {}", installation.user_id);
    println!("Catalog:     {}", installation.catalog_db_path().display());
    println!("Updates:     {}", installation.updates_db_path().display());
    println!("Locations:   {}", installation.locations_db_path().display());

    if resolution.records.is_empty() {
        println!("No updates available.");
        return Ok(());
    }
    println!(
        "{} update(s) available, {} MB total:",
        resolution.records.len(),
        select::megabytes(select::total_size(&resolution.records))
    );
    for (n, record) in resolution.records.iter().enumerate() {
        println!(
            "{:>4}. {} ({} MB)  {}",
            n + 1,
            record.title,
            select::megabytes(record.size_bytes),
            record.resource_id
        );
    }
    Ok(())
}
