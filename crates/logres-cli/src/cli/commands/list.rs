//! `logres list` – print selected update URLs to stdout.
//!
//! Lists and the prompt go to stderr, so the stdout of
//! `logres list <dir> --select all` pipes cleanly into other tools.

use anyhow::Result;
use std::path::Path;

use super::pending::{choose, resolve_pending};

pub async fn run_list(start_dir: &Path, select_expr: Option<&str>) -> Result<()> {
    let (_installation, resolution) = resolve_pending(start_dir).await?;
    if resolution.records.is_empty() {
        eprintln!("No updates available.");
        return Ok(());
    }

    let selected = choose(&resolution.records, select_expr)?;
    for record in &selected {
        println!("{}", record.url);
    }
    Ok(())
}
