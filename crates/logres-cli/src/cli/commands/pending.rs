//! Shared first half of every catalog-backed command: locate the
//! installation, open its databases, resolve pending updates, and apply the
//! operator's selection.

use anyhow::Result;
use logres_core::catalog::{resolve_updates, CatalogSet, Resolution, UpdateRecord};
use logres_core::discovery::Installation;
use logres_core::select;
use std::io;
use std::path::Path;

/// Locate, open, resolve. Dropped feed rows are reported on stderr so the
/// operator sees what was skipped without the run failing.
pub async fn resolve_pending(start_dir: &Path) -> Result<(Installation, Resolution)> {
    let installation = Installation::locate(start_dir)?;
    tracing::info!(
        install = %installation.install_dir.display(),
        user = %installation.user_id,
        "located installation"
    );
    let dbs = CatalogSet::open(&installation).await?;
    let resolution = resolve_updates(&dbs, &installation.install_dir).await?;
    for dropped in &resolution.dropped {
        eprintln!("Warning: skipping {dropped}");
    }
    Ok((installation, resolution))
}

/// Apply `--select` or run the interactive prompt.
///
/// Either way the full and selected lists land on stderr; stdout stays
/// reserved for machine-readable output. A bad `--select` expression is
/// fatal, while the prompt re-asks.
pub fn choose(records: &[UpdateRecord], expr: Option<&str>) -> Result<Vec<UpdateRecord>> {
    match expr {
        Some(expr) => {
            let mut err = io::stderr();
            select::show_updates(records, &mut err)?;
            let selected = select::select(records, expr)?;
            select::show_updates(&selected, &mut err)?;
            Ok(selected)
        }
        None => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut prompt = io::stderr();
            Ok(select::prompt_selection(records, &mut input, &mut prompt)?)
        }
    }
}
