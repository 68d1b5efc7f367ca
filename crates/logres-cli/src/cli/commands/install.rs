//! `logres install` – download, verify, and install the selected updates.

use anyhow::Result;
use logres_core::config::LogresConfig;
use logres_core::installer::{
    install_update, InstallFailure, InstallOutcome, TransferOptions, TransferProgress,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::pending::{choose, resolve_pending};

const PROGRESS_INTERVAL_MS: u64 = 200;

/// Runs the batch. Returns true when the operator interrupted it, so the
/// caller can exit with the conventional status.
pub async fn run_install(
    start_dir: &Path,
    select_expr: Option<&str>,
    cfg: &LogresConfig,
) -> Result<bool> {
    let (_installation, resolution) = resolve_pending(start_dir).await?;
    if resolution.records.is_empty() {
        eprintln!("No updates available.");
        return Ok(false);
    }

    let selected = choose(&resolution.records, select_expr)?;
    let opts = TransferOptions::from(cfg);

    // Ctrl-C flips the shared token instead of killing the process, so the
    // in-flight record can unwind its staging dir before we stop.
    let abort = Arc::new(AtomicBool::new(false));
    {
        let abort = Arc::clone(&abort);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                abort.store(true, Ordering::Relaxed);
            }
        });
    }

    let mut installed = 0u32;
    let mut failed = 0u32;
    for record in &selected {
        if abort.load(Ordering::Relaxed) {
            break;
        }
        eprintln!(
            "\nDownloading {} -> {}",
            record.title,
            record.dest_path.display()
        );

        let (progress_tx, mut progress_rx) =
            tokio::sync::mpsc::channel::<TransferProgress>(64);
        let printer = tokio::spawn(async move {
            let mut last_print = Instant::now();
            let mut printed = false;
            while let Some(progress) = progress_rx.recv().await {
                let due = last_print.elapsed().as_millis() as u64 >= PROGRESS_INTERVAL_MS
                    || progress.received >= progress.declared_total;
                if !due {
                    continue;
                }
                if let Some(pct) = progress.percent() {
                    eprint!("\rProgress: {pct}% ");
                    printed = true;
                    last_print = Instant::now();
                }
            }
            if printed {
                eprintln!();
            }
        });

        let outcome = {
            let record = record.clone();
            let tx = progress_tx;
            let token = Arc::clone(&abort);
            tokio::task::spawn_blocking(move || {
                install_update(&record, &opts, Some(&tx), Some(&token))
            })
            .await?
        };
        let _ = printer.await;

        match outcome {
            InstallOutcome::Installed => {
                installed += 1;
                eprintln!("Installed {}", record.title);
            }
            InstallOutcome::Failed(InstallFailure::Aborted) => {
                eprintln!("Aborted {}", record.title);
            }
            InstallOutcome::Failed(reason) => {
                failed += 1;
                eprintln!("Error: {} for {}", reason, record.title);
            }
        }
    }

    let interrupted = abort.load(Ordering::Relaxed);
    if interrupted {
        eprintln!("\nInterrupted.");
    }
    eprintln!("\n{installed} installed, {failed} failed.");
    tracing::info!(installed, failed, interrupted, "install run finished");
    Ok(interrupted)
}
