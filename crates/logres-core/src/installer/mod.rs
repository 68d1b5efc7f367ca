//! Download, verify, and atomically install one resource update.
//!
//! `install_update` runs one record through a fixed pipeline: stage the
//! payload into a scoped temp dir next to the destination, verify received
//! size and MD5 against the response metadata, then rename over the
//! destination. Every per-record failure is data, not a propagated error,
//! so a batch loop keeps going and reports each record on its own.

mod download;
mod headers;

use std::fs;
use std::fs::File;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::catalog::UpdateRecord;
use crate::checksum;

pub use download::{DownloadedBody, TransferOptions};

/// Progress snapshot for one transfer. Sent lossily; consumers only ever
/// need the newest one.
#[derive(Debug, Clone, Copy)]
pub struct TransferProgress {
    /// Bytes received so far.
    pub received: u64,
    /// Declared total from the response headers (0 until headers arrive).
    pub declared_total: u64,
}

impl TransferProgress {
    /// Whole percent of the declared total. None until the total is known.
    pub fn percent(&self) -> Option<u32> {
        if self.declared_total == 0 {
            return None;
        }
        let pct = (self.received as f64 * 100.0 / self.declared_total as f64).round() as u32;
        Some(pct.min(100))
    }
}

/// Outcome of one record's pass through the engine.
#[derive(Debug)]
pub enum InstallOutcome {
    /// The verified payload now sits at the destination path.
    Installed,
    /// The destination is untouched; the reason says why.
    Failed(InstallFailure),
}

/// Why a record failed. No variant leaves partial state behind.
#[derive(Debug, Error)]
pub enum InstallFailure {
    /// Connection, status, or required-header problem before verification.
    #[error("transport: {0}")]
    Transport(String),
    /// Received byte count differs from the declared Content-Length.
    #[error("bad file size: got {received} bytes, server declared {declared}")]
    SizeMismatch { declared: u64, received: u64 },
    /// MD5 of the received bytes differs from the ETag-declared digest.
    #[error("bad md5 sum: computed {computed}, server declared {expected}")]
    ChecksumMismatch { expected: String, computed: String },
    /// Temp workspace, staging, or final rename problem on the local side.
    #[error("workspace: {0}")]
    Workspace(String),
    /// The abort token was set mid-transfer.
    #[error("aborted")]
    Aborted,
}

/// Downloads, verifies, and installs one update.
///
/// The staging dir is created inside the destination's parent so the final
/// rename stays on one filesystem and lands atomically; it is removed on
/// every exit path when its scope closes. Blocking; callers on a runtime
/// wrap this in `spawn_blocking`.
pub fn install_update(
    record: &UpdateRecord,
    opts: &TransferOptions,
    progress: Option<&mpsc::Sender<TransferProgress>>,
    abort: Option<&Arc<AtomicBool>>,
) -> InstallOutcome {
    match run(record, opts, progress, abort) {
        Ok(()) => {
            tracing::info!(
                resource = %record.resource_id,
                dest = %record.dest_path.display(),
                "installed"
            );
            InstallOutcome::Installed
        }
        Err(failure) => {
            tracing::warn!(resource = %record.resource_id, %failure, "install failed");
            InstallOutcome::Failed(failure)
        }
    }
}

fn run(
    record: &UpdateRecord,
    opts: &TransferOptions,
    progress: Option<&mpsc::Sender<TransferProgress>>,
    abort: Option<&Arc<AtomicBool>>,
) -> Result<(), InstallFailure> {
    let dest = record.dest_path.as_path();
    let file_name = dest.file_name().ok_or_else(|| {
        InstallFailure::Workspace(format!("destination {} has no file name", dest.display()))
    })?;
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| {
            InstallFailure::Workspace(format!("destination {} has no parent dir", dest.display()))
        })?;

    fs::create_dir_all(parent)
        .map_err(|e| InstallFailure::Workspace(format!("create {}: {e}", parent.display())))?;

    // Same filesystem as the destination, so the rename below cannot turn
    // into a copy.
    let staging = tempfile::Builder::new()
        .prefix(".logres-")
        .tempdir_in(parent)
        .map_err(|e| {
            InstallFailure::Workspace(format!("staging dir in {}: {e}", parent.display()))
        })?;
    let staged_path = staging.path().join(file_name);
    let staged_file = File::create(&staged_path).map_err(|e| {
        InstallFailure::Workspace(format!("create {}: {e}", staged_path.display()))
    })?;

    let body = download::fetch_to_file(&record.url, staged_file, opts, progress, abort).map_err(
        |err| match err {
            download::FetchError::Transport(msg) => InstallFailure::Transport(msg),
            download::FetchError::Staging(msg) => InstallFailure::Workspace(msg),
            download::FetchError::Aborted => InstallFailure::Aborted,
        },
    )?;

    // The validator comes out of the headers first; a response without a
    // usable one never reaches the verification steps.
    let expected = checksum::expected_md5_from_etag(&body.etag)
        .map_err(|e| InstallFailure::Transport(format!("unusable ETag: {e}")))?;

    if body.received != body.declared_len {
        return Err(InstallFailure::SizeMismatch {
            declared: body.declared_len,
            received: body.received,
        });
    }

    let computed = checksum::md5_base64_path(&staged_path)
        .map_err(|e| InstallFailure::Workspace(e.to_string()))?;
    if computed != expected {
        return Err(InstallFailure::ChecksumMismatch { expected, computed });
    }

    fs::rename(&staged_path, dest)
        .map_err(|e| InstallFailure::Workspace(format!("install {}: {e}", dest.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_needs_a_known_total() {
        let p = TransferProgress {
            received: 10,
            declared_total: 0,
        };
        assert_eq!(p.percent(), None);
    }

    #[test]
    fn percent_rounds_to_nearest() {
        let p = TransferProgress {
            received: 512,
            declared_total: 1024,
        };
        assert_eq!(p.percent(), Some(50));
        let p = TransferProgress {
            received: 999,
            declared_total: 1000,
        };
        assert_eq!(p.percent(), Some(100));
    }

    #[test]
    fn percent_caps_at_one_hundred() {
        let p = TransferProgress {
            received: 1100,
            declared_total: 1000,
        };
        assert_eq!(p.percent(), Some(100));
    }
}
