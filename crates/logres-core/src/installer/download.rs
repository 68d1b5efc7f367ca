//! Streaming GET of one payload with header capture.
//!
//! One Easy handle per record, body written straight to the staging file.
//! Headers are parsed as they arrive so the declared total is available for
//! progress reporting while the body streams.

use std::fs::File;
use std::io::Write;
use std::str;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::LogresConfig;

use super::headers;
use super::TransferProgress;

/// Transfer tuning for one download.
#[derive(Debug, Clone, Copy)]
pub struct TransferOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_recv_speed: Option<u64>,
    pub buffer_size: Option<usize>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(3600),
            max_recv_speed: None,
            buffer_size: None,
        }
    }
}

impl From<&LogresConfig> for TransferOptions {
    fn from(cfg: &LogresConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.transfer_timeout_secs),
            max_recv_speed: cfg.max_recv_bytes_per_sec,
            buffer_size: cfg.recv_buffer_bytes,
        }
    }
}

/// What the wire declared and what actually landed.
#[derive(Debug, Clone)]
pub struct DownloadedBody {
    /// Bytes written to the staging file.
    pub received: u64,
    /// `Content-Length` of the final response.
    pub declared_len: u64,
    /// `ETag` of the final response, outer double quotes removed.
    pub etag: String,
}

/// Transport-phase failure. The engine maps these onto install failures.
#[derive(Debug)]
pub(super) enum FetchError {
    /// Network, status, or required-header problem.
    Transport(String),
    /// Local write into the staging file failed.
    Staging(String),
    /// The abort token was set mid-transfer.
    Aborted,
}

/// Streams `url` into `out` with a single GET.
///
/// Redirects are followed; each hop restarts the captured header set so the
/// parsed metadata always describes the final response. A short body
/// against the server's own Content-Length is not an error here: the caller
/// owns the size judgement and needs the received count to make it.
pub(super) fn fetch_to_file(
    url: &str,
    out: File,
    opts: &TransferOptions,
    progress: Option<&mpsc::Sender<TransferProgress>>,
    abort: Option<&Arc<AtomicBool>>,
) -> Result<DownloadedBody, FetchError> {
    fn t(err: curl::Error) -> FetchError {
        FetchError::Transport(format!("curl: {err}"))
    }

    let received = Arc::new(AtomicU64::new(0));
    let declared = Arc::new(AtomicU64::new(0));
    let staging_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let received_cb = Arc::clone(&received);
    let declared_cb = Arc::clone(&declared);
    let declared_pr = Arc::clone(&declared);
    let staging_cb = Arc::clone(&staging_error);

    let mut easy = curl::easy::Easy::new();
    easy.url(url)
        .map_err(|e| FetchError::Transport(format!("invalid URL: {e}")))?;
    easy.follow_location(true).map_err(t)?;
    easy.max_redirections(10).map_err(t)?;
    easy.connect_timeout(opts.connect_timeout).map_err(t)?;
    easy.timeout(opts.timeout).map_err(t)?;
    easy.low_speed_limit(1024).map_err(t)?;
    easy.low_speed_time(Duration::from_secs(60)).map_err(t)?;
    if let Some(speed) = opts.max_recv_speed {
        easy.max_recv_speed(speed).map_err(t)?;
    }
    if let Some(sz) = opts.buffer_size {
        easy.buffer_size(sz).map_err(t)?;
    }

    let mut header_lines: Vec<String> = Vec::new();
    {
        let mut transfer = easy.transfer();

        transfer
            .header_function(|data| {
                if let Ok(line) = str::from_utf8(data) {
                    let line = line.trim_end();
                    if headers::is_status_line(line) {
                        // New hop: whatever came before no longer applies.
                        header_lines.clear();
                        declared_cb.store(0, Ordering::Relaxed);
                    }
                    if let Some(len) = headers::content_length_of(line) {
                        declared_cb.store(len, Ordering::Relaxed);
                    }
                    header_lines.push(line.to_string());
                }
                true
            })
            .map_err(t)?;

        let mut out = out;
        transfer
            .write_function(move |data| {
                if let Some(token) = abort {
                    if token.load(Ordering::Relaxed) {
                        return Ok(0); // abort transfer
                    }
                }
                if let Err(err) = out.write_all(data) {
                    if let Ok(mut slot) = staging_cb.lock() {
                        *slot = Some(err.to_string());
                    }
                    return Ok(0); // abort transfer
                }
                let got =
                    received_cb.fetch_add(data.len() as u64, Ordering::Relaxed) + data.len() as u64;
                if let Some(tx) = progress {
                    let _ = tx.try_send(TransferProgress {
                        received: got,
                        declared_total: declared_pr.load(Ordering::Relaxed),
                    });
                }
                Ok(data.len())
            })
            .map_err(t)?;

        match transfer.perform() {
            Ok(()) => {}
            Err(err) => {
                if let Some(token) = abort {
                    if token.load(Ordering::Relaxed) {
                        return Err(FetchError::Aborted);
                    }
                }
                if let Ok(mut slot) = staging_error.lock() {
                    if let Some(msg) = slot.take() {
                        return Err(FetchError::Staging(msg));
                    }
                }
                if err.is_partial_file() {
                    tracing::warn!("server closed early: {err}");
                } else {
                    return Err(FetchError::Transport(format!("GET request failed: {err}")));
                }
            }
        }
    }

    let code = easy.response_code().map_err(t)?;
    if code < 200 || code >= 300 {
        return Err(FetchError::Transport(format!(
            "GET {url} returned HTTP {code}"
        )));
    }

    let meta = headers::parse_response_meta(&header_lines);
    let declared_len = meta.content_length.ok_or_else(|| {
        FetchError::Transport("response has no usable Content-Length".to_string())
    })?;
    let etag = meta
        .etag
        .ok_or_else(|| FetchError::Transport("response has no ETag".to_string()))?;

    Ok(DownloadedBody {
        received: received.load(Ordering::Relaxed),
        declared_len,
        etag,
    })
}
