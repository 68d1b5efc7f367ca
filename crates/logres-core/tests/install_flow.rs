//! Integration tests: the install engine against a local HTTP fixture.
//!
//! Starts a minimal server with CDN-style headers, runs records through
//! `install_update`, and asserts on the outcome and the filesystem.

mod common;

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use logres_core::catalog::UpdateRecord;
use logres_core::checksum;
use logres_core::installer::{install_update, InstallFailure, InstallOutcome, TransferOptions};
use tempfile::tempdir;

use common::resource_server::{self, ResourceServerOptions};

fn record(url: String, dest: PathBuf, size: u64) -> UpdateRecord {
    UpdateRecord {
        resource_id: "res-test".to_string(),
        title: "Test Resource".to_string(),
        size_bytes: size,
        url,
        dest_path: dest,
    }
}

fn sample_body() -> Vec<u8> {
    (0u8..250).cycle().take(48 * 1024).collect()
}

/// No `.logres-*` staging dirs may survive an install attempt.
fn assert_no_staging_leftovers(parent: &Path) {
    let leftovers: Vec<_> = std::fs::read_dir(parent)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".logres-"))
        .collect();
    assert!(leftovers.is_empty(), "staging left behind: {leftovers:?}");
}

#[test]
fn round_trip_replaces_the_destination() {
    let body = sample_body();
    let url = resource_server::start(body.clone());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bible-a.logos4");
    std::fs::write(&dest, b"stale old resource").unwrap();

    let outcome = install_update(
        &record(url, dest.clone(), body.len() as u64),
        &TransferOptions::default(),
        None,
        None,
    );

    assert!(matches!(outcome, InstallOutcome::Installed), "{outcome:?}");
    assert_eq!(std::fs::read(&dest).unwrap(), body);
    assert_no_staging_leftovers(dir.path());

    // The installed file's digest is exactly what the ETag declared.
    let computed = checksum::md5_base64_path(&dest).unwrap();
    let expected = checksum::expected_md5_from_etag(&resource_server::etag_for(&body)).unwrap();
    assert_eq!(computed, expected);
}

#[test]
fn destination_parents_are_created() {
    let body = sample_body();
    let url = resource_server::start(body.clone());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("Data").join("u1").join("LLS").join("r.logos4");

    let outcome = install_update(
        &record(url, dest.clone(), body.len() as u64),
        &TransferOptions::default(),
        None,
        None,
    );

    assert!(matches!(outcome, InstallOutcome::Installed));
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[test]
fn zero_byte_resource_installs() {
    let url = resource_server::start(Vec::new());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("empty.logos4");

    let outcome = install_update(
        &record(url, dest.clone(), 0),
        &TransferOptions::default(),
        None,
        None,
    );

    assert!(matches!(outcome, InstallOutcome::Installed), "{outcome:?}");
    assert_eq!(std::fs::read(&dest).unwrap(), Vec::<u8>::new());
}

#[test]
fn short_body_is_a_size_mismatch_and_leaves_destination_alone() {
    let body = sample_body();
    let url = resource_server::start_with_options(
        body.clone(),
        ResourceServerOptions {
            truncate_to: Some(body.len() - 512),
            ..Default::default()
        },
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bible-a.logos4");
    std::fs::write(&dest, b"previous payload").unwrap();

    let outcome = install_update(
        &record(url, dest.clone(), body.len() as u64),
        &TransferOptions::default(),
        None,
        None,
    );

    match outcome {
        InstallOutcome::Failed(InstallFailure::SizeMismatch { declared, received }) => {
            assert_eq!(declared, body.len() as u64);
            assert_eq!(received, body.len() as u64 - 512);
        }
        other => panic!("expected SizeMismatch, got {other:?}"),
    }
    assert_eq!(std::fs::read(&dest).unwrap(), b"previous payload");
    assert_no_staging_leftovers(dir.path());
}

#[test]
fn overdeclared_length_is_a_size_mismatch() {
    let body = sample_body();
    let url = resource_server::start_with_options(
        body.clone(),
        ResourceServerOptions {
            declared_len: Some(body.len() as u64 + 1000),
            ..Default::default()
        },
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("r.logos4");

    let outcome = install_update(
        &record(url, dest.clone(), body.len() as u64),
        &TransferOptions::default(),
        None,
        None,
    );

    assert!(matches!(
        outcome,
        InstallOutcome::Failed(InstallFailure::SizeMismatch { .. })
    ));
    assert!(!dest.exists());
}

#[test]
fn corrupted_payload_fails_the_checksum() {
    let body = sample_body();
    let mut corrupted = body.clone();
    let last = corrupted.len() - 1;
    corrupted[last] ^= 0xFF;
    // The server vouches for the original body but serves the corrupted one.
    let url = resource_server::start_with_options(
        corrupted,
        ResourceServerOptions {
            etag_override: Some(resource_server::etag_for(&body)),
            ..Default::default()
        },
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("r.logos4");

    let outcome = install_update(
        &record(url, dest.clone(), body.len() as u64),
        &TransferOptions::default(),
        None,
        None,
    );

    match outcome {
        InstallOutcome::Failed(InstallFailure::ChecksumMismatch { expected, computed }) => {
            assert_ne!(expected, computed);
        }
        other => panic!("expected ChecksumMismatch, got {other:?}"),
    }
    assert!(!dest.exists());
    assert_no_staging_leftovers(dir.path());
}

#[test]
fn missing_etag_is_a_transport_failure() {
    let body = sample_body();
    let url = resource_server::start_with_options(
        body.clone(),
        ResourceServerOptions {
            omit_etag: true,
            ..Default::default()
        },
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("r.logos4");

    let outcome = install_update(
        &record(url, dest.clone(), body.len() as u64),
        &TransferOptions::default(),
        None,
        None,
    );

    assert!(matches!(
        outcome,
        InstallOutcome::Failed(InstallFailure::Transport(_))
    ));
    assert!(!dest.exists());
}

#[test]
fn missing_content_length_is_a_transport_failure() {
    let body = sample_body();
    let url = resource_server::start_with_options(
        body.clone(),
        ResourceServerOptions {
            omit_content_length: true,
            ..Default::default()
        },
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("r.logos4");

    let outcome = install_update(
        &record(url, dest.clone(), body.len() as u64),
        &TransferOptions::default(),
        None,
        None,
    );

    assert!(matches!(
        outcome,
        InstallOutcome::Failed(InstallFailure::Transport(_))
    ));
}

#[test]
fn unusable_etag_is_a_transport_failure() {
    let body = sample_body();
    let url = resource_server::start_with_options(
        body.clone(),
        ResourceServerOptions {
            etag_override: Some("\"not-an-md5\"".to_string()),
            ..Default::default()
        },
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("r.logos4");

    let outcome = install_update(
        &record(url, dest.clone(), body.len() as u64),
        &TransferOptions::default(),
        None,
        None,
    );

    assert!(matches!(
        outcome,
        InstallOutcome::Failed(InstallFailure::Transport(_))
    ));
}

#[test]
fn http_error_status_is_a_transport_failure() {
    let url = resource_server::start_with_options(
        sample_body(),
        ResourceServerOptions {
            not_found: true,
            ..Default::default()
        },
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("r.logos4");

    let outcome = install_update(
        &record(url, dest.clone(), 0),
        &TransferOptions::default(),
        None,
        None,
    );

    assert!(matches!(
        outcome,
        InstallOutcome::Failed(InstallFailure::Transport(_))
    ));
    assert!(!dest.exists());
}

#[test]
fn unreachable_server_is_a_transport_failure() {
    // Bind then drop to get a port with nothing listening.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let dir = tempdir().unwrap();
    let dest = dir.path().join("r.logos4");

    let outcome = install_update(
        &record(format!("http://127.0.0.1:{port}/r"), dest.clone(), 0),
        &TransferOptions::default(),
        None,
        None,
    );

    assert!(matches!(
        outcome,
        InstallOutcome::Failed(InstallFailure::Transport(_))
    ));
    assert_no_staging_leftovers(dir.path());
}

#[test]
fn preset_abort_token_stops_the_install() {
    let body = sample_body();
    let url = resource_server::start(body.clone());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("r.logos4");
    let abort = Arc::new(AtomicBool::new(true));

    let outcome = install_update(
        &record(url, dest.clone(), body.len() as u64),
        &TransferOptions::default(),
        None,
        Some(&abort),
    );

    assert!(matches!(
        outcome,
        InstallOutcome::Failed(InstallFailure::Aborted)
    ));
    assert!(!dest.exists());
    assert_no_staging_leftovers(dir.path());
}

#[test]
fn progress_reaches_the_declared_total() {
    let body = sample_body();
    let url = resource_server::start(body.clone());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("r.logos4");
    let (tx, mut rx) = tokio::sync::mpsc::channel(1024);

    let outcome = install_update(
        &record(url, dest, body.len() as u64),
        &TransferOptions::default(),
        Some(&tx),
        None,
    );
    drop(tx);

    assert!(matches!(outcome, InstallOutcome::Installed));
    let mut last = None;
    while let Ok(p) = rx.try_recv() {
        last = Some(p);
    }
    let last = last.expect("at least one progress update");
    assert_eq!(last.received, body.len() as u64);
    assert_eq!(last.declared_total, body.len() as u64);
    assert_eq!(last.percent(), Some(100));
}
