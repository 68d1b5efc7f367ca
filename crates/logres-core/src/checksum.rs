//! MD5 checksums for downloaded payloads.
//!
//! The resource CDN publishes a payload's MD5 as a hex string in the `ETag`
//! response header, while verification compares digests in base64 text form.
//! This module computes file digests and converts between the two forms.

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use md5::{Digest, Md5};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Both textual forms of a file digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestText {
    /// Lowercase hex, as servers publish it.
    pub hex: String,
    /// Base64, the form verification compares.
    pub base64: String,
}

/// Compute MD5 of a file in both textual forms.
/// Reads in chunks to keep memory use bounded; suitable for large files.
pub fn md5_text_path(path: &Path) -> Result<DigestText> {
    let digest = md5_digest_path(path)?;
    Ok(DigestText {
        hex: hex::encode(digest),
        base64: BASE64.encode(digest),
    })
}

/// Compute MD5 of a file and return the digest in base64.
pub fn md5_base64_path(path: &Path) -> Result<String> {
    Ok(BASE64.encode(md5_digest_path(path)?))
}

fn md5_digest_path(path: &Path) -> Result<[u8; 16]> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Md5::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().into())
}

/// Convert a hex MD5 taken from an `ETag` header into the base64 form.
/// Surrounding single or double quotes are stripped first; anything that is
/// not a 16-byte hex digest is rejected.
pub fn expected_md5_from_etag(etag: &str) -> Result<String> {
    let cleaned = etag.trim().trim_matches(|c| c == '"' || c == '\'');
    let raw = hex::decode(cleaned).with_context(|| format!("ETag `{etag}` is not hex"))?;
    if raw.len() != 16 {
        bail!("ETag `{etag}` is not an MD5 digest ({} bytes)", raw.len());
    }
    Ok(BASE64.encode(raw))
}
