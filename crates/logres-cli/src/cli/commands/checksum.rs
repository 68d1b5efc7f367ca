//! Checksum command: compute MD5 of a file.

use anyhow::Result;
use logres_core::checksum;
use std::path::Path;

/// Compute and print the MD5 of the given file, hex first, then the base64
/// form payload verification compares against.
pub async fn run_checksum(path: &Path) -> Result<()> {
    let digest = checksum::md5_text_path(path)?;
    println!("{}  {}", digest.hex, path.display());
    println!("{}  (base64)", digest.base64);
    Ok(())
}
