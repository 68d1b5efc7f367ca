//! Read-only SQLite pools for the three catalog databases.
//!
//! The databases belong to the Wine-hosted application; this side never
//! writes them, so every pool is opened with `mode=ro`.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;

use crate::discovery::{Installation, SetupError};

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Connection pools for one user's update feed, library catalog, and
/// location map.
#[derive(Clone)]
pub struct CatalogSet {
    pub(crate) updates: Pool<Sqlite>,
    pub(crate) catalog: Pool<Sqlite>,
    pub(crate) locations: Pool<Sqlite>,
}

impl CatalogSet {
    /// Open the three databases of a located installation.
    pub async fn open(installation: &Installation) -> Result<Self> {
        Self::open_at(
            &installation.updates_db_path(),
            &installation.catalog_db_path(),
            &installation.locations_db_path(),
        )
        .await
    }

    /// Open the three databases at explicit paths.
    /// Intended for tests and for nonstandard layouts.
    pub async fn open_at(updates: &Path, catalog: &Path, locations: &Path) -> Result<Self> {
        Ok(Self {
            updates: open_read_only(updates).await?,
            catalog: open_read_only(catalog).await?,
            locations: open_read_only(locations).await?,
        })
    }

    /// Build a set from already-open pools. Test seam for in-memory
    /// databases.
    #[cfg(test)]
    pub(crate) fn from_pools(
        updates: Pool<Sqlite>,
        catalog: Pool<Sqlite>,
        locations: Pool<Sqlite>,
    ) -> Self {
        Self {
            updates,
            catalog,
            locations,
        }
    }
}

async fn open_read_only(path: &Path) -> Result<Pool<Sqlite>> {
    if !path.is_file() {
        return Err(SetupError::MissingDatabase(path.to_path_buf()).into());
    }
    let uri = path_to_sqlite_uri(path) + "?mode=ro";
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect(&uri)
        .await
        .with_context(|| format!("open {}", path.display()))?;
    Ok(pool)
}
