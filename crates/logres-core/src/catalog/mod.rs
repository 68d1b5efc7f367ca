//! Read-only access to the vendor catalog databases and update resolution.
//!
//! Three per-user SQLite databases cooperate: the update feed lists
//! resources with a newer version available, the library catalog maps a
//! resource id to its display title (through an internal record id), and
//! the resource manager records where each resource lives inside the Wine
//! prefix. Resolution joins the three into install-ready records.

mod db;
mod queries;
mod resolve;

pub use db::CatalogSet;
pub use resolve::{resolve_updates, Resolution};

use std::fmt;
use std::path::PathBuf;

use crate::winepath::PathResolutionError;

/// One resource eligible for update, fully resolved for display and install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecord {
    /// Opaque resource identifier, the key shared by all three databases.
    pub resource_id: String,
    /// Display title from the library catalog. Not necessarily unique.
    pub title: String,
    /// Payload size advertised by the feed. The live response wins at
    /// download time; this one is for operator display.
    pub size_bytes: u64,
    /// Where to fetch the payload from.
    pub url: String,
    /// Host path the verified payload is installed at.
    pub dest_path: PathBuf,
}

/// A feed row that could not be resolved into an [`UpdateRecord`].
///
/// Dropped rows are reported, never fatal: one stale feed entry must not
/// block the rest of the batch.
#[derive(Debug, Clone)]
pub struct ResolveDropped {
    pub resource_id: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone)]
pub enum DropReason {
    /// The library catalog has no record for the resource id.
    NotInCatalog,
    /// A catalog record exists but carries no title row.
    MissingTitle,
    /// The resource manager knows no installed location.
    MissingLocation,
    /// The feed URL does not parse.
    BadUrl(String),
    /// The recorded Windows path has no anchor segment.
    BadPath(PathResolutionError),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::NotInCatalog => write!(f, "not in the library catalog"),
            DropReason::MissingTitle => write!(f, "catalog record has no title"),
            DropReason::MissingLocation => write!(f, "no installed location on record"),
            DropReason::BadUrl(url) => write!(f, "feed URL `{url}` does not parse"),
            DropReason::BadPath(err) => write!(f, "{err}"),
        }
    }
}

impl fmt::Display for ResolveDropped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.resource_id, self.reason)
    }
}
