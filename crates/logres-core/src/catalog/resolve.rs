//! Joining the update feed, library catalog, and location map.

use anyhow::{bail, Result};
use std::path::Path;

use crate::winepath;

use super::db::CatalogSet;
use super::{DropReason, ResolveDropped, UpdateRecord};

/// Result of one resolution pass.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Install-ready records, sorted by title (ties keep feed order).
    pub records: Vec<UpdateRecord>,
    /// Feed rows that could not be resolved, with the reason each was
    /// skipped.
    pub dropped: Vec<ResolveDropped>,
}

/// Resolves every row of the update feed into an [`UpdateRecord`].
///
/// Each row needs a parseable URL, a catalog record, a title, and a
/// recorded location whose Windows path contains the anchor segment (the
/// name of `install_dir`). A row missing any of those is dropped and
/// reported; the rest of the batch is unaffected.
pub async fn resolve_updates(dbs: &CatalogSet, install_dir: &Path) -> Result<Resolution> {
    let Some(anchor) = install_dir.file_name().and_then(|n| n.to_str()) else {
        bail!("install dir {} has no usable name", install_dir.display());
    };

    let mut resolution = Resolution::default();
    for row in dbs.feed_rows().await? {
        match resolve_row(dbs, install_dir, anchor, &row).await? {
            Ok(record) => resolution.records.push(record),
            Err(reason) => {
                tracing::warn!(resource = %row.resource_id, %reason, "skipping update");
                resolution.dropped.push(ResolveDropped {
                    resource_id: row.resource_id,
                    reason,
                });
            }
        }
    }

    resolution.records.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(resolution)
}

/// One row's lookups. The outer `Result` is a database failure (fatal);
/// the inner one distinguishes a resolved record from a drop.
async fn resolve_row(
    dbs: &CatalogSet,
    install_dir: &Path,
    anchor: &str,
    row: &super::queries::FeedRow,
) -> Result<std::result::Result<UpdateRecord, DropReason>> {
    if url::Url::parse(&row.url).is_err() {
        return Ok(Err(DropReason::BadUrl(row.url.clone())));
    }

    let Some(record_id) = dbs.record_id(&row.resource_id).await? else {
        return Ok(Err(DropReason::NotInCatalog));
    };
    let Some(title) = dbs.title(record_id).await? else {
        return Ok(Err(DropReason::MissingTitle));
    };
    let Some(location) = dbs.location(&row.resource_id).await? else {
        return Ok(Err(DropReason::MissingLocation));
    };

    let relative = match winepath::translate(&location, anchor) {
        Ok(rel) => rel,
        Err(err) => return Ok(Err(DropReason::BadPath(err))),
    };

    Ok(Ok(UpdateRecord {
        resource_id: row.resource_id.clone(),
        title,
        size_bytes: row.size.max(0) as u64,
        url: row.url.clone(),
        dest_path: install_dir.join(relative),
    }))
}
