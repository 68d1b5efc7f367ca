//! Key lookups against the catalog databases.

use anyhow::Result;
use sqlx::Row;

use super::db::CatalogSet;

/// One row of the update feed: a resource with a newer version available.
#[derive(Debug, Clone)]
pub(crate) struct FeedRow {
    pub resource_id: String,
    pub url: String,
    pub size: i64,
}

impl CatalogSet {
    /// All downloadable updates, in feed order (update id ascending).
    pub(crate) async fn feed_rows(&self) -> Result<Vec<FeedRow>> {
        let rows = sqlx::query(
            r#"
            SELECT ResourceId, Url, Size
            FROM ResourceUpdates
            WHERE IsDownloadable = 1
            ORDER BY UpdateId
            "#,
        )
        .fetch_all(&self.updates)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(FeedRow {
                resource_id: row.get("ResourceId"),
                url: row.get("Url"),
                size: row.get("Size"),
            });
        }
        Ok(out)
    }

    /// Internal catalog record id for a resource, if the catalog knows it.
    pub(crate) async fn record_id(&self, resource_id: &str) -> Result<Option<i64>> {
        let row = sqlx::query(r#"SELECT RecordId FROM Records WHERE ResourceId = ?1"#)
            .bind(resource_id)
            .fetch_optional(&self.catalog)
            .await?;
        Ok(row.map(|r| r.get("RecordId")))
    }

    /// Display title for a catalog record id.
    ///
    /// Titles are keyed by the internal record id, not the resource id, so a
    /// title lookup always goes resource id, then record id, then title.
    pub(crate) async fn title(&self, record_id: i64) -> Result<Option<String>> {
        let row = sqlx::query(r#"SELECT Title FROM RecordTitles WHERE RecordId = ?1"#)
            .bind(record_id)
            .fetch_optional(&self.catalog)
            .await?;
        Ok(row.map(|r| r.get("Title")))
    }

    /// Installed location (Windows path syntax) for a resource.
    pub(crate) async fn location(&self, resource_id: &str) -> Result<Option<String>> {
        let row = sqlx::query(r#"SELECT Location FROM Resources WHERE ResourceId = ?1"#)
            .bind(resource_id)
            .fetch_optional(&self.locations)
            .await?;
        Ok(row.map(|r| r.get("Location")))
    }
}
