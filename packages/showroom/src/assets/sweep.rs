use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use common::storage::{BlobStore, Bucket, StorageError, resolve_key};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Outcome of one reconciliation pass over a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct SweepReport {
    pub bucket: Bucket,
    pub dry_run: bool,
    /// Blobs found in the bucket.
    pub scanned: usize,
    /// Blobs referenced by some record.
    pub live: usize,
    /// Unreferenced blobs kept because they are inside the grace period
    /// or have no known modification time.
    pub recent: usize,
    /// Keys of unreferenced blobs past the grace period.
    pub orphaned: Vec<String>,
    pub removed: usize,
    pub failed: usize,
}

/// Delete blobs in `bucket` that no record references.
///
/// Only blobs older than `grace` are candidates, so staged drafts that are
/// still being edited survive.
#[instrument(skip(blobs, live_urls), fields(live_urls = live_urls.len()))]
pub async fn sweep_bucket(
    blobs: &dyn BlobStore,
    bucket: Bucket,
    live_urls: &[String],
    grace: Duration,
    dry_run: bool,
) -> Result<SweepReport, StorageError> {
    let live: HashSet<_> = live_urls
        .iter()
        .filter_map(|url| resolve_key(url, bucket))
        .collect();
    let cutoff = chrono::Duration::from_std(grace)
        .ok()
        .and_then(|d| Utc::now().checked_sub_signed(d));

    let stored = blobs.list(bucket).await?;

    let mut report = SweepReport {
        bucket,
        dry_run,
        scanned: stored.len(),
        live: 0,
        recent: 0,
        orphaned: Vec::new(),
        removed: 0,
        failed: 0,
    };

    for blob in stored {
        if live.contains(&blob.key) {
            report.live += 1;
            continue;
        }
        let expired = match (blob.last_modified, cutoff) {
            (Some(modified), Some(cutoff)) => modified <= cutoff,
            _ => false,
        };
        if !expired {
            report.recent += 1;
            continue;
        }

        report.orphaned.push(blob.key.to_string());
        if dry_run {
            continue;
        }
        match blobs.delete(bucket, &blob.key).await {
            Ok(_) => report.removed += 1,
            Err(e) => {
                warn!(%bucket, key = %blob.key, error = %e, "Failed to sweep orphaned blob");
                report.failed += 1;
            }
        }
    }

    info!(
        scanned = report.scanned,
        orphaned = report.orphaned.len(),
        removed = report.removed,
        failed = report.failed,
        dry_run,
        "Sweep finished"
    );

    Ok(report)
}
