//! Offline reclamation of orphaned blobs.
//!
//! Puts never delete the blob a path used to point at, and bulk deletes
//! leave behind blobs they failed to remove. Interrupted writes can also
//! leave partial files on the blob store. The sweep is a mark-and-sweep
//! pass over both stores that reclaims them. It is not part of any request
//! path and is only run on demand.

use std::collections::HashSet;
use std::time::{Duration, SystemTime};

use tracing::{info, warn};

use crate::coordinator::StorageCoordinator;
use crate::error::CoordinatorResult;
use crate::report::SweepReport;

impl StorageCoordinator {
    /// Delete every blob that no index entry references and whose payload is
    /// at least `min_age` old.
    ///
    /// A put writes its blob before the index entry, so a young unreferenced
    /// blob may belong to a put that is still in flight. `min_age` must be
    /// comfortably longer than the slowest put.
    pub async fn sweep_orphans(&self, min_age: Duration) -> CoordinatorResult<SweepReport> {
        let blobs = self.blobs()?;

        // Mark. Keys that do not hold a blob id contribute nothing.
        let mut referenced = HashSet::new();
        for key in self.index.list_by_prefix("").await? {
            if let Some(id) = self.resolve(&key).await? {
                referenced.insert(id);
            }
        }

        // Sweep.
        let entries = blobs.list().await?;
        let now = SystemTime::now();
        let mut report = SweepReport {
            scanned: entries.len(),
            referenced: referenced.len(),
            ..SweepReport::default()
        };
        for entry in entries {
            if referenced.contains(&entry.id) {
                continue;
            }
            let age = now.duration_since(entry.modified).unwrap_or(Duration::ZERO);
            if age < min_age {
                report.skipped_recent += 1;
                continue;
            }
            match blobs.delete(&entry.id).await {
                Ok(_) => {
                    info!(blob_id = %entry.id, "removed orphaned blob");
                    report.removed += 1;
                }
                Err(e) => warn!(blob_id = %entry.id, error = %e, "failed to remove orphaned blob"),
            }
        }

        report.partials_removed = blobs.remove_stale_partials(min_age).await?;

        info!(
            scanned = report.scanned,
            referenced = report.referenced,
            removed = report.removed,
            skipped_recent = report.skipped_recent,
            partials_removed = report.partials_removed,
            "orphan sweep finished"
        );
        Ok(report)
    }
}
