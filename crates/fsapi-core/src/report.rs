/// One key that [`delete_by_prefix`] could not fully clean up.
///
/// [`delete_by_prefix`]: crate::StorageCoordinator::delete_by_prefix
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteFailure {
    pub key: String,
    pub error: String,
}

/// Outcome of a bulk delete.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Keys whose blob (if any) and index entry were both removed.
    pub removed: Vec<String>,
    pub failures: Vec<DeleteFailure>,
}

impl DeleteReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of keys the prefix matched.
    pub fn matched(&self) -> usize {
        self.removed.len() + self.failures.len()
    }
}

/// Outcome of an orphan sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Blobs found on the blob store.
    pub scanned: usize,
    /// Distinct blob ids referenced by live index entries.
    pub referenced: usize,
    /// Unreferenced blobs deleted.
    pub removed: usize,
    /// Unreferenced blobs left alone because they are younger than the
    /// minimum age.
    pub skipped_recent: usize,
    /// Leftovers of interrupted writes deleted.
    pub partials_removed: usize,
}
