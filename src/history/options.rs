use crate::catalog::HistoryFilter;
use crate::types::{DeviceKind, RecoveryForkId, Timestamp};

/// Options for `last_of_type` and `last_chain`.
#[derive(Clone, Debug, Default)]
pub struct ChainOptions {
    /// Use this fork instead of the most recent one.
    pub recovery_fork: Option<RecoveryForkId>,
    /// Skip differentials and roll forward from the full backup with logs only.
    pub ignore_differential: bool,
    /// Allow COPY_ONLY backups into the chain.
    pub include_copy_only: bool,
    /// Only consider backups written to these device kinds.
    pub device_kinds: Vec<DeviceKind>,
    /// Only consider backups finishing at or after this time.
    pub since: Option<Timestamp>,
    /// Point-in-time target: restore no further than this moment.
    pub stop_at: Option<Timestamp>,
    /// Keep mirrored media families on the returned sets.
    pub include_mirror: bool,
}

impl ChainOptions {
    /// Catalog filter for the window of history a selection reads.
    pub fn window(&self, database: &str) -> HistoryFilter {
        HistoryFilter::new()
            .database(database)
            .device_kinds(self.device_kinds.iter().copied())
            .since(self.since)
            .include_copy_only(self.include_copy_only)
            .include_mirror(self.include_mirror)
    }
}
