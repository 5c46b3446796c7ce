use std::collections::HashMap;

use serde::Serialize;

use crate::history::set::BackupSet;
use crate::types::{Lsn, RecoveryForkId, Timestamp};

/// LSN and date range covered by one recovery fork.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ForkSummary {
    /// Fork identifier.
    pub fork: RecoveryForkId,
    /// Lowest `first_lsn` on the fork.
    pub first_lsn: Lsn,
    /// Highest `last_lsn` on the fork.
    pub last_lsn: Lsn,
    /// Earliest backup start on the fork.
    pub first_start: Timestamp,
    /// Latest backup finish on the fork.
    pub last_end: Timestamp,
    /// Number of backup sets on the fork.
    pub backup_count: usize,
}

/// Summarises the forks present in `sets`, most recently finished first.
pub fn summarize_forks<'a>(sets: impl IntoIterator<Item = &'a BackupSet>) -> Vec<ForkSummary> {
    let mut by_fork: HashMap<RecoveryForkId, ForkSummary> = HashMap::new();
    for set in sets {
        by_fork
            .entry(set.recovery_fork_id)
            .and_modify(|summary| {
                summary.first_lsn = summary.first_lsn.min(set.first_lsn);
                summary.last_lsn = summary.last_lsn.max(set.last_lsn);
                summary.first_start = summary.first_start.min(set.start);
                summary.last_end = summary.last_end.max(set.end);
                summary.backup_count += 1;
            })
            .or_insert_with(|| ForkSummary {
                fork: set.recovery_fork_id,
                first_lsn: set.first_lsn,
                last_lsn: set.last_lsn,
                first_start: set.start,
                last_end: set.end,
                backup_count: 1,
            });
    }
    let mut forks: Vec<ForkSummary> = by_fork.into_values().collect();
    forks.sort_by(|a, b| {
        b.last_end
            .cmp(&a.last_end)
            .then(b.last_lsn.cmp(&a.last_lsn))
            .then(a.fork.cmp(&b.fork))
    });
    forks
}
