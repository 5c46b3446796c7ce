use serde::Serialize;

use crate::catalog::RawBackupRow;
use crate::types::{BackupType, DeviceKind, Lsn, RecoveryForkId, Timestamp};

/// Composable predicate over catalog rows.
///
/// Empty sets mean "no restriction". Copy-only and mirrored media are excluded
/// unless explicitly included. [`HistoryFilter::matches`] is authoritative:
/// back-ends may push parts of the filter into their query language, but must
/// return exactly the rows `matches` accepts.
#[derive(Clone, Debug, Default, Serialize)]
pub struct HistoryFilter {
    /// Databases to include (case-insensitive). Empty means all.
    pub databases: Vec<String>,
    /// Databases to exclude (case-insensitive).
    pub exclude_databases: Vec<String>,
    /// Backup types to include. Empty means all.
    pub backup_types: Vec<BackupType>,
    /// Device kinds to include. Empty means all.
    pub device_kinds: Vec<DeviceKind>,
    /// Only backups finishing at or after this time.
    pub since: Option<Timestamp>,
    /// Include COPY_ONLY backups.
    pub include_copy_only: bool,
    /// Include mirrored media families.
    pub include_mirror: bool,
    /// Only backups whose `last_lsn` is at least this value.
    pub min_last_lsn: Option<Lsn>,
    /// Only backups on this recovery fork.
    pub recovery_fork: Option<RecoveryForkId>,
}

impl HistoryFilter {
    /// Filter matching every primary-media, non-copy-only row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to a single database.
    pub fn database(mut self, name: impl Into<String>) -> Self {
        self.databases = vec![name.into()];
        self
    }

    /// Restricts to the given databases.
    pub fn databases<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.databases = names.into_iter().map(Into::into).collect();
        self
    }

    /// Excludes the given databases.
    pub fn exclude_databases<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_databases = names.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts to the given backup types.
    pub fn backup_types(mut self, types: impl IntoIterator<Item = BackupType>) -> Self {
        self.backup_types = types.into_iter().collect();
        self
    }

    /// Restricts to the given device kinds.
    pub fn device_kinds(mut self, kinds: impl IntoIterator<Item = DeviceKind>) -> Self {
        self.device_kinds = kinds.into_iter().collect();
        self
    }

    /// Only backups finishing at or after `since`.
    pub fn since(mut self, since: Option<Timestamp>) -> Self {
        self.since = since;
        self
    }

    /// Includes or excludes copy-only backups.
    pub fn include_copy_only(mut self, include: bool) -> Self {
        self.include_copy_only = include;
        self
    }

    /// Includes or excludes mirrored media.
    pub fn include_mirror(mut self, include: bool) -> Self {
        self.include_mirror = include;
        self
    }

    /// Lower bound on `last_lsn`.
    pub fn min_last_lsn(mut self, lsn: Option<Lsn>) -> Self {
        self.min_last_lsn = lsn;
        self
    }

    /// Restricts to one recovery fork.
    pub fn recovery_fork(mut self, fork: Option<RecoveryForkId>) -> Self {
        self.recovery_fork = fork;
        self
    }

    /// Whether a database name passes the include/exclude sets.
    pub fn matches_database(&self, name: &str) -> bool {
        let included = self.databases.is_empty()
            || self
                .databases
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(name));
        let excluded = self
            .exclude_databases
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(name));
        included && !excluded
    }

    /// Evaluates every predicate against a row.
    pub fn matches(&self, row: &RawBackupRow) -> bool {
        if !self.matches_database(&row.database_name) {
            return false;
        }
        if !self.backup_types.is_empty() && !self.backup_types.contains(&row.backup_type) {
            return false;
        }
        if !self.device_kinds.is_empty() {
            match row.device_type.kind() {
                Some(kind) if self.device_kinds.contains(&kind) => {}
                _ => return false,
            }
        }
        if let Some(since) = self.since {
            if row.end_time < since {
                return false;
            }
        }
        if row.is_copy_only && !self.include_copy_only {
            return false;
        }
        if row.mirror != 0 && !self.include_mirror {
            return false;
        }
        if let Some(min) = self.min_last_lsn {
            if row.last_lsn < min {
                return false;
            }
        }
        if let Some(fork) = self.recovery_fork {
            if row.recovery_fork_id != fork {
                return false;
            }
        }
        true
    }
}
