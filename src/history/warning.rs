use std::fmt;

use serde::Serialize;

use crate::history::fork::ForkSummary;
use crate::types::{Lsn, RecoveryForkId};

/// Non-fatal condition met while selecting history for one database.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryWarning {
    /// No usable full backup; the database's chain is omitted.
    NoFullBackup {
        /// Database concerned.
        database: String,
    },
    /// History spans several recovery forks.
    MultipleForks {
        /// Database concerned.
        database: String,
        /// Fork the selection ran against.
        selected: RecoveryForkId,
        /// Every fork found, most recent first.
        forks: Vec<ForkSummary>,
    },
    /// The requested fork has no backups in the window.
    ForkNotFound {
        /// Database concerned.
        database: String,
        /// Fork requested by the caller.
        fork: RecoveryForkId,
    },
    /// The latest differential does not extend the chosen full backup.
    NoValidDifferential {
        /// Database concerned.
        database: String,
        /// Rejected differential.
        backup_set_id: i64,
        /// Base LSN recorded by the differential.
        database_backup_lsn: Lsn,
        /// Checkpoint LSN of the full backup.
        full_checkpoint_lsn: Lsn,
    },
    /// Log backups stop being contiguous; the chain was cut before the gap.
    LogChainGap {
        /// Database concerned.
        database: String,
        /// Highest LSN the chain reaches.
        reached_lsn: Lsn,
        /// First LSN of the log backup that does not connect.
        next_first_lsn: Lsn,
        /// Log backup that does not connect.
        backup_set_id: i64,
    },
}

impl HistoryWarning {
    /// Database the warning refers to.
    pub fn database(&self) -> &str {
        match self {
            HistoryWarning::NoFullBackup { database }
            | HistoryWarning::MultipleForks { database, .. }
            | HistoryWarning::ForkNotFound { database, .. }
            | HistoryWarning::NoValidDifferential { database, .. }
            | HistoryWarning::LogChainGap { database, .. } => database,
        }
    }
}

impl fmt::Display for HistoryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryWarning::NoFullBackup { database } => {
                write!(f, "no full backup found for database {database}")
            }
            HistoryWarning::MultipleForks {
                database,
                selected,
                forks,
            } => {
                write!(
                    f,
                    "multiple recovery forks detected for database {database}; using {selected}:"
                )?;
                for fork in forks {
                    write!(
                        f,
                        " [{} lsn {}..{} from {} to {}]",
                        fork.fork, fork.first_lsn, fork.last_lsn, fork.first_start, fork.last_end
                    )?;
                }
                Ok(())
            }
            HistoryWarning::ForkNotFound { database, fork } => {
                write!(f, "recovery fork {fork} has no backups for database {database}")
            }
            HistoryWarning::NoValidDifferential {
                database,
                backup_set_id,
                database_backup_lsn,
                full_checkpoint_lsn,
            } => write!(
                f,
                "no valid differential for database {database}: backup set {backup_set_id} is based on LSN {database_backup_lsn}, full checkpoint is {full_checkpoint_lsn}"
            ),
            HistoryWarning::LogChainGap {
                database,
                reached_lsn,
                next_first_lsn,
                backup_set_id,
            } => write!(
                f,
                "log chain for database {database} breaks at LSN {reached_lsn}: backup set {backup_set_id} starts at {next_first_lsn}"
            ),
        }
    }
}
