use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{BackupCatalog, HistoryFilter};
use crate::history::error::{HistoryError, Result};
use crate::history::fork::{summarize_forks, ForkSummary};
use crate::history::options::ChainOptions;
use crate::history::set::{group_into_media_sets, BackupSet};
use crate::history::warning::HistoryWarning;
use crate::types::{BackupType, Lsn, RecoveryForkId};

/// Most recent backup of one type for a database.
#[derive(Clone, Debug, Serialize)]
pub struct LastBackup {
    /// Instance the catalog belongs to.
    pub instance: String,
    /// Database name.
    pub database: String,
    /// Backup type that was searched for.
    pub backup_type: BackupType,
    /// Fork the search ran against.
    pub selected_fork: Option<RecoveryForkId>,
    /// The backup, if one exists.
    pub backup: Option<BackupSet>,
    /// Conditions met along the way.
    pub warnings: Vec<HistoryWarning>,
}

/// Restore chain reconstructed for one database.
#[derive(Clone, Debug, Serialize)]
pub struct ChainOutcome {
    /// Instance the catalog belongs to.
    pub instance: String,
    /// Database name.
    pub database: String,
    /// Fork the chain lives on.
    pub selected_fork: Option<RecoveryForkId>,
    /// Every fork found in the window, most recent first.
    pub forks: Vec<ForkSummary>,
    /// Full, optional differential, then logs, ascending by `last_lsn`.
    pub chain: Vec<BackupSet>,
    /// Conditions met along the way.
    pub warnings: Vec<HistoryWarning>,
}

impl ChainOutcome {
    fn empty(instance: &str, database: &str) -> Self {
        Self {
            instance: instance.to_string(),
            database: database.to_string(),
            selected_fork: None,
            forks: Vec::new(),
            chain: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Whether a chain anchored on a full backup was found.
    pub fn has_chain(&self) -> bool {
        !self.chain.is_empty()
    }

    /// The full backup anchoring the chain.
    pub fn full(&self) -> Option<&BackupSet> {
        self.chain
            .iter()
            .find(|set| set.backup_type == BackupType::Full)
    }

    /// The differential included in the chain, if any.
    pub fn differential(&self) -> Option<&BackupSet> {
        self.chain
            .iter()
            .find(|set| set.backup_type == BackupType::Differential)
    }

    /// Log backups in restore order.
    pub fn logs(&self) -> impl Iterator<Item = &BackupSet> {
        self.chain
            .iter()
            .filter(|set| set.backup_type == BackupType::Log)
    }
}

struct ForkResolution {
    selected: Option<RecoveryForkId>,
    forks: Vec<ForkSummary>,
    warnings: Vec<HistoryWarning>,
}

/// Reads backup history from a catalog and derives restore chains from it.
pub struct HistorySelector<C> {
    catalog: C,
}

impl<C: BackupCatalog> HistorySelector<C> {
    /// Wraps a catalog.
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// The wrapped catalog.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Unwraps the catalog.
    pub fn into_inner(self) -> C {
        self.catalog
    }

    /// Backup sets matching `filter`, newest `last_lsn` first.
    ///
    /// Each call runs one pass over the catalog, so calling it again re-reads
    /// current history.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    pub fn list_history(&self, filter: &HistoryFilter) -> Result<Vec<BackupSet>> {
        let rows = self.catalog.fetch_rows(filter)?;
        let mut ids: Vec<i64> = rows.iter().map(|row| row.backup_set_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let files = self.catalog.fetch_files(&ids)?;
        let mut sets = group_into_media_sets(rows, files);
        sets.sort_by(newest_first);
        debug!(
            instance = self.catalog.instance(),
            sets = sets.len(),
            "listed backup history"
        );
        Ok(sets)
    }

    /// Recovery forks seen in the window `opts` describes for `database`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    pub fn recovery_forks(&self, database: &str, opts: &ChainOptions) -> Result<Vec<ForkSummary>> {
        let sets = self.window(database, opts)?;
        Ok(summarize_forks(&sets))
    }

    /// Most recent backup of `backup_type` for `database`.
    ///
    /// Ranked by `last_lsn`, ties broken by finish time. When history spans
    /// several forks a warning is attached and the most recent fork is used
    /// unless `opts.recovery_fork` names one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database name is empty or the catalog query fails.
    pub fn last_of_type(
        &self,
        database: &str,
        backup_type: BackupType,
        opts: &ChainOptions,
    ) -> Result<LastBackup> {
        let sets = self.window(database, opts)?;
        let resolution = resolve_fork(database, &sets, opts);
        let backup = resolution.selected.and_then(|fork| {
            latest_of_type(on_fork(&sets, fork), backup_type, opts).cloned()
        });
        Ok(LastBackup {
            instance: self.catalog.instance().to_string(),
            database: database.to_string(),
            backup_type,
            selected_fork: resolution.selected,
            backup,
            warnings: resolution.warnings,
        })
    }

    /// Minimal restore chain bringing `database` to its latest recoverable point.
    ///
    /// The chain is the last full backup on the selected fork, the last
    /// differential based on it (unless ignored), and the log backups based on
    /// the same full that roll forward from there. Missing full backups and
    /// multiple forks are reported as warnings, never as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the database name is empty or the catalog query fails.
    pub fn last_chain(&self, database: &str, opts: &ChainOptions) -> Result<ChainOutcome> {
        let sets = self.window(database, opts)?;
        let mut outcome = ChainOutcome::empty(self.catalog.instance(), database);
        let resolution = resolve_fork(database, &sets, opts);
        outcome.forks = resolution.forks;
        outcome.warnings = resolution.warnings;
        outcome.selected_fork = resolution.selected;

        let Some(fork) = resolution.selected else {
            if opts.recovery_fork.is_none() {
                note(&mut outcome.warnings, HistoryWarning::NoFullBackup {
                    database: database.to_string(),
                });
            }
            return Ok(outcome);
        };
        let candidates = on_fork(&sets, fork);

        let Some(full) = latest_of_type(candidates.iter().copied(), BackupType::Full, opts) else {
            note(&mut outcome.warnings, HistoryWarning::NoFullBackup {
                database: database.to_string(),
            });
            return Ok(outcome);
        };
        info!(
            database,
            backup_set_id = full.backup_set_id,
            last_lsn = %full.last_lsn,
            "selected full backup anchor"
        );

        let mut chain: Vec<&BackupSet> = vec![full];
        let mut log_start = full.first_lsn;
        let mut reached = full.last_lsn;

        if !opts.ignore_differential {
            if let Some(diff) =
                latest_of_type(candidates.iter().copied(), BackupType::Differential, opts)
            {
                if differential_extends(full, diff) {
                    debug!(database, backup_set_id = diff.backup_set_id, "differential accepted");
                    chain.push(diff);
                    log_start = diff.first_lsn;
                    reached = diff.last_lsn;
                } else {
                    note(&mut outcome.warnings, HistoryWarning::NoValidDifferential {
                        database: database.to_string(),
                        backup_set_id: diff.backup_set_id,
                        database_backup_lsn: diff.database_backup_lsn,
                        full_checkpoint_lsn: full.checkpoint_lsn,
                    });
                }
            }
        }

        let mut logs: Vec<&BackupSet> = candidates
            .iter()
            .copied()
            .filter(|set| {
                set.backup_type == BackupType::Log
                    && set.last_lsn > log_start
                    && set.database_backup_lsn == full.checkpoint_lsn
            })
            .collect();
        logs.sort_by(|a, b| oldest_first(a, b));

        let mut previous_last: Option<Lsn> = None;
        for log in logs {
            if previous_last.is_some_and(|prev| log.last_lsn <= prev) {
                continue;
            }
            if log.first_lsn > reached {
                note(&mut outcome.warnings, HistoryWarning::LogChainGap {
                    database: database.to_string(),
                    reached_lsn: reached,
                    next_first_lsn: log.first_lsn,
                    backup_set_id: log.backup_set_id,
                });
                break;
            }
            chain.push(log);
            previous_last = Some(log.last_lsn);
            reached = reached.max(log.last_lsn);
            if opts.stop_at.is_some_and(|stop| log.end >= stop) {
                break;
            }
        }

        chain.sort_by(|a, b| {
            a.last_lsn
                .cmp(&b.last_lsn)
                .then(a.backup_type.chain_rank().cmp(&b.backup_type.chain_rank()))
        });
        outcome.chain = chain.into_iter().cloned().collect();
        debug!(database, members = outcome.chain.len(), "restore chain assembled");
        Ok(outcome)
    }

    /// Runs [`last_chain`](Self::last_chain) for every database the filter's
    /// include/exclude sets admit.
    ///
    /// Per-database problems end up as warnings on that database's outcome;
    /// only catalog failures abort.
    ///
    /// # Errors
    ///
    /// Returns an error if a catalog query fails.
    pub fn last_chains(&self, filter: &HistoryFilter, opts: &ChainOptions) -> Result<Vec<ChainOutcome>> {
        let databases = self.catalog.databases()?;
        let mut outcomes = Vec::new();
        for database in databases.iter().filter(|name| filter.matches_database(name)) {
            outcomes.push(self.last_chain(database, opts)?);
        }
        Ok(outcomes)
    }

    fn window(&self, database: &str, opts: &ChainOptions) -> Result<Vec<BackupSet>> {
        if database.trim().is_empty() {
            return Err(HistoryError::InvalidArgument(
                "database name must not be empty".into(),
            ));
        }
        let mut sets = self.list_history(&opts.window(database))?;
        if let Some(stop) = opts.stop_at {
            sets.retain(|set| set.start <= stop);
        }
        Ok(sets)
    }
}

fn note(warnings: &mut Vec<HistoryWarning>, warning: HistoryWarning) {
    warn!("{warning}");
    warnings.push(warning);
}

fn resolve_fork(database: &str, sets: &[BackupSet], opts: &ChainOptions) -> ForkResolution {
    let forks = summarize_forks(sets);
    let mut warnings = Vec::new();

    let selected = match opts.recovery_fork {
        Some(requested) if forks.iter().any(|f| f.fork == requested) => Some(requested),
        Some(requested) => {
            note(&mut warnings, HistoryWarning::ForkNotFound {
                database: database.to_string(),
                fork: requested,
            });
            None
        }
        None => forks.first().map(|f| f.fork),
    };

    if forks.len() > 1 {
        if let Some(selected) = selected {
            note(&mut warnings, HistoryWarning::MultipleForks {
                database: database.to_string(),
                selected,
                forks: forks.clone(),
            });
        }
    }

    ForkResolution {
        selected,
        forks,
        warnings,
    }
}

fn on_fork(sets: &[BackupSet], fork: RecoveryForkId) -> Vec<&BackupSet> {
    sets.iter()
        .filter(|set| set.recovery_fork_id == fork)
        .collect()
}

fn latest_of_type<'a>(
    sets: impl IntoIterator<Item = &'a BackupSet>,
    backup_type: BackupType,
    opts: &ChainOptions,
) -> Option<&'a BackupSet> {
    sets.into_iter()
        .filter(|set| set.backup_type == backup_type)
        .filter(|set| opts.include_copy_only || !set.is_copy_only)
        .filter(|set| opts.stop_at.map_or(true, |stop| set.end <= stop))
        .max_by(|a, b| {
            a.last_lsn
                .cmp(&b.last_lsn)
                .then(a.end.cmp(&b.end))
                .then(a.backup_set_id.cmp(&b.backup_set_id))
        })
}

/// Whether `diff` can be restored on top of `full`.
pub fn differential_extends(full: &BackupSet, diff: &BackupSet) -> bool {
    diff.database_backup_lsn == full.checkpoint_lsn && diff.last_lsn > full.last_lsn
}

fn newest_first(a: &BackupSet, b: &BackupSet) -> Ordering {
    b.last_lsn
        .cmp(&a.last_lsn)
        .then(b.end.cmp(&a.end))
        .then(b.backup_set_id.cmp(&a.backup_set_id))
}

fn oldest_first(a: &BackupSet, b: &BackupSet) -> Ordering {
    a.last_lsn
        .cmp(&b.last_lsn)
        .then(a.end.cmp(&b.end))
        .then(a.backup_set_id.cmp(&b.backup_set_id))
}
