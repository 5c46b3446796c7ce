use serde::Serialize;

use crate::history::selector::differential_extends;
use crate::history::set::BackupSet;
use crate::types::{BackupType, Lsn};

/// Indicates the severity level of a verification finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifySeverity {
    /// Informational message.
    Info,
    /// Restorable, but not what an automatic chain would contain.
    Warning,
    /// The chain cannot be restored as given.
    Error,
}

/// Represents a single issue discovered during verification.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyFinding {
    /// The severity level of this finding.
    pub severity: VerifySeverity,
    /// Backup set the finding is about, if any.
    pub backup_set_id: Option<i64>,
    /// Human-readable description of the issue.
    pub message: String,
}

/// Counts of chain members by role.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ChainCounts {
    /// Full backups.
    pub full: usize,
    /// Differential backups.
    pub differential: usize,
    /// Log backups.
    pub log: usize,
    /// Members of other backup types.
    pub other: usize,
    /// Highest LSN the chain reaches.
    pub reaches_lsn: Option<Lsn>,
}

/// Complete report of a chain verification.
#[derive(Clone, Debug, Serialize)]
pub struct ChainVerifyReport {
    /// Whether the chain has no error findings.
    pub success: bool,
    /// Issues discovered.
    pub findings: Vec<VerifyFinding>,
    /// Member counts.
    pub counts: ChainCounts,
}

/// Checks that a chain can be restored in the given order.
///
/// Expects a full backup first and exactly once, at most one differential based on it,
/// and log backups based on the same full whose `last_lsn` strictly increases
/// without gaps. Copy-only members are flagged as warnings.
pub fn verify_chain(chain: &[BackupSet]) -> ChainVerifyReport {
    let mut findings = Vec::new();
    let mut counts = ChainCounts::default();

    if chain.is_empty() {
        findings.push(error(None, "chain is empty"));
        return finish(findings, counts);
    }
    if let Some(first) = chain.first().filter(|set| set.backup_type != BackupType::Full) {
        findings.push(error(
            Some(first.backup_set_id),
            format!("chain starts with a {} backup instead of a full backup", first.backup_type),
        ));
    }

    for set in chain {
        match set.backup_type {
            BackupType::Full => counts.full += 1,
            BackupType::Differential => counts.differential += 1,
            BackupType::Log => counts.log += 1,
            _ => {
                counts.other += 1;
                findings.push(error(
                    Some(set.backup_set_id),
                    format!("{} backups cannot be part of a database restore chain", set.backup_type),
                ));
            }
        }
        if set.is_copy_only {
            findings.push(VerifyFinding {
                severity: VerifySeverity::Warning,
                backup_set_id: Some(set.backup_set_id),
                message: "copy-only backup is outside the regular backup chain".into(),
            });
        }
    }

    let forks: Vec<_> = {
        let mut forks: Vec<_> = chain.iter().map(|set| set.recovery_fork_id).collect();
        forks.sort();
        forks.dedup();
        forks
    };
    if forks.len() > 1 {
        findings.push(error(
            None,
            format!("chain spans {} recovery forks", forks.len()),
        ));
    }

    let full = match counts.full {
        0 => {
            findings.push(error(None, "chain has no full backup"));
            return finish(findings, counts);
        }
        1 => chain
            .iter()
            .find(|set| set.backup_type == BackupType::Full),
        n => {
            findings.push(error(None, format!("chain has {n} full backups")));
            return finish(findings, counts);
        }
    };
    let Some(full) = full else {
        return finish(findings, counts);
    };

    let mut reached = full.last_lsn;
    if counts.differential > 1 {
        findings.push(error(
            None,
            format!("chain has {} differential backups", counts.differential),
        ));
    }
    if let Some(diff) = chain
        .iter()
        .find(|set| set.backup_type == BackupType::Differential)
    {
        if differential_extends(full, diff) {
            reached = diff.last_lsn;
        } else {
            findings.push(error(
                Some(diff.backup_set_id),
                format!(
                    "differential is based on LSN {}, full backup checkpoint is {}",
                    diff.database_backup_lsn, full.checkpoint_lsn
                ),
            ));
        }
    }

    let mut previous: Option<Lsn> = None;
    for log in chain.iter().filter(|set| set.backup_type == BackupType::Log) {
        if log.database_backup_lsn != full.checkpoint_lsn {
            findings.push(error(
                Some(log.backup_set_id),
                format!(
                    "log backup is based on LSN {}, full backup checkpoint is {}",
                    log.database_backup_lsn, full.checkpoint_lsn
                ),
            ));
        }
        if let Some(prev) = previous {
            if log.last_lsn <= prev {
                findings.push(error(
                    Some(log.backup_set_id),
                    format!("log last LSN {} does not advance past {prev}", log.last_lsn),
                ));
            }
        }
        if log.last_lsn <= reached {
            findings.push(VerifyFinding {
                severity: VerifySeverity::Info,
                backup_set_id: Some(log.backup_set_id),
                message: format!(
                    "log ends at LSN {} which the restored backups already cover; it is skipped on restore",
                    log.last_lsn
                ),
            });
        } else if log.first_lsn > reached {
            findings.push(error(
                Some(log.backup_set_id),
                format!(
                    "gap in log chain: restored up to LSN {reached}, next log starts at {}",
                    log.first_lsn
                ),
            ));
        }
        reached = reached.max(log.last_lsn);
        previous = Some(log.last_lsn);
    }

    counts.reaches_lsn = Some(reached);
    finish(findings, counts)
}

fn error(backup_set_id: Option<i64>, message: impl Into<String>) -> VerifyFinding {
    VerifyFinding {
        severity: VerifySeverity::Error,
        backup_set_id,
        message: message.into(),
    }
}

fn finish(findings: Vec<VerifyFinding>, counts: ChainCounts) -> ChainVerifyReport {
    let success = !findings
        .iter()
        .any(|finding| finding.severity == VerifySeverity::Error);
    ChainVerifyReport {
        success,
        findings,
        counts,
    }
}
