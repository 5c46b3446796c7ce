use thiserror::Error;

use crate::history::set::BackupSet;
use crate::types::{BackupType, DeviceKind, DeviceType, Lsn, Timestamp};

/// Error raised when a chain cannot be rendered as T-SQL.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    /// Nothing to restore.
    #[error("restore chain is empty")]
    EmptyChain,
    /// The set has no primary media recorded.
    #[error("backup set {0} has no media to restore from")]
    NoMedia(i64),
    /// RESTORE has no FROM clause for the device.
    #[error("backup set {backup_set_id} was written to a {device} device, which cannot be scripted")]
    UnsupportedDevice {
        /// Offending backup set.
        backup_set_id: i64,
        /// Device description.
        device: String,
    },
    /// Only full, differential and log backups can be scripted.
    #[error("backup set {backup_set_id} is a {backup_type} backup, which cannot be scripted")]
    UnsupportedBackupType {
        /// Offending backup set.
        backup_set_id: i64,
        /// Its backup type.
        backup_type: BackupType,
    },
}

/// Options for [`restore_script`].
#[derive(Clone, Debug, Default)]
pub struct ScriptOptions {
    /// Restore under a different database name.
    pub target_database: Option<String>,
    /// Add `REPLACE` to the first statement.
    pub replace: bool,
    /// Leave the database restoring after the last statement.
    pub no_recovery: bool,
    /// Add `STOPAT` to the log statements.
    pub stop_at: Option<Timestamp>,
}

/// Renders one `RESTORE` statement per chain member.
///
/// Log backups that end at or before the LSN already reached by the
/// preceding members are too early to apply and are left out.
///
/// # Errors
///
/// Returns an error for an empty chain, for members that are not full,
/// differential or log backups, and for media that RESTORE cannot read.
pub fn restore_script(
    chain: &[BackupSet],
    opts: &ScriptOptions,
) -> Result<Vec<String>, ScriptError> {
    let first = chain.first().ok_or(ScriptError::EmptyChain)?;
    let database = opts
        .target_database
        .clone()
        .unwrap_or_else(|| first.database.clone());
    let target = quote_identifier(&database);

    let mut applicable: Vec<&BackupSet> = Vec::new();
    let mut reached: Option<Lsn> = None;
    let mut ordered: Vec<&BackupSet> = chain.iter().collect();
    // Full first, then the differential, then logs by last LSN.
    ordered.sort_by_key(|set| {
        (
            set.backup_type != BackupType::Full,
            set.backup_type == BackupType::Log,
            set.last_lsn,
        )
    });
    for set in ordered {
        match set.backup_type {
            BackupType::Full | BackupType::Differential => {}
            BackupType::Log => {
                if reached.is_some_and(|lsn| set.last_lsn <= lsn) {
                    continue;
                }
            }
            other => {
                return Err(ScriptError::UnsupportedBackupType {
                    backup_set_id: set.backup_set_id,
                    backup_type: other,
                })
            }
        }
        reached = Some(reached.map_or(set.last_lsn, |lsn| lsn.max(set.last_lsn)));
        applicable.push(set);
    }

    let mut statements = Vec::with_capacity(applicable.len());
    let last_index = applicable.len().saturating_sub(1);
    for (index, set) in applicable.iter().enumerate() {
        let verb = if set.backup_type == BackupType::Log {
            "RESTORE LOG"
        } else {
            "RESTORE DATABASE"
        };
        let sources = from_clause(set)?;
        let mut with = Vec::new();
        if index == 0 && opts.replace {
            with.push("REPLACE".to_string());
        }
        if set.backup_type == BackupType::Log {
            if let Some(stop) = opts.stop_at {
                with.push(format!("STOPAT = N'{}'", stop.stamp(false)));
            }
        }
        let recover = index == last_index && !opts.no_recovery;
        with.push(if recover { "RECOVERY" } else { "NORECOVERY" }.to_string());
        statements.push(format!(
            "{verb} {target} FROM {sources} WITH {}",
            with.join(", ")
        ));
    }
    Ok(statements)
}

fn from_clause(set: &BackupSet) -> Result<String, ScriptError> {
    let primaries: Vec<_> = set.media.iter().filter(|m| m.mirror == 0).collect();
    if primaries.is_empty() {
        return Err(ScriptError::NoMedia(set.backup_set_id));
    }
    let mut parts = Vec::with_capacity(primaries.len());
    for media in primaries {
        let keyword = device_keyword(media.device_type).ok_or_else(|| {
            ScriptError::UnsupportedDevice {
                backup_set_id: set.backup_set_id,
                device: media.device_type.to_string(),
            }
        })?;
        parts.push(format!(
            "{keyword} = N'{}'",
            quote_literal(&media.physical_device_name)
        ));
    }
    Ok(parts.join(", "))
}

fn device_keyword(device: DeviceType) -> Option<&'static str> {
    match device.kind()? {
        DeviceKind::Disk => Some("DISK"),
        DeviceKind::Tape => Some("TAPE"),
        DeviceKind::Url => Some("URL"),
        DeviceKind::VirtualDevice => Some("VIRTUAL_DEVICE"),
        DeviceKind::Pipe => None,
    }
}

fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

fn quote_literal(value: &str) -> String {
    value.replace('\'', "''")
}
