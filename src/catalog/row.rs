use serde::Serialize;

use crate::types::{BackupType, DeviceType, Lsn, RecoveryForkId, Timestamp};

/// One catalog row: a backup set joined with one of its media families.
///
/// A backup striped over three files, or mirrored, shows up as several rows
/// sharing the same `backup_set_id`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RawBackupRow {
    /// `backupset.backup_set_id`.
    pub backup_set_id: i64,
    /// `backupset.media_set_id`.
    pub media_set_id: i64,
    /// Instance that took the backup.
    pub server_name: String,
    /// Database the backup belongs to.
    pub database_name: String,
    /// Backup kind.
    pub backup_type: BackupType,
    /// `backup_start_date`.
    pub start_time: Timestamp,
    /// `backup_finish_date`.
    pub end_time: Timestamp,
    /// First LSN contained in the backup.
    pub first_lsn: Lsn,
    /// LSN of the next log record after the backup.
    pub last_lsn: Lsn,
    /// LSN of the most recent checkpoint at backup time.
    pub checkpoint_lsn: Lsn,
    /// Checkpoint LSN of the full backup this one is based on.
    pub database_backup_lsn: Lsn,
    /// Backup was taken with COPY_ONLY.
    pub is_copy_only: bool,
    /// `last_recovery_fork_guid`.
    pub recovery_fork_id: RecoveryForkId,
    /// Uncompressed size in bytes.
    pub backup_size: u64,
    /// Compressed size in bytes; absent on engines without compression.
    pub compressed_backup_size: Option<u64>,
    /// Major version of the engine that wrote the backup.
    pub software_major_version: u32,
    /// Login that ran the backup.
    pub user_name: String,
    /// Optional backup set name.
    pub backup_name: Option<String>,
    /// Device path or URL of this media family.
    pub physical_device_name: String,
    /// Device type of this media family.
    pub device_type: DeviceType,
    /// Stripe number, starting at 1.
    pub family_sequence_number: u32,
    /// Mirror number; 0 for the primary copy.
    pub mirror: u32,
}

/// A database file captured by a backup (`backupfile`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BackupFile {
    /// Logical file name.
    pub logical_name: String,
    /// Physical path at backup time.
    pub physical_name: String,
    /// `D` data, `L` log, `F` full-text catalog, `S` filestream.
    pub file_type: String,
}
