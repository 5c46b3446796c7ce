use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::{BackupFile, RawBackupRow};
use crate::types::{BackupType, DeviceType, Lsn, RecoveryForkId, Timestamp};

/// A `backupset` row as written to a catalog, named after the catalog columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackupSetRecord {
    /// Catalog identifier of the backup set.
    pub backup_set_id: i64,
    /// Media set the backup was written to.
    pub media_set_id: i64,
    /// Instance that took the backup.
    #[serde(default)]
    pub server_name: String,
    /// Database name.
    pub database_name: String,
    /// Catalog code (`D`, `I`, `L`, ...).
    #[serde(rename = "type", deserialize_with = "backup_type_code")]
    pub backup_type: BackupType,
    /// `backup_start_date`.
    pub backup_start_date: Timestamp,
    /// `backup_finish_date`.
    pub backup_finish_date: Timestamp,
    /// First LSN.
    #[serde(deserialize_with = "lsn_text")]
    pub first_lsn: Lsn,
    /// Last LSN.
    #[serde(deserialize_with = "lsn_text")]
    pub last_lsn: Lsn,
    /// Checkpoint LSN.
    #[serde(deserialize_with = "lsn_text")]
    pub checkpoint_lsn: Lsn,
    /// Base full backup's checkpoint LSN.
    #[serde(deserialize_with = "lsn_text")]
    pub database_backup_lsn: Lsn,
    /// COPY_ONLY flag.
    #[serde(default, deserialize_with = "flag")]
    pub is_copy_only: bool,
    /// `last_recovery_fork_guid`.
    pub last_recovery_fork_guid: RecoveryForkId,
    /// Uncompressed size in bytes.
    #[serde(default)]
    pub backup_size: u64,
    /// Compressed size in bytes.
    #[serde(default)]
    pub compressed_backup_size: Option<u64>,
    /// Engine major version.
    #[serde(default = "default_major_version")]
    pub software_major_version: u32,
    /// Login that ran the backup.
    #[serde(default)]
    pub user_name: String,
    /// Backup set name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A `backupmediafamily` row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFamilyRecord {
    /// Media set the family belongs to.
    pub media_set_id: i64,
    /// Stripe number, starting at 1.
    #[serde(default = "default_family_sequence")]
    pub family_sequence_number: u32,
    /// Mirror number; 0 for the primary copy.
    #[serde(default)]
    pub mirror: u32,
    /// Device path or URL.
    pub physical_device_name: String,
    /// Numeric device code.
    pub device_type: i64,
}

/// A `backupfile` row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupFileRecord {
    /// Backup set the file was captured by.
    pub backup_set_id: i64,
    /// Logical file name.
    #[serde(default)]
    pub logical_name: String,
    /// Physical path at backup time.
    pub physical_name: String,
    /// File type code.
    pub file_type: String,
}

impl BackupSetRecord {
    /// Joins the set with one of its media families into a catalog row.
    pub fn join(&self, media: &MediaFamilyRecord) -> RawBackupRow {
        RawBackupRow {
            backup_set_id: self.backup_set_id,
            media_set_id: self.media_set_id,
            server_name: self.server_name.clone(),
            database_name: self.database_name.clone(),
            backup_type: self.backup_type,
            start_time: self.backup_start_date,
            end_time: self.backup_finish_date,
            first_lsn: self.first_lsn,
            last_lsn: self.last_lsn,
            checkpoint_lsn: self.checkpoint_lsn,
            database_backup_lsn: self.database_backup_lsn,
            is_copy_only: self.is_copy_only,
            recovery_fork_id: self.last_recovery_fork_guid,
            backup_size: self.backup_size,
            compressed_backup_size: self.compressed_backup_size,
            software_major_version: self.software_major_version,
            user_name: self.user_name.clone(),
            backup_name: self.name.clone(),
            physical_device_name: media.physical_device_name.clone(),
            device_type: DeviceType::from_code(media.device_type),
            family_sequence_number: media.family_sequence_number,
            mirror: media.mirror,
        }
    }
}

impl From<&BackupFileRecord> for BackupFile {
    fn from(record: &BackupFileRecord) -> Self {
        BackupFile {
            logical_name: record.logical_name.clone(),
            physical_name: record.physical_name.clone(),
            file_type: record.file_type.clone(),
        }
    }
}

fn default_major_version() -> u32 {
    16
}

fn default_family_sequence() -> u32 {
    1
}

// CSV cells are untyped text; numeric inference would turn 25-digit LSNs into floats.
fn lsn_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Lsn, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

fn backup_type_code<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BackupType, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean flag, found '{other}'"
        ))),
    }
}
