use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::{BackupFile, RawBackupRow};
use crate::types::{BackupType, DeviceType, Lsn, RecoveryForkId, Timestamp};

/// First engine major version that records compressed backup sizes.
const COMPRESSION_MIN_MAJOR_VERSION: u32 = 10;

/// One stripe (or mirror copy) of a backup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MediaFamily {
    /// Device path or URL.
    pub physical_device_name: String,
    /// Stripe number, starting at 1.
    pub family_sequence_number: u32,
    /// Mirror number; 0 for the primary copy.
    pub mirror: u32,
    /// Device the stripe was written to.
    pub device_type: DeviceType,
}

/// A logical backup operation assembled from its catalog rows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BackupSet {
    /// Catalog identifier.
    pub backup_set_id: i64,
    /// Media set identifier.
    pub media_set_id: i64,
    /// Instance that took the backup.
    pub server_name: String,
    /// Database name.
    pub database: String,
    /// Backup kind.
    pub backup_type: BackupType,
    /// Earliest start time over the set's rows.
    pub start: Timestamp,
    /// Latest finish time over the set's rows.
    pub end: Timestamp,
    /// `end - start` in whole seconds.
    pub duration_secs: i64,
    /// First LSN.
    pub first_lsn: Lsn,
    /// Last LSN.
    pub last_lsn: Lsn,
    /// Checkpoint LSN.
    pub checkpoint_lsn: Lsn,
    /// Checkpoint LSN of the base full backup.
    pub database_backup_lsn: Lsn,
    /// COPY_ONLY flag.
    pub is_copy_only: bool,
    /// Recovery fork the backup belongs to.
    pub recovery_fork_id: RecoveryForkId,
    /// Device type of the first stripe.
    pub device_type: DeviceType,
    /// Uncompressed size in bytes.
    pub total_size: u64,
    /// Size on media in bytes.
    pub compressed_size: u64,
    /// `total_size / compressed_size`, or 1 when compression is not recorded.
    pub compression_ratio: f64,
    /// Engine major version.
    pub software_major_version: u32,
    /// Login that ran the backup.
    pub user_name: String,
    /// Backup set name.
    pub backup_name: Option<String>,
    /// Stripes and mirrors, ordered by family then mirror.
    pub media: Vec<MediaFamily>,
    /// Database files captured.
    pub files: Vec<BackupFile>,
}

impl BackupSet {
    /// Device paths of the primary (non-mirror) stripes in family order.
    pub fn paths(&self) -> Vec<&str> {
        self.media
            .iter()
            .filter(|m| m.mirror == 0)
            .map(|m| m.physical_device_name.as_str())
            .collect()
    }

    /// Number of primary stripes.
    pub fn stripe_count(&self) -> usize {
        self.media.iter().filter(|m| m.mirror == 0).count()
    }

    fn from_row(row: &RawBackupRow) -> Self {
        let compressed = effective_compressed_size(row);
        BackupSet {
            backup_set_id: row.backup_set_id,
            media_set_id: row.media_set_id,
            server_name: row.server_name.clone(),
            database: row.database_name.clone(),
            backup_type: row.backup_type,
            start: row.start_time,
            end: row.end_time,
            duration_secs: row.start_time.seconds_until(row.end_time),
            first_lsn: row.first_lsn,
            last_lsn: row.last_lsn,
            checkpoint_lsn: row.checkpoint_lsn,
            database_backup_lsn: row.database_backup_lsn,
            is_copy_only: row.is_copy_only,
            recovery_fork_id: row.recovery_fork_id,
            device_type: row.device_type,
            total_size: row.backup_size,
            compressed_size: compressed.unwrap_or(row.backup_size),
            compression_ratio: compression_ratio(row.backup_size, compressed),
            software_major_version: row.software_major_version,
            user_name: row.user_name.clone(),
            backup_name: row.backup_name.clone(),
            media: Vec::new(),
            files: Vec::new(),
        }
    }
}

fn effective_compressed_size(row: &RawBackupRow) -> Option<u64> {
    if row.software_major_version < COMPRESSION_MIN_MAJOR_VERSION {
        return None;
    }
    row.compressed_backup_size.filter(|size| *size > 0)
}

fn compression_ratio(total: u64, compressed: Option<u64>) -> f64 {
    match compressed {
        Some(size) => total as f64 / size as f64,
        None => 1.0,
    }
}

/// Groups one-row-per-media-family catalog rows into backup sets.
///
/// Sets come out in the order their first row was seen. Start and end are the
/// min/max over the set's rows; files are attached by `backup_set_id`.
pub fn group_into_media_sets(rows: Vec<RawBackupRow>, files: Vec<(i64, BackupFile)>) -> Vec<BackupSet> {
    let mut sets: Vec<BackupSet> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in &rows {
        let slot = *index.entry(row.backup_set_id).or_insert_with(|| {
            sets.push(BackupSet::from_row(row));
            sets.len() - 1
        });
        let set = &mut sets[slot];
        if row.start_time < set.start {
            set.start = row.start_time;
        }
        if row.end_time > set.end {
            set.end = row.end_time;
        }
        let duplicate = set.media.iter().any(|m| {
            m.family_sequence_number == row.family_sequence_number && m.mirror == row.mirror
        });
        if !duplicate {
            set.media.push(MediaFamily {
                physical_device_name: row.physical_device_name.clone(),
                family_sequence_number: row.family_sequence_number,
                mirror: row.mirror,
                device_type: row.device_type,
            });
        }
    }

    for (id, file) in files {
        if let Some(&slot) = index.get(&id) {
            sets[slot].files.push(file);
        }
    }

    for set in &mut sets {
        set.duration_secs = set.start.seconds_until(set.end);
        set.media
            .sort_by_key(|m| (m.family_sequence_number, m.mirror));
        if let Some(first) = set.media.first() {
            set.device_type = first.device_type;
        }
    }
    sets
}
