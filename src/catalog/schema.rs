//! DDL for the msdb-shaped SQLite catalog.

pub(crate) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS backupset (
    backup_set_id INTEGER PRIMARY KEY,
    media_set_id INTEGER NOT NULL,
    server_name TEXT NOT NULL DEFAULT '',
    database_name TEXT NOT NULL,
    type TEXT NOT NULL,
    backup_start_date TEXT NOT NULL,
    backup_finish_date TEXT NOT NULL,
    first_lsn TEXT NOT NULL,
    last_lsn TEXT NOT NULL,
    checkpoint_lsn TEXT NOT NULL,
    database_backup_lsn TEXT NOT NULL,
    is_copy_only INTEGER NOT NULL DEFAULT 0,
    last_recovery_fork_guid TEXT NOT NULL,
    backup_size INTEGER NOT NULL DEFAULT 0,
    compressed_backup_size INTEGER,
    software_major_version INTEGER NOT NULL DEFAULT 16,
    user_name TEXT NOT NULL DEFAULT '',
    name TEXT
);

CREATE TABLE IF NOT EXISTS backupmediafamily (
    media_set_id INTEGER NOT NULL,
    family_sequence_number INTEGER NOT NULL DEFAULT 1,
    mirror INTEGER NOT NULL DEFAULT 0,
    physical_device_name TEXT NOT NULL,
    device_type INTEGER NOT NULL,
    PRIMARY KEY (media_set_id, family_sequence_number, mirror)
);

CREATE TABLE IF NOT EXISTS backupfile (
    backup_set_id INTEGER NOT NULL,
    logical_name TEXT NOT NULL DEFAULT '',
    physical_name TEXT NOT NULL,
    file_type TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_backupset_database ON backupset (database_name COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_backupset_media ON backupset (media_set_id);
CREATE INDEX IF NOT EXISTS idx_backupfile_set ON backupfile (backup_set_id);
";

pub(crate) const ROW_COLUMNS: &str = "
    bs.backup_set_id,
    bs.media_set_id,
    bs.server_name,
    bs.database_name,
    bs.type,
    bs.backup_start_date,
    bs.backup_finish_date,
    bs.first_lsn,
    bs.last_lsn,
    bs.checkpoint_lsn,
    bs.database_backup_lsn,
    bs.is_copy_only,
    bs.last_recovery_fork_guid,
    bs.backup_size,
    bs.compressed_backup_size,
    bs.software_major_version,
    bs.user_name,
    bs.name,
    mf.physical_device_name,
    mf.device_type,
    mf.family_sequence_number,
    mf.mirror";
