use std::fmt;
use std::fs;
use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, Row};
use serde::Serialize;
use tracing::{debug, trace};

use crate::catalog::error::{CatalogError, Result};
use crate::catalog::options::CatalogOpenOptions;
use crate::catalog::record::{BackupFileRecord, BackupSetRecord, MediaFamilyRecord};
use crate::catalog::schema::{ROW_COLUMNS, SCHEMA};
use crate::catalog::{BackupCatalog, BackupFile, HistoryFilter, RawBackupRow};

/// Backup catalog stored in an msdb-shaped SQLite database.
pub struct SqliteCatalog {
    conn: Connection,
    instance: String,
}

impl fmt::Debug for SqliteCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteCatalog")
            .field("instance", &self.instance)
            .field("path", &self.conn.path())
            .finish()
    }
}

/// Row counts written by [`SqliteCatalog::import`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    /// `backupset` rows written.
    pub backup_sets: usize,
    /// `backupmediafamily` rows written.
    pub media_families: usize,
    /// `backupfile` rows written.
    pub backup_files: usize,
}

impl SqliteCatalog {
    /// Opens a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist and `create_if_missing` is false,
    /// or if SQLite cannot open it.
    pub fn open(path: impl AsRef<Path>, opts: &CatalogOpenOptions) -> Result<Self> {
        let path = path.as_ref();
        let exists = path.exists();
        if !exists && !opts.create_if_missing {
            return Err(CatalogError::missing_catalog(path));
        }
        if !exists {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
        }
        let flags = if opts.read_only && exists {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        };
        let conn = Connection::open_with_flags(path, flags)?;
        let instance = opts.instance.clone().unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "catalog".to_string())
        });
        let catalog = Self { conn, instance };
        if !exists {
            catalog.init_schema()?;
        }
        debug!(path = %path.display(), instance = %catalog.instance, "opened backup catalog");
        Ok(catalog)
    }

    /// Creates an empty in-memory catalog with the schema installed.
    pub fn open_in_memory(instance: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let catalog = Self {
            conn,
            instance: instance.into(),
        };
        catalog.init_schema()?;
        Ok(catalog)
    }

    /// Installs the catalog tables if they are missing.
    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Writes one backup set together with its media families and files.
    pub fn record_backup(
        &mut self,
        set: &BackupSetRecord,
        media: &[MediaFamilyRecord],
        files: &[BackupFileRecord],
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        insert_backup_set(&tx, set)?;
        for family in media {
            insert_media_family(&tx, family)?;
        }
        for file in files {
            insert_backup_file(&tx, file)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Bulk-loads catalog rows in a single transaction.
    pub fn import(
        &mut self,
        sets: &[BackupSetRecord],
        media: &[MediaFamilyRecord],
        files: &[BackupFileRecord],
    ) -> Result<ImportCounts> {
        let tx = self.conn.transaction()?;
        for set in sets {
            insert_backup_set(&tx, set)?;
        }
        for family in media {
            insert_media_family(&tx, family)?;
        }
        for file in files {
            insert_backup_file(&tx, file)?;
        }
        tx.commit()?;
        Ok(ImportCounts {
            backup_sets: sets.len(),
            media_families: media.len(),
            backup_files: files.len(),
        })
    }
}

impl BackupCatalog for SqliteCatalog {
    fn instance(&self) -> &str {
        &self.instance
    }

    fn databases(&self) -> Result<Vec<String>> {
        // The bare column takes its spelling from the row holding MIN(backup_set_id).
        let mut stmt = self.conn.prepare_cached(
            "SELECT database_name, MIN(backup_set_id) FROM backupset \
             GROUP BY database_name COLLATE NOCASE \
             ORDER BY database_name COLLATE NOCASE",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    fn fetch_rows(&self, filter: &HistoryFilter) -> Result<Vec<RawBackupRow>> {
        let (sql, values) = pushdown_query(filter);
        trace!(%sql, params = values.len(), "catalog query");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(values.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let raw = decode_row(row)?;
            // LSN, time and fork predicates compare decoded values, never column text.
            if filter.matches(&raw) {
                out.push(raw);
            }
        }
        Ok(out)
    }

    fn fetch_files(&self, backup_set_ids: &[i64]) -> Result<Vec<(i64, BackupFile)>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT logical_name, physical_name, file_type FROM backupfile
             WHERE backup_set_id = ?1 ORDER BY rowid",
        )?;
        let mut out = Vec::new();
        for &id in backup_set_ids {
            let files = stmt.query_map([id], |row| {
                Ok(BackupFile {
                    logical_name: row.get(0)?,
                    physical_name: row.get(1)?,
                    file_type: row.get(2)?,
                })
            })?;
            for file in files {
                out.push((id, file?));
            }
        }
        Ok(out)
    }
}

fn pushdown_query(filter: &HistoryFilter) -> (String, Vec<Value>) {
    let mut sql = format!(
        "SELECT {ROW_COLUMNS}
         FROM backupset bs
         JOIN backupmediafamily mf ON mf.media_set_id = bs.media_set_id
         WHERE 1 = 1"
    );
    let mut values = Vec::new();

    if !filter.databases.is_empty() {
        sql.push_str(" AND bs.database_name COLLATE NOCASE IN (");
        push_placeholders(&mut sql, &mut values, filter.databases.iter().cloned().map(Value::Text));
        sql.push(')');
    }
    if !filter.exclude_databases.is_empty() {
        sql.push_str(" AND bs.database_name COLLATE NOCASE NOT IN (");
        push_placeholders(
            &mut sql,
            &mut values,
            filter.exclude_databases.iter().cloned().map(Value::Text),
        );
        sql.push(')');
    }
    if !filter.backup_types.is_empty() {
        sql.push_str(" AND bs.type IN (");
        push_placeholders(
            &mut sql,
            &mut values,
            filter
                .backup_types
                .iter()
                .map(|ty| Value::Text(ty.code().to_string())),
        );
        sql.push(')');
    }
    if !filter.device_kinds.is_empty() {
        sql.push_str(" AND mf.device_type IN (");
        push_placeholders(
            &mut sql,
            &mut values,
            filter
                .device_kinds
                .iter()
                .flat_map(|kind| kind.codes())
                .map(Value::Integer),
        );
        sql.push(')');
    }
    if !filter.include_copy_only {
        sql.push_str(" AND bs.is_copy_only = 0");
    }
    if !filter.include_mirror {
        sql.push_str(" AND mf.mirror = 0");
    }
    sql.push_str(" ORDER BY bs.backup_set_id, mf.family_sequence_number, mf.mirror");
    (sql, values)
}

fn push_placeholders(sql: &mut String, values: &mut Vec<Value>, items: impl Iterator<Item = Value>) {
    let mut first = true;
    for item in items {
        if !first {
            sql.push_str(", ");
        }
        first = false;
        values.push(item);
        sql.push_str(&format!("?{}", values.len()));
    }
}

fn decode_row(row: &Row<'_>) -> Result<RawBackupRow> {
    let backup_size: i64 = row.get(13)?;
    let compressed: Option<i64> = row.get(14)?;
    let major: i64 = row.get(15)?;
    let family: i64 = row.get(20)?;
    let mirror: i64 = row.get(21)?;
    let copy_only: i64 = row.get(11)?;
    Ok(RawBackupRow {
        backup_set_id: row.get(0)?,
        media_set_id: row.get(1)?,
        server_name: row.get(2)?,
        database_name: row.get(3)?,
        backup_type: row.get(4)?,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
        first_lsn: row.get(7)?,
        last_lsn: row.get(8)?,
        checkpoint_lsn: row.get(9)?,
        database_backup_lsn: row.get(10)?,
        is_copy_only: copy_only != 0,
        recovery_fork_id: row.get(12)?,
        backup_size: u64::try_from(backup_size).unwrap_or(0),
        compressed_backup_size: compressed.and_then(|size| u64::try_from(size).ok()),
        software_major_version: u32::try_from(major).unwrap_or(0),
        user_name: row.get(16)?,
        backup_name: row.get(17)?,
        physical_device_name: row.get(18)?,
        device_type: row.get(19)?,
        family_sequence_number: u32::try_from(family).unwrap_or(1),
        mirror: u32::try_from(mirror).unwrap_or(0),
    })
}

fn insert_backup_set(conn: &Connection, set: &BackupSetRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO backupset (
            backup_set_id, media_set_id, server_name, database_name, type,
            backup_start_date, backup_finish_date, first_lsn, last_lsn, checkpoint_lsn,
            database_backup_lsn, is_copy_only, last_recovery_fork_guid, backup_size,
            compressed_backup_size, software_major_version, user_name, name
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            set.backup_set_id,
            set.media_set_id,
            set.server_name,
            set.database_name,
            set.backup_type,
            set.backup_start_date,
            set.backup_finish_date,
            set.first_lsn,
            set.last_lsn,
            set.checkpoint_lsn,
            set.database_backup_lsn,
            set.is_copy_only as i64,
            set.last_recovery_fork_guid,
            set.backup_size as i64,
            set.compressed_backup_size.map(|size| size as i64),
            set.software_major_version as i64,
            set.user_name,
            set.name,
        ],
    )?;
    Ok(())
}

fn insert_media_family(conn: &Connection, family: &MediaFamilyRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO backupmediafamily (
            media_set_id, family_sequence_number, mirror, physical_device_name, device_type
        ) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            family.media_set_id,
            family.family_sequence_number as i64,
            family.mirror as i64,
            family.physical_device_name,
            family.device_type,
        ],
    )?;
    Ok(())
}

fn insert_backup_file(conn: &Connection, file: &BackupFileRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO backupfile (backup_set_id, logical_name, physical_name, file_type)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            file.backup_set_id,
            file.logical_name,
            file.physical_name,
            file.file_type,
        ],
    )?;
    Ok(())
}
