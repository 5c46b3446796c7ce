use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{
    BackupFileRecord, BackupSetRecord, CatalogError, CatalogOpenOptions, ImportCounts,
    MediaFamilyRecord, SqliteCatalog,
};
use crate::history::{BackupSet, HistoryError};

/// Configuration for importing catalog CSV exports.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Path to the catalog file.
    pub catalog_path: PathBuf,
    /// Whether to create the catalog if it doesn't exist.
    pub create_if_missing: bool,
    /// `backupset` export.
    pub backup_sets: PathBuf,
    /// `backupmediafamily` export.
    pub media_families: Option<PathBuf>,
    /// `backupfile` export.
    pub backup_files: Option<PathBuf>,
}

/// Error type for CLI import/export operations.
#[derive(Error, Debug)]
pub enum CliError {
    /// Generic error message.
    #[error("{0}")]
    Message(String),
    /// IO error from file operations.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// CSV parsing or writing error.
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// Catalog error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// History selection error.
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl From<&str> for CliError {
    fn from(value: &str) -> Self {
        CliError::Message(value.to_string())
    }
}

impl From<String> for CliError {
    fn from(value: String) -> Self {
        CliError::Message(value)
    }
}

/// Loads CSV exports of the catalog tables into a SQLite catalog.
///
/// All rows are written in one transaction. Sets without a media family and
/// files pointing at unknown sets are logged but still written.
pub fn run_import(cfg: &ImportConfig) -> Result<ImportCounts, CliError> {
    if !cfg.catalog_path.exists() && !cfg.create_if_missing {
        return Err(CliError::Message(format!(
            "catalog {} does not exist (use --create to initialize)",
            cfg.catalog_path.display()
        )));
    }

    let sets: Vec<BackupSetRecord> = read_records(&cfg.backup_sets)?;
    let media: Vec<MediaFamilyRecord> = match &cfg.media_families {
        Some(path) => read_records(path)?,
        None => Vec::new(),
    };
    let files: Vec<BackupFileRecord> = match &cfg.backup_files {
        Some(path) => read_records(path)?,
        None => Vec::new(),
    };

    let media_sets: HashSet<i64> = media.iter().map(|m| m.media_set_id).collect();
    for set in sets.iter().filter(|s| !media_sets.contains(&s.media_set_id)) {
        warn!(
            backup_set_id = set.backup_set_id,
            media_set_id = set.media_set_id,
            "backup set has no media family and will not appear in history"
        );
    }
    let set_ids: HashSet<i64> = sets.iter().map(|s| s.backup_set_id).collect();
    let orphans = files
        .iter()
        .filter(|f| !set_ids.contains(&f.backup_set_id))
        .count();
    if orphans > 0 {
        warn!(orphans, "backup files reference sets missing from this import");
    }

    let opts = CatalogOpenOptions {
        create_if_missing: cfg.create_if_missing,
        ..CatalogOpenOptions::default()
    };
    let mut catalog = SqliteCatalog::open(&cfg.catalog_path, &opts)?;
    let counts = catalog.import(&sets, &media, &files)?;
    info!(
        path = %cfg.catalog_path.display(),
        backup_sets = counts.backup_sets,
        media_families = counts.media_families,
        backup_files = counts.backup_files,
        "imported catalog rows"
    );
    Ok(counts)
}

/// Reads a headed CSV file into records.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CliError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    let mut records = Vec::new();
    for (line, result) in reader.deserialize().enumerate() {
        let record = result.map_err(|err| {
            CliError::Message(format!(
                "{}: record {}: {err}",
                path.display(),
                line + 1
            ))
        })?;
        records.push(record);
    }
    Ok(records)
}

#[derive(Serialize)]
struct HistoryCsvRow<'a> {
    server_name: &'a str,
    database: &'a str,
    backup_set_id: i64,
    backup_type: &'a str,
    start: String,
    end: String,
    duration_secs: i64,
    first_lsn: String,
    last_lsn: String,
    checkpoint_lsn: String,
    database_backup_lsn: String,
    is_copy_only: bool,
    recovery_fork_id: String,
    device_type: String,
    total_size: u64,
    compressed_size: u64,
    compression_ratio: f64,
    paths: String,
}

/// Writes one CSV row per backup set and returns the number written.
pub fn write_history_csv<W: io::Write>(writer: W, sets: &[BackupSet]) -> Result<u64, CliError> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    for set in sets {
        writer.serialize(HistoryCsvRow {
            server_name: &set.server_name,
            database: &set.database,
            backup_set_id: set.backup_set_id,
            backup_type: set.backup_type.code(),
            start: set.start.to_string(),
            end: set.end.to_string(),
            duration_secs: set.duration_secs,
            first_lsn: set.first_lsn.to_string(),
            last_lsn: set.last_lsn.to_string(),
            checkpoint_lsn: set.checkpoint_lsn.to_string(),
            database_backup_lsn: set.database_backup_lsn.to_string(),
            is_copy_only: set.is_copy_only,
            recovery_fork_id: set.recovery_fork_id.to_string(),
            device_type: set.device_type.to_string(),
            total_size: set.total_size,
            compressed_size: set.compressed_size,
            compression_ratio: set.compression_ratio,
            paths: set.paths().join("|"),
        })?;
    }
    writer.flush()?;
    Ok(sets.len() as u64)
}

/// Writes history to a CSV file.
pub fn export_history(path: &Path, sets: &[BackupSet]) -> Result<u64, CliError> {
    let file = std::fs::File::create(path)?;
    write_history_csv(file, sets)
}
