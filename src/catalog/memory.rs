use crate::catalog::error::Result;
use crate::catalog::record::{BackupFileRecord, BackupSetRecord, MediaFamilyRecord};
use crate::catalog::{BackupCatalog, BackupFile, HistoryFilter, RawBackupRow};

/// Vector-backed catalog, handy for tests and for history already in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    instance: String,
    rows: Vec<RawBackupRow>,
    files: Vec<(i64, BackupFile)>,
}

impl MemoryCatalog {
    /// Creates an empty catalog reporting the given instance name.
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            ..Self::default()
        }
    }

    /// Adds a pre-joined catalog row.
    pub fn push_row(&mut self, row: RawBackupRow) {
        self.rows.push(row);
    }

    /// Adds a file captured by a backup set.
    pub fn push_file(&mut self, backup_set_id: i64, file: BackupFile) {
        self.files.push((backup_set_id, file));
    }

    /// Adds a backup set with its media families and files.
    pub fn record_backup(
        &mut self,
        set: &BackupSetRecord,
        media: &[MediaFamilyRecord],
        files: &[BackupFileRecord],
    ) {
        for family in media.iter().filter(|m| m.media_set_id == set.media_set_id) {
            self.rows.push(set.join(family));
        }
        for file in files {
            self.files.push((file.backup_set_id, BackupFile::from(file)));
        }
    }

    /// Number of joined rows held.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the catalog holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl BackupCatalog for MemoryCatalog {
    fn instance(&self) -> &str {
        &self.instance
    }

    fn databases(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        for row in &self.rows {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&row.database_name)) {
                names.push(row.database_name.clone());
            }
        }
        names.sort_by_key(|name| name.to_ascii_lowercase());
        Ok(names)
    }

    fn fetch_rows(&self, filter: &HistoryFilter) -> Result<Vec<RawBackupRow>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    fn fetch_files(&self, backup_set_ids: &[i64]) -> Result<Vec<(i64, BackupFile)>> {
        Ok(self
            .files
            .iter()
            .filter(|(id, _)| backup_set_ids.contains(id))
            .cloned()
            .collect())
    }
}
