#![forbid(unsafe_code)]

//! Read access to a backup catalog.
//!
//! The catalog is the system-maintained record of every backup operation
//! (`backupset`, `backupmediafamily` and `backupfile` in msdb terms). The
//! [`BackupCatalog`] trait is the only thing the history layer needs from it:
//! list databases, fetch joined rows under a [`HistoryFilter`], and fetch the
//! file list of given backup sets.

mod error;
mod filter;
mod memory;
mod options;
mod record;
mod row;
mod schema;
mod sqlite;

pub use error::{CatalogError, Result};
pub use filter::HistoryFilter;
pub use memory::MemoryCatalog;
pub use options::CatalogOpenOptions;
pub use record::{BackupFileRecord, BackupSetRecord, MediaFamilyRecord};
pub use row::{BackupFile, RawBackupRow};
pub use sqlite::{ImportCounts, SqliteCatalog};

/// Source of backup history rows.
pub trait BackupCatalog {
    /// Name of the instance whose history this catalog holds.
    fn instance(&self) -> &str;

    /// Distinct database names that have at least one backup recorded.
    ///
    /// Names differing only in ASCII case are one database; the spelling of
    /// its earliest recorded backup is returned.
    fn databases(&self) -> Result<Vec<String>>;

    /// Joined backup-set/media-family rows accepted by `filter`.
    fn fetch_rows(&self, filter: &HistoryFilter) -> Result<Vec<RawBackupRow>>;

    /// Files captured by the given backup sets, tagged with their set id.
    fn fetch_files(&self, backup_set_ids: &[i64]) -> Result<Vec<(i64, BackupFile)>>;
}

impl<C: BackupCatalog + ?Sized> BackupCatalog for &C {
    fn instance(&self) -> &str {
        (**self).instance()
    }

    fn databases(&self) -> Result<Vec<String>> {
        (**self).databases()
    }

    fn fetch_rows(&self, filter: &HistoryFilter) -> Result<Vec<RawBackupRow>> {
        (**self).fetch_rows(filter)
    }

    fn fetch_files(&self, backup_set_ids: &[i64]) -> Result<Vec<(i64, BackupFile)>> {
        (**self).fetch_files(backup_set_ids)
    }
}

impl<C: BackupCatalog + ?Sized> BackupCatalog for Box<C> {
    fn instance(&self) -> &str {
        (**self).instance()
    }

    fn databases(&self) -> Result<Vec<String>> {
        (**self).databases()
    }

    fn fetch_rows(&self, filter: &HistoryFilter) -> Result<Vec<RawBackupRow>> {
        (**self).fetch_rows(filter)
    }

    fn fetch_files(&self, backup_set_ids: &[i64]) -> Result<Vec<(i64, BackupFile)>> {
        (**self).fetch_files(backup_set_ids)
    }
}
