#![forbid(unsafe_code)]

//! Command-line support shared with the `backchain` binary.

/// CSV import of catalog exports and CSV export of backup history.
///
/// Catalog CSV headers are the catalog column names (`backup_set_id`,
/// `type`, `first_lsn`, ...); LSN columns are always read as text.
pub mod import_export;
