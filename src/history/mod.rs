#![forbid(unsafe_code)]

//! Backup history selection and restore chain reconstruction.
//!
//! Catalog rows are grouped into logical [`BackupSet`]s, then narrowed down to
//! the latest backup of a type or to the minimal chain (full, optional
//! differential, contiguous logs) that brings a database to its latest
//! recoverable point on one recovery fork.

mod error;
mod fork;
mod options;
mod script;
mod selector;
mod set;
mod verify;
mod warning;

/// Error types for history selection.
pub use error::{HistoryError, Result};

/// Recovery fork summaries.
///
/// Each fork's LSN and date range, ordered with the most recently finished
/// fork first.
pub use fork::{summarize_forks, ForkSummary};

/// Options controlling which backups a selection may use.
pub use options::ChainOptions;

/// T-SQL rendering of a restore chain.
pub use script::{restore_script, ScriptError, ScriptOptions};

/// Selection of the latest backups and restore chains from a catalog.
pub use selector::{differential_extends, ChainOutcome, HistorySelector, LastBackup};

/// Logical backup sets assembled from catalog rows.
pub use set::{group_into_media_sets, BackupSet, MediaFamily};

/// Restorability checks for a chain.
///
/// Reports whether a sequence of backup sets can be restored in order and
/// what is wrong with it otherwise.
pub use verify::{verify_chain, ChainCounts, ChainVerifyReport, VerifyFinding, VerifySeverity};

/// Non-fatal conditions reported alongside a selection.
pub use warning::HistoryWarning;
