#![forbid(unsafe_code)]

//! Value types shared by the catalog and history layers.
//!
//! Everything here mirrors a column of the backup catalog and knows how to
//! read itself from (and write itself to) SQLite.

mod codes;
mod fork;
mod lsn;
mod timestamp;

use thiserror::Error;

pub use codes::{BackupType, DeviceKind, DeviceType};
pub use fork::RecoveryForkId;
pub use lsn::Lsn;
pub use timestamp::Timestamp;

/// Error raised when a catalog value cannot be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// LSN text is not an unsigned decimal number.
    #[error("invalid LSN '{0}'")]
    InvalidLsn(String),
    /// Backup type code outside D/I/L/F/G/P/Q.
    #[error("unknown backup type '{0}'")]
    UnknownBackupType(String),
    /// Device type name not recognised.
    #[error("unknown device type '{0}'")]
    UnknownDeviceType(String),
    /// Date-time text in an unsupported format.
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
    /// Recovery fork identifier is not a UUID.
    #[error("invalid recovery fork id '{0}'")]
    InvalidForkId(String),
}
