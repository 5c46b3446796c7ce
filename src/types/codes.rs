use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::TypeError;

/// Kind of backup operation, as encoded in `backupset.type`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupType {
    /// `D`: full database backup.
    Full,
    /// `I`: differential database backup.
    Differential,
    /// `L`: transaction log backup.
    Log,
    /// `F`: file or filegroup backup.
    File,
    /// `G`: differential file backup.
    DifferentialFile,
    /// `P`: partial backup.
    PartialFull,
    /// `Q`: differential partial backup.
    PartialDifferential,
}

impl BackupType {
    /// All variants in catalog code order.
    pub const ALL: [BackupType; 7] = [
        BackupType::Full,
        BackupType::Differential,
        BackupType::Log,
        BackupType::File,
        BackupType::DifferentialFile,
        BackupType::PartialFull,
        BackupType::PartialDifferential,
    ];

    /// Single-letter catalog code.
    pub fn code(self) -> &'static str {
        match self {
            BackupType::Full => "D",
            BackupType::Differential => "I",
            BackupType::Log => "L",
            BackupType::File => "F",
            BackupType::DifferentialFile => "G",
            BackupType::PartialFull => "P",
            BackupType::PartialDifferential => "Q",
        }
    }

    /// Decodes a catalog code.
    pub fn from_code(code: &str) -> Result<Self, TypeError> {
        match code.trim() {
            "D" => Ok(BackupType::Full),
            "I" => Ok(BackupType::Differential),
            "L" => Ok(BackupType::Log),
            "F" => Ok(BackupType::File),
            "G" => Ok(BackupType::DifferentialFile),
            "P" => Ok(BackupType::PartialFull),
            "Q" => Ok(BackupType::PartialDifferential),
            other => Err(TypeError::UnknownBackupType(other.to_string())),
        }
    }

    /// Secondary sort key inside a restore chain: full, then differential, then log.
    pub fn chain_rank(self) -> u8 {
        match self {
            BackupType::Full => 0,
            BackupType::PartialFull => 1,
            BackupType::File => 2,
            BackupType::Differential => 3,
            BackupType::PartialDifferential => 4,
            BackupType::DifferentialFile => 5,
            BackupType::Log => 6,
        }
    }

    /// Human-readable label used in reports and generated file names.
    pub fn label(self) -> &'static str {
        match self {
            BackupType::Full => "Full",
            BackupType::Differential => "Differential",
            BackupType::Log => "Log",
            BackupType::File => "File",
            BackupType::DifferentialFile => "Differential File",
            BackupType::PartialFull => "Partial Full",
            BackupType::PartialDifferential => "Partial Differential",
        }
    }
}

impl fmt::Display for BackupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BackupType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(ty) = BackupType::from_code(s) {
            return Ok(ty);
        }
        let lowered = s.trim().to_ascii_lowercase().replace(['_', '-', ' '], "");
        match lowered.as_str() {
            "full" | "database" => Ok(BackupType::Full),
            "diff" | "differential" => Ok(BackupType::Differential),
            "log" => Ok(BackupType::Log),
            "file" => Ok(BackupType::File),
            "differentialfile" | "difffile" => Ok(BackupType::DifferentialFile),
            "partialfull" | "partial" => Ok(BackupType::PartialFull),
            "partialdifferential" | "partialdiff" => Ok(BackupType::PartialDifferential),
            _ => Err(TypeError::UnknownBackupType(s.to_string())),
        }
    }
}

impl FromSql for BackupType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;
        BackupType::from_code(code).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for BackupType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

/// Physical medium a backup was written to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Code 2.
    Disk,
    /// Code 5.
    Tape,
    /// Code 6.
    Pipe,
    /// Code 7.
    VirtualDevice,
    /// Code 9.
    Url,
}

impl DeviceKind {
    /// Base catalog code for the kind (temporary device).
    pub fn code(self) -> i64 {
        match self {
            DeviceKind::Disk => 2,
            DeviceKind::Tape => 5,
            DeviceKind::Pipe => 6,
            DeviceKind::VirtualDevice => 7,
            DeviceKind::Url => 9,
        }
    }

    fn from_base_code(code: i64) -> Option<Self> {
        match code {
            2 => Some(DeviceKind::Disk),
            5 => Some(DeviceKind::Tape),
            6 => Some(DeviceKind::Pipe),
            7 => Some(DeviceKind::VirtualDevice),
            9 => Some(DeviceKind::Url),
            _ => None,
        }
    }

    /// Every catalog code (temporary and permanent) denoting this kind.
    pub fn codes(self) -> [i64; 2] {
        [self.code(), self.code() + PERMANENT_OFFSET]
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeviceKind::Disk => "Disk",
            DeviceKind::Tape => "Tape",
            DeviceKind::Pipe => "Pipe",
            DeviceKind::VirtualDevice => "Virtual Device",
            DeviceKind::Url => "URL",
        })
    }
}

impl FromStr for DeviceKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase().replace(['_', '-', ' '], "");
        match lowered.as_str() {
            "disk" => Ok(DeviceKind::Disk),
            "tape" => Ok(DeviceKind::Tape),
            "pipe" => Ok(DeviceKind::Pipe),
            "virtualdevice" | "vdi" => Ok(DeviceKind::VirtualDevice),
            "url" => Ok(DeviceKind::Url),
            _ => Err(TypeError::UnknownDeviceType(s.to_string())),
        }
    }
}

const PERMANENT_OFFSET: i64 = 100;

/// Decoded `backupmediafamily.device_type`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DeviceType {
    /// A recognised device kind; `permanent` is set for the `100+` codes.
    Known {
        /// Medium of the device.
        kind: DeviceKind,
        /// Whether the backup went to a permanent (logical) backup device.
        permanent: bool,
    },
    /// A code outside the documented table, kept verbatim.
    Unknown(i64),
}

impl DeviceType {
    /// Temporary device of the given kind.
    pub fn of(kind: DeviceKind) -> Self {
        DeviceType::Known {
            kind,
            permanent: false,
        }
    }

    /// Decodes a catalog device code.
    pub fn from_code(code: i64) -> Self {
        if let Some(kind) = DeviceKind::from_base_code(code) {
            return DeviceType::Known {
                kind,
                permanent: false,
            };
        }
        if let Some(kind) = DeviceKind::from_base_code(code - PERMANENT_OFFSET) {
            return DeviceType::Known {
                kind,
                permanent: true,
            };
        }
        DeviceType::Unknown(code)
    }

    /// Exact catalog code.
    pub fn code(self) -> i64 {
        match self {
            DeviceType::Known { kind, permanent } => {
                kind.code() + if permanent { PERMANENT_OFFSET } else { 0 }
            }
            DeviceType::Unknown(code) => code,
        }
    }

    /// Device kind, if the code is recognised.
    pub fn kind(self) -> Option<DeviceKind> {
        match self {
            DeviceType::Known { kind, .. } => Some(kind),
            DeviceType::Unknown(_) => None,
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::Known {
                kind,
                permanent: false,
            } => write!(f, "{kind}"),
            DeviceType::Known {
                kind,
                permanent: true,
            } => write!(f, "Permanent {kind}"),
            DeviceType::Unknown(code) => write!(f, "Unknown ({code})"),
        }
    }
}

impl Serialize for DeviceType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl FromSql for DeviceType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_i64().map(DeviceType::from_code)
    }
}

impl ToSql for DeviceType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}
