use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TypeError;

/// Identifier of a branch in a database's recovery history.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecoveryForkId(pub Uuid);

impl fmt::Display for RecoveryForkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated().to_string().to_ascii_uppercase())
    }
}

impl FromStr for RecoveryForkId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(RecoveryForkId)
            .map_err(|_| TypeError::InvalidForkId(s.to_string()))
    }
}

impl From<Uuid> for RecoveryForkId {
    fn from(value: Uuid) -> Self {
        RecoveryForkId(value)
    }
}

impl FromSql for RecoveryForkId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Blob(bytes) => Uuid::from_slice(bytes)
                .map(RecoveryForkId)
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            other => {
                let text = other.as_str()?;
                RecoveryForkId::from_str(text).map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    }
}

impl ToSql for RecoveryForkId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}
