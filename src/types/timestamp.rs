use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Duration, PrimitiveDateTime};

use super::TypeError;

/// Zone-less catalog date-time (`backup_start_date`, `backup_finish_date`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp(pub PrimitiveDateTime);

impl Timestamp {
    /// Second-precision text, or `yyyyMMddHHmm` when `compact` is set.
    ///
    /// Built from the date-time components, so it cannot fail.
    pub fn stamp(&self, compact: bool) -> String {
        let (date, clock) = (self.0.date(), self.0.time());
        let (year, month, day) = (date.year(), u8::from(date.month()), date.day());
        if compact {
            format!(
                "{year:04}{month:02}{day:02}{:02}{:02}",
                clock.hour(),
                clock.minute()
            )
        } else {
            format!(
                "{year:04}-{month:02}-{day:02} {:02}:{:02}:{:02}",
                clock.hour(),
                clock.minute(),
                clock.second()
            )
        }
    }

    /// Signed whole seconds between `self` and a later `end`.
    pub fn seconds_until(&self, end: Timestamp) -> i64 {
        let delta: Duration = end.0 - self.0;
        delta.whole_seconds()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .0
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
            ))
            .map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for Timestamp {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let spaced = format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
        );
        let iso = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
        );
        let minutes = format_description!("[year]-[month]-[day] [hour]:[minute]");
        PrimitiveDateTime::parse(trimmed, spaced)
            .or_else(|_| PrimitiveDateTime::parse(trimmed, iso))
            .or_else(|_| PrimitiveDateTime::parse(trimmed, minutes))
            .or_else(|_| {
                time::Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
                    .map(|date| date.midnight())
            })
            .map(Timestamp)
            .map_err(|_| TypeError::InvalidTimestamp(s.to_string()))
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Timestamp::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Timestamp::from_str(text).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}
