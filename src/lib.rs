//! Backup history selection and restore chain reconstruction over an
//! msdb-shaped backup catalog.
//!
//! The [`catalog`] layer reads joined backup rows, [`history`] groups them
//! into backup sets and derives restore chains, [`paths`] plans backup file
//! names and [`batch`] fans work out across several catalogs.

#![warn(missing_docs)]

pub mod batch;
pub mod catalog;
pub mod cli;
pub mod history;
pub mod logging;
pub mod paths;
pub mod types;
