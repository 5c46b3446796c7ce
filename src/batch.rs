#![forbid(unsafe_code)]

//! Fan-out of history work across several catalogs.
//!
//! Each target is opened and processed on a blocking task; a semaphore caps
//! how many run at once. A target that fails produces an error outcome and
//! the others carry on.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task;
use tracing::{debug, error, info};

use crate::catalog::{CatalogOpenOptions, SqliteCatalog};
use crate::history::{self, HistorySelector};

/// One catalog to process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogTarget {
    /// Instance name reported on outcomes.
    pub instance: String,
    /// Catalog file.
    pub path: PathBuf,
}

impl CatalogTarget {
    /// Target named after the catalog's file stem.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let instance = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { instance, path }
    }

    /// Parses `INSTANCE=PATH`, or a bare path named after its file stem.
    pub fn parse(arg: &str) -> Self {
        match arg.split_once('=') {
            Some((instance, path)) if !instance.trim().is_empty() => Self {
                instance: instance.trim().to_string(),
                path: PathBuf::from(path.trim()),
            },
            _ => Self::from_path(arg.trim()),
        }
    }

    /// Opens the catalog read-only.
    pub fn open(&self) -> history::Result<HistorySelector<SqliteCatalog>> {
        let opts = CatalogOpenOptions::read_only().instance(self.instance.clone());
        let catalog = SqliteCatalog::open(&self.path, &opts)?;
        Ok(HistorySelector::new(catalog))
    }
}

/// Result of processing one target.
#[derive(Clone, Debug, Serialize)]
pub struct TargetOutcome<T> {
    /// Instance name.
    pub instance: String,
    /// Catalog file.
    pub path: PathBuf,
    /// Value produced, when the target succeeded.
    pub value: Option<T>,
    /// Failure message, when it did not.
    pub error: Option<String>,
}

impl<T> TargetOutcome<T> {
    /// Whether the target completed without error.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn failed(target: &CatalogTarget, message: String) -> Self {
        Self {
            instance: target.instance.clone(),
            path: target.path.clone(),
            value: None,
            error: Some(message),
        }
    }
}

/// Runs `work` against every target with at most `jobs` in flight.
///
/// Outcomes come back in target order regardless of completion order.
pub async fn for_each_target<T, F>(
    targets: Vec<CatalogTarget>,
    jobs: usize,
    work: F,
) -> Vec<TargetOutcome<T>>
where
    T: Send + 'static,
    F: Fn(&HistorySelector<SqliteCatalog>) -> history::Result<T> + Send + Sync + 'static,
{
    let jobs = jobs.max(1);
    let permits = Arc::new(Semaphore::new(jobs));
    let work = Arc::new(work);
    info!(targets = targets.len(), jobs, "processing catalogs");

    let mut handles = Vec::with_capacity(targets.len());
    for target in targets.iter().cloned() {
        let permits = Arc::clone(&permits);
        let work = Arc::clone(&work);
        handles.push(task::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|err| format!("worker pool closed: {err}"))?;
            debug!(instance = %target.instance, "catalog task started");
            task::spawn_blocking(move || {
                let selector = target.open()?;
                (*work)(&selector)
            })
            .await
            .map_err(|err| format!("catalog task failed: {err}"))?
            .map_err(|err| err.to_string())
        }));
    }

    let mut outcomes = Vec::with_capacity(targets.len());
    for (target, handle) in targets.iter().zip(handles) {
        let result = match handle.await {
            Ok(result) => result,
            Err(err) => Err(format!("catalog task failed: {err}")),
        };
        match result {
            Ok(value) => outcomes.push(TargetOutcome {
                instance: target.instance.clone(),
                path: target.path.clone(),
                value: Some(value),
                error: None,
            }),
            Err(message) => {
                error!(instance = %target.instance, error = %message, "catalog failed");
                outcomes.push(TargetOutcome::failed(target, message));
            }
        }
    }
    outcomes
}
