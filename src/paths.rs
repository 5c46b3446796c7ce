#![forbid(unsafe_code)]

//! Planning of backup file paths.
//!
//! Turns a database, a backup type and a set of target directories into the
//! concrete device paths a striped backup writes to, using the naming
//! conventions operators expect from backup history.

use thiserror::Error;

use crate::types::{BackupType, Timestamp};

/// Operating system family of the instance that writes the files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum HostFlavor {
    /// Backslash separated paths.
    #[default]
    Windows,
    /// Forward slash separated paths.
    Linux,
}

impl HostFlavor {
    fn separator(self) -> char {
        match self {
            HostFlavor::Windows => '\\',
            HostFlavor::Linux => '/',
        }
    }
}

/// Error returned by [`plan_backup_paths`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathPlanError {
    /// No target directory was given.
    #[error("at least one backup directory is required")]
    NoDirectories,
    /// Empty database name.
    #[error("database name must not be empty")]
    EmptyDatabase,
    /// Striping across zero files.
    #[error("file count must be at least 1")]
    ZeroFileCount,
}

/// Inputs to [`plan_backup_paths`].
#[derive(Clone, Debug)]
pub struct BackupPathRequest {
    /// Database being backed up.
    pub database: String,
    /// Instance name used by the `instancename` token.
    pub instance: String,
    /// Host name used by the `servername` token.
    pub server_name: String,
    /// Kind of backup, which picks the default extension.
    pub backup_type: BackupType,
    /// Moment the backup is taken.
    pub timestamp: Timestamp,
    /// Target directories or URL containers.
    pub directories: Vec<String>,
    /// Number of stripes; the directory count wins when larger.
    pub file_count: usize,
    /// Explicit file name instead of `{database}_{timestamp}.{ext}`.
    pub file_name: Option<String>,
    /// Extension override, without the dot.
    pub extension: Option<String>,
    /// Substitute name tokens in an explicit file name.
    pub replace_in_name: bool,
    /// Put each file in a sub-directory named after the database.
    pub create_folder: bool,
    /// Prefix each file name with its stripe number.
    pub increment_prefix: bool,
    /// Separator convention of the target host.
    pub flavor: HostFlavor,
}

impl BackupPathRequest {
    /// A single-file request with default naming.
    pub fn new(
        database: impl Into<String>,
        backup_type: BackupType,
        timestamp: Timestamp,
        directory: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            instance: String::new(),
            server_name: String::new(),
            backup_type,
            timestamp,
            directories: vec![directory.into()],
            file_count: 1,
            file_name: None,
            extension: None,
            replace_in_name: false,
            create_folder: false,
            increment_prefix: false,
            flavor: HostFlavor::default(),
        }
    }
}

/// Default extension for a backup type, without the dot.
pub fn default_extension(backup_type: BackupType) -> &'static str {
    match backup_type {
        BackupType::Log => "trn",
        BackupType::Differential
        | BackupType::DifferentialFile
        | BackupType::PartialDifferential => "dif",
        BackupType::Full | BackupType::File | BackupType::PartialFull => "bak",
    }
}

/// Computes the device paths for one backup.
///
/// One path per stripe. With several directories, stripe `i` goes to
/// directory `i mod n`.
///
/// # Errors
///
/// Returns an error if no directory is given, the database name is empty or
/// `file_count` is zero.
pub fn plan_backup_paths(request: &BackupPathRequest) -> Result<Vec<String>, PathPlanError> {
    if request.directories.is_empty() {
        return Err(PathPlanError::NoDirectories);
    }
    if request.database.trim().is_empty() {
        return Err(PathPlanError::EmptyDatabase);
    }
    if request.file_count == 0 {
        return Err(PathPlanError::ZeroFileCount);
    }

    let count = request.file_count.max(request.directories.len());
    let extension = request
        .extension
        .as_deref()
        .map(|ext| ext.trim_start_matches('.'))
        .unwrap_or_else(|| default_extension(request.backup_type));
    let (stem, extension) = base_name(request, extension);

    let mut paths = Vec::with_capacity(count);
    for index in 0..count {
        let stripe = index + 1;
        let directory = &request.directories[index % request.directories.len()];
        let separator = if is_url(directory) {
            '/'
        } else {
            request.flavor.separator()
        };

        let mut name = String::new();
        if request.increment_prefix {
            name.push_str(&format!("{stripe}-"));
        }
        name.push_str(&stem);
        if count > 1 {
            name.push_str(&format!("-{stripe}-of-{count}"));
        }
        if !extension.is_empty() {
            name.push('.');
            name.push_str(&extension);
        }

        let mut path = normalize_directory(directory, separator);
        if request.create_folder {
            push_segment(&mut path, &request.database, separator);
        }
        push_segment(&mut path, &name, separator);
        paths.push(path);
    }
    Ok(paths)
}

fn base_name(request: &BackupPathRequest, default_ext: &str) -> (String, String) {
    let Some(explicit) = request.file_name.as_deref() else {
        let stem = format!("{}_{}", request.database, request.timestamp.stamp(true));
        return (stem, default_ext.to_string());
    };
    let explicit = if request.replace_in_name {
        replace_tokens(explicit, request)
    } else {
        explicit.to_string()
    };
    match explicit.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_string()),
        _ => (explicit, default_ext.to_string()),
    }
}

fn replace_tokens(name: &str, request: &BackupPathRequest) -> String {
    name.replace("dbname", &request.database)
        .replace("instancename", &request.instance)
        .replace("servername", &request.server_name)
        .replace("timestamp", &request.timestamp.stamp(true))
        .replace("backuptype", request.backup_type.label())
}

fn is_url(directory: &str) -> bool {
    let lower = directory.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("s3://")
}

fn normalize_directory(directory: &str, separator: char) -> String {
    let foreign = if separator == '/' { '\\' } else { '/' };
    let mut path: String = if is_url(directory) {
        directory.to_string()
    } else {
        directory.replace(foreign, &separator.to_string())
    };
    while path.len() > 1 && path.ends_with(separator) {
        path.pop();
    }
    path
}

fn push_segment(path: &mut String, segment: &str, separator: char) {
    if !path.is_empty() && !path.ends_with(separator) {
        path.push(separator);
    }
    path.push_str(segment);
}
