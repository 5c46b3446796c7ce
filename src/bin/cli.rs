//! Binary entry point for the backchain CLI.
#![forbid(unsafe_code)]

#[path = "cli/config.rs"]
mod config;
#[path = "cli/ui.rs"]
mod ui;

use std::error::Error;
use std::io;
use std::path::PathBuf;

use backchain::{
    batch::{for_each_target, CatalogTarget, TargetOutcome},
    catalog::{CatalogOpenOptions, HistoryFilter, SqliteCatalog},
    cli::import_export::{export_history, run_import, write_history_csv, CliError, ImportConfig},
    history::{
        restore_script, verify_chain, BackupSet, ChainOptions, ChainOutcome, ChainVerifyReport,
        ForkSummary, HistorySelector, LastBackup, ScriptOptions, VerifySeverity,
    },
    logging::init_logging,
    paths::{plan_backup_paths, BackupPathRequest, HostFlavor},
    types::{BackupType, DeviceKind, Lsn, RecoveryForkId, Timestamp},
};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::Serialize;
use time::{OffsetDateTime, PrimitiveDateTime};

use config::{CliConfig, Profile, ProfileUpdate};
use ui::{format_duration, format_size, Theme, Ui};

const DEFAULT_JOBS: usize = 4;

#[derive(Parser, Debug)]
#[command(
    name = "backchain",
    version,
    about = "Backup history and restore chain reconstruction over backup catalogs",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[arg(
        long,
        global = true,
        env = "BACKCHAIN_CONFIG",
        value_name = "FILE",
        help = "CLI config file"
    )]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Profile to take defaults from")]
    profile: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "FILTER",
        help = "Tracing filter (falls back to RUST_LOG, then 'warn')"
    )]
    log_level: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = Theme::Auto)]
    theme: Theme,

    #[arg(short, long, global = true, help = "Plain, undecorated text output")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct CatalogArgs {
    #[arg(
        short = 'c',
        long = "catalog",
        value_name = "[INSTANCE=]PATH",
        action = ArgAction::Append,
        help = "Catalog file (repeatable where several are accepted)"
    )]
    catalogs: Vec<String>,
}

#[derive(Args, Debug, Default)]
struct ChainArgs {
    #[arg(long, value_name = "GUID", help = "Use this recovery fork instead of the latest")]
    fork: Option<RecoveryForkId>,

    #[arg(long, help = "Roll forward from the full backup with logs only")]
    ignore_diff: bool,

    #[arg(long, help = "Allow COPY_ONLY backups")]
    include_copy_only: bool,

    #[arg(long, help = "Keep mirrored media families")]
    include_mirror: bool,

    #[arg(
        long = "device",
        value_name = "KIND",
        action = ArgAction::Append,
        help = "Only backups written to this device kind (repeatable)"
    )]
    devices: Vec<DeviceKind>,

    #[arg(long, value_name = "TIME", help = "Ignore backups finishing before this time")]
    since: Option<Timestamp>,

    #[arg(long, value_name = "TIME", help = "Point-in-time target")]
    stop_at: Option<Timestamp>,
}

#[derive(Args, Debug)]
struct ImportCmd {
    #[command(flatten)]
    catalog: CatalogArgs,

    #[arg(long, value_name = "FILE", help = "CSV export of backupset")]
    backup_sets: PathBuf,

    #[arg(long, value_name = "FILE", help = "CSV export of backupmediafamily")]
    media: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "CSV export of backupfile")]
    files: Option<PathBuf>,

    #[arg(long, help = "Create the catalog if it does not exist")]
    create: bool,
}

#[derive(Args, Debug)]
struct HistoryCmd {
    #[command(flatten)]
    catalog: CatalogArgs,

    #[arg(short, long = "database", action = ArgAction::Append)]
    databases: Vec<String>,

    #[arg(long = "exclude", value_name = "DATABASE", action = ArgAction::Append)]
    exclude: Vec<String>,

    #[arg(long = "type", value_name = "TYPE", action = ArgAction::Append)]
    types: Vec<BackupType>,

    #[arg(long = "device", value_name = "KIND", action = ArgAction::Append)]
    devices: Vec<DeviceKind>,

    #[arg(long, value_name = "TIME")]
    since: Option<Timestamp>,

    #[arg(long)]
    include_copy_only: bool,

    #[arg(long)]
    include_mirror: bool,

    #[arg(long, value_name = "LSN", help = "Only backups ending after this LSN")]
    min_lsn: Option<Lsn>,

    #[arg(long, value_name = "GUID")]
    fork: Option<RecoveryForkId>,

    #[arg(long, value_name = "FILE", help = "Write the listing as CSV ('-' for stdout)")]
    csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ChainCmd {
    #[command(flatten)]
    catalog: CatalogArgs,

    #[arg(short, long = "database", action = ArgAction::Append)]
    databases: Vec<String>,

    #[arg(long = "exclude", value_name = "DATABASE", action = ArgAction::Append)]
    exclude: Vec<String>,

    #[arg(short, long, help = "Catalogs processed concurrently")]
    jobs: Option<usize>,

    #[command(flatten)]
    chain: ChainArgs,
}

#[derive(Args, Debug)]
struct ScriptCmd {
    #[command(flatten)]
    catalog: CatalogArgs,

    #[arg(value_name = "DATABASE")]
    database: String,

    #[arg(long, help = "Restore under a different database name")]
    target_database: Option<String>,

    #[arg(long, help = "Overwrite an existing database")]
    replace: bool,

    #[arg(long, help = "Leave the database in the restoring state")]
    no_recovery: bool,

    #[command(flatten)]
    chain: ChainArgs,
}

#[derive(Args, Debug)]
struct PlanPathsCmd {
    #[arg(value_name = "DATABASE")]
    database: String,

    #[arg(long = "type", value_name = "TYPE", default_value = "full")]
    backup_type: BackupType,

    #[arg(
        short = 'd',
        long = "directory",
        value_name = "DIR",
        action = ArgAction::Append,
        required = true
    )]
    directories: Vec<String>,

    #[arg(long, default_value_t = 1)]
    file_count: usize,

    #[arg(long)]
    file_name: Option<String>,

    #[arg(long)]
    extension: Option<String>,

    #[arg(long)]
    replace_in_name: bool,

    #[arg(long)]
    create_folder: bool,

    #[arg(long)]
    increment_prefix: bool,

    #[arg(long, value_enum, default_value_t = HostFlavor::Windows)]
    flavor: HostFlavor,

    #[arg(long, default_value = "")]
    instance: String,

    #[arg(long, default_value = "")]
    server: String,

    #[arg(long, value_name = "TIME", help = "Backup time (defaults to now, UTC)")]
    timestamp: Option<Timestamp>,
}

#[derive(Subcommand, Debug)]
enum ProfileCmd {
    #[command(about = "List configured profiles")]
    List,
    #[command(about = "Show one profile")]
    Show { name: String },
    #[command(about = "Create or update a profile")]
    Set {
        name: String,
        #[arg(short = 'c', long = "catalog", action = ArgAction::Append)]
        catalogs: Vec<String>,
        #[arg(long)]
        jobs: Option<usize>,
        #[arg(long)]
        include_copy_only: Option<bool>,
        #[arg(long = "device", action = ArgAction::Append)]
        devices: Vec<DeviceKind>,
        #[arg(long, help = "Make this the default profile")]
        default: bool,
    },
    #[command(about = "Delete a profile")]
    Delete { name: String },
    #[command(about = "Set or clear the default profile")]
    Default { name: Option<String> },
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Create an empty catalog")]
    Init {
        #[command(flatten)]
        catalog: CatalogArgs,
    },

    #[command(about = "Import backup catalog CSV exports")]
    Import(ImportCmd),

    #[command(about = "List backup history")]
    History(HistoryCmd),

    #[command(about = "Show the latest backup of one type")]
    Last {
        #[command(flatten)]
        catalog: CatalogArgs,
        #[arg(value_name = "DATABASE")]
        database: String,
        #[arg(long = "type", value_name = "TYPE", default_value = "full")]
        backup_type: BackupType,
        #[command(flatten)]
        chain: ChainArgs,
    },

    #[command(about = "List recovery forks of a database")]
    Forks {
        #[command(flatten)]
        catalog: CatalogArgs,
        #[arg(value_name = "DATABASE")]
        database: String,
        #[command(flatten)]
        chain: ChainArgs,
    },

    #[command(about = "Reconstruct restore chains")]
    Chain(ChainCmd),

    #[command(about = "Check that the latest chain restores cleanly")]
    Verify {
        #[command(flatten)]
        catalog: CatalogArgs,
        #[arg(value_name = "DATABASE")]
        database: String,
        #[command(flatten)]
        chain: ChainArgs,
    },

    #[command(about = "Print RESTORE statements for the latest chain")]
    Script(ScriptCmd),

    #[command(about = "Plan backup file paths")]
    PlanPaths(PlanPathsCmd),

    #[command(subcommand, about = "Manage CLI profiles")]
    Profile(ProfileCmd),

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let level = cli
        .log_level
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "warn".to_string());
    init_logging(&level)?;

    let ui = Ui::new(cli.theme, cli.quiet);
    let mut config = CliConfig::load(cli.config.clone())?;
    let profile = config.active_profile(cli.profile.as_deref())?.cloned();
    let format = cli.format;

    match cli.command {
        Command::Init { catalog } => {
            let target = single_target(&catalog, &config, profile.as_ref())?;
            let opts = CatalogOpenOptions {
                create_if_missing: true,
                ..CatalogOpenOptions::default()
            };
            SqliteCatalog::open(&target.path, &opts)?;
            let report = InitReport {
                instance: target.instance,
                path: target.path,
            };
            emit(format, &report, || {
                ui.success(&format!(
                    "Catalog {} ready at {}",
                    report.instance,
                    report.path.display()
                ))
            })?;
        }
        Command::Import(cmd) => {
            let target = single_target(&cmd.catalog, &config, profile.as_ref())?;
            let cfg = ImportConfig {
                catalog_path: target.path,
                create_if_missing: cmd.create,
                backup_sets: cmd.backup_sets,
                media_families: cmd.media,
                backup_files: cmd.files,
            };
            let counts = run_import(&cfg).map_err(into_boxed_error)?;
            emit(format, &counts, || {
                ui.success(&format!(
                    "Imported {} backup sets, {} media families and {} files",
                    counts.backup_sets, counts.media_families, counts.backup_files
                ))
            })?;
        }
        Command::History(cmd) => {
            let selector = open_selector(&cmd.catalog, &config, profile.as_ref())?;
            let filter = build_history_filter(&cmd, profile.as_ref());
            let sets = selector.list_history(&filter)?;
            match cmd.csv.as_deref() {
                Some(path) if path.as_os_str() == "-" => {
                    write_history_csv(io::stdout().lock(), &sets).map_err(into_boxed_error)?;
                }
                Some(path) => {
                    let written = export_history(path, &sets).map_err(into_boxed_error)?;
                    ui.success(&format!(
                        "Exported {written} backup sets to {}",
                        path.display()
                    ));
                }
                None => emit(format, &sets, || print_history_text(&ui, &sets))?,
            }
        }
        Command::Last {
            catalog,
            database,
            backup_type,
            chain,
        } => {
            let selector = open_selector(&catalog, &config, profile.as_ref())?;
            let opts = build_chain_options(&chain, profile.as_ref());
            let last = selector.last_of_type(&database, backup_type, &opts)?;
            emit(format, &last, || print_last_text(&ui, &last))?;
        }
        Command::Forks {
            catalog,
            database,
            chain,
        } => {
            let selector = open_selector(&catalog, &config, profile.as_ref())?;
            let opts = build_chain_options(&chain, profile.as_ref());
            let forks = selector.recovery_forks(&database, &opts)?;
            emit(format, &forks, || print_forks_text(&ui, &database, &forks))?;
        }
        Command::Chain(cmd) => {
            let targets = resolve_targets(&cmd.catalog, &config, profile.as_ref())?;
            let jobs = cmd
                .jobs
                .or(profile.as_ref().and_then(|p| p.jobs))
                .unwrap_or(DEFAULT_JOBS);
            let filter = HistoryFilter::new()
                .databases(cmd.databases.iter().cloned())
                .exclude_databases(cmd.exclude.iter().cloned());
            let opts = build_chain_options(&cmd.chain, profile.as_ref());

            let task = ui.task(format!("Reading {} catalog(s)", targets.len()));
            let outcomes = for_each_target(targets, jobs, move |selector| {
                selector.last_chains(&filter, &opts)
            })
            .await;
            let elapsed = task.finish();

            emit(format, &outcomes, || {
                print_chain_text(&ui, &outcomes);
                ui.info(&format!("Finished in {}", format_duration(elapsed)));
            })?;
            let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
            if failed > 0 {
                return Err(format!("{failed} of {} catalog(s) failed", outcomes.len()).into());
            }
        }
        Command::Verify {
            catalog,
            database,
            chain,
        } => {
            let selector = open_selector(&catalog, &config, profile.as_ref())?;
            let opts = build_chain_options(&chain, profile.as_ref());
            let outcome = selector.last_chain(&database, &opts)?;
            let report = verify_chain(&outcome.chain);
            emit(format, &report, || print_verify_text(&ui, &database, &report))?;
            if !report.success {
                std::process::exit(2);
            }
        }
        Command::Script(cmd) => {
            let selector = open_selector(&cmd.catalog, &config, profile.as_ref())?;
            let opts = build_chain_options(&cmd.chain, profile.as_ref());
            let outcome = selector.last_chain(&cmd.database, &opts)?;
            for warning in &outcome.warnings {
                ui.warn(&warning.to_string());
            }
            let script_opts = ScriptOptions {
                target_database: cmd.target_database,
                replace: cmd.replace,
                no_recovery: cmd.no_recovery,
                stop_at: cmd.chain.stop_at,
            };
            let statements = restore_script(&outcome.chain, &script_opts)?;
            emit(format, &statements, || {
                for statement in &statements {
                    println!("{statement}");
                }
            })?;
        }
        Command::PlanPaths(cmd) => {
            let request = build_path_request(cmd);
            let paths = plan_backup_paths(&request)?;
            emit(format, &paths, || {
                for path in &paths {
                    println!("{path}");
                }
            })?;
        }
        Command::Profile(cmd) => run_profile(cmd, &mut config, format, &ui)?,
        Command::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "backchain", &mut io::stdout());
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct InitReport {
    instance: String,
    path: PathBuf,
}

fn resolve_targets(
    args: &CatalogArgs,
    config: &CliConfig,
    profile: Option<&Profile>,
) -> Result<Vec<CatalogTarget>, CliError> {
    if !args.catalogs.is_empty() {
        return Ok(args.catalogs.iter().map(|s| CatalogTarget::parse(s)).collect());
    }
    if let Some(profile) = profile.filter(|p| !p.catalogs.is_empty()) {
        return Ok(profile
            .catalogs
            .iter()
            .map(|s| CatalogTarget::parse(s))
            .collect());
    }
    if let Some(path) = config.default_catalog() {
        return Ok(vec![CatalogTarget::from_path(path.clone())]);
    }
    Err(CliError::Message(
        "no catalog given; pass --catalog or configure a profile".into(),
    ))
}

fn single_target(
    args: &CatalogArgs,
    config: &CliConfig,
    profile: Option<&Profile>,
) -> Result<CatalogTarget, CliError> {
    let mut targets = resolve_targets(args, config, profile)?;
    if targets.len() > 1 {
        return Err(CliError::Message(
            "this command reads a single catalog; pass one --catalog".into(),
        ));
    }
    targets
        .pop()
        .ok_or_else(|| CliError::Message("no catalog given".into()))
}

fn open_selector(
    args: &CatalogArgs,
    config: &CliConfig,
    profile: Option<&Profile>,
) -> Result<HistorySelector<SqliteCatalog>, Box<dyn Error>> {
    let target = single_target(args, config, profile)?;
    Ok(target.open()?)
}

fn build_chain_options(args: &ChainArgs, profile: Option<&Profile>) -> ChainOptions {
    let include_copy_only = args.include_copy_only
        || profile
            .and_then(|p| p.include_copy_only)
            .unwrap_or(false);
    let device_kinds = if args.devices.is_empty() {
        profile.map(|p| p.device_types.clone()).unwrap_or_default()
    } else {
        args.devices.clone()
    };
    ChainOptions {
        recovery_fork: args.fork,
        ignore_differential: args.ignore_diff,
        include_copy_only,
        device_kinds,
        since: args.since,
        stop_at: args.stop_at,
        include_mirror: args.include_mirror,
    }
}

fn build_history_filter(cmd: &HistoryCmd, profile: Option<&Profile>) -> HistoryFilter {
    let include_copy_only = cmd.include_copy_only
        || profile
            .and_then(|p| p.include_copy_only)
            .unwrap_or(false);
    let devices = if cmd.devices.is_empty() {
        profile.map(|p| p.device_types.clone()).unwrap_or_default()
    } else {
        cmd.devices.clone()
    };
    HistoryFilter::new()
        .databases(cmd.databases.iter().cloned())
        .exclude_databases(cmd.exclude.iter().cloned())
        .backup_types(cmd.types.iter().copied())
        .device_kinds(devices)
        .since(cmd.since)
        .include_copy_only(include_copy_only)
        .include_mirror(cmd.include_mirror)
        .min_last_lsn(cmd.min_lsn)
        .recovery_fork(cmd.fork)
}

fn build_path_request(cmd: PlanPathsCmd) -> BackupPathRequest {
    let timestamp = cmd.timestamp.unwrap_or_else(|| {
        let now = OffsetDateTime::now_utc();
        Timestamp(PrimitiveDateTime::new(now.date(), now.time()))
    });
    BackupPathRequest {
        database: cmd.database,
        instance: cmd.instance,
        server_name: cmd.server,
        backup_type: cmd.backup_type,
        timestamp,
        directories: cmd.directories,
        file_count: cmd.file_count,
        file_name: cmd.file_name,
        extension: cmd.extension,
        replace_in_name: cmd.replace_in_name,
        create_folder: cmd.create_folder,
        increment_prefix: cmd.increment_prefix,
        flavor: cmd.flavor,
    }
}

fn run_profile(
    cmd: ProfileCmd,
    config: &mut CliConfig,
    format: OutputFormat,
    ui: &Ui,
) -> Result<(), Box<dyn Error>> {
    match cmd {
        ProfileCmd::List => {
            let profiles: Vec<&Profile> = config.profiles().collect();
            let default = config.default_profile_name();
            emit(format, &profiles, || {
                ui.list(
                    "Profiles",
                    profiles.iter().map(|p| {
                        if Some(p.name.as_str()) == default {
                            format!("{} (default)", p.name)
                        } else {
                            p.name.clone()
                        }
                    }),
                );
            })?;
        }
        ProfileCmd::Show { name } => {
            let profile = config.profile(&name).ok_or_else(|| {
                CliError::Message(format!("profile '{name}' not found"))
            })?;
            emit(format, profile, || print_profile_text(ui, profile))?;
        }
        ProfileCmd::Set {
            name,
            catalogs,
            jobs,
            include_copy_only,
            devices,
            default,
        } => {
            config.upsert_profile(
                &name,
                ProfileUpdate {
                    catalogs,
                    jobs,
                    include_copy_only,
                    device_types: devices,
                },
            )?;
            if default {
                config.set_default_profile(Some(&name))?;
            }
            let path = config.persist()?;
            ui.success(&format!("Saved profile '{name}' to {}", path.display()));
        }
        ProfileCmd::Delete { name } => {
            config.delete_profile(&name)?;
            let path = config.persist()?;
            ui.success(&format!("Deleted profile '{name}' from {}", path.display()));
        }
        ProfileCmd::Default { name } => {
            config.set_default_profile(name.as_deref())?;
            let path = config.persist()?;
            match name {
                Some(name) => ui.success(&format!("Default profile is now '{name}'")),
                None => ui.success("Default profile cleared"),
            }
            ui.info(&format!("Config written to {}", path.display()));
        }
    }
    Ok(())
}

fn into_boxed_error(err: CliError) -> Box<dyn Error> {
    Box::new(err)
}

fn emit<T, F>(format: OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: Serialize + ?Sized,
    F: FnOnce(),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(),
    }
    Ok(())
}

fn set_row(set: &BackupSet) -> Vec<String> {
    vec![
        set.database.clone(),
        set.backup_type.code().to_string(),
        set.backup_set_id.to_string(),
        set.start.stamp(false),
        set.end.stamp(false),
        set.first_lsn.to_string(),
        set.last_lsn.to_string(),
        format_size(set.total_size),
        format!("{:.2}", set.compression_ratio),
        set.paths().join(", "),
    ]
}

const SET_HEADER: [&str; 10] = [
    "database", "type", "id", "start", "end", "first_lsn", "last_lsn", "size", "ratio", "paths",
];

fn print_history_text(ui: &Ui, sets: &[BackupSet]) {
    let rows: Vec<Vec<String>> = sets.iter().map(set_row).collect();
    ui.table(&format!("Backup history ({} sets)", sets.len()), &SET_HEADER, &rows);
}

fn print_last_text(ui: &Ui, last: &LastBackup) {
    for warning in &last.warnings {
        ui.warn(&warning.to_string());
    }
    match &last.backup {
        Some(set) => {
            ui.section(
                &format!("Last {} backup of {}", last.backup_type, last.database),
                [
                    ("instance", last.instance.clone()),
                    ("backup_set_id", set.backup_set_id.to_string()),
                    ("finished", set.end.to_string()),
                    ("first_lsn", set.first_lsn.to_string()),
                    ("last_lsn", set.last_lsn.to_string()),
                    ("fork", set.recovery_fork_id.to_string()),
                    ("size", format_size(set.total_size)),
                    ("paths", set.paths().join(", ")),
                ],
            );
        }
        None => ui.info(&format!(
            "No {} backup found for {} on {}",
            last.backup_type, last.database, last.instance
        )),
    }
}

fn print_forks_text(ui: &Ui, database: &str, forks: &[ForkSummary]) {
    let rows: Vec<Vec<String>> = forks
        .iter()
        .map(|f| {
            vec![
                f.fork.to_string(),
                f.first_lsn.to_string(),
                f.last_lsn.to_string(),
                f.first_start.stamp(false),
                f.last_end.stamp(false),
                f.backup_count.to_string(),
            ]
        })
        .collect();
    ui.table(
        &format!("Recovery forks of {database}"),
        &["fork", "first_lsn", "last_lsn", "first_start", "last_end", "backups"],
        &rows,
    );
}

fn print_chain_text(ui: &Ui, outcomes: &[TargetOutcome<Vec<ChainOutcome>>]) {
    for target in outcomes {
        if let Some(message) = &target.error {
            ui.error(&format!("{}: {message}", target.instance));
            continue;
        }
        for chain in target.value.iter().flatten() {
            for warning in &chain.warnings {
                ui.warn(&format!("{}: {warning}", target.instance));
            }
            if !chain.has_chain() {
                continue;
            }
            let rows: Vec<Vec<String>> = chain.chain.iter().map(set_row).collect();
            ui.table(
                &format!("{} / {}", target.instance, chain.database),
                &SET_HEADER,
                &rows,
            );
            ui.spacer();
        }
    }
}

fn print_verify_text(ui: &Ui, database: &str, report: &ChainVerifyReport) {
    let reaches = report
        .counts
        .reaches_lsn
        .map(|lsn| lsn.to_string())
        .unwrap_or_else(|| "-".into());
    ui.section(
        &format!("Chain verification for {database}"),
        [
            ("full", report.counts.full.to_string()),
            ("differential", report.counts.differential.to_string()),
            ("log", report.counts.log.to_string()),
            ("reaches_lsn", reaches),
        ],
    );
    for finding in &report.findings {
        let subject = finding
            .backup_set_id
            .map(|id| format!("[set {id}] "))
            .unwrap_or_default();
        let message = format!("{subject}{}", finding.message);
        match finding.severity {
            VerifySeverity::Info => ui.info(&message),
            VerifySeverity::Warning => ui.warn(&message),
            VerifySeverity::Error => ui.error(&message),
        }
    }
    if report.success {
        ui.success("Chain is restorable");
    }
}

fn print_profile_text(ui: &Ui, profile: &Profile) {
    let devices = profile
        .device_types
        .iter()
        .map(|kind| kind.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    ui.section(
        &format!("Profile {}", profile.name),
        [
            ("catalogs", profile.catalogs.join(", ")),
            (
                "jobs",
                profile
                    .jobs
                    .map(|jobs| jobs.to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
            (
                "include_copy_only",
                profile
                    .include_copy_only
                    .map(|flag| flag.to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
            ("device_types", devices),
        ],
    );
}
