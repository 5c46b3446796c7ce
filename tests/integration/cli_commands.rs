#![allow(missing_docs)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

const BACKUP_SETS: &str = "\
backup_set_id,media_set_id,server_name,database_name,type,backup_start_date,backup_finish_date,first_lsn,last_lsn,checkpoint_lsn,database_backup_lsn,is_copy_only,last_recovery_fork_guid,backup_size,compressed_backup_size,software_major_version
1,1,SQL01,Payroll,D,2024-06-01 00:00:00,2024-06-01 00:20:00,1000,2000,1500,0,0,5b1e7c2a-3d4f-4e5a-8b9c-0d1e2f3a4b5c,4096,1024,16
2,2,SQL01,Payroll,I,2024-06-01 06:00:00,2024-06-01 06:05:00,3000,4000,3500,1500,0,5b1e7c2a-3d4f-4e5a-8b9c-0d1e2f3a4b5c,2048,,16
3,3,SQL01,Payroll,L,2024-06-01 07:00:00,2024-06-01 07:01:00,3900,5000,3500,1500,0,5b1e7c2a-3d4f-4e5a-8b9c-0d1e2f3a4b5c,512,,16
";

const MEDIA_FAMILIES: &str = "\
media_set_id,family_sequence_number,mirror,physical_device_name,device_type
1,1,0,D:\\Backups\\Payroll_1.bak,2
1,2,0,E:\\Backups\\Payroll_2.bak,2
2,1,0,D:\\Backups\\Payroll.dif,2
3,1,0,D:\\Backups\\Payroll.trn,2
";

struct Workspace {
    dir: TempDir,
    catalog: PathBuf,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let catalog = dir.path().join("sql01.db");
        let config = dir.path().join("config").join("cli.toml");
        Self {
            dir,
            catalog,
            config,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("backchain");
        cmd.env("BACKCHAIN_CONFIG", &self.config)
            .env_remove("RUST_LOG")
            .arg("--theme")
            .arg("plain");
        cmd
    }

    fn imported() -> Self {
        let ws = Self::new();
        let sets = ws.dir.path().join("backupset.csv");
        let media = ws.dir.path().join("backupmediafamily.csv");
        fs::write(&sets, BACKUP_SETS).expect("write sets");
        fs::write(&media, MEDIA_FAMILIES).expect("write media");
        ws.cmd()
            .arg("import")
            .arg("--catalog")
            .arg(&ws.catalog)
            .arg("--backup-sets")
            .arg(&sets)
            .arg("--media")
            .arg(&media)
            .arg("--create")
            .assert()
            .success();
        ws
    }
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("valid json")
}

fn stderr_of(cmd: &mut Command, code: i32) -> String {
    let output = cmd.assert().code(code).get_output().stderr.clone();
    String::from_utf8(output).expect("utf8")
}

fn ids(chain: &Value) -> Vec<i64> {
    chain
        .as_array()
        .expect("chain array")
        .iter()
        .map(|set| set["backup_set_id"].as_i64().expect("id"))
        .collect()
}

#[test]
fn init_creates_catalog() {
    let ws = Workspace::new();
    let json = json_stdout(
        ws.cmd()
            .args(["--format", "json", "init", "--catalog"])
            .arg(&ws.catalog),
    );
    assert_eq!(json["instance"], "sql01");
    assert!(ws.catalog.exists());
}

#[test]
fn import_then_chain_as_json() {
    let ws = Workspace::imported();
    let json = json_stdout(
        ws.cmd()
            .args(["--format", "json", "chain", "--catalog"])
            .arg(format!("SQL01={}", ws.catalog.display()))
            .args(["--database", "payroll"]),
    );
    let target = &json[0];
    assert_eq!(target["instance"], "SQL01");
    assert!(target["error"].is_null());
    let outcome = &target["value"][0];
    assert_eq!(outcome["database"], "Payroll");
    assert_eq!(ids(&outcome["chain"]), vec![1, 2, 3]);
}

#[test]
fn chain_reports_failed_catalogs() {
    let ws = Workspace::imported();
    let missing = ws.dir.path().join("gone.db");
    let stderr = stderr_of(
        ws.cmd()
            .args(["chain", "--catalog"])
            .arg(&ws.catalog)
            .arg("--catalog")
            .arg(&missing),
        1,
    );
    assert!(stderr.contains("1 of 2 catalog(s) failed"), "{stderr}");
}

#[test]
fn verify_passes_and_fails_with_exit_codes() {
    let ws = Workspace::imported();
    let json = json_stdout(
        ws.cmd()
            .args(["--format", "json", "verify", "Payroll", "--catalog"])
            .arg(&ws.catalog),
    );
    assert_eq!(json["success"], true);
    assert_eq!(json["counts"]["differential"], 1);

    let stderr = stderr_of(ws.cmd().args(["verify", "Ghost", "--catalog"]).arg(&ws.catalog), 2);
    assert!(stderr.contains("chain is empty"), "{stderr}");
}

#[test]
fn script_prints_restore_statements() {
    let ws = Workspace::imported();
    let output = ws
        .cmd()
        .args(["script", "Payroll", "--target-database", "Payroll_copy", "--catalog"])
        .arg(&ws.catalog)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3, "{text}");
    assert!(lines[0].starts_with("RESTORE DATABASE [Payroll_copy] FROM DISK = N'D:\\Backups\\Payroll_1.bak'"));
    assert!(lines[0].ends_with("WITH NORECOVERY"));
    assert!(lines[2].starts_with("RESTORE LOG [Payroll_copy]"));
    assert!(lines[2].ends_with("WITH RECOVERY"));
}

#[test]
fn plan_paths_uses_given_timestamp() {
    let ws = Workspace::new();
    let json = json_stdout(ws.cmd().args([
        "--format",
        "json",
        "plan-paths",
        "Sales",
        "--type",
        "log",
        "-d",
        "/var/opt/mssql/backup",
        "--flavor",
        "linux",
        "--timestamp",
        "2024-01-02 12:30:00",
    ]));
    assert_eq!(json, serde_json::json!(["/var/opt/mssql/backup/Sales_202401021230.trn"]));
}

#[test]
fn profiles_supply_catalogs() {
    let ws = Workspace::imported();
    ws.cmd()
        .args(["profile", "set", "nightly", "--jobs", "2", "--default", "--catalog"])
        .arg(&ws.catalog)
        .assert()
        .success();
    assert!(ws.config.exists());

    let profiles = json_stdout(ws.cmd().args(["--format", "json", "profile", "list"]));
    assert_eq!(profiles[0]["name"], "nightly");
    assert_eq!(profiles[0]["jobs"], 2);

    let json = json_stdout(ws.cmd().args([
        "--format", "json", "last", "Payroll", "--type", "log",
    ]));
    assert_eq!(json["backup"]["backup_set_id"], 3);

    let stderr = stderr_of(ws.cmd().args(["--profile", "missing", "profile", "list"]), 1);
    assert!(stderr.contains("profile 'missing' not found"), "{stderr}");
}

#[test]
fn completions_are_generated() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("utf8");
    assert!(text.contains("backchain"));
}

