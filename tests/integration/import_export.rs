#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use backchain::{
    catalog::{CatalogOpenOptions, HistoryFilter, SqliteCatalog},
    cli::import_export::{export_history, run_import, ImportConfig},
    history::{ChainOptions, HistorySelector},
    types::Lsn,
};
use csv::ReaderBuilder;
use tempfile::TempDir;

const BACKUP_SETS: &str = "\
backup_set_id,media_set_id,server_name,database_name,type,backup_start_date,backup_finish_date,first_lsn,last_lsn,checkpoint_lsn,database_backup_lsn,is_copy_only,last_recovery_fork_guid,backup_size,compressed_backup_size,software_major_version,user_name,name
1,1,SQL01,Payroll,D,2024-06-01 00:00:00,2024-06-01 00:20:00,41000000012300001,41000000015600001,41000000014000001,0,0,5b1e7c2a-3d4f-4e5a-8b9c-0d1e2f3a4b5c,52428800,13107200,16,sa,Payroll-Full
2,2,SQL01,Payroll,L,2024-06-01 01:00:00,2024-06-01 01:01:00,41000000015600001,41000000099900001,41000000014000001,41000000014000001,0,5b1e7c2a-3d4f-4e5a-8b9c-0d1e2f3a4b5c,1048576,,16,sa,
3,3,SQL01,Payroll,L,2024-06-01 02:00:00,2024-06-01 02:01:00,41000000099900001,410000000100000001,41000000014000001,41000000014000001,0,5b1e7c2a-3d4f-4e5a-8b9c-0d1e2f3a4b5c,1048576,,16,sa,
4,4,SQL01,Payroll,D,2024-06-01 03:00:00,2024-06-01 03:05:00,410000000100000001,410000000100000500,410000000100000200,0,1,5b1e7c2a-3d4f-4e5a-8b9c-0d1e2f3a4b5c,52428800,,16,sa,adhoc
";

const MEDIA_FAMILIES: &str = "\
media_set_id,family_sequence_number,mirror,physical_device_name,device_type
1,1,0,/var/opt/mssql/backup/Payroll_full_1.bak,2
1,2,0,/var/opt/mssql/backup/Payroll_full_2.bak,2
2,1,0,/var/opt/mssql/backup/Payroll_1.trn,2
3,1,0,/var/opt/mssql/backup/Payroll_2.trn,2
4,1,0,/tmp/Payroll_adhoc.bak,2
";

const BACKUP_FILES: &str = "\
backup_set_id,logical_name,physical_name,file_type
1,Payroll,/var/opt/mssql/data/Payroll.mdf,D
1,Payroll_log,/var/opt/mssql/data/Payroll_log.ldf,L
";

fn write_exports(dir: &Path) -> ImportConfig {
    let sets = dir.join("backupset.csv");
    let media = dir.join("backupmediafamily.csv");
    let files = dir.join("backupfile.csv");
    fs::write(&sets, BACKUP_SETS).expect("write sets");
    fs::write(&media, MEDIA_FAMILIES).expect("write media");
    fs::write(&files, BACKUP_FILES).expect("write files");
    ImportConfig {
        catalog_path: dir.join("msdb.db"),
        create_if_missing: true,
        backup_sets: sets,
        media_families: Some(media),
        backup_files: Some(files),
    }
}

fn imported() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let cfg = write_exports(dir.path());
    let counts = run_import(&cfg).expect("import");
    assert_eq!(counts.backup_sets, 4);
    assert_eq!(counts.media_families, 5);
    assert_eq!(counts.backup_files, 2);
    (dir, cfg.catalog_path)
}

#[test]
fn imported_history_builds_a_chain() {
    let (_dir, path) = imported();
    let catalog = SqliteCatalog::open(&path, &CatalogOpenOptions::read_only()).expect("open");
    let selector = HistorySelector::new(catalog);

    let outcome = selector
        .last_chain("Payroll", &ChainOptions::default())
        .expect("chain");
    let ids: Vec<i64> = outcome.chain.iter().map(|s| s.backup_set_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(outcome.chain[2].last_lsn, Lsn(410_000_000_100_000_001));

    let full = &outcome.chain[0];
    assert_eq!(full.backup_name.as_deref(), Some("Payroll-Full"));
    assert_eq!(full.stripe_count(), 2);
    assert_eq!(full.files.len(), 2);
    assert!((full.compression_ratio - 4.0).abs() < f64::EPSILON);
    assert!((outcome.chain[1].compression_ratio - 1.0).abs() < f64::EPSILON);
}

#[test]
fn copy_only_rows_come_back_when_asked_for() {
    let (_dir, path) = imported();
    let catalog = SqliteCatalog::open(&path, &CatalogOpenOptions::read_only()).expect("open");
    let selector = HistorySelector::new(catalog);
    let sets = selector
        .list_history(&HistoryFilter::new().include_copy_only(true))
        .expect("history");
    assert_eq!(sets.len(), 4);
    assert_eq!(sets[0].backup_set_id, 4);
    assert!(sets[0].is_copy_only);
}

#[test]
fn exported_history_round_trips_through_csv() {
    let (dir, path) = imported();
    let catalog = SqliteCatalog::open(&path, &CatalogOpenOptions::read_only()).expect("open");
    let selector = HistorySelector::new(catalog);
    let sets = selector
        .list_history(&HistoryFilter::new().database("payroll"))
        .expect("history");

    let out = dir.path().join("history.csv");
    let written = export_history(&out, &sets).expect("export");
    assert_eq!(written, 3);

    let mut reader = ReaderBuilder::new().from_path(&out).expect("reader");
    let headers = reader.headers().expect("headers").clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .unwrap_or_else(|| panic!("missing column {name}"))
    };
    let (id, last_lsn, paths, kind) = (
        column("backup_set_id"),
        column("last_lsn"),
        column("paths"),
        column("backup_type"),
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("record")).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][id], "3");
    assert_eq!(&rows[0][last_lsn], "410000000100000001");
    assert_eq!(&rows[0][kind], "L");
    assert_eq!(
        &rows[2][paths],
        "/var/opt/mssql/backup/Payroll_full_1.bak|/var/opt/mssql/backup/Payroll_full_2.bak"
    );
}
