#![allow(missing_docs)]

use std::path::PathBuf;

use backchain::{
    catalog::{
        BackupCatalog, BackupFileRecord, BackupSetRecord, CatalogError, CatalogOpenOptions,
        HistoryFilter, MediaFamilyRecord, SqliteCatalog,
    },
    history::{ChainOptions, HistorySelector},
    types::{BackupType, DeviceKind, DeviceType, Lsn},
};
use tempfile::TempDir;

const FORK: &str = "2f3a0c5e-8d61-4b7a-9e0f-1c2d3e4f5a6b";

fn catalog_path(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(format!("{name}.db"));
    (dir, path)
}

fn set(id: i64, database: &str, ty: BackupType, lsns: (u128, u128, u128, u128), end: &str) -> BackupSetRecord {
    let (first, last, checkpoint, base) = lsns;
    let finish = end.parse().expect("finish time");
    BackupSetRecord {
        backup_set_id: id,
        media_set_id: id,
        server_name: "SQL01".into(),
        database_name: database.into(),
        backup_type: ty,
        backup_start_date: finish,
        backup_finish_date: finish,
        first_lsn: Lsn(first),
        last_lsn: Lsn(last),
        checkpoint_lsn: Lsn(checkpoint),
        database_backup_lsn: Lsn(base),
        is_copy_only: false,
        last_recovery_fork_guid: FORK.parse().expect("fork"),
        backup_size: 10_000,
        compressed_backup_size: Some(2_500),
        software_major_version: 15,
        user_name: "svc_backup".into(),
        name: None,
    }
}

fn media(media_set_id: i64, family: u32, mirror: u32, path: &str, device_type: i64) -> MediaFamilyRecord {
    MediaFamilyRecord {
        media_set_id,
        family_sequence_number: family,
        mirror,
        physical_device_name: path.into(),
        device_type,
    }
}

fn seeded(path: &PathBuf) -> SqliteCatalog {
    let opts = CatalogOpenOptions {
        create_if_missing: true,
        ..CatalogOpenOptions::default()
    }
    .instance("SQL01");
    let mut catalog = SqliteCatalog::open(path, &opts).expect("create catalog");
    catalog
        .record_backup(
            &set(1, "Sales", BackupType::Full, (100, 200, 150, 0), "2024-01-01 01:00:00"),
            &[
                media(1, 1, 0, "D:\\Backups\\Sales_1-of-2.bak", 2),
                media(1, 2, 0, "E:\\Backups\\Sales_2-of-2.bak", 2),
                media(1, 1, 1, "\\\\mirror\\Sales_1-of-2.bak", 2),
                media(1, 2, 1, "\\\\mirror\\Sales_2-of-2.bak", 2),
            ],
            &[
                BackupFileRecord {
                    backup_set_id: 1,
                    logical_name: "Sales".into(),
                    physical_name: "D:\\Data\\Sales.mdf".into(),
                    file_type: "D".into(),
                },
                BackupFileRecord {
                    backup_set_id: 1,
                    logical_name: "Sales_log".into(),
                    physical_name: "L:\\Logs\\Sales_log.ldf".into(),
                    file_type: "L".into(),
                },
            ],
        )
        .expect("record full");
    catalog
        .record_backup(
            &set(2, "Sales", BackupType::Log, (190, 300, 150, 150), "2024-01-01 02:00:00"),
            &[media(2, 1, 0, "SalesLogDevice", 102)],
            &[],
        )
        .expect("record log");
    catalog
        .record_backup(
            &set(3, "Inventory", BackupType::Full, (500, 600, 550, 0), "2024-01-01 03:00:00"),
            &[media(3, 1, 0, "https://acct.blob.core.windows.net/backups/inv.bak", 9)],
            &[],
        )
        .expect("record inventory");
    catalog
}

#[test]
fn missing_catalog_is_reported() {
    let (_dir, path) = catalog_path("absent");
    let err = SqliteCatalog::open(&path, &CatalogOpenOptions::read_only())
        .expect_err("missing catalog should fail");
    assert!(matches!(err, CatalogError::MissingCatalog(ref p) if *p == path));
    assert!(!path.exists());
}

#[test]
fn created_catalog_reopens_with_history() {
    let (_dir, path) = catalog_path("sql01");
    drop(seeded(&path));

    let catalog = SqliteCatalog::open(&path, &CatalogOpenOptions::read_only()).expect("reopen");
    assert_eq!(catalog.instance(), "sql01");
    let databases = catalog.databases().expect("databases");
    assert_eq!(databases, vec!["Inventory".to_string(), "Sales".to_string()]);
}

#[test]
fn striped_sets_group_and_skip_mirrors() {
    let (_dir, path) = catalog_path("stripes");
    let selector = HistorySelector::new(seeded(&path));
    let sets = selector
        .list_history(&HistoryFilter::new().database("Sales"))
        .expect("history");
    assert_eq!(sets.len(), 2);

    let full = sets.iter().find(|s| s.backup_set_id == 1).expect("full present");
    assert_eq!(full.stripe_count(), 2);
    assert_eq!(
        full.paths(),
        vec!["D:\\Backups\\Sales_1-of-2.bak", "E:\\Backups\\Sales_2-of-2.bak"]
    );
    assert_eq!(full.files.len(), 2);
    assert_eq!(full.files[1].logical_name, "Sales_log");
    assert_eq!(full.compressed_size, 2_500);
    assert!((full.compression_ratio - 4.0).abs() < f64::EPSILON);

    let with_mirrors = selector
        .list_history(&HistoryFilter::new().database("Sales").include_mirror(true))
        .expect("history with mirrors");
    let full = with_mirrors
        .iter()
        .find(|s| s.backup_set_id == 1)
        .expect("full present");
    assert_eq!(full.media.len(), 4);
    assert_eq!(full.stripe_count(), 2);
}

#[test]
fn database_names_match_without_case() {
    let (_dir, path) = catalog_path("case");
    let selector = HistorySelector::new(seeded(&path));
    let sets = selector
        .list_history(&HistoryFilter::new().database("SALES"))
        .expect("history");
    assert_eq!(sets.len(), 2);
    assert!(sets.iter().all(|s| s.database == "Sales"));

    let excluded = selector
        .list_history(&HistoryFilter::new().exclude_databases(["sales"]))
        .expect("history");
    assert_eq!(excluded.len(), 1);
    assert_eq!(excluded[0].database, "Inventory");
}

#[test]
fn databases_fold_case_variants_into_one_name() {
    let (_dir, path) = catalog_path("folded");
    let mut catalog = seeded(&path);
    catalog
        .record_backup(
            &set(9, "SALES", BackupType::Log, (300, 400, 150, 150), "2024-01-01 04:00:00"),
            &[media(9, 1, 0, "D:\\Backups\\SALES_9.trn", 2)],
            &[],
        )
        .expect("record log");
    assert_eq!(
        catalog.databases().expect("databases"),
        vec!["Inventory".to_string(), "Sales".to_string()]
    );

    let selector = HistorySelector::new(catalog);
    let outcomes = selector
        .last_chains(&HistoryFilter::new(), &ChainOptions::default())
        .expect("chains");
    assert_eq!(outcomes.len(), 2);
    let sales = &outcomes[1];
    assert_eq!(sales.database, "Sales");
    let ids: Vec<i64> = sales.chain.iter().map(|s| s.backup_set_id).collect();
    assert_eq!(ids, vec![1, 2, 9]);
    assert!(format!("{:?}", selector.catalog()).contains("instance: \"SQL01\""));
}

#[test]
fn device_filter_covers_permanent_devices() {
    let (_dir, path) = catalog_path("devices");
    let selector = HistorySelector::new(seeded(&path));

    let disk = selector
        .list_history(&HistoryFilter::new().device_kinds([DeviceKind::Disk]))
        .expect("disk history");
    let mut ids: Vec<i64> = disk.iter().map(|s| s.backup_set_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);

    let log = disk.iter().find(|s| s.backup_set_id == 2).expect("log present");
    assert_eq!(
        log.device_type,
        DeviceType::Known {
            kind: DeviceKind::Disk,
            permanent: true
        }
    );
    assert_eq!(log.device_type.to_string(), "Permanent Disk");

    let url = selector
        .list_history(&HistoryFilter::new().device_kinds([DeviceKind::Url]))
        .expect("url history");
    assert_eq!(url.len(), 1);
    assert_eq!(url[0].database, "Inventory");
}

#[test]
fn lsns_beyond_u64_survive_storage() {
    let (_dir, path) = catalog_path("wide");
    let mut catalog = SqliteCatalog::open(
        &path,
        &CatalogOpenOptions {
            create_if_missing: true,
            ..CatalogOpenOptions::default()
        },
    )
    .expect("create");
    let base: u128 = 98_000_000_123_400_000_001_234;
    assert!(base > u128::from(u64::MAX));
    catalog
        .record_backup(
            &set(10, "Wide", BackupType::Full, (base, base + 200, base + 100, 0), "2024-02-01 00:00:00"),
            &[media(10, 1, 0, "/backup/wide_full.bak", 2)],
            &[],
        )
        .expect("full");
    // 9 sorts after 10 as text; the chain must still pick the numerically larger log.
    catalog
        .record_backup(
            &set(11, "Wide", BackupType::Log, (base + 200, base + 999, base + 100, base + 100), "2024-02-01 01:00:00"),
            &[media(11, 1, 0, "/backup/wide_1.trn", 2)],
            &[],
        )
        .expect("log 1");
    catalog
        .record_backup(
            &set(12, "Wide", BackupType::Log, (base + 999, base + 1_000, base + 100, base + 100), "2024-02-01 02:00:00"),
            &[media(12, 1, 0, "/backup/wide_2.trn", 2)],
            &[],
        )
        .expect("log 2");

    let selector = HistorySelector::new(catalog);
    let outcome = selector
        .last_chain("wide", &ChainOptions::default())
        .expect("chain");
    let ids: Vec<i64> = outcome.chain.iter().map(|s| s.backup_set_id).collect();
    assert_eq!(ids, vec![10, 11, 12]);
    assert_eq!(outcome.chain[2].last_lsn, Lsn(base + 1_000));
    assert!(outcome.warnings.is_empty());
}

#[test]
fn import_loads_records_in_one_pass() {
    let mut catalog = SqliteCatalog::open_in_memory("SQL02").expect("memory catalog");
    let sets = vec![
        set(1, "Hr", BackupType::Full, (10, 20, 15, 0), "2024-03-01 00:00:00"),
        set(2, "Hr", BackupType::Differential, (30, 40, 35, 15), "2024-03-02 00:00:00"),
    ];
    let families = vec![
        media(1, 1, 0, "/b/hr_full.bak", 2),
        media(2, 1, 0, "/b/hr_diff.dif", 2),
    ];
    let counts = catalog.import(&sets, &families, &[]).expect("import");
    assert_eq!(counts.backup_sets, 2);
    assert_eq!(counts.media_families, 2);
    assert_eq!(counts.backup_files, 0);

    let selector = HistorySelector::new(catalog);
    let last = selector
        .last_of_type("Hr", BackupType::Differential, &ChainOptions::default())
        .expect("last diff");
    assert_eq!(last.instance, "SQL02");
    assert_eq!(last.backup.map(|b| b.backup_set_id), Some(2));
}
