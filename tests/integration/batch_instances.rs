#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use backchain::{
    batch::{for_each_target, CatalogTarget},
    catalog::{BackupSetRecord, CatalogOpenOptions, MediaFamilyRecord, SqliteCatalog},
    history::ChainOptions,
    types::{BackupType, Lsn},
};
use tempfile::TempDir;

fn seed(path: &Path, database: &str, logs: usize) {
    let opts = CatalogOpenOptions {
        create_if_missing: true,
        ..CatalogOpenOptions::default()
    };
    let mut catalog = SqliteCatalog::open(path, &opts).expect("create catalog");
    let fork = "7d9e4f10-5a2b-4c3d-8e9f-0a1b2c3d4e5f".parse().expect("fork");
    let mut sets = Vec::new();
    let mut media = Vec::new();
    for index in 0..=logs {
        let id = index as i64 + 1;
        let (ty, first, base) = if index == 0 {
            (BackupType::Full, 1_000, 0)
        } else {
            (BackupType::Log, 1_000 + index as u128 * 100, 1_050)
        };
        let finish = format!("2024-05-01 {:02}:00:00", index);
        sets.push(BackupSetRecord {
            backup_set_id: id,
            media_set_id: id,
            server_name: "batch".into(),
            database_name: database.into(),
            backup_type: ty,
            backup_start_date: finish.parse().expect("start"),
            backup_finish_date: finish.parse().expect("finish"),
            first_lsn: Lsn(first),
            last_lsn: Lsn(first + 100),
            checkpoint_lsn: Lsn(1_050),
            database_backup_lsn: Lsn(base),
            is_copy_only: false,
            last_recovery_fork_guid: fork,
            backup_size: 1 << 20,
            compressed_backup_size: None,
            software_major_version: 16,
            user_name: "agent".into(),
            name: None,
        });
        media.push(MediaFamilyRecord {
            media_set_id: id,
            family_sequence_number: 1,
            mirror: 0,
            physical_device_name: format!("/backup/{database}_{id}.bak"),
            device_type: 2,
        });
    }
    catalog.import(&sets, &media, &[]).expect("import");
}

fn fleet() -> (TempDir, Vec<CatalogTarget>) {
    let dir = TempDir::new().expect("tempdir");
    let first: PathBuf = dir.path().join("east.db");
    let second: PathBuf = dir.path().join("west.db");
    seed(&first, "Orders", 3);
    seed(&second, "Orders", 1);
    let targets = vec![
        CatalogTarget::parse(&format!("EAST={}", first.display())),
        CatalogTarget::from_path(dir.path().join("missing.db")),
        CatalogTarget::from_path(second),
    ];
    (dir, targets)
}

#[tokio::test]
async fn outcomes_follow_target_order() {
    let (_dir, targets) = fleet();
    let outcomes = for_each_target(targets, 2, |selector| {
        selector.last_chain("Orders", &ChainOptions::default())
    })
    .await;

    let instances: Vec<&str> = outcomes.iter().map(|o| o.instance.as_str()).collect();
    assert_eq!(instances, vec!["EAST", "missing", "west"]);

    let east = outcomes[0].value.as_ref().expect("east chain");
    assert_eq!(east.instance, "EAST");
    assert_eq!(east.chain.len(), 4);

    assert!(!outcomes[1].is_ok());
    let message = outcomes[1].error.as_deref().expect("error message");
    assert!(message.contains("missing.db"), "{message}");

    let west = outcomes[2].value.as_ref().expect("west chain");
    assert_eq!(west.chain.len(), 2);
    assert_eq!(west.chain[1].backup_type, BackupType::Log);
}

#[tokio::test]
async fn single_job_still_processes_every_target() {
    let (_dir, targets) = fleet();
    let outcomes = for_each_target(targets, 0, |selector| {
        Ok(selector
            .list_history(&Default::default())?
            .len())
    })
    .await;
    let counts: Vec<Option<usize>> = outcomes.iter().map(|o| o.value).collect();
    assert_eq!(counts, vec![Some(4), None, Some(2)]);
}
