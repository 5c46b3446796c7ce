#![allow(missing_docs)]

use backchain::{
    catalog::{BackupSetRecord, MediaFamilyRecord, MemoryCatalog},
    history::{verify_chain, ChainOptions, HistorySelector},
    types::{BackupType, Lsn, Timestamp},
};
use proptest::prelude::*;
use time::Duration;

const FORK: &str = "cccccccc-0000-0000-0000-000000000003";

#[derive(Debug, Clone)]
struct Planned {
    id: i64,
    ty: BackupType,
    first: u128,
    last: u128,
    checkpoint: u128,
    base: u128,
    minute: i64,
}

fn to_records(entry: &Planned) -> (BackupSetRecord, MediaFamilyRecord) {
    let origin: Timestamp = "2024-03-01 00:00:00".parse().expect("origin");
    let end = Timestamp(origin.0 + Duration::minutes(entry.minute));
    let set = BackupSetRecord {
        backup_set_id: entry.id,
        media_set_id: entry.id,
        server_name: "SQL01".into(),
        database_name: "Ledger".into(),
        backup_type: entry.ty,
        backup_start_date: Timestamp(end.0 - Duration::seconds(30)),
        backup_finish_date: end,
        first_lsn: Lsn(entry.first),
        last_lsn: Lsn(entry.last),
        checkpoint_lsn: Lsn(entry.checkpoint),
        database_backup_lsn: Lsn(entry.base),
        is_copy_only: false,
        last_recovery_fork_guid: FORK.parse().expect("fork"),
        backup_size: 4096,
        compressed_backup_size: None,
        software_major_version: 16,
        user_name: "sa".into(),
        name: None,
    };
    let media = MediaFamilyRecord {
        media_set_id: entry.id,
        family_sequence_number: 1,
        mirror: 0,
        physical_device_name: format!("/backups/ledger_{}.bak", entry.id),
        device_type: 2,
    };
    (set, media)
}

/// A full backup followed by a contiguous run of logs, plus an optional
/// differential taken part way through, in shuffled catalog order.
fn history() -> impl Strategy<Value = (Vec<Planned>, usize, bool)> {
    (
        1u128..=u128::from(u64::MAX) * 1_000,
        prop::collection::vec(1u128..=5_000_000_000, 1..24),
        any::<bool>(),
    )
        .prop_flat_map(|(start, steps, with_diff)| {
            let full_last = start + 1_000;
            let checkpoint = start + 500;
            let mut planned = vec![Planned {
                id: 1,
                ty: BackupType::Full,
                first: start,
                last: full_last,
                checkpoint,
                base: 0,
                minute: 0,
            }];
            let mut previous = full_last;
            for (index, step) in steps.iter().enumerate() {
                let last = previous + step;
                planned.push(Planned {
                    id: index as i64 + 2,
                    ty: BackupType::Log,
                    first: previous,
                    last,
                    checkpoint,
                    base: checkpoint,
                    minute: (index as i64 + 1) * 15,
                });
                previous = last;
            }
            if with_diff {
                let anchor = planned[planned.len() / 2].clone();
                planned.push(Planned {
                    id: 1_000,
                    ty: BackupType::Differential,
                    first: anchor.last,
                    last: anchor.last + 1,
                    checkpoint: anchor.last,
                    base: checkpoint,
                    minute: anchor.minute + 1,
                });
            }
            let log_count = steps.len();
            (Just(planned).prop_shuffle(), Just(log_count), Just(with_diff))
        })
}

proptest! {
    #[test]
    fn lsn_order_is_numeric(a in any::<u128>(), b in any::<u128>()) {
        let left: Lsn = a.to_string().parse().unwrap();
        let right: Lsn = b.to_string().parse().unwrap();
        prop_assert_eq!(left.cmp(&right), a.cmp(&b));
    }

    #[test]
    fn reconstructed_chain_is_restorable((planned, log_count, with_diff) in history()) {
        let mut catalog = MemoryCatalog::new("SQL01");
        for entry in &planned {
            let (set, media) = to_records(entry);
            catalog.record_backup(&set, &[media], &[]);
        }
        let selector = HistorySelector::new(catalog);
        let outcome = selector.last_chain("Ledger", &ChainOptions::default()).unwrap();
        let chain = &outcome.chain;

        prop_assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
        prop_assert_eq!(chain[0].backup_type, BackupType::Full);
        prop_assert!(chain.windows(2).all(|w| w[0].last_lsn <= w[1].last_lsn));

        let full = &chain[0];
        let logs: Vec<_> = chain.iter().filter(|s| s.backup_type == BackupType::Log).collect();
        prop_assert!(logs.windows(2).all(|w| w[0].last_lsn < w[1].last_lsn));
        prop_assert!(logs.iter().all(|l| l.database_backup_lsn == full.checkpoint_lsn));

        let highest = planned.iter().map(|s| s.last).max().unwrap();
        prop_assert_eq!(chain.last().unwrap().last_lsn, Lsn(highest));
        prop_assert_eq!(outcome.differential().is_some(), with_diff);
        if !with_diff {
            prop_assert_eq!(logs.len(), log_count);
        }

        let report = verify_chain(chain);
        prop_assert!(report.success, "{:?}", report.findings);
    }
}
