use tempfile::TempDir;

use pointlog::{
    award::AwardRecord,
    ledger::{PointsLedger, sqlite::SqliteLedger},
    types::AwardReason,
};

fn award(user_id: u64, points: u32, reason: AwardReason, ts_ms: u64) -> AwardRecord {
    AwardRecord {
        user_id,
        points,
        reason,
        ts_ms,
    }
}

#[test]
fn append_then_query_round_trips_per_user() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");

    assert!(
        ledger
            .append(&award(1, 100, AwardReason::ChatActivity, 1_000))
            .expect("append")
    );
    assert!(
        ledger
            .append(&award(1, 2, AwardReason::VoicePresence, 2_000))
            .expect("append")
    );
    assert!(
        ledger
            .append(&award(2, 45, AwardReason::ChatActivity, 1_500))
            .expect("append")
    );

    let rows = ledger.by_user(1).expect("by_user");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], award(1, 2, AwardReason::VoicePresence, 2_000));
    assert_eq!(rows[1], award(1, 100, AwardReason::ChatActivity, 1_000));

    let mut totals = ledger.totals_by_user().expect("totals");
    totals.sort();
    assert_eq!(totals, vec![(1, 102), (2, 45)]);
}

#[test]
fn zero_point_awards_are_dropped_not_rejected() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");
    assert!(
        !ledger
            .append(&award(1, 0, AwardReason::VoicePresence, 1_000))
            .expect("append")
    );
    assert!(ledger.is_empty().expect("is_empty"));
    assert!(ledger.by_user(1).expect("by_user").is_empty());
    assert!(ledger.totals_by_user().expect("totals").is_empty());
}

#[test]
fn by_user_orders_newest_first() {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");
    for (points, ts) in [(5u32, 3_000u64), (10, 1_000), (15, 2_000)] {
        let _ = ledger
            .append(&award(7, points, AwardReason::ChatActivity, ts))
            .expect("append");
    }

    let ts: Vec<u64> = ledger
        .by_user(7)
        .expect("by_user")
        .into_iter()
        .map(|r| r.ts_ms)
        .collect();
    assert_eq!(ts, vec![3_000, 2_000, 1_000]);
}

#[test]
fn on_disk_ledger_survives_reopen() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("points.db");

    {
        let mut ledger = SqliteLedger::open(&db_path).expect("open");
        let _ = ledger
            .append(&award(1, 100, AwardReason::ChatActivity, 1_000))
            .expect("append");
        let _ = ledger
            .append(&award(2, 3, AwardReason::VoicePresence, 2_000))
            .expect("append");
    }

    let reopened = SqliteLedger::open(&db_path).expect("reopen");
    assert_eq!(reopened.len().expect("len"), 2);
    let rows = reopened.by_user(2).expect("by_user");
    assert_eq!(rows, vec![award(2, 3, AwardReason::VoicePresence, 2_000)]);
}

#[test]
fn reasons_round_trip_through_their_stable_text() {
    assert_eq!(AwardReason::ChatActivity.as_str(), "chat-activity");
    assert_eq!(AwardReason::VoicePresence.as_str(), "voice-presence");
    assert_eq!(
        AwardReason::parse("chat-activity"),
        Some(AwardReason::ChatActivity)
    );
    assert_eq!(
        AwardReason::parse("voice-presence"),
        Some(AwardReason::VoicePresence)
    );
    assert_eq!(AwardReason::parse("house-cup"), None);
}
