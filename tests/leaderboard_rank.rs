use pointlog::{
    award::AwardRecord,
    leaderboard::{self, QueryError, QueryTarget},
    ledger::{PointsLedger, sqlite::SqliteLedger},
    types::AwardReason,
};

fn seeded_ledger(entries: &[(u64, u32)]) -> SqliteLedger {
    let mut ledger = SqliteLedger::open_in_memory().expect("open");
    for (i, (user_id, points)) in entries.iter().enumerate() {
        let _ = ledger
            .append(&AwardRecord {
                user_id: *user_id,
                points: *points,
                reason: AwardReason::ChatActivity,
                ts_ms: 1_000 + i as u64,
            })
            .expect("append");
    }
    ledger
}

#[test]
fn totals_rank_descending_with_ascending_id_tie_break() {
    let ledger = seeded_ledger(&[(3, 50), (1, 30), (2, 50), (1, 20), (4, 75)]);

    let rows = leaderboard::ranked_totals(&ledger).expect("rank");
    let ranked: Vec<(u64, u64)> = rows.iter().map(|r| (r.user_id, r.total_points)).collect();
    assert_eq!(ranked, vec![(4, 75), (1, 50), (2, 50), (3, 50)]);

    for pair in rows.windows(2) {
        assert!(pair[0].total_points >= pair[1].total_points);
    }
}

#[test]
fn empty_ledger_ranks_nobody() {
    let ledger = SqliteLedger::open_in_memory().expect("open");
    assert!(leaderboard::ranked_totals(&ledger).expect("rank").is_empty());
}

#[test]
fn history_returns_only_the_target_user() {
    let ledger = seeded_ledger(&[(1, 30), (2, 50), (1, 20)]);
    let rows = leaderboard::history(&ledger, QueryTarget::User(1)).expect("history");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.user_id == 1));
    assert!(rows[0].ts_ms > rows[1].ts_ms);
}

#[test]
fn unsupported_target_kind_fails_fast() {
    assert!(matches!(
        QueryTarget::parse("user", 9),
        Ok(QueryTarget::User(9))
    ));
    match QueryTarget::parse("channel", 9) {
        Err(QueryError::InvalidScope(kind)) => assert_eq!(kind, "channel"),
        other => panic!("expected invalid scope, got {other:?}"),
    }
}
