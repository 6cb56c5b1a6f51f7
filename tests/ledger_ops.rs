use pickleball_ledger::{
    core::ledger::{GamesOnEdit, Ledger, LedgerConfig, LedgerError, Snapshot},
    match_record::ValidationError,
    op::Op,
    player::Player,
    types::PlayerId,
};

fn ledger_with(names: &str) -> (Ledger, Vec<PlayerId>) {
    let mut ledger = Ledger::new(LedgerConfig::default());
    let (ids, _) = ledger.add_players(names).expect("names");
    (ledger, ids)
}

fn totals(ledger: &Ledger, id: PlayerId) -> (i64, u32) {
    let p = ledger.player(id).expect("player");
    (p.points, p.games_played)
}

#[test]
fn add_players_splits_on_commas_periods_and_newlines() {
    let mut ledger = Ledger::new(LedgerConfig::default());
    let (ids, op) = ledger.add_players("Alice, Bob.\nCharlie").expect("added");

    assert_eq!(ids.len(), 3);
    let names: Vec<&str> = ledger.players().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Alice", "Bob", "Charlie"]);
    assert!(ledger.players().iter().all(|p| p.points == 0 && p.games_played == 0));
    assert_eq!(op.op.notice(), "3 player(s) added.");
}

#[test]
fn whitespace_only_input_is_a_no_op() {
    let mut ledger = Ledger::new(LedgerConfig::default());
    assert!(ledger.add_players("   ").is_none());
    assert!(ledger.add_players(" , .\n ").is_none());
    assert!(ledger.players().is_empty());
    assert_eq!(ledger.latest_op_seq(), 0);
}

#[test]
fn player_ids_are_unique_and_names_may_repeat() {
    let (ledger, ids) = ledger_with("Sam, Sam, Sam");
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(ledger.players().iter().all(|p| p.name == "Sam"));
}

#[test]
fn record_match_validates_player_count_and_points() {
    let (mut ledger, ids) = ledger_with("p1, p2, p3");

    assert_eq!(
        ledger.record_match(vec![], 10).unwrap_err(),
        LedgerError::Validation(ValidationError::PlayerCount { count: 0 })
    );
    assert_eq!(
        ledger.record_match(ids.clone(), 10).unwrap_err(),
        LedgerError::Validation(ValidationError::PlayerCount { count: 3 })
    );
    assert_eq!(
        ledger.record_match(vec![ids[0]], 0).unwrap_err(),
        LedgerError::Validation(ValidationError::NonPositivePoints { points: 0 })
    );
    assert_eq!(
        ledger.record_match(vec![ids[0], ids[0]], 4).unwrap_err(),
        LedgerError::Validation(ValidationError::DuplicatePlayer { id: ids[0] })
    );
    assert!(ledger.match_history().is_empty());
    assert_eq!(totals(&ledger, ids[0]), (0, 0));

    ledger.record_match(vec![ids[0]], 5).expect("record");
    assert_eq!(totals(&ledger, ids[0]), (5, 1));
}

#[test]
fn validation_messages_are_advisory_text() {
    let (mut ledger, ids) = ledger_with("p1");
    let err = ledger.record_match(vec![], 3).unwrap_err();
    assert_eq!(err.to_string(), "Select 1 or 2 players for the match.");
    let err = ledger.record_match(vec![ids[0]], -2).unwrap_err();
    assert_eq!(err.to_string(), "Enter valid points.");
}

#[test]
fn both_players_receive_full_points_and_history_is_newest_first() {
    let (mut ledger, ids) = ledger_with("p1, p2");
    let (first, _) = ledger.record_match(vec![ids[0], ids[1]], 11).expect("first");
    let (second, _) = ledger.record_match(vec![ids[1]], 4).expect("second");

    assert_eq!(totals(&ledger, ids[0]), (11, 1));
    assert_eq!(totals(&ledger, ids[1]), (15, 2));
    let order: Vec<_> = ledger.match_history().iter().map(|m| m.id).collect();
    assert_eq!(order, vec![second, first]);
}

#[test]
fn update_moves_points_but_not_games_by_default() {
    let (mut ledger, ids) = ledger_with("p1, p2");
    let (match_id, _) = ledger.record_match(vec![ids[0]], 10).expect("record");
    let stamp = ledger.match_record(match_id).expect("match").timestamp.clone();

    let (prev, op) = ledger.update_match(match_id, vec![ids[1]], 3).expect("update");
    assert_eq!(prev.player_ids(), [ids[0]]);
    assert_eq!(prev.points(), 10);

    assert_eq!(totals(&ledger, ids[0]), (0, 1));
    assert_eq!(totals(&ledger, ids[1]), (3, 0));
    let rec = ledger.match_record(match_id).expect("match");
    assert_eq!(rec.player_ids, vec![ids[1]]);
    assert_eq!(rec.points, 3);
    assert_eq!(rec.timestamp, stamp);
    assert!(matches!(op.op, Op::MatchUpdated { id, .. } if id == match_id));
}

#[test]
fn rebalance_policy_moves_games_with_points() {
    let mut ledger = Ledger::new(LedgerConfig {
        games_on_edit: GamesOnEdit::Rebalance,
    });
    let (ids, _) = ledger.add_players("p1, p2").expect("names");
    let (match_id, _) = ledger.record_match(vec![ids[0]], 10).expect("record");

    ledger.update_match(match_id, vec![ids[1]], 3).expect("update");

    assert_eq!(totals(&ledger, ids[0]), (0, 0));
    assert_eq!(totals(&ledger, ids[1]), (3, 1));
}

#[test]
fn invalid_update_leaves_state_unchanged() {
    let (mut ledger, ids) = ledger_with("p1, p2");
    let (match_id, _) = ledger.record_match(vec![ids[0]], 10).expect("record");
    let before = ledger.export_snapshot();

    assert!(matches!(
        ledger.update_match(match_id, vec![], 3),
        Err(LedgerError::Validation(_))
    ));
    assert!(matches!(
        ledger.update_match(match_id, vec![ids[1]], 0),
        Err(LedgerError::Validation(_))
    ));
    assert_eq!(
        ledger.update_match(999, vec![ids[1]], 3).unwrap_err(),
        LedgerError::MatchNotFound(999)
    );
    assert_eq!(ledger.export_snapshot(), before);
}

#[test]
fn delete_reverses_points_and_games() {
    let (mut ledger, ids) = ledger_with("p1");
    let (ten, _) = ledger.record_match(vec![ids[0]], 10).expect("ten");
    ledger.record_match(vec![ids[0]], 5).expect("five");
    assert_eq!(totals(&ledger, ids[0]), (15, 2));

    let (removed, op) = ledger.delete_match(ten).expect("delete");

    assert_eq!(removed.points, 10);
    assert_eq!(totals(&ledger, ids[0]), (5, 1));
    assert_eq!(ledger.match_history().len(), 1);
    assert_eq!(op.op.notice(), "Match deleted.");
    assert_eq!(ledger.delete_match(ten).unwrap_err(), LedgerError::MatchNotFound(ten));
}

#[test]
fn delete_after_default_edit_never_underflows_games() {
    let (mut ledger, ids) = ledger_with("p1, p2");
    let (match_id, _) = ledger.record_match(vec![ids[0]], 6).expect("record");
    ledger.update_match(match_id, vec![ids[1]], 6).expect("update");

    ledger.delete_match(match_id).expect("delete");

    assert_eq!(totals(&ledger, ids[0]), (0, 1));
    assert_eq!(totals(&ledger, ids[1]), (0, 0));
}

#[test]
fn removing_a_player_keeps_orphaned_history() {
    let (mut ledger, ids) = ledger_with("p1, p2");
    let (match_id, _) = ledger.record_match(vec![ids[0], ids[1]], 8).expect("record");

    let (gone, op) = ledger.remove_player(ids[0]).expect("remove");
    assert_eq!(gone.name, "p1");
    assert_eq!(op.op.notice(), "Player \"p1\" removed.");
    assert!(ledger.player(ids[0]).is_none());
    assert!(ledger.match_record(match_id).expect("kept").credits(ids[0]));

    ledger.delete_match(match_id).expect("delete orphaned");
    assert_eq!(totals(&ledger, ids[1]), (0, 0));

    assert_eq!(ledger.remove_player(ids[0]).unwrap_err(), LedgerError::PlayerNotFound(ids[0]));
}

#[test]
fn credit_for_missing_players_is_skipped() {
    let (mut ledger, ids) = ledger_with("p1");
    ledger.record_match(vec![ids[0], 404], 9).expect("record");
    assert_eq!(totals(&ledger, ids[0]), (9, 1));
    assert_eq!(ledger.match_history()[0].player_ids, vec![ids[0], 404]);
}

#[test]
fn reset_clears_everything_and_ids_stay_fresh() {
    let (mut ledger, ids) = ledger_with("p1, p2");
    ledger.record_match(vec![ids[0]], 2).expect("record");

    let op = ledger.reset_all();

    assert_eq!(op.op, Op::Reset { players: 2, matches: 1 });
    assert!(ledger.players().is_empty());
    assert!(ledger.match_history().is_empty());
    let (new_ids, _) = ledger.add_players("p3").expect("names");
    assert!(!ids.contains(&new_ids[0]));
}

#[test]
fn leaderboard_sorts_descending_with_stable_ties() {
    let snapshot = Snapshot {
        players: vec![
            Player::with_totals(1, "ten", 10, 1),
            Player::with_totals(2, "thirty", 30, 3),
            Player::with_totals(3, "twenty", 20, 2),
            Player::with_totals(4, "also-twenty", 20, 2),
        ],
        match_history: vec![],
    };
    let ledger = Ledger::from_snapshot(snapshot, LedgerConfig::default());
    let board = ledger.leaderboard();

    let ranked: Vec<_> = board.iter().map(|p| p.id).collect();
    assert_eq!(ranked, vec![2, 3, 4, 1]);
    // restartable
    let again: Vec<_> = (&board).into_iter().map(|p| p.id).collect();
    assert_eq!(again, ranked);
    assert_eq!(board.len(), 4);
    assert_eq!(ledger.players()[0].id, 1);
}

#[test]
fn snapshot_restore_resumes_ids_above_orphans() {
    let (mut ledger, ids) = ledger_with("p1, p2");
    ledger.record_match(vec![ids[1]], 3).expect("record");
    ledger.remove_player(ids[1]).expect("remove");

    let snapshot = ledger.export_snapshot();
    let mut restored = Ledger::from_snapshot(snapshot.clone(), LedgerConfig::default());
    assert_eq!(restored.export_snapshot(), snapshot);

    let (new_ids, _) = restored.add_players("p3").expect("names");
    assert_eq!(new_ids, vec![3]);
    let (match_id, _) = restored.record_match(vec![ids[0]], 1).expect("record");
    assert_eq!(match_id, 2);
}

#[test]
fn tally_matches_totals_after_mixed_operations() {
    let (mut ledger, ids) = ledger_with("a, b, c");
    let (m1, _) = ledger.record_match(vec![ids[0], ids[1]], 11).expect("m1");
    let (m2, _) = ledger.record_match(vec![ids[2]], 7).expect("m2");
    ledger.record_match(vec![ids[1], ids[2]], 5).expect("m3");
    ledger.update_match(m2, vec![ids[0]], 4).expect("edit");
    ledger.delete_match(m1).expect("delete");

    let tally = ledger.tally_history();
    for player in ledger.players() {
        assert_eq!(tally[&player.id].0, player.points, "points for {}", player.name);
    }
}

#[test]
fn overflowing_credit_rejects_the_whole_match() {
    let (mut ledger, ids) = ledger_with("a, b");
    let (a, b) = (ids[0], ids[1]);
    ledger.record_match(vec![a], i64::MAX).expect("record max");

    let err = ledger.record_match(vec![b, a], 1).unwrap_err();
    assert_eq!(err, LedgerError::PointsOverflow(a));
    assert_eq!(err.to_string(), format!("Points total for player {a} is out of range."));
    assert_eq!(totals(&ledger, a), (i64::MAX, 1));
    assert_eq!(totals(&ledger, b), (0, 0));
    assert_eq!(ledger.match_history().len(), 1);
    assert_eq!(ledger.latest_op_seq(), 2);
}

#[test]
fn overflowing_edit_leaves_match_and_totals_alone() {
    let (mut ledger, ids) = ledger_with("a, b");
    let (a, b) = (ids[0], ids[1]);
    ledger.record_match(vec![a], i64::MAX).expect("record max");
    let (m, _) = ledger.record_match(vec![b], 5).expect("record");

    assert_eq!(
        ledger.update_match(m, vec![a, b], 5).unwrap_err(),
        LedgerError::PointsOverflow(a)
    );
    assert_eq!(totals(&ledger, a), (i64::MAX, 1));
    assert_eq!(totals(&ledger, b), (5, 1));
    let rec = ledger.match_record(m).expect("match");
    assert_eq!((rec.player_ids.clone(), rec.points), (vec![b], 5));

    // moving the credit off `a` first keeps the same edit in range
    ledger.update_match(m, vec![b], 6).expect("edit in range");
    assert_eq!(totals(&ledger, b), (6, 1));
}
