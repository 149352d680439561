mod common;

use common::{AWAY_ID, HOME_ID, MATCH_ID, ace, fixture, play, session};
use volleyfold::stats::{self, AttackStats, BlockStats, ReceiveStats, ServeStats};
use volleyfold::{EventResult, EventType, PlayerSort, Side, VolleyEvent};

fn raw_event(
    event_type: EventType,
    team_id: u32,
    player_id: u32,
    result: EventResult,
) -> VolleyEvent {
    let line = serde_json::json!({
        "id": "raw",
        "matchId": MATCH_ID,
        "timestamp": 0,
        "type": event_type,
        "playerId": player_id,
        "teamId": team_id,
        "setNumber": 1,
        "result": result,
        "homeScore": 0,
        "awayScore": 0,
    });
    serde_json::from_value(line).unwrap()
}

#[test]
fn test_fresh_match_lists_full_rosters_with_zero_stats() {
    let session = session();
    let stats = session.calculate_match_stats();

    assert_eq!(stats.match_id, MATCH_ID);
    assert_eq!(stats.players.len(), 14);
    assert!(stats.players.values().all(|p| p.tally == Default::default()));
    assert_eq!(stats.player(104).unwrap().player_name, "Zhang Min");
    assert_eq!(stats.player(104).unwrap().team_id, HOME_ID);
    assert_eq!(stats.player(206).unwrap().team_id, AWAY_ID);
    assert_eq!(stats.home.points, 0);
    assert_eq!(stats.away.team_id, AWAY_ID);
}

#[test]
fn test_serve_outcomes() {
    let mut session = session();
    play(&mut session, EventType::Serve, HOME_ID, 105, EventResult::Success);
    play(&mut session, EventType::Serve, HOME_ID, 105, EventResult::Error);
    play(&mut session, EventType::Serve, HOME_ID, 105, EventResult::Neutral);

    let stats = session.calculate_match_stats();
    let expected = ServeStats {
        total: 3,
        aces: 1,
        errors: 1,
    };
    assert_eq!(stats.player(105).unwrap().tally.serves, expected);
    assert_eq!(stats.home.tally.serves, expected);
    // One ace for home, one serve error handed a point to away.
    assert_eq!(stats.home.points, 1);
    assert_eq!(stats.away.points, 1);
}

#[test]
fn test_attack_block_receive_outcomes() {
    let mut session = session();
    for result in [EventResult::Success, EventResult::Error, EventResult::Neutral] {
        play(&mut session, EventType::Attack, AWAY_ID, 204, result);
        play(&mut session, EventType::Block, AWAY_ID, 203, result);
        play(&mut session, EventType::Receive, AWAY_ID, 207, result);
    }

    let stats = session.calculate_match_stats();
    assert_eq!(
        stats.player(204).unwrap().tally.attacks,
        AttackStats {
            total: 3,
            kills: 1,
            errors: 1
        }
    );
    assert_eq!(
        stats.player(203).unwrap().tally.blocks,
        BlockStats {
            total: 3,
            points: 1,
            touches: 1
        }
    );
    assert_eq!(
        stats.player(207).unwrap().tally.receives,
        ReceiveStats {
            total: 3,
            perfect: 1,
            errors: 1
        }
    );
    assert_eq!(stats.away.tally.attacks.total, 3);
    assert_eq!(stats.away.tally.blocks.points, 1);
    assert_eq!(stats.away.tally.receives.perfect, 1);
}

#[test]
fn test_digs_and_sets_count_every_result() {
    let mut session = session();
    for result in [EventResult::Success, EventResult::Error, EventResult::Neutral] {
        play(&mut session, EventType::Dig, HOME_ID, 107, result);
        play(&mut session, EventType::Set, HOME_ID, 101, result);
    }
    let stats = session.calculate_match_stats();
    assert_eq!(stats.player(107).unwrap().tally.digs, 3);
    assert_eq!(stats.player(101).unwrap().tally.sets, 3);
    assert_eq!(stats.home.tally.digs, 3);
    assert_eq!(stats.home.tally.sets, 3);
    assert_eq!(stats.home.points, 0);
}

#[test]
fn test_timeouts_and_substitutions_are_ignored() {
    let mut session = session();
    play(&mut session, EventType::Timeout, HOME_ID, 101, EventResult::Neutral);
    play(&mut session, EventType::Substitution, AWAY_ID, 206, EventResult::Neutral);

    let stats = session.calculate_match_stats();
    assert_eq!(session.match_events().len(), 2);
    assert_eq!(stats, volleyfold::MatchStats::new(&fixture()));
}

#[test]
fn test_points_follow_team_id() {
    let mut session = session();
    for _ in 0..4 {
        ace(&mut session, Side::Home);
    }
    ace(&mut session, Side::Away);
    let stats = session.calculate_match_stats();
    assert_eq!(stats.home.points, 4);
    assert_eq!(stats.away.points, 1);
    assert_eq!(stats.team(Side::Home).points, 4);
}

#[test]
fn test_unknown_player_still_counts_for_team() {
    let m = fixture();
    let events = vec![
        raw_event(EventType::Attack, HOME_ID, 999, EventResult::Success),
        raw_event(EventType::Attack, HOME_ID, 102, EventResult::Success),
    ];
    let stats = stats::calculate(&m, &events);
    assert_eq!(stats.home.tally.attacks.kills, 2);
    assert_eq!(stats.player(102).unwrap().tally.attacks.kills, 1);
    assert!(stats.player(999).is_none());
}

#[test]
fn test_unknown_team_and_other_matches_are_skipped() {
    let m = fixture();
    let mut foreign = raw_event(EventType::Dig, HOME_ID, 101, EventResult::Neutral);
    foreign.match_id = "another-match".into();
    let events = vec![
        raw_event(EventType::Dig, 77, 101, EventResult::Neutral),
        raw_event(EventType::Point, 77, 101, EventResult::Success),
        foreign,
    ];
    let stats = stats::calculate(&m, &events);
    assert_eq!(stats, volleyfold::MatchStats::new(&m));
}

#[test]
fn test_recalculation_is_idempotent() {
    let mut session = session();
    play(&mut session, EventType::Attack, HOME_ID, 102, EventResult::Success);
    play(&mut session, EventType::Dig, AWAY_ID, 207, EventResult::Neutral);
    let first = session.calculate_match_stats();
    let second = session.calculate_match_stats();
    assert_eq!(first, second);
}

#[test]
fn test_team_players_sorting() {
    let mut session = session();
    // 102 (#9): 2 kills, 105 (#3): 1 kill, 104 (#5): 1 kill
    play(&mut session, EventType::Attack, HOME_ID, 102, EventResult::Success);
    play(&mut session, EventType::Attack, HOME_ID, 102, EventResult::Success);
    play(&mut session, EventType::Attack, HOME_ID, 105, EventResult::Success);
    play(&mut session, EventType::Attack, HOME_ID, 104, EventResult::Success);
    play(&mut session, EventType::Dig, HOME_ID, 107, EventResult::Neutral);

    let stats = session.calculate_match_stats();

    let by_number: Vec<u32> = stats
        .team_players(HOME_ID, PlayerSort::Number)
        .iter()
        .map(|p| p.player_number)
        .collect();
    assert_eq!(by_number, vec![1, 3, 5, 7, 8, 9, 12]);

    let by_kills: Vec<u32> = stats
        .team_players(HOME_ID, PlayerSort::Kills)
        .iter()
        .map(|p| p.player_id)
        .take(3)
        .collect();
    assert_eq!(by_kills, vec![102, 105, 104]);

    let top_digger = stats.team_players(HOME_ID, PlayerSort::Digs)[0];
    assert_eq!(top_digger.player_id, 107);
    assert_eq!(stats.team_players(AWAY_ID, PlayerSort::Aces).len(), 7);
}

#[test]
fn test_efficiencies() {
    let mut session = session();
    play(&mut session, EventType::Attack, HOME_ID, 102, EventResult::Success);
    play(&mut session, EventType::Attack, HOME_ID, 102, EventResult::Success);
    play(&mut session, EventType::Attack, HOME_ID, 102, EventResult::Success);
    play(&mut session, EventType::Attack, HOME_ID, 102, EventResult::Error);
    play(&mut session, EventType::Receive, AWAY_ID, 207, EventResult::Success);
    play(&mut session, EventType::Receive, AWAY_ID, 207, EventResult::Neutral);

    let stats = session.calculate_match_stats();
    assert_eq!(stats.home.tally.attack_efficiency(), Some(50));
    assert_eq!(stats.home.tally.serve_efficiency(), None);
    assert_eq!(stats.away.tally.receive_efficiency(), Some(50));
}

#[test]
fn test_match_stats_serialize_camel_case() {
    let mut session = session();
    ace(&mut session, Side::Away);
    let value = serde_json::to_value(session.calculate_match_stats()).unwrap();
    assert_eq!(value["matchId"], MATCH_ID);
    assert_eq!(value["away"]["points"], 1);
    assert_eq!(value["away"]["serves"]["aces"], 1);
    assert_eq!(value["players"]["202"]["playerName"], "Tsai Ming-han");
}
