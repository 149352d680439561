#![allow(dead_code)]

use volleyfold::{
    CandidateEvent, EventResult, EventType, Match, MatchSession, MatchStore, Player, Recorded,
    Side, Team,
};

pub const HOME_ID: u32 = 1;
pub const AWAY_ID: u32 = 2;
pub const MATCH_ID: &str = "vb2024-0512-001";

pub fn home_team() -> Team {
    Team::new(
        HOME_ID,
        "Taipei Dragons",
        vec![
            Player::new(101, "Liu Wei", 7, "Setter"),
            Player::new(102, "Chen Jie", 9, "Outside Hitter"),
            Player::new(103, "Wang Tao", 12, "Middle Blocker"),
            Player::new(104, "Zhang Min", 5, "Opposite"),
            Player::new(105, "Li Wei", 3, "Outside Hitter"),
            Player::new(106, "Wu Ying", 8, "Middle Blocker"),
            Player::new(107, "Zhao Lei", 1, "Libero"),
        ],
    )
}

pub fn away_team() -> Team {
    Team::new(
        AWAY_ID,
        "Kaohsiung Phoenix",
        vec![
            Player::new(201, "Lin Tzu-wei", 2, "Setter"),
            Player::new(202, "Tsai Ming-han", 13, "Outside Hitter"),
            Player::new(203, "Lee Chih-kai", 17, "Middle Blocker"),
            Player::new(204, "Chang Wei-cheng", 22, "Opposite"),
            Player::new(205, "Hsu Chien-tung", 19, "Outside Hitter"),
            Player::new(206, "Cheng Yu-min", 8, "Middle Blocker"),
            Player::new(207, "Wu Chien-ho", 15, "Libero"),
        ],
    )
}

pub fn fixture() -> Match {
    Match::new(
        MATCH_ID,
        home_team(),
        away_team(),
        "2024-05-12T19:30:00",
        "Taipei Arena",
    )
}

pub fn session() -> MatchSession {
    MatchSession::new(fixture()).unwrap()
}

pub fn candidate(
    event_type: EventType,
    team_id: u32,
    player_id: u32,
    result: EventResult,
) -> CandidateEvent {
    CandidateEvent::new(event_type, team_id, player_id, result).with_timestamp(1_715_542_200_000)
}

pub fn play<S: MatchStore>(
    session: &mut MatchSession<S>,
    event_type: EventType,
    team_id: u32,
    player_id: u32,
    result: EventResult,
) -> Recorded {
    session
        .record_event(candidate(event_type, team_id, player_id, result))
        .unwrap()
}

/// Score one point for `side` with a service ace.
pub fn ace<S: MatchStore>(session: &mut MatchSession<S>, side: Side) -> Recorded {
    match side {
        Side::Home => play(session, EventType::Serve, HOME_ID, 102, EventResult::Success),
        Side::Away => play(session, EventType::Serve, AWAY_ID, 202, EventResult::Success),
    }
}

/// Alternate points until the live set stands at `home`-`away`.
pub fn rally_to<S: MatchStore>(session: &mut MatchSession<S>, home: u32, away: u32) {
    loop {
        let set = session.current_match().current_set_state();
        let (h, a) = (set.home_score, set.away_score);
        if h >= home && a >= away {
            break;
        }
        if h < home && (h <= a || a >= away) {
            ace(session, Side::Home);
        } else {
            ace(session, Side::Away);
        }
    }
}

/// Play the live set to 25-0 for `side`.
pub fn win_set<S: MatchStore>(session: &mut MatchSession<S>, side: Side) {
    for _ in 0..25 {
        ace(session, side);
    }
}
