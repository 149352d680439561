//! Statistics derived from the event ledger.
//!
//! [`MatchStats`] is never stored. It is rebuilt by folding every event of a
//! match into a zeroed accumulator, so it always agrees with the ledger.

use crate::event::{EventResult, EventType, VolleyEvent};
use crate::roster::{Player, Side};
use crate::state::Match;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServeStats {
    pub total: u32,
    pub aces: u32,
    pub errors: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackStats {
    pub total: u32,
    pub kills: u32,
    pub errors: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStats {
    pub total: u32,
    pub points: u32,
    pub touches: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveStats {
    pub total: u32,
    pub perfect: u32,
    pub errors: u32,
}

/// Counters shared by players and teams.
///
/// Both levels go through [`Tally::record`], which keeps a team's counters
/// equal to the sum of its players'.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub serves: ServeStats,
    pub attacks: AttackStats,
    pub blocks: BlockStats,
    pub digs: u32,
    pub sets: u32,
    pub receives: ReceiveStats,
}

impl Tally {
    /// Count one play. Points, timeouts and substitutions are not counted here.
    pub fn record(&mut self, event_type: EventType, result: EventResult) {
        match event_type {
            EventType::Serve => {
                self.serves.total += 1;
                match result {
                    EventResult::Success => self.serves.aces += 1,
                    EventResult::Error => self.serves.errors += 1,
                    EventResult::Neutral => {}
                }
            }
            EventType::Attack => {
                self.attacks.total += 1;
                match result {
                    EventResult::Success => self.attacks.kills += 1,
                    EventResult::Error => self.attacks.errors += 1,
                    EventResult::Neutral => {}
                }
            }
            EventType::Block => {
                self.blocks.total += 1;
                match result {
                    EventResult::Success => self.blocks.points += 1,
                    EventResult::Neutral => self.blocks.touches += 1,
                    EventResult::Error => {}
                }
            }
            EventType::Receive => {
                self.receives.total += 1;
                match result {
                    EventResult::Success => self.receives.perfect += 1,
                    EventResult::Error => self.receives.errors += 1,
                    EventResult::Neutral => {}
                }
            }
            EventType::Dig => self.digs += 1,
            EventType::Set => self.sets += 1,
            EventType::Point | EventType::Timeout | EventType::Substitution => {}
        }
    }

    /// Kills minus attack errors, as a rounded percentage of attacks.
    ///
    /// ```
    /// use volleyfold::stats::Tally;
    /// use volleyfold::{EventResult, EventType};
    ///
    /// let mut tally = Tally::default();
    /// assert_eq!(tally.attack_efficiency(), None);
    /// tally.record(EventType::Attack, EventResult::Success);
    /// tally.record(EventType::Attack, EventResult::Success);
    /// tally.record(EventType::Attack, EventResult::Error);
    /// assert_eq!(tally.attack_efficiency(), Some(33));
    /// ```
    pub fn attack_efficiency(&self) -> Option<i32> {
        percent(
            i64::from(self.attacks.kills) - i64::from(self.attacks.errors),
            self.attacks.total,
        )
    }

    /// Aces minus serve errors, as a rounded percentage of serves.
    pub fn serve_efficiency(&self) -> Option<i32> {
        percent(
            i64::from(self.serves.aces) - i64::from(self.serves.errors),
            self.serves.total,
        )
    }

    /// Perfect receptions as a rounded percentage of receptions.
    pub fn receive_efficiency(&self) -> Option<i32> {
        percent(i64::from(self.receives.perfect), self.receives.total)
    }
}

fn percent(numerator: i64, total: u32) -> Option<i32> {
    if total == 0 {
        return None;
    }
    Some((numerator as f64 / f64::from(total) * 100.0).round() as i32)
}

/// Statistics of one roster player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub player_id: u32,
    pub player_name: String,
    pub player_number: u32,
    pub team_id: u32,
    #[serde(flatten)]
    pub tally: Tally,
}

impl PlayerStats {
    fn zeroed(player: &Player, team_id: u32) -> Self {
        PlayerStats {
            player_id: player.id,
            player_name: player.name.clone(),
            player_number: player.number,
            team_id,
            tally: Tally::default(),
        }
    }
}

/// Statistics of one team. `points` counts point events for the team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub team_id: u32,
    pub points: u32,
    #[serde(flatten)]
    pub tally: Tally,
}

/// Ordering for [`MatchStats::team_players`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSort {
    /// Jersey number, ascending.
    Number,
    /// Attack kills, descending.
    Kills,
    /// Service aces, descending.
    Aces,
    /// Block points, descending.
    BlockPoints,
    /// Digs, descending.
    Digs,
}

/// Team and player statistics for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStats {
    pub match_id: String,
    pub home: TeamStats,
    pub away: TeamStats,
    /// Every roster player of both teams, keyed by player id.
    pub players: BTreeMap<u32, PlayerStats>,
}

impl MatchStats {
    /// Zeroed statistics for every team and roster player of `m`.
    pub fn new(m: &Match) -> Self {
        let mut players = BTreeMap::new();
        for team in [&m.home_team, &m.away_team] {
            for player in &team.players {
                players.insert(player.id, PlayerStats::zeroed(player, team.id));
            }
        }
        MatchStats {
            match_id: m.id.clone(),
            home: TeamStats {
                team_id: m.home_team.id,
                ..TeamStats::default()
            },
            away: TeamStats {
                team_id: m.away_team.id,
                ..TeamStats::default()
            },
            players,
        }
    }

    pub fn team(&self, side: Side) -> &TeamStats {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn player(&self, player_id: u32) -> Option<&PlayerStats> {
        self.players.get(&player_id)
    }

    /// Players of `team_id` in the requested order. Ties keep jersey order.
    pub fn team_players(&self, team_id: u32, sort: PlayerSort) -> Vec<&PlayerStats> {
        let mut list: Vec<&PlayerStats> = self
            .players
            .values()
            .filter(|p| p.team_id == team_id)
            .collect();
        list.sort_by_key(|p| p.player_number);
        match sort {
            PlayerSort::Number => {}
            PlayerSort::Kills => list.sort_by_key(|p| Reverse(p.tally.attacks.kills)),
            PlayerSort::Aces => list.sort_by_key(|p| Reverse(p.tally.serves.aces)),
            PlayerSort::BlockPoints => list.sort_by_key(|p| Reverse(p.tally.blocks.points)),
            PlayerSort::Digs => list.sort_by_key(|p| Reverse(p.tally.digs)),
        }
        list
    }
}

/// Fold one event into match statistics.
///
/// Team counters are updated even when the player is missing from the
/// rosters. Events for a team outside the match are skipped entirely.
pub fn stats_reducer(mut stats: MatchStats, event: &VolleyEvent) -> MatchStats {
    let team = if event.team_id == stats.home.team_id {
        &mut stats.home
    } else if event.team_id == stats.away.team_id {
        &mut stats.away
    } else {
        log::warn!(
            "match {}: event {} names unknown team {}, skipped",
            stats.match_id,
            event.id,
            event.team_id
        );
        return stats;
    };

    if event.is_point() {
        team.points += 1;
        return stats;
    }
    team.tally.record(event.event_type, event.result);

    match stats.players.get_mut(&event.player_id) {
        Some(player) => player.tally.record(event.event_type, event.result),
        None => log::debug!(
            "match {}: event {} names unknown player {}, counted for team only",
            stats.match_id,
            event.id,
            event.player_id
        ),
    }
    stats
}

/// Recompute statistics for `m` from the events of the ledger.
///
/// Events of other matches are ignored.
pub fn calculate<'a, I>(m: &Match, events: I) -> MatchStats
where
    I: IntoIterator<Item = &'a VolleyEvent>,
{
    events
        .into_iter()
        .filter(|e| e.match_id == m.id)
        .fold(MatchStats::new(m), stats_reducer)
}
