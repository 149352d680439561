//! Match and set snapshot.

use crate::error::ValidationError;
use crate::roster::{Side, Team};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of sets in a match.
pub const SET_COUNT: u8 = 5;

/// Lifecycle of a set or match. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Upcoming,
    Live,
    Completed,
}

/// Score and status of one set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetState {
    /// 1-based set number.
    pub id: u8,
    pub home_score: u32,
    pub away_score: u32,
    pub status: Status,
}

impl SetState {
    fn new(id: u8, status: Status) -> Self {
        SetState {
            id,
            home_score: 0,
            away_score: 0,
            status,
        }
    }

    /// Score for one side.
    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }

    /// The side that took a completed set.
    pub fn winner(&self) -> Option<Side> {
        if self.status != Status::Completed {
            return None;
        }
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Snapshot of a match: teams, status and the five sets.
///
/// Only the progression rules in [`Match::award_point`] mutate scores and
/// statuses after construction.
///
/// # Examples
///
/// ```
/// use volleyfold::{Match, Player, Status, Team};
///
/// let home = Team::new(1, "Dragons", vec![Player::new(101, "Liu Wei", 7, "Setter")]);
/// let away = Team::new(2, "Phoenix", vec![Player::new(201, "Lin Tzu-wei", 2, "Setter")]);
/// let m = Match::new("vb-001", home, away, "2024-05-12T19:30:00", "Taipei Arena");
///
/// assert_eq!(m.status, Status::Live);
/// assert_eq!(m.current_set, 1);
/// assert_eq!(m.sets[0].status, Status::Live);
/// assert!(m.sets[1..].iter().all(|s| s.status == Status::Upcoming));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub home_team: Team,
    pub away_team: Team,
    pub date: String,
    pub location: String,
    pub status: Status,
    /// 1-based index of the live set, or of the last completed set once the
    /// match is over.
    pub current_set: u8,
    pub sets: [SetState; SET_COUNT as usize],
}

impl Match {
    /// Create a match in its initial state: first set live, the rest upcoming.
    pub fn new(
        id: impl Into<String>,
        home_team: Team,
        away_team: Team,
        date: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        let sets = std::array::from_fn(|i| {
            let status = if i == 0 { Status::Live } else { Status::Upcoming };
            SetState::new(i as u8 + 1, status)
        });
        Match {
            id: id.into(),
            home_team,
            away_team,
            date: date.into(),
            location: location.into(),
            status: Status::Live,
            current_set: 1,
            sets,
        }
    }

    /// Check that the rosters can back a scorekeeping session.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if both teams share an id, a roster is
    /// empty, or a player id appears more than once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.home_team.id == self.away_team.id {
            return Err(ValidationError::DuplicateTeam {
                team_id: self.home_team.id,
            });
        }
        let mut seen = HashSet::new();
        for team in [&self.home_team, &self.away_team] {
            if team.players.is_empty() {
                return Err(ValidationError::EmptyRoster { team_id: team.id });
            }
            for player in &team.players {
                if !seen.insert(player.id) {
                    return Err(ValidationError::DuplicatePlayer {
                        player_id: player.id,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    /// Which side a team id belongs to.
    pub fn side_of(&self, team_id: u32) -> Option<Side> {
        if team_id == self.home_team.id {
            Some(Side::Home)
        } else if team_id == self.away_team.id {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    /// The set `current_set` points at.
    pub fn current_set_state(&self) -> &SetState {
        &self.sets[self.current_index()]
    }

    /// Number of completed sets won by `side`.
    pub fn sets_won(&self, side: Side) -> u8 {
        self.sets
            .iter()
            .filter(|s| s.winner() == Some(side))
            .count() as u8
    }

    pub(crate) fn current_index(&self) -> usize {
        usize::from(self.current_set.clamp(1, SET_COUNT)) - 1
    }

    pub(crate) fn current_set_mut(&mut self) -> &mut SetState {
        let index = self.current_index();
        &mut self.sets[index]
    }
}
