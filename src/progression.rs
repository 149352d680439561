//! Set and match progression.
//!
//! A set is `upcoming → live → completed`; the match is `live → completed`.
//! Scores only change through [`Match::award_point`], and a completed set is
//! never touched again.

use crate::event::VolleyEvent;
use crate::roster::Side;
use crate::state::{Match, SET_COUNT, Status};
use serde::{Deserialize, Serialize};

/// Points needed to take a set.
///
/// The deciding set has its own target. It defaults to the same 25 points as
/// the other sets; set it to 15 for a short fifth set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRules {
    pub points_to_win: u32,
    pub deciding_set_points: u32,
    pub win_margin: u32,
}

impl Default for SetRules {
    fn default() -> Self {
        SetRules {
            points_to_win: 25,
            deciding_set_points: 25,
            win_margin: 2,
        }
    }
}

impl SetRules {
    /// Target score for the given 1-based set number.
    pub fn target(&self, set_number: u8) -> u32 {
        if set_number == SET_COUNT {
            self.deciding_set_points
        } else {
            self.points_to_win
        }
    }

    /// Whether `home`–`away` ends set `set_number`.
    ///
    /// ```
    /// use volleyfold::SetRules;
    ///
    /// let rules = SetRules::default();
    /// assert!(rules.is_set_won(1, 25, 23));
    /// assert!(!rules.is_set_won(1, 25, 24));
    /// assert!(rules.is_set_won(1, 24, 26));
    /// assert!(!rules.is_set_won(1, 24, 22));
    /// ```
    pub fn is_set_won(&self, set_number: u8, home: u32, away: u32) -> bool {
        let target = self.target(set_number);
        (home >= target || away >= target) && home.abs_diff(away) >= self.win_margin
    }
}

/// What a single awarded point did to the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointOutcome {
    pub side: Side,
    /// Set in which the point was played.
    pub set_number: u8,
    pub home_score: u32,
    pub away_score: u32,
    pub set_completed: bool,
    pub match_completed: bool,
}

impl Match {
    /// Give one point to `side` in the live set and advance the match.
    ///
    /// When the set is won, the next set goes live, or the match completes if
    /// this was the fifth set. Returns `None` without changing anything when
    /// the match is not live.
    pub fn award_point(&mut self, side: Side, rules: &SetRules) -> Option<PointOutcome> {
        if self.status != Status::Live {
            return None;
        }

        let set = self.current_set_mut();
        if set.status != Status::Live {
            return None;
        }
        match side {
            Side::Home => set.home_score += 1,
            Side::Away => set.away_score += 1,
        }
        let set_number = set.id;
        let (home_score, away_score) = (set.home_score, set.away_score);

        let set_completed = rules.is_set_won(set_number, home_score, away_score);
        let mut match_completed = false;
        if set_completed {
            set.status = Status::Completed;
            log::info!(
                "match {}: set {set_number} completed {home_score}-{away_score}",
                self.id
            );
            if self.current_set < SET_COUNT {
                self.current_set += 1;
                self.current_set_mut().status = Status::Live;
                log::debug!("match {}: set {} is live", self.id, self.current_set);
            } else {
                self.status = Status::Completed;
                match_completed = true;
                log::info!(
                    "match {}: completed, sets {}-{}",
                    self.id,
                    self.sets_won(Side::Home),
                    self.sets_won(Side::Away)
                );
            }
        }

        Some(PointOutcome {
            side,
            set_number,
            home_score,
            away_score,
            set_completed,
            match_completed,
        })
    }
}

/// Rebuild match state by folding the point events of a ledger into the
/// initial fixture.
///
/// Events for other matches, non-point events, and point events naming a team
/// outside the fixture are ignored, as are points after the match completed.
pub fn replay<'a, I>(fixture: &Match, events: I, rules: &SetRules) -> Match
where
    I: IntoIterator<Item = &'a VolleyEvent>,
{
    let mut state = fixture.clone();
    for event in events {
        if event.match_id != state.id || !event.is_point() {
            continue;
        }
        match state.side_of(event.team_id) {
            Some(side) => {
                state.award_point(side, rules);
            }
            None => log::warn!(
                "match {}: point event {} names unknown team {}",
                state.id,
                event.id,
                event.team_id
            ),
        }
    }
    state
}
