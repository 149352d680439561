use crate::error::{OpenError, RecordError, StoreError, ValidationError};
use crate::event::{CandidateEvent, EventResult, EventType, VolleyEvent};
use crate::ledger::Ledger;
use crate::progression::{self, PointOutcome, SetRules};
use crate::roster::Side;
use crate::scoring;
use crate::state::Match;
use crate::stats::{self, MatchStats};
use crate::store::{MatchStore, MemoryStore};
use crate::timeline::{self, PointEntry};
use std::sync::mpsc::{self, Receiver, Sender};

/// What happens to events submitted after the match completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClosedMatchPolicy {
    /// Refuse them with [`RecordError::MatchClosed`].
    #[default]
    Reject,
    /// Append them to the ledger with the final score, without scoring.
    /// Direct `point` events are still refused.
    RecordOnly,
}

/// Result of a successful [`MatchSession::record_event`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    /// The submitted play as stored.
    pub event: VolleyEvent,
    /// The synthetic point event, when the play won a rally.
    pub point: Option<VolleyEvent>,
    /// Number of the set this play completed, if any.
    pub set_completed: Option<u8>,
    pub match_completed: bool,
}

/// Notification sent to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerUpdate {
    Appended(VolleyEvent),
    Reset,
}

/// Configures and opens a [`MatchSession`].
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    fixture: Match,
    rules: SetRules,
    closed: ClosedMatchPolicy,
}

impl SessionBuilder {
    pub fn rules(mut self, rules: SetRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn closed_match(mut self, policy: ClosedMatchPolicy) -> Self {
        self.closed = policy;
        self
    }

    /// Validate the fixture and load whatever `store` persisted.
    ///
    /// Persisted events seed the ledger. The stored match state is used if
    /// the store trusts it and it belongs to this fixture; otherwise state is
    /// rebuilt by replaying the ledger's point events.
    pub fn open<S: MatchStore>(self, mut store: S) -> Result<MatchSession<S>, OpenError> {
        self.fixture.validate()?;

        let (state, ledger) = match store.load()? {
            None => (self.fixture.clone(), Ledger::new()),
            Some(stored) => {
                let ledger = Ledger::restore(stored.events);
                let state = match stored.state {
                    Some(state) if state.id == self.fixture.id => state,
                    other => {
                        if let Some(foreign) = other {
                            log::warn!(
                                "stored state belongs to match {}, not {}; replaying",
                                foreign.id,
                                self.fixture.id
                            );
                        }
                        progression::replay(
                            &self.fixture,
                            ledger.query(&self.fixture.id),
                            &self.rules,
                        )
                    }
                };
                log::debug!(
                    "match {}: loaded {} events, set {}",
                    state.id,
                    ledger.len(),
                    state.current_set
                );
                (state, ledger)
            }
        };

        Ok(MatchSession {
            fixture: self.fixture,
            state,
            persisted: ledger.len(),
            ledger,
            clear_pending: false,
            rules: self.rules,
            closed: self.closed,
            store,
            subscribers: Vec::new(),
        })
    }
}

/// A scorekeeping session for one match.
///
/// Owns the initial fixture, the live match state, the ledger and the store.
/// Every mutation goes through `&mut self`, so appending events, updating
/// set scores and advancing the set happen as one unit.
///
/// # Examples
///
/// ```
/// use volleyfold::{CandidateEvent, EventResult, EventType, Match, MatchSession, Player, Team};
///
/// let home = Team::new(1, "Dragons", vec![Player::new(101, "Liu Wei", 7, "Setter")]);
/// let away = Team::new(2, "Phoenix", vec![Player::new(201, "Lin Tzu-wei", 2, "Setter")]);
/// let fixture = Match::new("vb-001", home, away, "2024-05-12T19:30:00", "Taipei Arena");
///
/// let mut session = MatchSession::new(fixture)?;
/// let recorded = session.record_event(CandidateEvent::new(
///     EventType::Attack,
///     1,
///     101,
///     EventResult::Success,
/// ))?;
///
/// assert_eq!(recorded.event.score(), (1, 0));
/// assert_eq!(recorded.point.unwrap().score(), (1, 0));
/// assert_eq!(session.current_match().sets[0].home_score, 1);
/// assert_eq!(session.calculate_match_stats().home.points, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct MatchSession<S = MemoryStore> {
    fixture: Match,
    state: Match,
    ledger: Ledger,
    /// Number of leading ledger events the store holds.
    persisted: usize,
    /// A reset the store has not yet applied.
    clear_pending: bool,
    rules: SetRules,
    closed: ClosedMatchPolicy,
    store: S,
    subscribers: Vec<Sender<LedgerUpdate>>,
}

impl<S> std::fmt::Debug for MatchSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchSession")
            .field("match_id", &self.state.id)
            .field("status", &self.state.status)
            .field("current_set", &self.state.current_set)
            .field("events", &self.ledger.len())
            .field("rules", &self.rules)
            .finish()
    }
}

impl MatchSession<MemoryStore> {
    /// In-memory session with default rules.
    pub fn new(fixture: Match) -> Result<Self, OpenError> {
        Self::builder(fixture).open(MemoryStore::new())
    }

    /// Start configuring a session; the store is chosen in
    /// [`SessionBuilder::open`].
    pub fn builder(fixture: Match) -> SessionBuilder {
        SessionBuilder {
            fixture,
            rules: SetRules::default(),
            closed: ClosedMatchPolicy::default(),
        }
    }
}

impl<S: MatchStore> MatchSession<S> {
    /// Current match snapshot.
    pub fn current_match(&self) -> &Match {
        &self.state
    }

    /// The match as it was before any event.
    pub fn fixture(&self) -> &Match {
        &self.fixture
    }

    /// Events of the current match, in recording order.
    pub fn match_events(&self) -> Vec<&VolleyEvent> {
        self.ledger.query(&self.state.id).collect()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn rules(&self) -> &SetRules {
        &self.rules
    }

    pub fn closed_match_policy(&self) -> ClosedMatchPolicy {
        self.closed
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a play, scoring it if it ends the rally.
    ///
    /// A rally-winning play is stored first, carrying the new score, followed
    /// by a synthetic `point` event for the winning team credited to the first
    /// player on its roster. A candidate of type `point` scores for its own
    /// team and is itself the point event.
    ///
    /// # Errors
    ///
    /// - [`RecordError::MatchClosed`] if the match is over and the policy is
    ///   [`ClosedMatchPolicy::Reject`].
    /// - [`RecordError::Validation`] if the team or player is not in the
    ///   match; nothing is recorded.
    /// - [`RecordError::Persist`] if the store failed after the events were
    ///   applied in memory. The in-memory result is inside the error.
    pub fn record_event(&mut self, candidate: CandidateEvent) -> Result<Recorded, RecordError> {
        // A point after the final whistle would never show on the scoreboard.
        let closed = self.closed == ClosedMatchPolicy::Reject
            || candidate.event_type == EventType::Point;
        if self.state.is_completed() && closed {
            log::warn!(
                "match {}: {:?} submitted after completion, rejected",
                self.state.id,
                candidate.event_type
            );
            return Err(RecordError::MatchClosed {
                match_id: self.state.id.clone(),
            });
        }

        let side = self.validate(&candidate)?;

        if self.state.is_completed() {
            let set = self.state.current_set_state();
            let event = self.build_event(&candidate, set.id, set.home_score, set.away_score);
            return self.commit(event, None, None, false);
        }

        let awarded = if candidate.event_type == EventType::Point {
            Some(side)
        } else {
            scoring::resolve(candidate.event_type, candidate.result, side)
        };

        let Some(winner) = awarded else {
            let set = self.state.current_set_state();
            let event = self.build_event(&candidate, set.id, set.home_score, set.away_score);
            return self.commit(event, None, None, false);
        };

        let Some(outcome) = self.state.award_point(winner, &self.rules) else {
            return Err(RecordError::MatchClosed {
                match_id: self.state.id.clone(),
            });
        };

        let event = self.build_event(
            &candidate,
            outcome.set_number,
            outcome.home_score,
            outcome.away_score,
        );
        let point = (candidate.event_type != EventType::Point)
            .then(|| self.point_event(&outcome, candidate.timestamp));
        let set_completed = outcome.set_completed.then_some(outcome.set_number);
        self.commit(event, point, set_completed, outcome.match_completed)
    }

    /// Recompute statistics from the full ledger.
    pub fn calculate_match_stats(&self) -> MatchStats {
        stats::calculate(&self.state, self.ledger.events())
    }

    /// Point events of the current match with the plays that won them.
    pub fn point_timeline(&self) -> Vec<PointEntry<'_>> {
        timeline::point_timeline(self.ledger.events())
            .into_iter()
            .filter(|entry| entry.point.match_id == self.state.id)
            .collect()
    }

    /// Clear the ledger and restore the fixture. For development and tests.
    ///
    /// The in-memory reset always happens; a store failure is returned after
    /// the fact and the reset is retried on the next save.
    pub fn reset_match(&mut self) -> Result<(), StoreError> {
        self.state = self.fixture.clone();
        self.ledger.reset();
        self.persisted = 0;
        log::info!("match {}: reset", self.state.id);
        self.broadcast(LedgerUpdate::Reset);
        match self.store.clear(&self.state) {
            Ok(()) => {
                self.clear_pending = false;
                Ok(())
            }
            Err(e) => {
                log::error!("match {}: failed to persist reset: {e}", self.state.id);
                self.clear_pending = true;
                Err(e)
            }
        }
    }

    /// Receive every event appended from now on, and resets.
    pub fn subscribe(&mut self) -> Receiver<LedgerUpdate> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn validate(&self, candidate: &CandidateEvent) -> Result<Side, ValidationError> {
        let side = self
            .state
            .side_of(candidate.team_id)
            .ok_or(ValidationError::UnknownTeam {
                team_id: candidate.team_id,
            })?;
        if self.state.team(side).player(candidate.player_id).is_none() {
            return Err(ValidationError::UnknownPlayer {
                player_id: candidate.player_id,
                team_id: candidate.team_id,
            });
        }
        Ok(side)
    }

    fn build_event(
        &self,
        candidate: &CandidateEvent,
        set_number: u8,
        home_score: u32,
        away_score: u32,
    ) -> VolleyEvent {
        VolleyEvent {
            id: String::new(),
            match_id: self.state.id.clone(),
            timestamp: candidate.timestamp,
            event_type: candidate.event_type,
            player_id: candidate.player_id,
            team_id: candidate.team_id,
            set_number,
            result: candidate.result,
            home_score,
            away_score,
            details: candidate.details.clone(),
        }
    }

    fn point_event(&self, outcome: &PointOutcome, timestamp: u64) -> VolleyEvent {
        let team = self.state.team(outcome.side);
        VolleyEvent {
            id: String::new(),
            match_id: self.state.id.clone(),
            timestamp,
            event_type: EventType::Point,
            player_id: team.representative().map_or(0, |p| p.id),
            team_id: team.id,
            set_number: outcome.set_number,
            result: EventResult::Success,
            home_score: outcome.home_score,
            away_score: outcome.away_score,
            details: None,
        }
    }

    fn commit(
        &mut self,
        event: VolleyEvent,
        point: Option<VolleyEvent>,
        set_completed: Option<u8>,
        match_completed: bool,
    ) -> Result<Recorded, RecordError> {
        let event = self.ledger.append(event).clone();
        let point = point.map(|p| self.ledger.append(p).clone());
        log::debug!(
            "match {}: recorded {} {:?}/{:?} at {}-{}",
            event.match_id,
            event.id,
            event.event_type,
            event.result,
            event.home_score,
            event.away_score
        );

        self.broadcast(LedgerUpdate::Appended(event.clone()));
        if let Some(p) = &point {
            self.broadcast(LedgerUpdate::Appended(p.clone()));
        }

        let recorded = Recorded {
            event,
            point,
            set_completed,
            match_completed,
        };
        match self.persist() {
            Ok(()) => Ok(recorded),
            Err(source) => {
                log::error!(
                    "match {}: event {} not persisted: {source}",
                    self.state.id,
                    recorded.event.id
                );
                Err(RecordError::Persist {
                    recorded: Box::new(recorded),
                    source,
                })
            }
        }
    }

    /// Hand the store every event it does not hold yet, after any reset it
    /// missed.
    fn persist(&mut self) -> Result<(), StoreError> {
        if self.clear_pending {
            self.store.clear(&self.fixture)?;
            self.clear_pending = false;
        }
        let unsaved = &self.ledger.events()[self.persisted..];
        self.store.save(&self.state, unsaved)?;
        self.persisted = self.ledger.len();
        Ok(())
    }

    fn broadcast(&mut self, update: LedgerUpdate) {
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }
}
