use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Kind of play recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Serve,
    Receive,
    Set,
    Attack,
    Block,
    Dig,
    Timeout,
    Substitution,
    Point,
}

/// Outcome of a play as judged by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventResult {
    Success,
    Error,
    Neutral,
}

/// An immutable event record stored in the ledger.
///
/// `home_score` and `away_score` are the score of the set *after* this event
/// was applied. An action that wins a rally and the synthetic `point` event
/// that follows it carry the same pair.
///
/// Serialized as a single JSON object with camelCase keys; the event kind is
/// written as `"type"`:
///
/// ```text
/// {"id":"event-1715542200000-0","matchId":"vb-001","timestamp":1715542200000,
///  "type":"attack","playerId":102,"teamId":1,"setNumber":1,"result":"success",
///  "homeScore":1,"awayScore":0}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct VolleyEvent {
    /// Assigned by the ledger on append.
    pub id: String,

    pub match_id: String,

    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,

    #[serde(rename = "type")]
    pub event_type: EventType,

    pub player_id: u32,

    pub team_id: u32,

    /// Set in which the rally was played (1-based).
    pub set_number: u8,

    pub result: EventResult,

    pub home_score: u32,

    pub away_score: u32,

    /// Free-form annotations. Omitted from serialized output when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl VolleyEvent {
    /// Whether this is a point event (synthetic or operator-entered).
    pub fn is_point(&self) -> bool {
        self.event_type == EventType::Point
    }

    /// The `(home, away)` score snapshot carried by this event.
    pub fn score(&self) -> (u32, u32) {
        (self.home_score, self.away_score)
    }
}

/// A play submitted by the operator: an event without id, match, set or
/// score. The session fills those in when the candidate is recorded.
///
/// # Examples
///
/// ```
/// use volleyfold::{CandidateEvent, EventResult, EventType};
/// use serde_json::json;
///
/// let candidate = CandidateEvent::new(EventType::Attack, 1, 102, EventResult::Success)
///     .with_details(json!({"zone": 4}));
/// assert_eq!(candidate.team_id, 1);
/// assert!(candidate.timestamp > 0);
/// assert_eq!(candidate.details.unwrap()["zone"], 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub team_id: u32,
    pub player_id: u32,
    pub result: EventResult,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl CandidateEvent {
    /// Create a candidate stamped with the current time.
    pub fn new(event_type: EventType, team_id: u32, player_id: u32, result: EventResult) -> Self {
        CandidateEvent {
            event_type,
            team_id,
            player_id,
            result,
            timestamp: now_millis(),
            details: None,
        }
    }

    /// Override the recording time (milliseconds since the Unix epoch).
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attach free-form details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Current time in milliseconds since the Unix epoch. A clock set before the
/// epoch reads as 0.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
