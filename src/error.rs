use crate::session::Recorded;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Input that does not fit the match roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("team {team_id} is not playing in this match")]
    UnknownTeam { team_id: u32 },

    #[error("player {player_id} is not on the roster of team {team_id}")]
    UnknownPlayer { player_id: u32, team_id: u32 },

    #[error("team {team_id} has an empty roster")]
    EmptyRoster { team_id: u32 },

    #[error("home and away teams share id {team_id}")]
    DuplicateTeam { team_id: u32 },

    #[error("player {player_id} appears more than once across the rosters")]
    DuplicatePlayer { player_id: u32 },
}

/// Failure of the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("another writer holds the lock on {}", .path.display())]
    Locked { path: PathBuf },

    #[error("corrupt ledger entry at line {line}: {source}")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Why [`MatchSession::record_event`](crate::MatchSession::record_event)
/// did not cleanly record a play.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("match {match_id} is completed; no further events are accepted")]
    MatchClosed { match_id: String },

    /// The events were applied in memory but the store failed to save them.
    /// The in-memory mutation stands.
    #[error("event {} recorded but not persisted: {source}", .recorded.event.id)]
    Persist {
        recorded: Box<Recorded>,
        #[source]
        source: StoreError,
    },
}

impl RecordError {
    /// The in-memory result carried by a persistence failure.
    pub fn recorded(&self) -> Option<&Recorded> {
        match self {
            RecordError::Persist { recorded, .. } => Some(recorded),
            _ => None,
        }
    }
}

/// Failure while constructing a session.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("invalid match fixture: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to load match: {0}")]
    Store(#[from] StoreError),
}
