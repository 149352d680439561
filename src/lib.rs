//! Volleyball scorekeeping over an append-only event ledger.
//!
//! Plays are recorded through a [`MatchSession`]. Each play is checked against
//! the rosters, scored by [`scoring::resolve`], applied to the set and match
//! state, and appended to the ledger together with a synthetic point event
//! when it wins a rally. Statistics are a pure fold over the ledger
//! ([`stats::calculate`]) and are recomputed on every request.

mod archive;
mod error;
mod event;
mod ledger;
mod log;
pub mod progression;
mod roster;
pub mod scoring;
mod session;
pub mod snapshot;
mod state;
pub mod stats;
mod store;
pub mod timeline;

pub use crate::log::{AppendResult, EventLines, LedgerReader, LedgerWriter, WaitResult, line_hash};
pub use error::{OpenError, RecordError, StoreError, ValidationError};
pub use event::{CandidateEvent, EventResult, EventType, VolleyEvent};
pub use ledger::Ledger;
pub use progression::{PointOutcome, SetRules};
pub use roster::{Player, Side, Team};
pub use session::{ClosedMatchPolicy, LedgerUpdate, MatchSession, Recorded, SessionBuilder};
pub use snapshot::MatchSnapshot;
pub use state::{Match, SET_COUNT, SetState, Status};
pub use stats::{MatchStats, PlayerSort, PlayerStats, TeamStats};
pub use store::{DirStore, MatchStore, MemoryStore, StoredMatch};
pub use timeline::PointEntry;
