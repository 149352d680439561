//! Point attribution for rally-ending plays.

use crate::event::{EventResult, EventType};
use crate::roster::Side;

/// Decide whether a play ends the rally and which side wins the point.
///
/// Successful serves, attacks and blocks score for the acting side. Serve,
/// attack and receive errors score for the opponent. Every other play leaves
/// the rally open.
///
/// ```
/// use volleyfold::{scoring, EventResult, EventType, Side};
///
/// assert_eq!(
///     scoring::resolve(EventType::Block, EventResult::Success, Side::Away),
///     Some(Side::Away)
/// );
/// assert_eq!(
///     scoring::resolve(EventType::Receive, EventResult::Error, Side::Home),
///     Some(Side::Away)
/// );
/// assert_eq!(scoring::resolve(EventType::Dig, EventResult::Success, Side::Home), None);
/// ```
pub fn resolve(event_type: EventType, result: EventResult, acting: Side) -> Option<Side> {
    match (event_type, result) {
        (EventType::Serve | EventType::Attack | EventType::Block, EventResult::Success) => {
            Some(acting)
        }
        (EventType::Serve | EventType::Attack | EventType::Receive, EventResult::Error) => {
            Some(acting.opponent())
        }
        _ => None,
    }
}
