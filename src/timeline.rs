use crate::event::VolleyEvent;

/// A point event and the play that won it, when known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointEntry<'a> {
    pub point: &'a VolleyEvent,
    /// The action recorded immediately before the point, if it carries the
    /// same score. `None` for points entered directly.
    pub cause: Option<&'a VolleyEvent>,
}

/// Every point event in ledger order, paired with its causing action.
pub fn point_timeline(events: &[VolleyEvent]) -> Vec<PointEntry<'_>> {
    events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_point())
        .map(|(i, point)| {
            let cause = i
                .checked_sub(1)
                .map(|prev| &events[prev])
                .filter(|prev| {
                    !prev.is_point()
                        && prev.match_id == point.match_id
                        && prev.set_number == point.set_number
                        && prev.score() == point.score()
                });
            PointEntry { point, cause }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventResult, EventType};

    fn event(event_type: EventType, home: u32, away: u32) -> VolleyEvent {
        VolleyEvent {
            id: format!("{event_type:?}-{home}-{away}"),
            match_id: "m1".into(),
            timestamp: 0,
            event_type,
            player_id: 101,
            team_id: 1,
            set_number: 1,
            result: EventResult::Success,
            home_score: home,
            away_score: away,
            details: None,
        }
    }

    #[test]
    fn pairs_point_with_preceding_action() {
        let events = vec![
            event(EventType::Serve, 0, 0),
            event(EventType::Attack, 1, 0),
            event(EventType::Point, 1, 0),
        ];
        let timeline = point_timeline(&events);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].cause.unwrap().event_type, EventType::Attack);
    }

    #[test]
    fn first_event_point_has_no_cause() {
        let events = vec![event(EventType::Point, 1, 0)];
        let timeline = point_timeline(&events);
        assert_eq!(timeline[0].cause, None);
    }

    #[test]
    fn direct_point_after_unrelated_action_has_no_cause() {
        let events = vec![
            event(EventType::Dig, 0, 0),
            event(EventType::Point, 1, 0),
            event(EventType::Point, 2, 0),
        ];
        let timeline = point_timeline(&events);
        assert_eq!(timeline.len(), 2);
        assert!(timeline.iter().all(|entry| entry.cause.is_none()));
    }
}
