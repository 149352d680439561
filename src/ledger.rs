use crate::event::VolleyEvent;

/// Append-only, in-memory sequence of recorded events.
///
/// Arrival order is preserved and stored events are never modified. The
/// ledger assigns ids of the form `event-<timestamp>-<seq>`, where `seq`
/// counts appends since the last reset.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    events: Vec<VolleyEvent>,
    next_seq: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Seed a ledger with previously persisted events, continuing the id
    /// sequence after them.
    pub fn restore(events: Vec<VolleyEvent>) -> Self {
        let next_seq = events.len() as u64;
        Ledger { events, next_seq }
    }

    /// Assign an id to `event` and store it at the end of the ledger.
    ///
    /// Any id already on the event is replaced.
    pub fn append(&mut self, mut event: VolleyEvent) -> &VolleyEvent {
        event.id = format!("event-{}-{}", event.timestamp, self.next_seq);
        self.next_seq += 1;
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    /// Events belonging to `match_id`, in append order.
    pub fn query<'a>(&'a self, match_id: &'a str) -> impl Iterator<Item = &'a VolleyEvent> + 'a {
        self.events.iter().filter(move |e| e.match_id == match_id)
    }

    /// Every stored event, in append order.
    pub fn events(&self) -> &[VolleyEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every event. Development and test use only.
    pub fn reset(&mut self) {
        self.events.clear();
        self.next_seq = 0;
    }
}
