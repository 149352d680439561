use serde::{Deserialize, Serialize};

/// One of the two teams in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    /// The side across the net.
    ///
    /// ```
    /// use volleyfold::Side;
    ///
    /// assert_eq!(Side::Home.opponent(), Side::Away);
    /// assert_eq!(Side::Away.opponent(), Side::Home);
    /// ```
    pub fn opponent(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// Roster entry. Immutable for the duration of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub number: u32,
    pub position: String,
}

impl Player {
    pub fn new(id: u32, name: impl Into<String>, number: u32, position: impl Into<String>) -> Self {
        Player {
            id,
            name: name.into(),
            number,
            position: position.into(),
        }
    }
}

/// A team and its roster.
///
/// Roster order is significant: the first player stands in as the scorer of
/// synthetic point events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub players: Vec<Player>,
}

impl Team {
    pub fn new(id: u32, name: impl Into<String>, players: Vec<Player>) -> Self {
        Team {
            id,
            name: name.into(),
            players,
        }
    }

    /// Look up a roster player by id.
    pub fn player(&self, player_id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// The player credited with synthetic point events (roster index 0).
    pub fn representative(&self) -> Option<&Player> {
        self.players.first()
    }
}
