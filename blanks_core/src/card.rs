use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::store::Record;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CardState {
    #[default]
    Normal,
    /// Picked locally, not yet confirmed by the server.
    Selecting,
    /// Confirmed by the server as part of this player's pending nomination.
    Selected,
}

/// A white card in the player's hand. The id is the card text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandCard {
    pub id: String,
    /// Position within a multi-card nomination; 0 when not part of one.
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub state: CardState,
}

impl HandCard {
    pub fn new(id: &str) -> Self {
        HandCard {
            id: id.to_string(),
            index: 0,
            state: CardState::Normal,
        }
    }

    pub fn is_normal(&self) -> bool {
        self.state == CardState::Normal
    }

    pub fn is_selecting(&self) -> bool {
        self.state == CardState::Selecting
    }

    pub fn clear(&mut self) {
        self.index = 0;
        self.state = CardState::Normal;
    }
}

impl Record for HandCard {
    fn id(&self) -> &str {
        &self.id
    }
}
