use std::str::FromStr;

use serde::{de::Error, Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumString};

use crate::prompt::{BlackInfo, PromptParser};

/// What the server currently expects from this player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Action {
    Join,
    Leave,
    GameFull,
    Nominate,
    Elect,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSummary {
    pub name: String,
    pub kind: Option<String>,
    pub score: u32,
    pub ready: bool,
    pub abandoned: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    #[default]
    Pending,
    Winner,
    Loser,
}

/// One candidate answer: hand-card ids in blank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub cards: Vec<String>,
    #[serde(default)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub status: String,
    pub error: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub roster: Vec<PlayerSummary>,
    pub black: Option<String>,
    /// Derived from `black`, never taken from the wire.
    pub black_info: Option<BlackInfo>,
    #[serde(deserialize_with = "action_or_none")]
    pub action: Option<Action>,
    #[serde(deserialize_with = "null_as_default")]
    pub submissions: Vec<Submission>,
    pub selection_confirmed: bool,
    pub countdown: Option<u32>,
}

impl Default for GameState {
    fn default() -> Self {
        GameState {
            status: "Loading...".to_string(),
            error: false,
            roster: vec![],
            black: None,
            black_info: None,
            action: None,
            submissions: vec![],
            selection_confirmed: false,
            countdown: None,
        }
    }
}

impl GameState {
    pub fn is_nominating(&self) -> bool {
        self.action == Some(Action::Nominate)
    }

    pub fn is_electing(&self) -> bool {
        self.action == Some(Action::Elect)
    }

    pub fn blank_count(&self) -> Option<u32> {
        self.black_info.as_ref().map(|info| info.blank_count)
    }

    pub fn refresh_black_info(&mut self, parser: &dyn PromptParser) {
        self.black_info = self
            .black
            .as_deref()
            .filter(|black| !black.is_empty())
            .map(|black| parser.parse(black));
    }
}

/// Reads an action where both `null` and `"none"` mean there is nothing to do.
pub(crate) fn action_or_none<'de, D>(deserializer: D) -> Result<Option<Action>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("none") => Ok(None),
        Some(name) => Action::from_str(name)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("unknown action `{name}`"))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::prompt::BlankParser;

    #[test]
    fn game_state_should_read_camel_case_fields() {
        let state: GameState = serde_json::from_value(json!({
            "status": "Pick a card.",
            "action": "nominate",
            "selectionConfirmed": true,
            "submissions": null,
            "roster": [{"name": "Ann", "kind": "czar", "score": 2}],
        }))
        .unwrap();

        assert_eq!(state.status, "Pick a card.");
        assert!(state.is_nominating());
        assert!(state.selection_confirmed);
        assert!(state.submissions.is_empty());
        assert_eq!(state.roster[0].score, 2);
        assert!(!state.roster[0].ready);
    }

    #[test]
    fn action_should_use_camel_case_tags() {
        assert_eq!(
            serde_json::from_value::<Action>(json!("gameFull")).unwrap(),
            Action::GameFull
        );
        assert_eq!(Action::GameFull.to_string(), "gameFull");
    }

    #[test]
    fn refresh_black_info_should_follow_black() {
        let mut state = GameState {
            black: Some("_ is why I cry.".to_string()),
            ..GameState::default()
        };
        state.refresh_black_info(&BlankParser);
        assert_eq!(state.blank_count(), Some(1));

        state.black = None;
        state.refresh_black_info(&BlankParser);
        assert_eq!(state.black_info, None);

        state.black = Some(String::new());
        state.refresh_black_info(&BlankParser);
        assert_eq!(state.black_info, None);
    }

    #[test]
    fn none_action_should_mean_no_action() {
        let state: GameState = serde_json::from_value(json!({"action": "none"})).unwrap();
        assert_eq!(state.action, None);

        let state: GameState = serde_json::from_value(json!({"action": null})).unwrap();
        assert_eq!(state.action, None);

        assert!(serde_json::from_value::<GameState>(json!({"action": "dance"})).is_err());
    }
}
