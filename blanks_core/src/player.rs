use serde::{Deserialize, Serialize};

use crate::game_state::{action_or_none, Action};

/// The local player's account: display name and lobby action
/// (`join`, `leave` or `gameFull`).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub name: Option<String>,
    #[serde(deserialize_with = "action_or_none")]
    pub action: Option<Action>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn account_should_read_none_as_no_action() {
        let account: Account = serde_json::from_value(json!({"name": "Ann", "action": "none"})).unwrap();

        assert_eq!(account.name.as_deref(), Some("Ann"));
        assert_eq!(account.action, None);
    }
}
