use crate::game_state::{Action, GameState};

/// Whether the game is waiting on this player.
pub fn attention_needed(game: &GameState) -> bool {
    match game.action {
        None => false,
        Some(Action::Nominate) => !game.selection_confirmed,
        Some(_) => true,
    }
}

/// Drives an outside notifier (title blink, badge). Signalled while
/// attention is needed and the view is not focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttentionSignal {
    needed: bool,
    focused: bool,
}

impl Default for AttentionSignal {
    fn default() -> Self {
        AttentionSignal {
            needed: false,
            focused: true,
        }
    }
}

impl AttentionSignal {
    pub fn is_signalled(&self) -> bool {
        self.needed && !self.focused
    }

    /// Re-evaluates against the game. Returns the new signal on an edge.
    pub fn update(&mut self, game: &GameState) -> Option<bool> {
        let needed = attention_needed(game);
        self.transition(|s| s.needed = needed)
    }

    pub fn set_focused(&mut self, focused: bool) -> Option<bool> {
        self.transition(|s| s.focused = focused)
    }

    fn transition<F: FnOnce(&mut Self)>(&mut self, f: F) -> Option<bool> {
        let before = self.is_signalled();
        f(self);
        let after = self.is_signalled();
        (before != after).then_some(after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(action: Option<Action>, selection_confirmed: bool) -> GameState {
        GameState {
            action,
            selection_confirmed,
            ..GameState::default()
        }
    }

    #[test]
    fn attention_needed_should_follow_action_and_confirmation() {
        assert!(!attention_needed(&game(None, false)));
        assert!(attention_needed(&game(Some(Action::Nominate), false)));
        assert!(!attention_needed(&game(Some(Action::Nominate), true)));
        assert!(attention_needed(&game(Some(Action::Elect), true)));
        assert!(attention_needed(&game(Some(Action::Join), false)));
    }

    #[test]
    fn signal_should_flip_on_confirmation_and_back_on_elect() {
        let mut signal = AttentionSignal::default();
        assert_eq!(signal.set_focused(false), None);

        assert_eq!(signal.update(&game(Some(Action::Nominate), false)), Some(true));
        assert_eq!(signal.update(&game(Some(Action::Nominate), true)), Some(false));
        assert_eq!(signal.update(&game(Some(Action::Elect), true)), Some(true));
        assert_eq!(signal.update(&game(Some(Action::Elect), false)), None);
    }

    #[test]
    fn focus_should_silence_the_signal() {
        let mut signal = AttentionSignal::default();
        assert_eq!(signal.update(&game(Some(Action::Elect), false)), None);
        assert_eq!(signal.set_focused(false), Some(true));
        assert_eq!(signal.set_focused(true), Some(false));
        assert!(!signal.is_signalled());
    }
}
