use log::{debug, error, info};

use crate::{
    attention::AttentionSignal,
    card::HandCard,
    chat::ChatMessage,
    config::SessionConfig,
    countdown::{ending_soon, CountdownTimer},
    error::SyncError,
    event::SessionEvent,
    events::ClientEvent,
    game_state::{Action, GameState},
    player::Account,
    prompt::{BlankParser, PromptParser},
    selection::SelectionEngine,
    store::{Change, EntityStore, Singleton},
};

/// Everything one connected client knows: the mirrored stores plus the local
/// timer, attention signal, pending intents and view events.
///
/// All mutation runs to completion inside one call: an inbound batch
/// ([`Session::apply_batch`]), a user action, or a timer tick.
pub struct Session {
    pub(crate) config: SessionConfig,
    pub(crate) parser: Box<dyn PromptParser>,
    pub(crate) game: Singleton<GameState>,
    pub(crate) account: Singleton<Account>,
    pub(crate) hand: EntityStore<HandCard>,
    pub(crate) chat: EntityStore<ChatMessage>,
    pub(crate) timer: CountdownTimer,
    attention: AttentionSignal,
    pub(crate) outbox: Vec<ClientEvent>,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Session::with_parser(config, Box::new(BlankParser))
    }

    pub fn with_parser(config: SessionConfig, parser: Box<dyn PromptParser>) -> Self {
        Session {
            config,
            parser,
            game: Singleton::new("game", GameState::default()),
            account: Singleton::new("account", Account::default()),
            hand: EntityStore::new("hand"),
            chat: EntityStore::new("chat"),
            timer: CountdownTimer::default(),
            attention: AttentionSignal::default(),
            outbox: vec![],
            events: vec![],
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn game(&self) -> &GameState {
        self.game.get()
    }

    pub fn account(&self) -> &Account {
        self.account.get()
    }

    pub fn hand(&self) -> &EntityStore<HandCard> {
        &self.hand
    }

    pub fn chat(&self) -> &EntityStore<ChatMessage> {
        &self.chat
    }

    pub fn countdown_active(&self) -> bool {
        self.timer.is_active()
    }

    pub fn attention_signalled(&self) -> bool {
        self.attention.is_signalled()
    }

    pub fn on_game_change<F: FnMut(&Change<GameState>) + 'static>(&mut self, listener: F) {
        self.game.subscribe(listener);
    }

    pub fn on_account_change<F: FnMut(&Change<Account>) + 'static>(&mut self, listener: F) {
        self.account.subscribe(listener);
    }

    pub fn on_chat_change<F: FnMut(&Change<ChatMessage>) + 'static>(&mut self, listener: F) {
        self.chat.subscribe(listener);
    }

    /// Intents queued since the last drain, in the order they were produced.
    pub fn drain_outbox(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// A click on a hand card. Clicks on cards that are already gone are
    /// ignored.
    pub fn click_card(&mut self, id: &str) -> Result<(), SyncError> {
        let result = SelectionEngine::new(&mut self.hand, &mut self.outbox).click(self.game.get(), id);
        recover_unknown_entity(result)
    }

    /// Cancels any nomination in progress.
    pub fn reset_selections(&mut self) {
        if let Err(e) = SelectionEngine::new(&mut self.hand, &mut self.outbox).reset_selections(None) {
            error!("failed to reset selections: {e}");
        }
    }

    /// A "game is full" notice lapses back into an offer to join.
    pub fn reopen_join(&mut self) {
        self.account.modify(|a| {
            if a.action == Some(Action::GameFull) {
                a.action = Some(Action::Join);
            }
        });
    }

    /// One local second passed.
    pub fn tick(&mut self) {
        let change = self.timer.tick(&mut self.game);
        self.game_changed(change);
    }

    pub fn set_focused(&mut self, focused: bool) {
        if let Some(signalled) = self.attention.set_focused(focused) {
            self.events.push(SessionEvent::AttentionChanged(signalled));
        }
    }

    /// The transport is gone for good.
    pub fn connection_lost(&mut self) {
        let game = self.game.get();
        let status = if game.error {
            format!("Dropped: {}", game.status)
        } else {
            "Lost connection.".to_string()
        };
        info!("{status}");
        let change = self.game.modify(|g| {
            g.status = status;
            g.error = true;
        });
        self.game_changed(change);
        self.events.push(SessionEvent::ConnectionLost);
    }

    /// Reactions to a game change: the "ending soon" threshold and the
    /// attention signal.
    pub(crate) fn game_changed(&mut self, change: Option<Change<GameState>>) {
        let (previous, current) = match change {
            Some(Change::Patch { previous, current }) => (previous, current),
            _ => return,
        };

        if previous.countdown != current.countdown {
            match (ending_soon(previous.countdown), ending_soon(current.countdown)) {
                (_, Some(remaining)) => self.events.push(SessionEvent::EndingSoon(remaining)),
                (Some(_), None) => self.events.push(SessionEvent::EndingSoonCleared),
                (None, None) => {}
            }
        }

        if let Some(signalled) = self.attention.update(&current) {
            debug!("attention signal now {signalled}");
            self.events.push(SessionEvent::AttentionChanged(signalled));
        }
    }

    pub(crate) fn chat_changed(&mut self) {
        self.chat.trim_front(self.config.chat_history);
    }
}

/// A reference to an entity a preceding message just removed is not an error
/// worth surfacing.
pub(crate) fn recover_unknown_entity(result: Result<(), SyncError>) -> Result<(), SyncError> {
    match result {
        Err(SyncError::UnknownEntity(e)) => {
            debug!("ignoring: {e}");
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use serde_json::json;

    use super::*;
    use crate::card::CardState;

    fn session() -> Session {
        Session::new(SessionConfig::default())
    }

    #[test]
    fn connection_lost_should_keep_the_previous_error_status() {
        let mut session = session();
        session.connection_lost();
        assert_eq!(session.game().status, "Lost connection.");
        assert!(session.game().error);

        let mut session = self::session();
        session.game.modify(|g| {
            g.status = "Kicked for idling.".to_string();
            g.error = true;
        });
        session.connection_lost();
        assert_eq!(session.game().status, "Dropped: Kicked for idling.");
        assert_eq!(session.drain_events(), vec![SessionEvent::ConnectionLost]);
    }

    #[test]
    fn ticks_should_announce_the_ending_soon_threshold() {
        let mut session = session();
        let change = session.timer.arm(&mut session.game, Some(12));
        session.game_changed(change);
        session.tick();
        assert!(session.drain_events().is_empty());

        session.tick();
        assert_eq!(session.drain_events(), vec![SessionEvent::EndingSoon(10)]);

        let change = session.timer.arm(&mut session.game, None);
        session.game_changed(change);
        assert_eq!(session.drain_events(), vec![SessionEvent::EndingSoonCleared]);
    }

    #[test]
    fn game_listeners_should_see_changes_before_reactions() {
        let mut session = session();
        let seen = Rc::new(RefCell::new(vec![]));
        let sink = seen.clone();
        session.on_game_change(move |c| {
            if let Change::Patch { current, .. } = c {
                sink.borrow_mut().push(current.action);
            }
        });
        session.set_focused(false);
        let change = session.game.modify(|g| g.action = Some(Action::Elect));
        session.game_changed(change);

        assert_eq!(*seen.borrow(), vec![Some(Action::Elect)]);
        assert_eq!(session.drain_events(), vec![SessionEvent::AttentionChanged(true)]);
    }

    #[test]
    fn reset_selections_should_cancel_and_tell_the_server() {
        let mut session = session();
        session.apply_batch(
            &json!([
                {"a": "set", "action": "nominate", "black": "_ and _"},
                {"a": "reset", "t": "hand", "objs": [{"id": "A"}, {"id": "B"}]},
            ])
            .to_string(),
        );
        session.click_card("A").unwrap();
        assert_eq!(session.hand().get("A").map(|c| c.state), Some(CardState::Selecting));

        session.reset_selections();
        assert!(session.hand().iter().all(|c| c.is_normal() && c.index == 0));
        assert_eq!(session.drain_outbox(), vec![ClientEvent::Submit { cards: vec![] }]);
    }

    #[test]
    fn reopen_join_should_only_replace_game_full() {
        let mut session = session();
        let seen = Rc::new(RefCell::new(vec![]));
        let sink = seen.clone();
        session.on_account_change(move |c| {
            if let Change::Patch { current, .. } = c {
                sink.borrow_mut().push(current.action);
            }
        });
        session.reopen_join();
        assert_eq!(session.account().action, None);

        session.apply_batch(&json!([{"a": "set", "t": "account", "action": "gameFull"}]).to_string());
        session.reopen_join();
        assert_eq!(session.account().action, Some(Action::Join));
        assert_eq!(*seen.borrow(), vec![Some(Action::GameFull), Some(Action::Join)]);
    }
}
