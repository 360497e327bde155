use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    card::{CardState, HandCard},
    chat::ChatMessage,
    error::{ProtocolError, SyncError},
    events::{ServerEvent, Target},
    game_state::Outcome,
    session::{recover_unknown_entity, Session},
};

impl Session {
    /// Applies one inbound batch in array order. A bad envelope does not stop
    /// the rest of the batch; every failure is logged and returned.
    pub fn apply_batch(&mut self, payload: &str) -> Vec<SyncError> {
        let decoded = match ServerEvent::decode_batch(payload) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("dropping batch: {e}");
                return vec![e.into()];
            }
        };

        let mut errors = vec![];
        for event in decoded {
            let result = event.map_err(SyncError::from).and_then(|event| self.apply(event));
            if let Err(e) = result {
                warn!("{e}");
                errors.push(e);
            }
        }
        errors
    }

    pub fn apply(&mut self, event: ServerEvent) -> Result<(), SyncError> {
        debug!("applying `{}`: {event:?}", event.tag());
        let result = match event {
            ServerEvent::Set { target, fields } => self.apply_set(target, fields),
            ServerEvent::Add { target, records } => self.apply_add(target, records),
            ServerEvent::Reset { target, records } => self.apply_reset(target, records),
            ServerEvent::Select { cards, is_final } => self.apply_select(&cards, is_final),
            ServerEvent::Elect { cards } => {
                self.apply_elect(&cards);
                Ok(())
            }
            ServerEvent::Countdown { remaining } => {
                let change = self.timer.arm(&mut self.game, remaining);
                self.game_changed(change);
                Ok(())
            }
        };
        recover_unknown_entity(result)
    }

    fn apply_set(&mut self, target: Target, mut fields: Map<String, Value>) -> Result<(), SyncError> {
        match target {
            Target::Game => {
                if fields.remove("blackInfo").is_some() {
                    warn!("ignoring blackInfo pushed by the server");
                }
                let mut next = self
                    .game
                    .merged(&fields)
                    .map_err(|e| ProtocolError::malformed("set", e))?;
                if next.black != self.game.get().black {
                    next.refresh_black_info(self.parser.as_ref());
                }
                let change = self.game.replace(next);
                self.game_changed(change);
            }
            Target::Account => {
                self.account.patch(&fields)?;
            }
            Target::Hand | Target::Chat => return Err(ProtocolError::NotASingleton(target).into()),
        }
        Ok(())
    }

    fn apply_add(&mut self, target: Target, records: Vec<Value>) -> Result<(), SyncError> {
        match target {
            Target::Hand => {
                self.hand.add_wire("add", records)?;
            }
            Target::Chat => {
                self.chat.add_wire("add", records)?;
                self.chat_changed();
            }
            Target::Game | Target::Account => return Err(ProtocolError::NotACollection(target).into()),
        }
        Ok(())
    }

    fn apply_reset(&mut self, target: Target, records: Vec<Value>) -> Result<(), SyncError> {
        match target {
            Target::Hand => {
                self.hand.reset(decode_records::<HandCard>("reset", records)?);
            }
            Target::Chat => {
                self.chat.reset(decode_records::<ChatMessage>("reset", records)?);
                self.chat_changed();
            }
            Target::Game | Target::Account => return Err(ProtocolError::NotACollection(target).into()),
        }
        Ok(())
    }

    /// Reconciles the hand with the server's view of this player's
    /// selection. A card still being picked locally survives a non-final
    /// broadcast; a final one consumes the named cards.
    fn apply_select(&mut self, cards: &[String], is_final: bool) -> Result<(), SyncError> {
        for missing in cards.iter().filter(|id| !self.hand.contains(id)) {
            debug!("selected card {missing:?} is not in the hand");
        }

        for id in self.hand.ids() {
            let targeted = cards.contains(&id);
            let selecting = self.hand.get(&id).map_or(false, HandCard::is_selecting);
            if targeted && is_final {
                continue;
            }
            if !targeted && !is_final && selecting {
                continue;
            }
            self.hand.modify(&id, |card| {
                if targeted {
                    card.state = CardState::Selected;
                } else {
                    card.clear();
                }
            })?;
        }

        if is_final {
            self.hand.remove(cards);
        }
        let confirmed = !cards.is_empty() && !is_final;
        let change = self.game.modify(|g| g.selection_confirmed = confirmed);
        self.game_changed(change);
        Ok(())
    }

    /// Flags the winning submission. An `elect` naming no known submission
    /// changes nothing.
    fn apply_elect(&mut self, winner: &[String]) {
        if !self.game.get().submissions.iter().any(|s| s.cards == winner) {
            warn!("elected submission {winner:?} is not on the table");
            return;
        }
        let change = self.game.modify(|g| {
            for submission in g.submissions.iter_mut() {
                submission.outcome = if submission.cards == winner {
                    Outcome::Winner
                } else {
                    Outcome::Loser
                };
            }
        });
        self.game_changed(change);
    }
}

fn decode_records<T: DeserializeOwned>(tag: &str, records: Vec<Value>) -> Result<Vec<T>, ProtocolError> {
    records
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| ProtocolError::malformed(tag, e))
}
