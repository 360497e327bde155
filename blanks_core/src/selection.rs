//! The nomination state machine.
//!
//! Clicking a normal card while nominating moves it to `selecting`. With a
//! single blank that card is submitted immediately. With `n` blanks each
//! selecting card gets the next index; the click that would exceed `n`
//! starts a new nomination at index 1, and the click that reaches `n`
//! submits the selecting cards in index order. Clicking a card that is
//! already part of a nomination cancels it.

use std::iter::once;

use itertools::Itertools;
use log::{debug, error};

use crate::{
    card::{CardState, HandCard},
    error::{InvalidSelectionState, SyncError, UnknownEntityError},
    events::ClientEvent,
    game_state::GameState,
    store::{Change, EntityStore},
};

pub struct SelectionEngine<'a> {
    hand: &'a mut EntityStore<HandCard>,
    outbox: &'a mut Vec<ClientEvent>,
}

impl<'a> SelectionEngine<'a> {
    pub fn new(hand: &'a mut EntityStore<HandCard>, outbox: &'a mut Vec<ClientEvent>) -> Self {
        SelectionEngine { hand, outbox }
    }

    pub fn click(&mut self, game: &GameState, id: &str) -> Result<(), SyncError> {
        if !game.is_nominating() {
            return Ok(());
        }
        let card = self.hand.get(id).ok_or_else(|| UnknownEntityError {
            store: self.hand.name(),
            id: id.to_string(),
        })?;
        if !card.is_normal() {
            self.reset_selections(None)?;
            return Ok(());
        }

        let change = self.hand.modify(id, |c| c.state = CardState::Selecting)?;
        if let Some(Change::Patch { previous, current }) = change {
            if !previous.is_selecting() && current.is_selecting() {
                self.on_selecting(game, id)?;
            }
        }
        Ok(())
    }

    /// Clears every card except `except` and tells the server nothing is
    /// pending.
    pub fn reset_selections(&mut self, except: Option<&str>) -> Result<(), UnknownEntityError> {
        for id in self.hand.ids() {
            if Some(id.as_str()) != except {
                self.hand.modify(&id, HandCard::clear)?;
            }
        }
        self.submit(vec![]);
        Ok(())
    }

    fn on_selecting(&mut self, game: &GameState, id: &str) -> Result<(), SyncError> {
        let blanks = match game.blank_count() {
            Some(blanks) => blanks,
            None => {
                self.hand.modify(id, HandCard::clear)?;
                error!("card {id:?} selected without a prompt");
                return Err(InvalidSelectionState::MissingPrompt.into());
            }
        };
        if blanks < 2 {
            self.submit(vec![id.to_string()]);
            return Ok(());
        }

        let mut index = self
            .hand
            .iter()
            .map(|c| c.index)
            .chain(once(0))
            .max()
            .unwrap_or(0)
            + 1;
        if index > blanks {
            index = 1;
            self.reset_selections(Some(id))?;
        }
        self.hand.modify(id, |c| c.index = index)?;

        if index == blanks {
            let cards = self.nomination(blanks).map_err(|e| {
                error!("refusing to submit nomination: {e}");
                e
            })?;
            self.submit(cards);
        }
        Ok(())
    }

    /// The selecting cards in index order, provided they fill exactly
    /// `1..=blanks`.
    pub fn nomination(&self, blanks: u32) -> Result<Vec<String>, InvalidSelectionState> {
        let choices: Vec<&HandCard> = self
            .hand
            .iter()
            .filter(|c| c.is_selecting())
            .sorted_by_key(|c| c.index)
            .collect();

        let unindexed = choices.iter().filter(|c| c.index == 0).count();
        if unindexed > 0 {
            return Err(InvalidSelectionState::UnindexedSelection(unindexed));
        }
        if let Some(card) = choices.iter().find(|c| c.index > blanks) {
            return Err(InvalidSelectionState::IndexOutOfRange {
                index: card.index,
                blanks,
            });
        }
        if let Some((a, _)) = choices.iter().tuple_windows().find(|(a, b)| a.index == b.index) {
            return Err(InvalidSelectionState::DuplicateIndex(a.index));
        }
        if choices.len() != blanks as usize {
            return Err(InvalidSelectionState::IncompleteNomination {
                expected: blanks,
                found: choices.len(),
            });
        }
        Ok(choices.iter().map(|c| c.id.clone()).collect())
    }

    fn submit(&mut self, cards: Vec<String>) {
        debug!("submitting {cards:?}");
        self.outbox.push(ClientEvent::Submit { cards });
    }
}
