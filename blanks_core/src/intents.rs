use std::io;

use log::info;
use rand::{distributions::Alphanumeric, Rng};

use crate::{events::ClientEvent, session::Session, utils::StrExtensions};

pub const LOGIN_ID_LENGTH: usize = 16;

/// Where the login id survives between sessions.
pub trait LoginStore {
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&mut self, id: &str) -> io::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryLoginStore {
    pub id: Option<String>,
}

impl LoginStore for MemoryLoginStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.id.clone())
    }

    fn save(&mut self, id: &str) -> io::Result<()> {
        self.id = Some(id.to_string());
        Ok(())
    }
}

pub fn random_login_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(LOGIN_ID_LENGTH)
        .map(char::from)
        .collect()
}

impl Session {
    /// Queues `login`, creating and persisting an id on first use.
    pub fn login(&mut self, store: &mut dyn LoginStore) -> io::Result<String> {
        let id = match store.load()? {
            Some(id) => id,
            None => {
                let id = random_login_id();
                store.save(&id)?;
                info!("created login id {id}");
                id
            }
        };
        self.outbox.push(ClientEvent::Login { id: id.clone() });
        Ok(id)
    }

    pub fn join_game(&mut self) {
        self.outbox.push(ClientEvent::Join {
            game: self.config.game_id.clone(),
        });
        self.account.modify(|a| a.action = None);
    }

    pub fn leave_game(&mut self) {
        self.outbox.push(ClientEvent::Leave);
        self.account.modify(|a| a.action = None);
    }

    /// Returns whether anything was sent.
    pub fn set_name(&mut self, name: &str) -> bool {
        self.queue(name.clamped(self.config.username_length), |name| ClientEvent::SetName { name })
    }

    pub fn send_chat(&mut self, text: &str) -> bool {
        self.queue(text.clamped(self.config.message_length), |text| ClientEvent::Chat { text })
    }

    pub fn suggest_card(&mut self, card: &str) -> bool {
        self.queue(card.clamped(self.config.suggestion_length), |card| ClientEvent::Suggest { card })
    }

    /// Votes for the submission at `index` while electing.
    pub fn elect_submission(&mut self, index: usize) -> bool {
        let game = self.game.get();
        if !game.is_electing() {
            return false;
        }
        let cards = match game.submissions.get(index) {
            Some(submission) if !submission.cards.is_empty() => submission.cards.clone(),
            _ => return false,
        };
        self.outbox.push(ClientEvent::Elect { cards });
        true
    }

    fn queue<F>(&mut self, text: Option<String>, event: F) -> bool
    where
        F: FnOnce(String) -> ClientEvent,
    {
        match text {
            Some(text) => {
                self.outbox.push(event(text));
                true
            }
            None => false,
        }
    }
}
