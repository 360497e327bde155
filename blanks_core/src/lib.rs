pub mod attention;
pub mod card;
pub mod chat;
pub mod config;
pub mod countdown;
mod dispatch;
pub mod error;
pub mod event;
pub mod events;
pub mod game_state;
pub mod intents;
pub mod player;
pub mod prompt;
pub mod selection;
pub mod session;
pub mod store;
pub mod utils;

pub use config::SessionConfig;
pub use error::SyncError;
pub use event::SessionEvent;
pub use events::{ClientEvent, ServerEvent};
pub use session::Session;
