use std::{net::SocketAddr, path::PathBuf};

use blanks_core::SessionConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "blanks", about = "Terminal client for a fill-in-the-blanks card game")]
pub struct ClientConfig {
    /// Game server address.
    #[arg(long, default_value = "127.0.0.1:6969")]
    pub server: SocketAddr,

    /// Game to join.
    #[arg(long, default_value = "1")]
    pub game: String,

    /// Where the login id is kept between runs.
    #[arg(long, default_value = ".blanks_login.json")]
    pub login_file: PathBuf,

    /// Chat lines to keep.
    #[arg(long, default_value_t = 40)]
    pub chat_history: usize,

    #[arg(long, default_value_t = 0)]
    pub protocol_id: u64,
}

impl ClientConfig {
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            game_id: self.game.clone(),
            chat_history: self.chat_history,
            ..SessionConfig::default()
        }
    }
}
