#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sent with `join`.
    pub game_id: String,
    /// Chat lines kept in the transcript store.
    pub chat_history: usize,
    pub username_length: usize,
    pub message_length: usize,
    pub suggestion_length: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            game_id: "1".to_string(),
            chat_history: 40,
            username_length: 30,
            message_length: 256,
            suggestion_length: 200,
        }
    }
}
