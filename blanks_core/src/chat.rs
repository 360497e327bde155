use serde::{Deserialize, Serialize};

use crate::{prompt::Token, store::Record};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatText {
    Plain(String),
    Tokens(Vec<Token>),
}

impl ChatText {
    pub fn plain(&self) -> String {
        match self {
            ChatText::Plain(text) => text.clone(),
            ChatText::Tokens(tokens) => tokens.iter().map(Token::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub text: ChatText,
    #[serde(default)]
    pub kind: Option<String>,
}

impl Record for ChatMessage {
    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, seq: u64) {
        if self.id.is_empty() {
            self.id = format!("local-{seq}");
        }
    }
}
