//! Prompt ("black card") parsing.
//!
//! The session only needs the display text and the number of blanks; the
//! markup itself is owned by a [`PromptParser`].

use serde::{Deserialize, Serialize};

pub const BLANK: &str = "____";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlackInfo {
    pub text: String,
    /// Always at least 1.
    pub blank_count: u32,
}

/// A piece of rendered text; `White` marks text that came from a hand card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    Text(String),
    White { white: String },
}

impl Token {
    pub fn as_str(&self) -> &str {
        match self {
            Token::Text(text) => text,
            Token::White { white } => white,
        }
    }
}

pub trait PromptParser {
    fn parse(&self, raw: &str) -> BlackInfo;
}

/// Treats every run of underscores as one blank.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlankParser;

impl PromptParser for BlankParser {
    fn parse(&self, raw: &str) -> BlackInfo {
        let mut text = String::with_capacity(raw.len());
        let mut blanks = 0;
        let mut in_blank = false;
        for c in raw.trim().chars() {
            if c == '_' {
                if !in_blank {
                    text.push_str(BLANK);
                    blanks += 1;
                }
                in_blank = true;
            } else {
                text.push(c);
                in_blank = false;
            }
        }
        BlackInfo {
            text,
            blank_count: blanks.max(1),
        }
    }
}

impl BlackInfo {
    /// Renders a submission into the prompt. Blanks are filled in order; whites
    /// left over once the blanks run out are appended after the text.
    pub fn fill(&self, whites: &[&str]) -> Vec<Token> {
        let mut tokens = vec![];
        let mut whites = whites.iter();
        for (i, segment) in self.text.split(BLANK).enumerate() {
            if i > 0 {
                tokens.push(match whites.next() {
                    Some(white) => Token::White {
                        white: white.to_string(),
                    },
                    None => Token::Text(BLANK.to_string()),
                });
            }
            if !segment.is_empty() {
                tokens.push(Token::Text(segment.to_string()));
            }
        }
        for white in whites {
            tokens.push(Token::Text(" ".to_string()));
            tokens.push(Token::White {
                white: white.to_string(),
            });
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_should_count_underscore_runs() {
        let info = BlankParser.parse("_ + __ = ___.");

        assert_eq!(info.blank_count, 3);
        assert_eq!(info.text, "____ + ____ = ____.");
    }

    #[test]
    fn parse_should_report_one_blank_for_questions() {
        let info = BlankParser.parse("  What ended my last relationship? ");

        assert_eq!(info.blank_count, 1);
        assert_eq!(info.text, "What ended my last relationship?");
    }

    #[test]
    fn fill_should_place_whites_into_blanks_in_order() {
        let info = BlankParser.parse("_ and _ walk into a bar.");
        let tokens = info.fill(&["A cat", "Bees"]);

        assert_eq!(
            tokens,
            vec![
                Token::White {
                    white: "A cat".to_string()
                },
                Token::Text(" and ".to_string()),
                Token::White {
                    white: "Bees".to_string()
                },
                Token::Text(" walk into a bar.".to_string()),
            ]
        );
    }

    #[test]
    fn fill_should_append_whites_to_questions() {
        let info = BlankParser.parse("Why?");
        let rendered: String = info.fill(&["Bees"]).iter().map(Token::as_str).collect();

        assert_eq!(rendered, "Why? Bees");
    }
}
