use thiserror::Error;

use crate::events::Target;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("batch is not a JSON array of envelopes: {0}")]
    Batch(String),
    #[error("envelope has no `a` tag")]
    MissingTag,
    #[error("unknown envelope tag `{0}`")]
    UnknownTag(String),
    #[error("unknown target store `{0}`")]
    UnknownTarget(String),
    #[error("`{0}` is not a collection store")]
    NotACollection(Target),
    #[error("`{0}` is not a singleton store")]
    NotASingleton(Target),
    #[error("malformed `{tag}` envelope: {reason}")]
    Malformed { tag: String, reason: String },
}

impl ProtocolError {
    pub fn malformed(tag: &str, reason: impl ToString) -> Self {
        ProtocolError::Malformed {
            tag: tag.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no entity `{id}` in the {store} store")]
pub struct UnknownEntityError {
    pub store: &'static str,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSelectionState {
    #[error("nomination started without a prompt")]
    MissingPrompt,
    #[error("index {index} outside 1..={blanks}")]
    IndexOutOfRange { index: u32, blanks: u32 },
    #[error("nomination has {found} cards, prompt needs {expected}")]
    IncompleteNomination { expected: u32, found: usize },
    #[error("index {0} assigned to more than one card")]
    DuplicateIndex(u32),
    #[error("{0} selecting cards have no index")]
    UnindexedSelection(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    UnknownEntity(#[from] UnknownEntityError),
    #[error(transparent)]
    InvalidSelection(#[from] InvalidSelectionState),
}
