//! Wire envelopes. Every envelope is a JSON object tagged by its `a` field;
//! the server sends them in batches (JSON arrays), the client sends them one
//! at a time.

use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{Display, EnumString};

use crate::error::ProtocolError;

/// A store addressed by an envelope's `t` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Target {
    Game,
    Account,
    Hand,
    Chat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Patch a singleton store (`game` when no target is named).
    Set {
        target: Target,
        fields: Map<String, Value>,
    },
    Add {
        target: Target,
        records: Vec<Value>,
    },
    Reset {
        target: Target,
        records: Vec<Value>,
    },
    /// The server's view of this player's selected cards.
    Select { cards: Vec<String>, is_final: bool },
    /// The winning submission of the round.
    Elect { cards: Vec<String> },
    Countdown { remaining: Option<u32> },
}

#[derive(Deserialize)]
struct AddPayload {
    t: String,
    obj: Option<Value>,
    objs: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct ResetPayload {
    t: String,
    #[serde(default)]
    objs: Vec<Value>,
}

#[derive(Deserialize)]
struct SelectPayload {
    #[serde(default)]
    cards: Vec<String>,
    #[serde(default, rename = "final")]
    is_final: bool,
}

#[derive(Deserialize)]
struct ElectPayload {
    #[serde(default)]
    cards: Vec<String>,
}

#[derive(Deserialize)]
struct CountdownPayload {
    #[serde(default)]
    remaining: Option<u32>,
}

impl ServerEvent {
    pub fn tag(&self) -> &'static str {
        match self {
            ServerEvent::Set { .. } => "set",
            ServerEvent::Add { .. } => "add",
            ServerEvent::Reset { .. } => "reset",
            ServerEvent::Select { .. } => "select",
            ServerEvent::Elect { .. } => "elect",
            ServerEvent::Countdown { .. } => "countdown",
        }
    }

    /// Splits a batch into envelopes. Only a payload that is not a JSON array
    /// fails as a whole; each element is decoded on its own.
    pub fn decode_batch(payload: &str) -> Result<Vec<Result<ServerEvent, ProtocolError>>, ProtocolError> {
        let values: Vec<Value> =
            serde_json::from_str(payload).map_err(|e| ProtocolError::Batch(e.to_string()))?;
        Ok(values.into_iter().map(ServerEvent::decode).collect())
    }

    pub fn decode(value: Value) -> Result<ServerEvent, ProtocolError> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => return Err(ProtocolError::malformed("?", format!("not an object: {other}"))),
        };
        let tag = match fields.remove("a") {
            Some(Value::String(tag)) => tag,
            _ => return Err(ProtocolError::MissingTag),
        };

        match tag.as_str() {
            "set" => {
                let target = match fields.remove("t") {
                    None | Some(Value::Null) => Target::Game,
                    Some(Value::String(name)) => parse_target(name)?,
                    Some(other) => return Err(ProtocolError::malformed("set", format!("bad target {other}"))),
                };
                Ok(ServerEvent::Set { target, fields })
            }
            "add" => {
                let payload: AddPayload = decode_payload(&tag, fields)?;
                let records = match (payload.objs, payload.obj) {
                    (Some(objs), _) => objs,
                    (None, Some(obj)) => vec![obj],
                    (None, None) => vec![],
                };
                Ok(ServerEvent::Add {
                    target: parse_target(payload.t)?,
                    records,
                })
            }
            "reset" => {
                let payload: ResetPayload = decode_payload(&tag, fields)?;
                Ok(ServerEvent::Reset {
                    target: parse_target(payload.t)?,
                    records: payload.objs,
                })
            }
            "select" => {
                let payload: SelectPayload = decode_payload(&tag, fields)?;
                Ok(ServerEvent::Select {
                    cards: payload.cards,
                    is_final: payload.is_final,
                })
            }
            "elect" => {
                let payload: ElectPayload = decode_payload(&tag, fields)?;
                Ok(ServerEvent::Elect {
                    cards: payload.cards,
                })
            }
            "countdown" => {
                let payload: CountdownPayload = decode_payload(&tag, fields)?;
                Ok(ServerEvent::Countdown {
                    remaining: payload.remaining,
                })
            }
            _ => Err(ProtocolError::UnknownTag(tag)),
        }
    }
}

fn decode_payload<T: DeserializeOwned>(tag: &str, fields: Map<String, Value>) -> Result<T, ProtocolError> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| ProtocolError::malformed(tag, e))
}

fn parse_target(name: String) -> Result<Target, ProtocolError> {
    Target::from_str(&name).map_err(|_| ProtocolError::UnknownTarget(name))
}

/// A player intent, sent to the server as one envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "a", rename_all = "camelCase")]
pub enum ClientEvent {
    Login {
        id: String,
    },
    Join {
        game: String,
    },
    Leave,
    SetName {
        name: String,
    },
    Chat {
        text: String,
    },
    /// An empty list tells the server nothing is pending.
    Submit {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        cards: Vec<String>,
    },
    Elect {
        cards: Vec<String>,
    },
    Suggest {
        card: String,
    },
}

impl ClientEvent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn set_should_default_to_the_game_target() {
        let event = ServerEvent::decode(json!({"a": "set", "status": "Waiting"})).unwrap();

        assert_eq!(
            event,
            ServerEvent::Set {
                target: Target::Game,
                fields: json!({"status": "Waiting"}).as_object().cloned().unwrap(),
            }
        );
    }

    #[test]
    fn add_should_accept_a_single_obj() {
        let event = ServerEvent::decode(json!({"a": "add", "t": "hand", "obj": {"id": "Bees"}})).unwrap();

        assert_eq!(
            event,
            ServerEvent::Add {
                target: Target::Hand,
                records: vec![json!({"id": "Bees"})],
            }
        );
    }

    #[test]
    fn select_should_read_the_final_flag() {
        let event = ServerEvent::decode(json!({"a": "select", "cards": ["x"], "final": true})).unwrap();

        assert_eq!(
            event,
            ServerEvent::Select {
                cards: vec!["x".to_string()],
                is_final: true
            }
        );
    }

    #[test]
    fn decode_should_reject_unknown_tags_and_targets() {
        assert_eq!(
            ServerEvent::decode(json!({"a": "explode"})),
            Err(ProtocolError::UnknownTag("explode".to_string()))
        );
        assert_eq!(
            ServerEvent::decode(json!({"a": "reset", "t": "deck", "objs": []})),
            Err(ProtocolError::UnknownTarget("deck".to_string()))
        );
        assert_eq!(ServerEvent::decode(json!({"t": "hand"})), Err(ProtocolError::MissingTag));
        assert!(matches!(
            ServerEvent::decode(json!({"a": "add", "obj": {}})),
            Err(ProtocolError::Malformed { .. })
        ));
    }

    #[test]
    fn decode_batch_should_keep_going_after_a_bad_envelope() {
        let batch = ServerEvent::decode_batch(r#"[{"a": "nope"}, {"a": "countdown", "remaining": 5}]"#).unwrap();

        assert!(batch[0].is_err());
        assert_eq!(batch[1], Ok(ServerEvent::Countdown { remaining: Some(5) }));
        assert!(matches!(
            ServerEvent::decode_batch("{}"),
            Err(ProtocolError::Batch(_))
        ));
    }

    #[test]
    fn client_events_should_serialize_with_camel_case_tags() {
        let name = ClientEvent::SetName {
            name: "Ann".to_string(),
        };
        assert_eq!(name.to_json().unwrap(), r#"{"a":"setName","name":"Ann"}"#);
        assert_eq!(ClientEvent::Leave.to_json().unwrap(), r#"{"a":"leave"}"#);
        assert_eq!(
            ClientEvent::Submit { cards: vec![] }.to_json().unwrap(),
            r#"{"a":"submit"}"#
        );
        assert_eq!(
            ClientEvent::Submit {
                cards: vec!["A".to_string(), "B".to_string()]
            }
            .to_json()
            .unwrap(),
            r#"{"a":"submit","cards":["A","B"]}"#
        );
    }
}
