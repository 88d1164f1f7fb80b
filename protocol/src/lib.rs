use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ---- Poll options ----
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionId {
    A,
    B,
    C,
}

impl OptionId {
    pub const ALL: [OptionId; 3] = [OptionId::A, OptionId::B, OptionId::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionId::A => "A",
            OptionId::B => "B",
            OptionId::C => "C",
        }
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown poll option: {0:?}")]
pub struct UnknownOption(pub String);

impl FromStr for OptionId {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(OptionId::A),
            "B" => Ok(OptionId::B),
            "C" => Ok(OptionId::C),
            other => Err(UnknownOption(other.to_string())),
        }
    }
}

/// ---- Tally ----
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counts {
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "B")]
    pub b: u32,
    #[serde(rename = "C")]
    pub c: u32,
}

impl Counts {
    pub fn get(&self, option: OptionId) -> u32 {
        match option {
            OptionId::A => self.a,
            OptionId::B => self.b,
            OptionId::C => self.c,
        }
    }

    pub fn get_mut(&mut self, option: OptionId) -> &mut u32 {
        match option {
            OptionId::A => &mut self.a,
            OptionId::B => &mut self.b,
            OptionId::C => &mut self.c,
        }
    }

    pub fn total(&self) -> u32 {
        self.a + self.b + self.c
    }
}

/// Read-only summary for the stats endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub online_count: usize,
    pub total_votes: u32,
    pub counts: Counts,
}

/// ---- Wire messages ----
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientToServer {
    Join {
        name: String,
    },
    Vote {
        #[serde(rename = "optionId")]
        option_id: OptionId,
    },
    RemoveVote,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerToClient {
    /// Joined names, newest first. The full list is always sent.
    Presence { online: Vec<String> },
    Counts { counts: Counts },
    /// The recipient's own current vote.
    UserVote {
        #[serde(rename = "optionId")]
        option_id: Option<OptionId>,
    },
    Error { message: String },
}

impl ServerToClient {
    pub fn error(message: impl Into<String>) -> Self {
        ServerToClient::Error {
            message: message.into(),
        }
    }
}

/// Why an inbound frame could not be turned into a `ClientToServer`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Invalid message format")]
    Malformed,
    #[error("Unknown message type")]
    UnknownKind(String),
    #[error("Invalid option")]
    InvalidOption,
}

/// Decodes one client frame. An unknown `type` and a bad `optionId` are
/// reported separately from frames that are not messages at all.
pub fn decode_client_message(text: &str) -> Result<ClientToServer, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(|_| DecodeError::Malformed)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::Malformed)?;

    match kind {
        "join" => {
            let name = value
                .get("name")
                .and_then(Value::as_str)
                .ok_or(DecodeError::Malformed)?;
            Ok(ClientToServer::Join {
                name: name.to_string(),
            })
        }
        "vote" => {
            let raw = value.get("optionId").ok_or(DecodeError::Malformed)?;
            let option_id = raw
                .as_str()
                .and_then(|s| s.parse().ok())
                .ok_or(DecodeError::InvalidOption)?;
            Ok(ClientToServer::Vote { option_id })
        }
        "removeVote" => Ok(ClientToServer::RemoveVote),
        other => Err(DecodeError::UnknownKind(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_each_client_kind() {
        assert_eq!(
            decode_client_message(r#"{"type":"join","name":"Ann"}"#),
            Ok(ClientToServer::Join { name: "Ann".into() })
        );
        assert_eq!(
            decode_client_message(r#"{"type":"vote","optionId":"B"}"#),
            Ok(ClientToServer::Vote { option_id: OptionId::B })
        );
        assert_eq!(
            decode_client_message(r#"{"type":"removeVote","extra":1}"#),
            Ok(ClientToServer::RemoveVote)
        );
    }

    #[test]
    fn whitespace_name_still_decodes() {
        // rejected later by the registry, not by the decoder
        assert_eq!(
            decode_client_message(r#"{"type":"join","name":"   "}"#),
            Ok(ClientToServer::Join { name: "   ".into() })
        );
    }

    #[test]
    fn classifies_bad_frames() {
        assert_eq!(decode_client_message("not json"), Err(DecodeError::Malformed));
        assert_eq!(decode_client_message("[1,2]"), Err(DecodeError::Malformed));
        assert_eq!(decode_client_message(r#"{"name":"x"}"#), Err(DecodeError::Malformed));
        assert_eq!(decode_client_message(r#"{"type":7}"#), Err(DecodeError::Malformed));
        assert_eq!(decode_client_message(r#"{"type":"join"}"#), Err(DecodeError::Malformed));
        assert_eq!(
            decode_client_message(r#"{"type":"join","name":42}"#),
            Err(DecodeError::Malformed)
        );
        assert_eq!(decode_client_message(r#"{"type":"vote"}"#), Err(DecodeError::Malformed));
        assert_eq!(
            decode_client_message(r#"{"type":"rename","name":"x"}"#),
            Err(DecodeError::UnknownKind("rename".into()))
        );
    }

    #[test]
    fn rejects_options_outside_the_enumeration() {
        for raw in [r#""Z""#, r#""a""#, "1", "null", r#"["A"]"#] {
            let text = format!(r#"{{"type":"vote","optionId":{raw}}}"#);
            assert_eq!(decode_client_message(&text), Err(DecodeError::InvalidOption), "{text}");
        }
    }

    #[test]
    fn server_messages_match_wire_shape() {
        let counts = Counts { a: 2, b: 1, c: 0 };
        assert_eq!(
            serde_json::to_value(ServerToClient::Counts { counts }).unwrap(),
            json!({"type":"counts","counts":{"A":2,"B":1,"C":0}})
        );
        assert_eq!(
            serde_json::to_value(ServerToClient::UserVote { option_id: None }).unwrap(),
            json!({"type":"userVote","optionId":null})
        );
        assert_eq!(
            serde_json::to_value(ServerToClient::Presence { online: vec!["Cy".into(), "Ann".into()] })
                .unwrap(),
            json!({"type":"presence","online":["Cy","Ann"]})
        );
        assert_eq!(
            serde_json::to_value(ServerToClient::error("Invalid option")).unwrap(),
            json!({"type":"error","message":"Invalid option"})
        );
    }

    #[test]
    fn client_messages_encode_for_the_decoder() {
        let msg = ClientToServer::Vote { option_id: OptionId::C };
        let text = serde_json::to_string(&msg).unwrap();
        assert_eq!(text, r#"{"type":"vote","optionId":"C"}"#);
        assert_eq!(decode_client_message(&text), Ok(msg));
    }

    #[test]
    fn stats_use_camel_case() {
        let stats = Stats {
            online_count: 3,
            total_votes: 2,
            counts: Counts { a: 1, b: 1, c: 0 },
        };
        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            json!({"onlineCount":3,"totalVotes":2,"counts":{"A":1,"B":1,"C":0}})
        );
    }
}
