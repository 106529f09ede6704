use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type ConnectionId = u16;

/// One wire message from a client. The relay reads only the `type`
/// discriminator; every other field is opaque payload and is forwarded
/// exactly as received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// How the relay treats an action: persisted kinds end up in the log,
/// transient ones are forwarded live only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Draw,
    Clear,
    Transient,
}

impl Action {
    pub fn decode(text: &str) -> Result<Action, MalformedAction> {
        serde_json::from_str(text).map_err(MalformedAction)
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("must succeed")
    }

    pub fn classify(&self) -> ActionKind {
        match self.kind.as_str() {
            "draw" => ActionKind::Draw,
            "clear" => ActionKind::Clear,
            _ => ActionKind::Transient,
        }
    }
}

/// The inbound text was not a JSON object carrying a string `type` field.
#[derive(Debug)]
pub struct MalformedAction(serde_json::Error);

impl fmt::Display for MalformedAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "malformed action: {}", self.0)
    }
}
