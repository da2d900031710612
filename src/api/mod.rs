pub mod ticket;

use serde::{Deserialize, Serialize};

use crate::form;

pub use self::ticket::Ticket;

/// Body of every non-2xx response.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Error {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<std::collections::BTreeMap<String, Vec<String>>>,
}

impl Error {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: None,
        }
    }
}

impl From<form::Invalid> for Error {
    fn from(invalid: form::Invalid) -> Self {
        Self {
            message: invalid.to_string(),
            fields: Some(invalid.0),
        }
    }
}

/// Plain confirmation shown after a successful action.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
