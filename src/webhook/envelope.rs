use serde::{de, Deserialize, Deserializer};

/// Response wrapper every ticketing webhook answers with.
///
/// The backend reports `success` either as a JSON boolean or as the strings
/// `"true"`/`"false"`. Both are folded into a plain `bool` here; a missing
/// flag reads as failure.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Envelope<T> {
    #[serde(default, deserialize_with = "flag")]
    pub success: bool,
    pub msg: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Splits the envelope into its payload or the rejection message.
    pub fn into_result(self) -> Result<Accepted<T>, Rejection> {
        if self.success {
            Ok(Accepted {
                msg: self.msg,
                data: self.data,
            })
        } else {
            Err(Rejection { msg: self.msg })
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Accepted<T> {
    pub msg: Option<String>,
    pub data: Option<T>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rejection {
    pub msg: Option<String>,
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Str(other),
                &"a boolean or \"true\"/\"false\"",
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn parse(value: Value) -> Result<Envelope<Value>, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn accepts_boolean_and_string_flags() {
        assert!(parse(json!({"success": true})).unwrap().success);
        assert!(parse(json!({"success": "true"})).unwrap().success);
        assert!(!parse(json!({"success": false})).unwrap().success);
        assert!(!parse(json!({"success": "false"})).unwrap().success);
    }

    #[test]
    fn missing_flag_is_failure() {
        let envelope = parse(json!({"msg": "hmm"})).unwrap();
        assert!(!envelope.success);
        assert_eq!(
            envelope.into_result().unwrap_err().msg.as_deref(),
            Some("hmm"),
        );
    }

    #[test]
    fn rejects_unknown_flag_text() {
        assert!(parse(json!({"success": "yes"})).is_err());
        assert!(parse(json!({"success": 1})).is_err());
    }

    #[test]
    fn keeps_message_and_data() {
        let accepted = parse(json!({
            "success": "true",
            "msg": "ok",
            "data": {"id": "T-1"},
        }))
        .unwrap()
        .into_result()
        .unwrap();
        assert_eq!(accepted.msg.as_deref(), Some("ok"));
        assert_eq!(accepted.data, Some(json!({"id": "T-1"})));
    }
}
