use derive_more::Display;
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};
use serde_json::json;

use super::{Client, Error};

/// Opaque serial id issued by the ticketing backend.
#[derive(
    Clone, Debug, Default, Display, Eq, Hash, PartialEq, Serialize,
)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for TicketId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TicketId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for TicketId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Some workflows emit numeric row ids.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Number(number) => Self(number.to_string()),
        })
    }
}

/// Ticket fields returned by the lookup webhook.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Ticket {
    pub id: TicketId,
    pub name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub qr_url: Option<String>,
}

/// Body of the purchase webhook.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub name: String,
    pub email: String,
    pub batch: String,
    /// Data URL of the bank slip image.
    pub bank_slip: String,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|value| !value.trim().is_empty()))
}

impl Client {
    /// Submits a purchase for verification. Returns the backend's message.
    pub async fn buy(
        &self,
        purchase: &Purchase,
    ) -> Result<Option<String>, Error> {
        let accepted = self
            .post::<_, IgnoredAny>(&["buy"], purchase)
            .await?
            .into_result()?;
        tracing::info!(email = %purchase.email, "purchase request accepted");
        Ok(accepted.msg)
    }

    pub async fn my_tickets(&self, email: &str) -> Result<Ticket, Error> {
        self.post::<_, Ticket>(&["my-tickets"], &json!({ "email": email }))
            .await?
            .into_result()?
            .data
            .ok_or(Error::MissingTicket)
    }

    /// Posts an image for verification. The answer is advisory only.
    pub async fn watch(&self, image: &str) -> Result<(), Error> {
        self.post::<_, IgnoredAny>(&["ticket", "watch"], &json!({
            "image": image,
        }))
        .await?
        .into_result()?;
        Ok(())
    }
}
