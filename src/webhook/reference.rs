use serde::{de::IgnoredAny, Deserialize, Serialize};

use super::{Client, Error, TicketId};

/// Body of a manual (reference) ticket entry.
#[derive(Clone, Debug, Serialize)]
pub struct ReferenceEntry {
    pub name: String,
    pub email: String,
    pub batch: String,
    #[serde(rename = "ref-name")]
    pub ref_name: String,
}

#[derive(Deserialize)]
struct Issued {
    id: Option<TicketId>,
}

impl Client {
    /// Issues a ticket by reference and returns its id.
    pub async fn buy_ref(
        &self,
        entry: &ReferenceEntry,
    ) -> Result<TicketId, Error> {
        let id = self
            .post::<_, Issued>(&["buy", "ref"], entry)
            .await?
            .into_result()?
            .data
            .and_then(|issued| issued.id)
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingTicketId)?;
        tracing::info!(%id, ref_name = %entry.ref_name, "manual entry issued");
        Ok(id)
    }

    /// Removes a manual entry. The backend exposes this as a GET.
    pub async fn delete_ref(&self, id: &TicketId) -> Result<(), Error> {
        self.get::<IgnoredAny>(&["buy", "ref", id.as_str()])
            .await?
            .into_result()?;
        tracing::info!(%id, "manual entry deleted");
        Ok(())
    }
}
