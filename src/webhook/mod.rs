pub mod envelope;
pub mod reference;
pub mod ticket;

use std::error::Error as StdError;

use derive_more::{Display, From};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::config;

pub use self::{
    envelope::{Accepted, Envelope, Rejection},
    reference::ReferenceEntry,
    ticket::{Purchase, Ticket, TicketId},
};

/// Outbound adapter for the ticketing webhooks.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
}

impl Client {
    pub fn new(config: config::Webhook) -> Self {
        Self::with_http(reqwest::Client::new(), config)
    }

    pub fn with_http(http: reqwest::Client, config: config::Webhook) -> Self {
        Self {
            http,
            base_url: config.base_url,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post<B, T>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<Envelope<T>, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        tracing::debug!(%url, "POST webhook");
        Ok(self
            .http
            .post(url)
            .json(body)
            .send()
            .await?
            .json::<Envelope<T>>()
            .await?)
    }

    async fn get<T>(&self, segments: &[&str]) -> Result<Envelope<T>, Error>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        tracing::debug!(%url, "GET webhook");
        Ok(self
            .http
            .get(url)
            .send()
            .await?
            .json::<Envelope<T>>()
            .await?)
    }
}

#[derive(Debug, Display, From)]
pub enum Error {
    /// Network failure, or the response body was not a valid envelope.
    #[display("webhook unreachable: {_0}")]
    #[from]
    Transport(reqwest::Error),

    /// The backend answered with `success: false`.
    #[display(
        "{}",
        _0.msg.as_deref().unwrap_or("webhook rejected the request")
    )]
    #[from]
    Rejected(Rejection),

    /// Manual entry succeeded but no ticket id came back.
    #[display("API did not return a ticket ID")]
    MissingTicketId,

    /// Lookup succeeded but carried no ticket.
    #[display("Ticket not found")]
    MissingTicket,
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}
