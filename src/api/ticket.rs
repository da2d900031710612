use serde::{Deserialize, Serialize};

use crate::card::TicketCard;

pub use crate::webhook::TicketId as Id;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Id,
    pub name: String,
    pub qr_url: String,
}

impl From<TicketCard> for Ticket {
    fn from(card: TicketCard) -> Self {
        Self {
            id: card.serial,
            name: card.attendee,
            qr_url: card.qr_url,
        }
    }
}

/// State of a manual entry's undo window.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntry {
    pub id: Id,
    pub name: String,
    pub remaining_secs: u64,
    pub deletable: bool,
}

impl From<crate::undo::Window> for ManualEntry {
    fn from(window: crate::undo::Window) -> Self {
        Self {
            id: window.id,
            name: window.name,
            remaining_secs: window.remaining_secs,
            deletable: window.deletable,
        }
    }
}
