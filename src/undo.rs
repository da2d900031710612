use std::{collections::HashMap, sync::Mutex, time::Duration};

use serde::Serialize;

use crate::{countdown::Countdown, webhook::TicketId};

/// Undo windows of manual entries issued through this service.
#[derive(Debug)]
pub struct Registry {
    window: Duration,
    entries: Mutex<HashMap<TicketId, Entry>>,
}

#[derive(Clone, Debug)]
struct Entry {
    name: String,
    countdown: Countdown,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub id: TicketId,
    pub name: String,
    pub remaining_secs: u64,
    pub deletable: bool,
}

impl Registry {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::default(),
        }
    }

    pub fn open(&self, id: TicketId, name: String) -> Window {
        let entry = Entry {
            name,
            countdown: Countdown::start(self.window),
        };
        let window = entry.window(&id);
        let mut entries = self.lock();
        entries.retain(|_, entry| entry.countdown.is_open());
        entries.insert(id, entry);
        window
    }

    /// Current state of the window, if it was ever opened and not yet
    /// purged. An expired window still reads as closed until purged.
    pub fn get(&self, id: &TicketId) -> Option<Window> {
        self.lock().get(id).map(|entry| entry.window(id))
    }

    pub fn is_open(&self, id: &TicketId) -> bool {
        self.lock()
            .get(id)
            .is_some_and(|entry| entry.countdown.is_open())
    }

    /// Closes the window after a successful delete.
    pub fn close(&self, id: &TicketId) {
        if let Some(mut entry) = self.lock().remove(id) {
            entry.countdown.cancel();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TicketId, Entry>> {
        // A panic while holding the lock cannot leave the map inconsistent.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Entry {
    fn window(&self, id: &TicketId) -> Window {
        Window {
            id: id.clone(),
            name: self.name.clone(),
            remaining_secs: self.countdown.remaining_secs(),
            deletable: self.countdown.is_open(),
        }
    }
}
