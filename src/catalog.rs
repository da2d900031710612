use std::collections::HashSet;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use time::{
    macros::{date, time},
    Date, Time,
};

time::serde::format_description!(
    pub(crate) iso_date,
    Date,
    "[year]-[month]-[day]"
);
time::serde::format_description!(clock_time, Time, "[hour]:[minute]");

#[derive(
    Clone, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
pub enum Category {
    Music,
    Tech,
    Sports,
    Art,
    Networking,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: EventId,
    pub name: String,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(with = "clock_time")]
    pub time: Time,
    pub location: String,
    pub category: Category,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub tickets_available: u32,
    pub organizer: String,
}

/// The subset of an [`EventRecord`] handed to the recommendation backend.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Projection {
    pub id: EventId,
    pub name: String,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub category: Category,
    pub description: String,
}

impl From<&EventRecord> for Projection {
    fn from(event: &EventRecord) -> Self {
        Self {
            id: event.id.clone(),
            name: event.name.clone(),
            date: event.date,
            category: event.category,
            description: event.description.clone(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub event_id: EventId,
    pub unit_price: f64,
    pub quantity: u32,
    pub total: f64,
}

#[derive(Debug, Display, PartialEq)]
pub enum Error {
    #[display("duplicate event id `{_0}`")]
    DuplicateId(EventId),
    #[display("event `{_0}` not found")]
    EventNotFound(EventId),
    #[display("event `{_0}` is sold out")]
    SoldOut(EventId),
}

/// Immutable list of events. Constructed once and shared behind an `Arc`.
#[derive(Clone, Debug)]
pub struct Catalog {
    events: Vec<EventRecord>,
}

impl Catalog {
    pub fn new(events: Vec<EventRecord>) -> Result<Self, Error> {
        let mut seen = HashSet::with_capacity(events.len());
        for event in &events {
            if !seen.insert(&event.id) {
                return Err(Error::DuplicateId(event.id.clone()));
            }
        }
        Ok(Self { events })
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn get(&self, id: &EventId) -> Option<&EventRecord> {
        self.events.iter().find(|event| &event.id == id)
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.get(id).is_some()
    }

    pub fn by_category(
        &self,
        category: Category,
    ) -> impl Iterator<Item = &EventRecord> {
        self.events
            .iter()
            .filter(move |event| event.category == category)
    }

    pub fn projections(&self) -> Vec<Projection> {
        self.events.iter().map(Projection::from).collect()
    }

    /// Prices a checkout of `quantity` tickets, clamping the quantity to
    /// what is still available.
    pub fn quote(&self, id: &EventId, quantity: u32) -> Result<Quote, Error> {
        let event = self
            .get(id)
            .ok_or_else(|| Error::EventNotFound(id.clone()))?;
        if event.tickets_available == 0 {
            return Err(Error::SoldOut(id.clone()));
        }
        let quantity = quantity.clamp(1, event.tickets_available);
        let total = (event.price * f64::from(quantity) * 100.0).round() / 100.0;
        Ok(Quote {
            event_id: event.id.clone(),
            unit_price: event.price,
            quantity,
            total,
        })
    }

    /// Campus events shipped with the front end.
    pub fn mock() -> Self {
        let events = vec![
            EventRecord {
                id: "1".into(),
                name: "AlgoRhythm Main Night (algoරිද්ම)".to_string(),
                date: date!(2025 - 05 - 15),
                time: time!(18:00),
                location: "University Grand Auditorium".to_string(),
                category: Category::Music,
                description: "The flagship musical event of the year, \
                              featuring local and international tech-house \
                              beats. Experience the rhythm of algorithms."
                    .to_string(),
                price: 15.00,
                image: "https://picsum.photos/seed/algo1/1200/600".to_string(),
                tickets_available: 500,
                organizer: "Faculty of Computing".to_string(),
            },
            EventRecord {
                id: "2".into(),
                name: "Future AI Summit".to_string(),
                date: date!(2025 - 05 - 20),
                time: time!(09:00),
                location: "Innovation Hub, Floor 4".to_string(),
                category: Category::Tech,
                description: "A gathering of industry leaders discussing the \
                              future of generative AI and its impact on \
                              university research."
                    .to_string(),
                price: 5.00,
                image: "https://picsum.photos/seed/algo2/800/600".to_string(),
                tickets_available: 150,
                organizer: "AI Society".to_string(),
            },
            EventRecord {
                id: "3".into(),
                name: "Code-Strike Hackathon".to_string(),
                date: date!(2025 - 06 - 01),
                time: time!(08:00),
                location: "Main Lab Complex".to_string(),
                category: Category::Tech,
                description: "24 hours of non-stop coding. Build a solution \
                              for climate change using university API \
                              services."
                    .to_string(),
                price: 0.00,
                image: "https://picsum.photos/seed/algo3/800/600".to_string(),
                tickets_available: 100,
                organizer: "Developer Student Club".to_string(),
            },
            EventRecord {
                id: "4".into(),
                name: "Inter-Uni Athletics Meet".to_string(),
                date: date!(2025 - 06 - 10),
                time: time!(07:00),
                location: "University Sports Ground".to_string(),
                category: Category::Sports,
                description: "Witness the fastest students across the \
                              country compete for the ultimate championship \
                              trophy."
                    .to_string(),
                price: 3.00,
                image: "https://picsum.photos/seed/algo4/800/600".to_string(),
                tickets_available: 2000,
                organizer: "Sports Council".to_string(),
            },
            EventRecord {
                id: "5".into(),
                name: "Digital Canvas Art Expo".to_string(),
                date: date!(2025 - 06 - 25),
                time: time!(10:00),
                location: "Fine Arts Faculty Lobby".to_string(),
                category: Category::Art,
                description: "An exhibition of student-created digital art, \
                              NFT collections, and traditional paintings."
                    .to_string(),
                price: 2.00,
                image: "https://picsum.photos/seed/algo5/800/600".to_string(),
                tickets_available: 300,
                organizer: "Art & Design Collective".to_string(),
            },
            EventRecord {
                id: "6".into(),
                name: "Startup Networking Night".to_string(),
                date: date!(2025 - 07 - 05),
                time: time!(17:30),
                location: "Business School Cafe".to_string(),
                category: Category::Networking,
                description: "Connect with startup founders, university \
                              alumni, and venture capitalists in an informal \
                              setting."
                    .to_string(),
                price: 10.00,
                image: "https://picsum.photos/seed/algo6/800/600".to_string(),
                tickets_available: 80,
                organizer: "Entrepreneurship Cell".to_string(),
            },
        ];

        Self { events }
    }
}
