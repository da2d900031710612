//! AI-backed "recommended events" widget.

pub mod generative;
pub mod prompt;

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, EventId, Projection};

pub use self::generative::GenerativeRecommender;

/// Upper bound on entries in a recommendation result.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Who the recommendations are for.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub past_purchases: Option<Vec<String>>,
    #[serde(default)]
    pub preferences: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub user_id: String,
    pub past_purchases: Option<Vec<String>>,
    pub preferences: Option<Vec<String>>,
    pub upcoming_events: Vec<Projection>,
}

impl Request {
    pub fn new(profile: UserProfile, catalog: &Catalog) -> Self {
        Self {
            user_id: profile.user_id,
            past_purchases: profile.past_purchases,
            preferences: profile.preferences,
            upcoming_events: catalog.projections(),
        }
    }

    fn event(&self, id: &EventId) -> Option<&Projection> {
        self.upcoming_events.iter().find(|event| &event.id == id)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: EventId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Recommendations {
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("generation request failed: {_0}")]
    #[from]
    Transport(reqwest::Error),

    #[display("generation output is not valid JSON: {_0}")]
    #[from]
    Malformed(serde_json::Error),

    #[display("generation returned no text")]
    EmptyResponse,
}

impl std::error::Error for Error {}

/// A backend able to pick events for a visitor.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(
        &self,
        request: &Request,
    ) -> Result<Recommendations, Error>;
}

/// Issues a fresh recommendation call per page view and keeps only what the
/// widget may show.
#[derive(Clone)]
pub struct Requester {
    recommender: Arc<dyn Recommender>,
    catalog: Arc<Catalog>,
}

impl Requester {
    pub fn new(
        recommender: Arc<dyn Recommender>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            recommender,
            catalog,
        }
    }

    /// Never fails: any backend error yields an empty list so the widget is
    /// simply hidden.
    pub async fn recommend(&self, profile: UserProfile) -> Recommendations {
        let request = Request::new(profile, &self.catalog);
        match self.recommender.recommend(&request).await {
            Ok(generated) => sanitize(&request, generated),
            Err(e) => {
                tracing::warn!(
                    user_id = %request.user_id,
                    error = %e,
                    "recommendations unavailable",
                );
                Recommendations::default()
            }
        }
    }
}

/// Drops entries naming events absent from `request`, drops repeated ids,
/// caps the list at [`MAX_RECOMMENDATIONS`] and restores the event fields
/// from the catalog. Only the reason is taken from the backend verbatim.
pub fn sanitize(
    request: &Request,
    generated: Recommendations,
) -> Recommendations {
    let mut seen = HashSet::new();
    let recommendations = generated
        .recommendations
        .into_iter()
        .filter_map(|rec| {
            let Some(event) = request.event(&rec.id) else {
                tracing::debug!(id = %rec.id, "dropping unknown event");
                return None;
            };
            if !seen.insert(event.id.clone()) {
                return None;
            }
            Some(Recommendation {
                id: event.id.clone(),
                name: event.name.clone(),
                date: event.date.to_string(),
                category: event.category.to_string(),
                description: event.description.clone(),
                reason: rec.reason,
            })
        })
        .take(MAX_RECOMMENDATIONS)
        .collect();
    Recommendations { recommendations }
}
