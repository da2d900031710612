use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use derive_more::From;
use serde::Deserialize;

use crate::{
    api,
    catalog::{self, Category, EventId, EventRecord, Quote},
};

use super::{reply, SharedAppState};

#[derive(Deserialize)]
pub(super) struct ListInput {
    category: Option<Category>,
}

pub(super) async fn list(
    State(state): State<SharedAppState>,
    Query(ListInput { category }): Query<ListInput>,
) -> Json<Vec<EventRecord>> {
    let events = match category {
        Some(category) => {
            state.catalog.by_category(category).cloned().collect()
        }
        None => state.catalog.events().to_vec(),
    };
    Json(events)
}

pub(super) async fn get(
    State(state): State<SharedAppState>,
    Path(id): Path<EventId>,
) -> Result<Json<EventRecord>, GetEventError> {
    state
        .catalog
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(GetEventError::EventNotFound)
}

#[derive(Debug)]
pub enum GetEventError {
    EventNotFound,
}

impl IntoResponse for GetEventError {
    fn into_response(self) -> Response {
        match self {
            Self::EventNotFound => reply(
                StatusCode::NOT_FOUND,
                api::Error::new("Event not found"),
            ),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct QuoteInput {
    #[serde(default = "one")]
    quantity: u32,
}

fn one() -> u32 {
    1
}

pub(super) async fn quote(
    State(state): State<SharedAppState>,
    Path(id): Path<EventId>,
    Query(QuoteInput { quantity }): Query<QuoteInput>,
) -> Result<Json<Quote>, QuoteError> {
    Ok(Json(state.catalog.quote(&id, quantity)?))
}

#[derive(Debug, From)]
pub enum QuoteError {
    #[from]
    Catalog(catalog::Error),
}

impl IntoResponse for QuoteError {
    fn into_response(self) -> Response {
        let Self::Catalog(e) = self;
        let status = match e {
            catalog::Error::EventNotFound(_) => StatusCode::NOT_FOUND,
            catalog::Error::SoldOut(_) => StatusCode::CONFLICT,
            catalog::Error::DuplicateId(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        reply(status, api::Error::new(e.to_string()))
    }
}
