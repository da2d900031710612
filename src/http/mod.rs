//! HTTP surface consumed by the browser front end.

mod events;
mod reference;
mod tickets;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::{
    api,
    catalog::Catalog,
    config,
    form::Attachment,
    inflight::InFlight,
    recommend::{self, Recommendations, Requester, UserProfile},
    showcase, undo, webhook,
};

/// Shown for network failures and unreadable backend answers.
pub const SOMETHING_WENT_WRONG: &str =
    "Something went wrong. Please try again later.";

pub type SharedAppState = Arc<AppState>;

pub struct AppState {
    pub catalog: Arc<Catalog>,

    pub webhook: webhook::Client,

    /// Fetches QR images for the raster card.
    pub http: reqwest::Client,

    pub recommendations: Requester,

    pub undo: undo::Registry,

    pub inflight: InFlight,

    pub qr: config::Qr,

    pub ticket: config::Ticket,
}

impl AppState {
    pub fn new(
        catalog: Arc<Catalog>,
        http: reqwest::Client,
        recommender: Arc<dyn recommend::Recommender>,
        webhook: config::Webhook,
        qr: config::Qr,
        ticket: config::Ticket,
    ) -> Self {
        Self {
            recommendations: Requester::new(recommender, catalog.clone()),
            catalog,
            webhook: webhook::Client::with_http(http.clone(), webhook),
            http,
            undo: undo::Registry::new(ticket.undo_window),
            inflight: InFlight::default(),
            qr,
            ticket,
        }
    }
}

pub fn router(state: SharedAppState) -> Router {
    Router::new()
        .route("/events", get(events::list))
        .route("/events/:id", get(events::get))
        .route("/events/:id/quote", get(events::quote))
        .route(
            "/recommendations",
            get(default_recommendations).post(recommendations),
        )
        .route("/buy", post(tickets::buy))
        .route("/my-tickets", post(tickets::my_tickets))
        .route("/ticket/watch", post(tickets::watch))
        .route("/ticket/:email", get(tickets::page))
        .route("/ticket/:email/card.png", get(tickets::card_png))
        .route("/ref", post(reference::create))
        .route("/ref/:id", get(reference::get).delete(reference::delete))
        .route("/organizer/dashboard", get(dashboard))
        .route("/profile", get(profile))
        .with_state(state)
}

async fn default_recommendations(
    State(state): State<SharedAppState>,
) -> Json<Recommendations> {
    let profile = showcase::profile(&state.catalog).recommendation_profile();
    Json(state.recommendations.recommend(profile).await)
}

async fn recommendations(
    State(state): State<SharedAppState>,
    Json(profile): Json<UserProfile>,
) -> Json<Recommendations> {
    Json(state.recommendations.recommend(profile).await)
}

async fn dashboard(
    State(state): State<SharedAppState>,
) -> Json<showcase::Dashboard> {
    Json(showcase::dashboard(&state.catalog))
}

async fn profile(
    State(state): State<SharedAppState>,
) -> Json<showcase::Profile> {
    Json(showcase::profile(&state.catalog))
}

fn reply(status: StatusCode, body: api::Error) -> Response {
    (status, Json(body)).into_response()
}

fn in_progress() -> Response {
    reply(
        StatusCode::CONFLICT,
        api::Error::new("A request is already in progress."),
    )
}

/// Maps a webhook failure onto a response. A rejection carries the backend's
/// message, or `fallback` when it sent none.
fn webhook_failure(
    e: webhook::Error,
    rejected: StatusCode,
    fallback: &str,
) -> Response {
    use webhook::Error as E;

    match e {
        E::Rejected(rejection) => reply(
            rejected,
            api::Error::new(rejection.msg.as_deref().unwrap_or(fallback)),
        ),
        E::MissingTicketId => {
            reply(StatusCode::BAD_GATEWAY, api::Error::new(e.to_string()))
        }
        E::MissingTicket => {
            reply(StatusCode::NOT_FOUND, api::Error::new(e.to_string()))
        }
        E::Transport(e) => {
            tracing::warn!(error = %e, "webhook unreachable");
            reply(
                StatusCode::BAD_GATEWAY,
                api::Error::new(SOMETHING_WENT_WRONG),
            )
        }
    }
}

/// Text fields and files of a `multipart/form-data` body.
#[derive(Debug, Default)]
struct FormData {
    text: HashMap<String, String>,
    files: HashMap<String, Attachment>,
}

impl FormData {
    async fn read(multipart: &mut Multipart) -> Result<Self, MultipartError> {
        let mut data = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(ToString::to_string) else {
                continue;
            };
            if field.file_name().is_some() {
                let content_type =
                    field.content_type().map(ToString::to_string);
                let bytes = field.bytes().await?;
                data.files.insert(
                    name,
                    Attachment::new(content_type.as_deref(), bytes.to_vec()),
                );
            } else {
                data.text.insert(name, field.text().await?);
            }
        }
        Ok(data)
    }

    fn take_text(&mut self, name: &str) -> String {
        self.text.remove(name).unwrap_or_default()
    }

    fn take_file(&mut self, name: &str) -> Option<Attachment> {
        self.files.remove(name)
    }
}
