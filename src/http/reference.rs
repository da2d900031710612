use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use derive_more::From;

use crate::{
    api,
    form::{self, ReferenceForm},
    webhook::{self, TicketId},
};

use super::{in_progress, reply, webhook_failure, SharedAppState};

/// Issues a ticket by reference and opens its undo window.
pub(super) async fn create(
    State(state): State<SharedAppState>,
    Json(form): Json<ReferenceForm>,
) -> Result<(StatusCode, Json<api::ticket::ManualEntry>), CreateError> {
    use CreateError as E;

    let entry = form.into_entry()?;
    let _guard = state
        .inflight
        .try_begin(format!("ref:{}", entry.email))
        .ok_or(E::InProgress)?;

    let id = state.webhook.buy_ref(&entry).await?;
    let window = state.undo.open(id, entry.name);

    Ok((StatusCode::CREATED, Json(window.into())))
}

#[derive(Debug, From)]
pub enum CreateError {
    #[from]
    Invalid(form::Invalid),
    InProgress,
    #[from]
    Webhook(webhook::Error),
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        match self {
            Self::Invalid(invalid) => {
                reply(StatusCode::UNPROCESSABLE_ENTITY, invalid.into())
            }
            Self::InProgress => in_progress(),
            Self::Webhook(e) => webhook_failure(
                e,
                StatusCode::UNPROCESSABLE_ENTITY,
                "An error occurred during processing.",
            ),
        }
    }
}

pub(super) async fn get(
    State(state): State<SharedAppState>,
    Path(id): Path<TicketId>,
) -> Result<Json<api::ticket::ManualEntry>, DeleteError> {
    state
        .undo
        .get(&id)
        .map(|window| Json(window.into()))
        .ok_or(DeleteError::EntryNotFound)
}

/// Deletes a manual entry while its undo window is open.
pub(super) async fn delete(
    State(state): State<SharedAppState>,
    Path(id): Path<TicketId>,
) -> Result<Json<api::Message>, DeleteError> {
    use DeleteError as E;

    let window = state.undo.get(&id).ok_or(E::EntryNotFound)?;
    if !window.deletable {
        return Err(E::WindowClosed);
    }
    let _guard = state
        .inflight
        .try_begin(format!("ref-delete:{id}"))
        .ok_or(E::InProgress)?;

    state.webhook.delete_ref(&id).await?;
    state.undo.close(&id);

    Ok(Json(api::Message::new(
        "The ticket entry has been successfully removed.",
    )))
}

#[derive(Debug, From)]
pub enum DeleteError {
    EntryNotFound,
    WindowClosed,
    InProgress,
    #[from]
    Webhook(webhook::Error),
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        match self {
            Self::EntryNotFound => reply(
                StatusCode::NOT_FOUND,
                api::Error::new("No manual entry with this id."),
            ),
            Self::WindowClosed => reply(
                StatusCode::GONE,
                api::Error::new("The undo window has closed."),
            ),
            Self::InProgress => in_progress(),
            Self::Webhook(webhook::Error::Transport(e)) => {
                tracing::warn!(error = %e, "webhook unreachable");
                reply(
                    StatusCode::BAD_GATEWAY,
                    api::Error::new(
                        "An error occurred while deleting the entry.",
                    ),
                )
            }
            Self::Webhook(e) => webhook_failure(
                e,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Could not delete the entry.",
            ),
        }
    }
}
