use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::{Html, IntoResponse, Response},
    Json,
};
use derive_more::From;

use crate::{
    api,
    card::{self, TicketCard},
    form::{self, LookupForm, PurchaseForm, VerifyForm},
    webhook,
};

use super::{
    in_progress, reply, webhook_failure, FormData, SharedAppState,
    SOMETHING_WENT_WRONG,
};

const PURCHASE_RECEIVED: &str = "We let you know after verifying your \
                                 payment slip. Your ticket will be sent to \
                                 your email shortly.";

pub(super) async fn buy(
    State(state): State<SharedAppState>,
    mut multipart: Multipart,
) -> Result<Json<api::Message>, BuyError> {
    use BuyError as E;

    let mut data = FormData::read(&mut multipart).await?;
    let purchase = PurchaseForm {
        name: data.take_text("name"),
        email: data.take_text("email"),
        batch: data.take_text("batch"),
        bank_slip: data.take_file("bankSlip"),
    }
    .into_purchase()?;

    let _guard = state
        .inflight
        .try_begin(format!("buy:{}", purchase.email))
        .ok_or(E::InProgress)?;
    let msg = state.webhook.buy(&purchase).await?;

    Ok(Json(api::Message::new(
        msg.unwrap_or_else(|| PURCHASE_RECEIVED.to_string()),
    )))
}

#[derive(Debug, From)]
pub enum BuyError {
    #[from]
    Malformed(MultipartError),
    #[from]
    Invalid(form::Invalid),
    InProgress,
    #[from]
    Webhook(webhook::Error),
}

impl IntoResponse for BuyError {
    fn into_response(self) -> Response {
        match self {
            Self::Malformed(e) => {
                reply(StatusCode::BAD_REQUEST, api::Error::new(e.body_text()))
            }
            Self::Invalid(invalid) => {
                reply(StatusCode::UNPROCESSABLE_ENTITY, invalid.into())
            }
            Self::InProgress => in_progress(),
            Self::Webhook(e) => webhook_failure(
                e,
                StatusCode::UNPROCESSABLE_ENTITY,
                "An error occurred with your purchase.",
            ),
        }
    }
}

pub(super) async fn my_tickets(
    State(state): State<SharedAppState>,
    Json(form): Json<LookupForm>,
) -> Result<Json<api::Ticket>, LookupError> {
    let email = form.into_email()?;
    let _guard = state
        .inflight
        .try_begin(format!("lookup:{email}"))
        .ok_or(LookupError::InProgress)?;
    Ok(Json(lookup(&state, &email).await?.into()))
}

#[derive(Debug, From)]
pub enum LookupError {
    #[from]
    Invalid(form::Invalid),
    InProgress,
    #[from]
    Webhook(webhook::Error),
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        match self {
            Self::Invalid(invalid) => {
                reply(StatusCode::UNPROCESSABLE_ENTITY, invalid.into())
            }
            Self::InProgress => in_progress(),
            Self::Webhook(e) => webhook_failure(
                e,
                StatusCode::NOT_FOUND,
                "Could not load ticket data.",
            ),
        }
    }
}

/// Rendered ticket card, or the "ticket not found" page.
pub(super) async fn page(
    State(state): State<SharedAppState>,
    Path(email): Path<String>,
) -> Response {
    let download = card::download_path(&email);
    match lookup_email(&state, email).await {
        Ok(card) => Html(card.render_html(&download)).into_response(),
        Err(message) => {
            (StatusCode::NOT_FOUND, Html(card::render_not_found(&message)))
                .into_response()
        }
    }
}

pub(super) async fn card_png(
    State(state): State<SharedAppState>,
    Path(email): Path<String>,
) -> Result<Response, CardError> {
    use CardError as E;

    let card = lookup_email(&state, email).await.map_err(E::NotFound)?;
    let qr = state
        .http
        .get(&card.qr_url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    let qr = image::load_from_memory(&qr)?;
    let png = card.render_png(&qr)?;

    Ok((
        [
            (CONTENT_TYPE, "image/png".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", card.file_name()),
            ),
        ],
        png,
    )
        .into_response())
}

#[derive(Debug, From)]
pub enum CardError {
    NotFound(String),
    #[from]
    QrUnavailable(reqwest::Error),
    #[from]
    Image(image::ImageError),
    #[from]
    Render(card::Error),
}

impl IntoResponse for CardError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(message) => {
                reply(StatusCode::NOT_FOUND, api::Error::new(message))
            }
            Self::QrUnavailable(e) => {
                tracing::warn!(error = %e, "QR image unavailable");
                reply(
                    StatusCode::BAD_GATEWAY,
                    api::Error::new(SOMETHING_WENT_WRONG),
                )
            }
            Self::Image(e) => {
                tracing::warn!(error = %e, "QR image unreadable");
                reply(
                    StatusCode::BAD_GATEWAY,
                    api::Error::new(SOMETHING_WENT_WRONG),
                )
            }
            Self::Render(e) => {
                tracing::warn!(error = %e, "failed to render ticket card");
                reply(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    api::Error::new(SOMETHING_WENT_WRONG),
                )
            }
        }
    }
}

/// Fire-and-forget: the verification outcome is only logged.
pub(super) async fn watch(
    State(state): State<SharedAppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<api::Message>), WatchError> {
    let mut data = FormData::read(&mut multipart).await?;
    let image = VerifyForm {
        image: data.take_file("image"),
    }
    .into_image()?;

    let webhook = state.webhook.clone();
    tokio::spawn(async move {
        if let Err(e) = webhook.watch(&image).await {
            tracing::warn!(error = %e, "image verification notice failed");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(api::Message::new("Image sent for verification.")),
    ))
}

#[derive(Debug, From)]
pub enum WatchError {
    #[from]
    Malformed(MultipartError),
    #[from]
    Invalid(form::Invalid),
}

impl IntoResponse for WatchError {
    fn into_response(self) -> Response {
        match self {
            Self::Malformed(e) => {
                reply(StatusCode::BAD_REQUEST, api::Error::new(e.body_text()))
            }
            Self::Invalid(invalid) => {
                reply(StatusCode::UNPROCESSABLE_ENTITY, invalid.into())
            }
        }
    }
}

async fn lookup(
    state: &SharedAppState,
    email: &str,
) -> Result<TicketCard, webhook::Error> {
    let ticket = state.webhook.my_tickets(email).await?;
    Ok(TicketCard::new(ticket, &state.ticket, &state.qr))
}

/// Like [`lookup`], but every failure becomes the message to show.
async fn lookup_email(
    state: &SharedAppState,
    email: String,
) -> Result<TicketCard, String> {
    let email = LookupForm { email }
        .into_email()
        .map_err(|invalid| invalid.to_string())?;
    lookup(state, &email).await.map_err(|e| match e {
        webhook::Error::Rejected(rejection) => rejection
            .msg
            .unwrap_or_else(|| "Could not load ticket data.".to_string()),
        webhook::Error::Transport(e) => {
            tracing::warn!(error = %e, "webhook unreachable");
            "Network error occurred.".to_string()
        }
        e @ webhook::Error::MissingTicket
        | e @ webhook::Error::MissingTicketId => e.to_string(),
    })
}
