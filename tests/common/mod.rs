use std::{
    collections::HashMap,
    io::Cursor,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use campus_tickets::{
    api,
    catalog::Catalog,
    config,
    http::{self, AppState},
    recommend::{self, Recommendations, Recommender},
};
use constcat::concat;
use reqwest::{multipart, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Notify};
use url::Url;

/// Path prefix the stub webhook backend serves under.
const WEBHOOK_PREFIX: &str = "/webhook/algo/";

pub const BUY: &str = concat!(WEBHOOK_PREFIX, "buy");
pub const BUY_REF: &str = concat!(WEBHOOK_PREFIX, "buy/ref");
pub const MY_TICKETS: &str = concat!(WEBHOOK_PREFIX, "my-tickets");
pub const WATCH: &str = concat!(WEBHOOK_PREFIX, "ticket/watch");

/// Path of the QR image served next to the stub webhook.
pub const QR_PNG: &str = "/qr.png";

/// Records every call and answers with canned envelopes.
#[derive(Default)]
pub struct Webhook {
    replies: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<(String, Value)>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl Webhook {
    /// Answers `path` with `reply` from now on. Unset paths get
    /// `{"success": true}`.
    pub fn reply(&self, path: &str, reply: Value) {
        self.replies
            .lock()
            .unwrap()
            .insert(path.to_string(), reply);
    }

    /// Bodies received on `path`, in order.
    pub fn calls(&self, path: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| called == path)
            .map(|(_, body)| body.clone())
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Makes every call wait for the returned [`Notify`] before answering.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Waits until `count` calls have arrived.
    pub async fn wait_for_calls(&self, count: usize) {
        for _ in 0..200 {
            if self.total_calls() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {count} webhook calls, got {}", self.total_calls());
    }
}

async fn answer(
    State(webhook): State<Arc<Webhook>>,
    uri: Uri,
    body: Bytes,
) -> Json<Value> {
    let path = uri.path().to_string();
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    webhook.calls.lock().unwrap().push((path.clone(), body));
    let gate = webhook.gate.lock().unwrap().clone();
    if let Some(gate) = gate {
        gate.notified().await;
    }
    Json(
        webhook
            .replies
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .unwrap_or_else(|| json!({ "success": true })),
    )
}

async fn qr_png() -> impl IntoResponse {
    let qr = image::RgbaImage::from_pixel(21, 21, image::Rgba([0, 0, 0, 0xff]));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(qr)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .expect("failed to encode QR image");
    ([(CONTENT_TYPE, "image/png")], png)
}

/// Recommender answering with a fixed list, or failing.
pub enum StubRecommender {
    Returns(Recommendations),
    Fails,
}

#[async_trait]
impl Recommender for StubRecommender {
    async fn recommend(
        &self,
        _: &recommend::Request,
    ) -> Result<Recommendations, recommend::Error> {
        match self {
            Self::Returns(recommendations) => Ok(recommendations.clone()),
            Self::Fails => Err(recommend::Error::EmptyResponse),
        }
    }
}

pub struct App {
    pub client: Client,
    pub webhook: Arc<Webhook>,
    /// `http://host:port` of the stub webhook server.
    pub webhook_origin: String,
}

pub struct Builder {
    recommender: StubRecommender,
    undo_window: Duration,
    offline: bool,
}

impl Builder {
    pub fn recommender(mut self, recommender: StubRecommender) -> Self {
        self.recommender = recommender;
        self
    }

    pub fn undo_window(mut self, window: Duration) -> Self {
        self.undo_window = window;
        self
    }

    /// Points the app at a port nobody listens on.
    pub fn webhook_offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub async fn spawn(self) -> App {
        let webhook = Arc::new(Webhook::default());
        let webhook_addr = serve(
            Router::new()
                .route(QR_PNG, get(qr_png))
                .fallback(answer)
                .with_state(webhook.clone()),
        )
        .await;

        let target = if self.offline {
            let closed = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind");
            closed.local_addr().expect("no local address")
        } else {
            webhook_addr
        };
        let base_url = Url::parse(&format!("http://{target}{WEBHOOK_PREFIX}"))
            .expect("valid webhook URL");
        let state = AppState::new(
            Arc::new(Catalog::mock()),
            reqwest::Client::new(),
            Arc::new(self.recommender),
            config::Webhook { base_url },
            config::Qr::default(),
            config::Ticket {
                undo_window: self.undo_window,
                ..config::Ticket::default()
            },
        );
        let addr = serve(http::router(Arc::new(state))).await;

        App {
            client: Client::new(format!("http://{addr}")),
            webhook,
            webhook_origin: format!("http://{webhook_addr}"),
        }
    }
}

pub fn app() -> Builder {
    Builder {
        recommender: StubRecommender::Returns(Recommendations::default()),
        undo_window: Duration::from_secs(30),
        offline: false,
    }
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("no local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    addr
}

/// Non-2xx answer of the service.
#[derive(Debug)]
pub struct Failure {
    pub status: StatusCode,
    pub body: api::Error,
}

pub struct Client {
    inner: reqwest::Client,
    base_url: String,
}

impl Client {
    fn new(base_url: String) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn events(&self, category: Option<&str>) -> Vec<Value> {
        let mut req = self.inner.get(self.url("/events"));
        if let Some(category) = category {
            req = req.query(&[("category", category)]);
        }
        read(req.send().await.expect("failed to send a request"))
            .await
            .expect("wrong status code")
    }

    /// Raw response for `path`, which may be absolute or relative to the
    /// service root.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        let url = Url::parse(&self.base_url)
            .and_then(|base| base.join(path))
            .expect("valid URL");
        self.inner
            .get(url)
            .send()
            .await
            .expect("failed to send a request")
    }

    pub async fn event(&self, id: &str) -> Result<Value, Failure> {
        read(
            self.inner
                .get(self.url(&format!("/events/{id}")))
                .send()
                .await
                .expect("failed to send a request"),
        )
        .await
    }

    pub async fn quote(
        &self,
        id: &str,
        quantity: u32,
    ) -> Result<Value, Failure> {
        read(
            self.inner
                .get(self.url(&format!("/events/{id}/quote")))
                .query(&[("quantity", quantity)])
                .send()
                .await
                .expect("failed to send a request"),
        )
        .await
    }

    pub async fn recommendations(&self) -> Recommendations {
        read(
            self.inner
                .get(self.url("/recommendations"))
                .send()
                .await
                .expect("failed to send a request"),
        )
        .await
        .expect("wrong status code")
    }

    pub async fn buy(
        &self,
        name: &str,
        email: &str,
        batch: &str,
        bank_slip: Option<&[u8]>,
    ) -> Result<api::Message, Failure> {
        let mut form = multipart::Form::new()
            .text("name", name.to_string())
            .text("email", email.to_string())
            .text("batch", batch.to_string());
        if let Some(bytes) = bank_slip {
            form = form.part(
                "bankSlip",
                multipart::Part::bytes(bytes.to_vec())
                    .file_name("slip.png")
                    .mime_str("image/png")
                    .expect("valid mime"),
            );
        }
        read(
            self.inner
                .post(self.url("/buy"))
                .multipart(form)
                .send()
                .await
                .expect("failed to send a request"),
        )
        .await
    }

    pub async fn my_tickets(
        &self,
        email: &str,
    ) -> Result<api::Ticket, Failure> {
        read(
            self.inner
                .post(self.url("/my-tickets"))
                .json(&json!({ "email": email }))
                .send()
                .await
                .expect("failed to send a request"),
        )
        .await
    }

    /// Status and HTML of the printable ticket page.
    pub async fn ticket_page(&self, email: &str) -> (StatusCode, String) {
        let res = self
            .inner
            .get(self.url(&format!("/ticket/{email}")))
            .send()
            .await
            .expect("failed to send a request");
        let status = res.status();
        (status, res.text().await.expect("failed to get a response"))
    }

    pub async fn watch(&self, image: &[u8]) -> Result<api::Message, Failure> {
        let form = multipart::Form::new().part(
            "image",
            multipart::Part::bytes(image.to_vec())
                .file_name("scan.jpg")
                .mime_str("image/jpeg")
                .expect("valid mime"),
        );
        read(
            self.inner
                .post(self.url("/ticket/watch"))
                .multipart(form)
                .send()
                .await
                .expect("failed to send a request"),
        )
        .await
    }

    pub async fn create_ref(
        &self,
        body: Value,
    ) -> Result<api::ticket::ManualEntry, Failure> {
        read(
            self.inner
                .post(self.url("/ref"))
                .json(&body)
                .send()
                .await
                .expect("failed to send a request"),
        )
        .await
    }

    pub async fn get_ref(
        &self,
        id: &str,
    ) -> Result<api::ticket::ManualEntry, Failure> {
        read(
            self.inner
                .get(self.url(&format!("/ref/{id}")))
                .send()
                .await
                .expect("failed to send a request"),
        )
        .await
    }

    pub async fn delete_ref(&self, id: &str) -> Result<api::Message, Failure> {
        read(
            self.inner
                .delete(self.url(&format!("/ref/{id}")))
                .send()
                .await
                .expect("failed to send a request"),
        )
        .await
    }

    pub async fn dashboard(&self) -> Value {
        read(
            self.inner
                .get(self.url("/organizer/dashboard"))
                .send()
                .await
                .expect("failed to send a request"),
        )
        .await
        .expect("wrong status code")
    }

    pub async fn profile(&self) -> Value {
        read(
            self.inner
                .get(self.url("/profile"))
                .send()
                .await
                .expect("failed to send a request"),
        )
        .await
        .expect("wrong status code")
    }
}

async fn read<T: DeserializeOwned>(
    res: reqwest::Response,
) -> Result<T, Failure> {
    let status = res.status();
    if status.is_success() {
        Ok(res.json::<T>().await.expect("failed to get a response"))
    } else {
        Err(Failure {
            status,
            body: res.json().await.expect("failed to get an error body"),
        })
    }
}
