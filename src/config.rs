use std::{net, time};

use serde::Deserialize;
use url::Url;

#[derive(Deserialize)]
pub struct Config {
    pub http: Http,
    #[serde(default)]
    pub webhook: Webhook,
    #[serde(default)]
    pub qr: Qr,
    pub ai: Ai,
    #[serde(default)]
    pub ticket: Ticket,
}

#[derive(Deserialize)]
pub struct Http {
    pub server: Server,
    pub cors: Cors,
}

#[derive(Deserialize)]
pub struct Server {
    pub addr: net::SocketAddr,
}

#[derive(Deserialize)]
pub struct Cors {
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Deserialize)]
pub struct Webhook {
    /// Every ticketing endpoint lives under this prefix.
    pub base_url: Url,
}

impl Default for Webhook {
    fn default() -> Self {
        Self {
            base_url: Url::parse(
                "https://central.elight.lk/webhook/ijse-algo-ridma/",
            )
            .expect("valid literal URL"),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct Qr {
    pub base_url: Url,
    pub size: u32,
}

impl Default for Qr {
    fn default() -> Self {
        Self {
            base_url: Url::parse(
                "https://api.qrserver.com/v1/create-qr-code/",
            )
            .expect("valid literal URL"),
            size: 150,
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct Ai {
    #[serde(default = "default_ai_base_url")]
    pub base_url: Url,
    #[serde(default = "default_ai_model")]
    pub model: String,
    pub api_key: String,
}

fn default_ai_base_url() -> Url {
    Url::parse("https://generativelanguage.googleapis.com/v1beta/")
        .expect("valid literal URL")
}

fn default_ai_model() -> String {
    "gemini-2.0-flash".to_string()
}

#[derive(Clone, Deserialize)]
pub struct Ticket {
    #[serde(with = "humantime_serde")]
    pub undo_window: time::Duration,
    pub title: String,
    pub date: String,
    pub venue: String,
}

impl Default for Ticket {
    fn default() -> Self {
        Self {
            undo_window: time::Duration::from_secs(30),
            title: "Algoridma".to_string(),
            date: "FEB 28, 2026".to_string(),
            venue: "IJSE CAR PARK".to_string(),
        }
    }
}
