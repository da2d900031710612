use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::config;

use super::{prompt, Error, Recommendations, Recommender, Request};

/// [`Recommender`] backed by a hosted text-generation model speaking the
/// `generateContent` API.
#[derive(Clone, Debug)]
pub struct GenerativeRecommender {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl GenerativeRecommender {
    pub fn new(
        http: reqwest::Client,
        config: config::Ai,
    ) -> Result<Self, url::ParseError> {
        let endpoint = config
            .base_url
            .join(&format!("models/{}:generateContent", config.model))?;
        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key,
        })
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[async_trait]
impl Recommender for GenerativeRecommender {
    async fn recommend(
        &self,
        request: &Request,
    ) -> Result<Recommendations, Error> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt::render(request) }],
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
            },
        });

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateResponse>()
            .await?;

        let text = response
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .find_map(|part| part.text)
            .ok_or(Error::EmptyResponse)?;

        Ok(parse_output(&text)?)
    }
}

/// Parses model output, tolerating a Markdown code fence around the JSON.
fn parse_output(text: &str) -> Result<Recommendations, serde_json::Error> {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .unwrap_or(text);
    serde_json::from_str(text.trim())
}
