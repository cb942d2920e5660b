//! Gemini-style remote classifier.
//!
//! Talks to a generateContent text endpoint, asks for a strict JSON verdict
//! and parses it leniently: every verdict field is defaulted on its own, and
//! an unparseable body degrades to the safe default rather than an error.
//! Transport and API failures are retried with a linear backoff before the
//! caller falls back to the heuristic.

use super::{Category, Classifier, ClassifyError, Verdict};
use crate::api_key::{ApiKeyError, ApiKeySource};
use crate::ingest::RawPost;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(1000);

lazy_static! {
    static ref JSON_FENCE_RE: Regex =
        Regex::new("```json\n|\n```").expect("Failed to compile fence regex");
}

const PROMPT_TEMPLATE: &str = r##"Classify the following social media post into ONE of these categories:
- Emergency/Alert: High urgency, immediate danger (e.g., people in peril, evacuation needed).
- Observation/Neutral Report: Factual info without panic (e.g., "Waves spotted at beach").
- Panic/Fear: Expressions of fear, confusion, or exaggeration (e.g., "Everyone is dying!").
- Awareness/Official Info: Sharing warnings, official updates, or advice (e.g., "INCOIS alert for Kerala").

Extract:
- Location (city/village/state if mentioned, e.g., "Chennai Marina Beach").
- Hashtags (array of #tags, e.g., ["#ChennaiFloods"]).

Flag misinformation/exaggeration? (yes/no, with brief reason if yes).

Respond ONLY in valid JSON: {"category": "Category Name", "location": "Extracted Location", "hashtags": ["#tag1", "#tag2"], "misinfo_flag": true/false, "misinfo_reason": "Reason if flagged"}.

Post: "{{POST_TEXT}}"

Metadata: Timestamp: {{TIMESTAMP}}, Geo: {{GEO}}, User: {{USER}}"##;

/// Remote classifier against a Gemini-style generateContent API.
pub struct GeminiClassifier {
    client: Client,
    base_url: String,
    model: String,
    api_key_source: ApiKeySource,
    max_attempts: u32,
    backoff_step: Duration,
}

impl GeminiClassifier {
    /// Create a classifier for the given endpoint and model.
    ///
    /// # Arguments
    /// * `base_url` - API base (e.g. "https://generativelanguage.googleapis.com").
    /// * `model` - Model name (e.g. "gemini-1.5-flash").
    /// * `api_key_source` - Where the API key comes from; the key is resolved
    ///   per request and carried in the query string.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key_source: ApiKeySource,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key_source,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_step: DEFAULT_BACKOFF_STEP,
        }
    }

    /// Override the retry schedule (attempt n sleeps `backoff_step * n`).
    pub fn with_retry(mut self, max_attempts: u32, backoff_step: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff_step = backoff_step;
        self
    }

    fn generate_url(&self, key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(key)
        )
    }

    fn model_url(&self, key: &str) -> String {
        format!(
            "{}/v1beta/models/{}?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(key)
        )
    }

    async fn require_key(&self) -> Result<String, ClassifyError> {
        match self.api_key_source.get_key().await? {
            Some(key) => Ok(key),
            None => Err(ClassifyError::InvalidCredentials),
        }
    }

    /// One generateContent round trip, returning the raw response text.
    async fn generate(&self, prompt: &str) -> Result<String, ClassifyError> {
        let key = self.require_key().await?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(self.generate_url(&key))
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifyError::Timeout
                } else {
                    ClassifyError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ClassifyError::InvalidCredentials);
        }
        if status.as_u16() == 404 {
            return Err(ClassifyError::UnknownModel(self.model.clone()));
        }
        if !status.is_success() {
            return Err(ClassifyError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let envelope: GenerateContentResponse = response.json().await.map_err(|e| {
            ClassifyError::InvalidResponse(format!("Failed to parse response envelope: {}", e))
        })?;

        envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| ClassifyError::InvalidResponse("No candidates in response".to_string()))
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn classify(&self, post: &RawPost) -> Result<Verdict, ClassifyError> {
        let prompt = build_prompt(post);

        debug!(
            model = %self.model,
            content = %preview(&post.content),
            "Sending classification request"
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.generate(&prompt).await {
                Ok(text) => return Ok(parse_verdict(&text)),
                Err(err) => {
                    warn!(
                        attempt = attempt,
                        error = %err,
                        "Classification attempt failed"
                    );
                    if attempt >= self.max_attempts {
                        return Err(err);
                    }
                    tokio::time::sleep(self.backoff_step * attempt).await;
                }
            }
        }
    }

    async fn health_check(&self) -> Result<(), ClassifyError> {
        let key = self.require_key().await?;

        let response = self
            .client
            .get(self.model_url(&key))
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifyError::Timeout
                } else {
                    ClassifyError::Connection(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ClassifyError::Api {
                status: response.status().as_u16(),
                message: "Health check failed".to_string(),
            });
        }

        Ok(())
    }
}

impl From<ApiKeyError> for ClassifyError {
    fn from(err: ApiKeyError) -> Self {
        match err {
            ApiKeyError::Timeout => ClassifyError::Timeout,
            other => ClassifyError::Connection(other.to_string()),
        }
    }
}

/// Fill the prompt template with post text and metadata.
fn build_prompt(post: &RawPost) -> String {
    let content = if post.content.is_empty() {
        "No content"
    } else {
        post.content.as_str()
    };
    let geo = post
        .metadata
        .geo
        .as_ref()
        .filter(|g| !g.coordinates.is_empty())
        .and_then(|g| serde_json::to_string(&g.coordinates).ok())
        .unwrap_or_else(|| "No geo".to_string());

    PROMPT_TEMPLATE
        .replace("{{POST_TEXT}}", &content.replace('"', "\\\""))
        .replace(
            "{{TIMESTAMP}}",
            post.metadata.created_at.as_deref().unwrap_or("Unknown"),
        )
        .replace("{{GEO}}", &geo)
        .replace(
            "{{USER}}",
            post.metadata.username.as_deref().unwrap_or("Unknown"),
        )
}

/// Parse the model's verdict text. Code fences are stripped, then every
/// field is defaulted on its own; a body that is not JSON at all yields the
/// safe default verdict.
fn parse_verdict(raw: &str) -> Verdict {
    let cleaned = JSON_FENCE_RE.replace_all(raw, "");
    let cleaned = cleaned.trim();

    let value: serde_json::Value = match serde_json::from_str(cleaned) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                error = %err,
                response = %preview(raw),
                "Verdict JSON parse failed, using safe default"
            );
            return Verdict::fallback_default();
        }
    };

    let category = value
        .get("category")
        .and_then(|v| v.as_str())
        .and_then(Category::from_label)
        .unwrap_or(Category::ObservationNeutralReport);
    let location = value
        .get("location")
        .and_then(|v| v.as_str())
        .filter(|l| !l.is_empty() && *l != "Unknown")
        .map(|l| l.to_string());
    let hashtags = value
        .get("hashtags")
        .and_then(|v| v.as_array())
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.as_str())
                .map(|t| t.to_string())
                .collect()
        })
        .unwrap_or_default();
    let misinfo_flag = value
        .get("misinfo_flag")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let misinfo_reason = value
        .get("misinfo_reason")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Verdict {
        category,
        location,
        hashtags,
        misinfo_flag,
        misinfo_reason,
    }
}

fn preview(text: &str) -> String {
    text.chars().take(80).collect()
}

// Wire types

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}
