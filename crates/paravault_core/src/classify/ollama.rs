//! Ollama `/api/generate` classification backend.
//!
//! # Responsibility
//! - Render the prompt template with the note body.
//! - Issue one bounded, blocking JSON-mode generate request.
//! - Parse the nested JSON answer into a `Classification`.
//!
//! # Invariants
//! - Note bodies and prompts are never logged.
//! - Every request carries the configured timeout.

use super::{Classifier, ClassifierError};
use crate::config::ClassifierConfig;
use crate::model::note::Classification;
use log::{info, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

/// Token replaced by the note body in the prompt template.
pub const NOTE_CONTENT_PLACEHOLDER: &str = "{{note_content}}";

const FALLBACK_PROMPT_TEMPLATE: &str = "Analyze this note: {{note_content}}";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    format: &'static str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct ClassificationPayload {
    #[serde(default)]
    suggested_folder: Option<String>,
    #[serde(default)]
    yaml_frontmatter: Option<String>,
}

/// Blocking client for a local Ollama server.
pub struct OllamaClassifier {
    client: Client,
    endpoint: String,
    model: String,
    prompt_template: String,
}

impl OllamaClassifier {
    /// Builds a classifier from config, reading the prompt template once.
    ///
    /// # Errors
    /// - `Transport` when the HTTP client cannot be constructed.
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ClassifierError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            prompt_template: load_prompt_template(config.prompt_path.as_deref()),
        })
    }

    /// Substitutes `note_text` into the prompt template.
    pub fn render_prompt(&self, note_text: &str) -> String {
        self.prompt_template
            .replace(NOTE_CONTENT_PLACEHOLDER, note_text)
    }
}

impl Classifier for OllamaClassifier {
    fn classify(&self, note_text: &str) -> Result<Classification, ClassifierError> {
        let started_at = Instant::now();
        let prompt = self.render_prompt(note_text);
        let request = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            format: "json",
            stream: false,
        };

        let result = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(map_transport_error)
            .and_then(|response| {
                let status = response.status();
                if !status.is_success() {
                    return Err(ClassifierError::Status(status.as_u16()));
                }
                response.text().map_err(map_transport_error)
            })
            .and_then(|body| parse_generate_response(&body));

        match &result {
            Ok(_) => info!(
                "event=classify module=classify status=ok model={} duration_ms={}",
                self.model,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=classify module=classify status=error model={} duration_ms={} error={}",
                self.model,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

/// Parses an Ollama generate envelope whose `response` holds a JSON object.
///
/// # Errors
/// - `Malformed` when the envelope or the nested object does not parse, or
///   when a known field is not a string.
pub fn parse_generate_response(body: &str) -> Result<Classification, ClassifierError> {
    let envelope: GenerateResponse = serde_json::from_str(body)
        .map_err(|err| ClassifierError::Malformed(format!("envelope: {err}")))?;
    let inner: serde_json::Value = serde_json::from_str(&envelope.response)
        .map_err(|err| ClassifierError::Malformed(format!("response body: {err}")))?;
    if !inner.is_object() {
        return Err(ClassifierError::Malformed(
            "response body is not a JSON object".to_string(),
        ));
    }
    let payload: ClassificationPayload = serde_json::from_value(inner)
        .map_err(|err| ClassifierError::Malformed(format!("fields: {err}")))?;

    Ok(Classification {
        suggested_folder: payload.suggested_folder,
        frontmatter: payload.yaml_frontmatter,
    })
}

fn map_transport_error(err: reqwest::Error) -> ClassifierError {
    if err.is_timeout() {
        ClassifierError::Timeout
    } else {
        ClassifierError::Transport(err.to_string())
    }
}

fn load_prompt_template(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return FALLBACK_PROMPT_TEMPLATE.to_string();
    };
    match std::fs::read_to_string(path) {
        Ok(template) => template,
        Err(err) => {
            warn!(
                "event=prompt_load module=classify status=error path={} error={}",
                path.display(),
                err
            );
            FALLBACK_PROMPT_TEMPLATE.to_string()
        }
    }
}
