use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::GenerationError;

/// A text-generation backend taking a single instruction string.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Fails with [`GenerationError::Configuration`] when the credential is missing.
    fn ensure_configured(&self) -> Result<(), GenerationError>;

    async fn generate(&self, instruction: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model_url: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GenerateContentResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        Some(text)
    }
}

impl GeminiClient {
    pub fn new(client: Client, api_key: Option<String>, base_url: &str, model: &str) -> Self {
        Self {
            client,
            api_key,
            model_url: format!(
                "{}/v1beta/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn ensure_configured(&self) -> Result<(), GenerationError> {
        match &self.api_key {
            Some(_) => Ok(()),
            None => Err(GenerationError::Configuration(
                "APP_GEMINI_API_KEY".to_string(),
            )),
        }
    }

    async fn generate(&self, instruction: &str) -> Result<String, GenerationError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(GenerationError::Configuration(
                "APP_GEMINI_API_KEY".to_string(),
            ));
        };

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: instruction }],
            }],
        };

        debug!("Sending request to Gemini API");
        let response = self
            .client
            .post(&self.model_url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Upstream(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            error!("Gemini API error ({}): {}", status, message);
            return Err(GenerationError::Upstream(format!(
                "Gemini API error ({}): {}",
                status, message
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            GenerationError::Upstream(format!("Failed to parse Gemini response: {}", e))
        })?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(GenerationError::Upstream(format!(
                "Gemini blocked the request: {}",
                reason
            )));
        }

        parsed
            .text()
            .ok_or_else(|| GenerationError::Upstream("Gemini returned no candidates".to_string()))
    }
}
