use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::{
    error::GenerationError,
    models::{JobStatus, MusicPrompt},
};

/// MusicGen model version used for every soundtrack
pub const MUSICGEN_VERSION: &str =
    "671ac645ce5e552cc63a54a2bbff63fcf798043055d2dac5fc9e36a837eedcfb";

/// Parameters of one audio-generation job. Only the prompt varies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRequest {
    pub version: &'static str,
    pub input: JobInput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobInput {
    pub prompt: String,
    pub model_version: &'static str,
    pub duration: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub classifier_free_guidance: u32,
}

impl JobRequest {
    pub fn for_prompt(prompt: &MusicPrompt) -> Self {
        Self {
            version: MUSICGEN_VERSION,
            input: JobInput {
                prompt: prompt.as_str().to_string(),
                model_version: "stereo-melody-large",
                duration: 30,
                temperature: 1.0,
                top_k: 250,
                top_p: 0.0,
                classifier_free_guidance: 3,
            },
        }
    }
}

/// One status observation of a remote job
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatusReport {
    pub status: JobStatus,
    /// Raw job output; a URL string once the job succeeds
    pub output: Option<Value>,
    pub error: Option<String>,
}

/// An asynchronous generation job system.
#[async_trait]
pub trait JobService: Send + Sync {
    async fn submit(&self, request: &JobRequest) -> Result<String, GenerationError>;

    async fn get_status(&self, job_id: &str) -> Result<JobStatusReport, GenerationError>;
}

#[derive(Debug, Clone)]
pub struct ReplicateClient {
    client: Client,
    api_token: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl Prediction {
    fn into_report(self) -> JobStatusReport {
        let status = match self.status.as_str() {
            "succeeded" => JobStatus::Succeeded,
            "failed" | "canceled" => JobStatus::Failed,
            _ => JobStatus::Pending,
        };

        let error = match self.error {
            Some(Value::String(message)) => Some(message),
            Some(Value::Null) | None if self.status == "canceled" => {
                Some("prediction was canceled".to_string())
            }
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        JobStatusReport {
            status,
            output: self.output.filter(|o| !o.is_null()),
            error,
        }
    }
}

impl ReplicateClient {
    pub fn new(client: Client, api_token: Option<String>, base_url: &str) -> Self {
        Self {
            client,
            api_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn token(&self) -> Result<&str, GenerationError> {
        self.api_token.as_deref().ok_or_else(|| {
            GenerationError::Configuration("APP_REPLICATE_API_TOKEN".to_string())
        })
    }

    async fn read_prediction(
        &self,
        response: reqwest::Response,
        action: &str,
    ) -> Result<Prediction, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Replicate {} failed ({}): {}", action, status, body);
            let reason = if status == StatusCode::UNAUTHORIZED {
                "invalid API token".to_string()
            } else {
                body
            };
            return Err(GenerationError::Upstream(format!(
                "Replicate {} failed ({}): {}",
                action, status, reason
            )));
        }

        response.json().await.map_err(|e| {
            GenerationError::Upstream(format!("Failed to parse Replicate {} response: {}", action, e))
        })
    }
}

#[async_trait]
impl JobService for ReplicateClient {
    async fn submit(&self, request: &JobRequest) -> Result<String, GenerationError> {
        let token = self.token()?;

        let response = self
            .client
            .post(format!("{}/v1/predictions", self.base_url))
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationError::Upstream(format!("Replicate request failed: {}", e)))?;

        let prediction = self.read_prediction(response, "submit").await?;
        debug!("Prediction created: {}", prediction.id);
        Ok(prediction.id)
    }

    async fn get_status(&self, job_id: &str) -> Result<JobStatusReport, GenerationError> {
        let token = self.token()?;

        let response = self
            .client
            .get(format!("{}/v1/predictions/{}", self.base_url, job_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GenerationError::Upstream(format!("Replicate request failed: {}", e)))?;

        let prediction = self.read_prediction(response, "status").await?;
        Ok(prediction.into_report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prediction(value: Value) -> Prediction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_uses_fixed_parameters() {
        let prompt = MusicPrompt::new("ambient piano").unwrap();
        let body = serde_json::to_value(JobRequest::for_prompt(&prompt)).unwrap();

        assert_eq!(body["version"], MUSICGEN_VERSION);
        assert_eq!(
            body["input"],
            json!({
                "prompt": "ambient piano",
                "model_version": "stereo-melody-large",
                "duration": 30,
                "temperature": 1.0,
                "top_k": 250,
                "top_p": 0.0,
                "classifier_free_guidance": 3
            })
        );
    }

    #[test]
    fn test_in_progress_states_are_pending() {
        for status in ["starting", "processing"] {
            let report = prediction(json!({ "id": "p1", "status": status })).into_report();
            assert_eq!(report.status, JobStatus::Pending);
            assert_eq!(report.output, None);
        }
    }

    #[test]
    fn test_succeeded_keeps_raw_output() {
        let report = prediction(json!({
            "id": "p1",
            "status": "succeeded",
            "output": "https://example.com/a.mp3"
        }))
        .into_report();

        assert_eq!(report.status, JobStatus::Succeeded);
        assert_eq!(report.output, Some(json!("https://example.com/a.mp3")));
    }

    #[test]
    fn test_failed_and_canceled_carry_reason() {
        let failed =
            prediction(json!({ "id": "p1", "status": "failed", "error": "oom" })).into_report();
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("oom"));

        let canceled =
            prediction(json!({ "id": "p1", "status": "canceled", "error": null })).into_report();
        assert_eq!(canceled.status, JobStatus::Failed);
        assert_eq!(canceled.error.as_deref(), Some("prediction was canceled"));
    }

    #[tokio::test]
    async fn test_missing_token_is_a_configuration_error() {
        let client = ReplicateClient::new(Client::new(), None, "http://127.0.0.1:9");
        let prompt = MusicPrompt::new("ambient").unwrap();

        let result = client.submit(&JobRequest::for_prompt(&prompt)).await;
        assert!(matches!(result, Err(GenerationError::Configuration(_))));
    }
}
