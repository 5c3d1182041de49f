use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    error::GenerationError,
    models::{BookDescriptor, GenerationPreferences, GenerationResult},
    services::{job_poller::JobPoller, prompt_synthesizer::PromptSynthesizer},
};

/// Chains prompt synthesis and audio generation for one book.
///
/// Stateless: concurrent invocations share nothing but the HTTP clients.
#[derive(Clone)]
pub struct SoundtrackService {
    synthesizer: PromptSynthesizer,
    poller: JobPoller,
}

impl SoundtrackService {
    pub fn new(synthesizer: PromptSynthesizer, poller: JobPoller) -> Self {
        Self {
            synthesizer,
            poller,
        }
    }

    /// Generate a soundtrack for `book`.
    ///
    /// Runs at most one prompt synthesis and one job submission, never
    /// retries, and returns the first stage failure unchanged.
    pub async fn generate_soundtrack(
        &self,
        book: &BookDescriptor,
        preferences: Option<&GenerationPreferences>,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult, GenerationError> {
        let title = book.title.trim();
        if title.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "Book title is required".to_string(),
            ));
        }

        info!("Generating music prompt for: {}", title);
        let categories = (!book.categories.is_empty()).then_some(book.categories.as_slice());
        let synthesized = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
            prompt = self.synthesizer.synthesize_prompt(
                title,
                book.description(),
                categories,
                preferences,
            ) => prompt,
        };
        let prompt = synthesized.map_err(|e| {
            error!("Prompt synthesis failed for '{}': {}", title, e);
            e
        })?;

        info!("Generating music for: {}", title);
        let job = self.poller.run(&prompt, cancel).await.map_err(|e| {
            error!("Audio generation failed for '{}': {}", title, e);
            e
        })?;

        let result = GenerationResult::from_job(prompt, &job)?;
        info!("Music generated for '{}': {}", title, result.audio_url());
        Ok(result)
    }
}
