use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    error::GenerationError,
    models::{GenerationPreferences, MusicPrompt, NO_DESCRIPTION},
    services::gemini::TextGenerator,
};

const NO_CATEGORIES: &str = "General";

const DIRECTOR_DIRECTIVE: &str = "You are a music director. Given a book's title and description, \
generate a short music prompt for an AI music generator. The music will be played while someone \
reads this book.";

const OUTPUT_RULES: &str = "Output ONLY the prompt, nothing else. Keep it under 50 words.";

const OUTPUT_FORMAT: &str =
    "Format: [genre], [mood], [tempo], [instruments], [atmosphere], instrumental, no vocals";

const EXAMPLE: &str = "Example for \"Dune\": ambient electronic, epic and mysterious, slow tempo, \
deep synths, sparse percussion, desert atmosphere, middle-eastern scales, instrumental, no vocals";

/// Build the single instruction sent to the text generator.
///
/// Blank descriptions and empty category lists are replaced by fixed
/// placeholders. Preferences set to `none` add nothing.
pub fn build_instruction(
    title: &str,
    description: Option<&str>,
    categories: Option<&[String]>,
    preferences: Option<&GenerationPreferences>,
) -> String {
    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DESCRIPTION);

    let categories = categories
        .map(|c| {
            c.iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| NO_CATEGORIES.to_string());

    let mut instruction = format!(
        "{}\n\n{}\n\n{}\n\n{}\n\n",
        DIRECTOR_DIRECTIVE, OUTPUT_RULES, OUTPUT_FORMAT, EXAMPLE
    );

    let directives = preferences
        .map(GenerationPreferences::directives)
        .unwrap_or_default();
    if !directives.is_empty() {
        instruction.push_str("Listener preferences:\n");
        for directive in directives {
            instruction.push_str("- ");
            instruction.push_str(directive);
            instruction.push('\n');
        }
        instruction.push('\n');
    }

    instruction.push_str(&format!(
        "Book Title: {}\nDescription: {}\nCategories: {}\n\nGenerate a music prompt:",
        title.trim(),
        description,
        categories
    ));

    instruction
}

/// Turns book metadata into a concise music-generation prompt
#[derive(Clone)]
pub struct PromptSynthesizer {
    generator: Arc<dyn TextGenerator>,
}

impl PromptSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// One text-generation call, no retry. The returned prompt is trimmed.
    pub async fn synthesize_prompt(
        &self,
        title: &str,
        description: Option<&str>,
        categories: Option<&[String]>,
        preferences: Option<&GenerationPreferences>,
    ) -> Result<MusicPrompt, GenerationError> {
        self.generator.ensure_configured()?;

        let instruction = build_instruction(title, description, categories, preferences);
        debug!("Prompt instruction for '{}': {} chars", title, instruction.len());

        let text = self.generator.generate(&instruction).await?;
        let prompt = MusicPrompt::new(&text).ok_or_else(|| {
            GenerationError::Upstream("text generation returned an empty response".to_string())
        })?;

        info!("Generated prompt for '{}': {}", title, prompt);
        Ok(prompt)
    }
}
