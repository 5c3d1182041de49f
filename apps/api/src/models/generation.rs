use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::GenerationError;

/// Preferred musical style. Unknown labels fall back to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleCategory {
    #[default]
    None,
    Classical,
    Electronic,
    Minimalist,
    Nature,
}

impl StyleCategory {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "classical" => Self::Classical,
            "electronic" => Self::Electronic,
            "minimalist" => Self::Minimalist,
            "nature" => Self::Nature,
            _ => Self::None,
        }
    }

    /// Extra guidance appended to the prompt instruction
    pub fn directive(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Classical => Some(
                "Favor a classical palette: orchestral strings, piano, woodwinds, \
                 traditional harmony and acoustic instruments only.",
            ),
            Self::Electronic => Some(
                "Favor an electronic palette: synthesizers, pads, arpeggiators, \
                 subtle electronic beats and modern production.",
            ),
            Self::Minimalist => Some(
                "Keep it minimalist: very few instruments, repetitive motifs, \
                 lots of space and gentle gradual changes.",
            ),
            Self::Nature => Some(
                "Blend in natural soundscapes: rain, wind, forest, water or birdsong \
                 layered under soft organic instruments.",
            ),
        }
    }
}

impl<'de> Deserialize<'de> for StyleCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.map(|l| Self::from_label(&l)).unwrap_or_default())
    }
}

/// Preferred reading mood. Unknown labels fall back to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodCategory {
    #[default]
    None,
    Calm,
    Action,
    Contemplating,
}

impl MoodCategory {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "calm" => Self::Calm,
            "action" => Self::Action,
            "contemplating" => Self::Contemplating,
            _ => Self::None,
        }
    }

    pub fn directive(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Calm => Some(
                "The mood should be calm and soothing: slow tempo, soft dynamics, \
                 nothing sudden or tense.",
            ),
            Self::Action => Some(
                "The mood should carry energy and momentum: driving rhythm, \
                 rising tension and a faster tempo.",
            ),
            Self::Contemplating => Some(
                "The mood should be reflective and introspective: sparse, \
                 lingering melodies that leave room for thought.",
            ),
        }
    }
}

impl<'de> Deserialize<'de> for MoodCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.map(|l| Self::from_label(&l)).unwrap_or_default())
    }
}

/// Optional style and mood preferences supplied with a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationPreferences {
    #[serde(default, rename = "general", alias = "styleCategory")]
    pub style: StyleCategory,
    #[serde(default, rename = "action", alias = "moodCategory")]
    pub mood: MoodCategory,
}

impl GenerationPreferences {
    pub fn new(style: StyleCategory, mood: MoodCategory) -> Self {
        Self { style, mood }
    }

    /// Guidance lines contributed by these preferences, in style-then-mood order
    pub fn directives(&self) -> Vec<&'static str> {
        self.style
            .directive()
            .into_iter()
            .chain(self.mood.directive())
            .collect()
    }
}

/// A concise, non-empty text prompt for the audio-generation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MusicPrompt(String);

impl MusicPrompt {
    /// Trims `text`; returns `None` when nothing is left
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MusicPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// Local view of a submitted generation job, advanced only by polling
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub job_id: String,
    pub status: JobStatus,
    pub result_url: Option<String>,
    pub error_detail: Option<String>,
}

impl GenerationJob {
    pub fn submitted(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Pending,
            result_url: None,
            error_detail: None,
        }
    }
}

/// Outcome of a successful orchestration: the prompt and the playable asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    prompt: MusicPrompt,
    audio_url: String,
}

impl GenerationResult {
    /// Only a succeeded job with a non-empty result URL yields a result.
    pub fn from_job(prompt: MusicPrompt, job: &GenerationJob) -> Result<Self, GenerationError> {
        match (job.status, job.result_url.as_deref()) {
            (JobStatus::Succeeded, Some(url)) if !url.trim().is_empty() => Ok(Self {
                prompt,
                audio_url: url.to_string(),
            }),
            (JobStatus::Succeeded, _) => Err(GenerationError::MalformedResult(format!(
                "job {} succeeded without an audio URL",
                job.job_id
            ))),
            (JobStatus::Failed, _) => Err(GenerationError::GenerationFailed(
                job.error_detail
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            )),
            (JobStatus::Pending, _) => Err(GenerationError::MalformedResult(format!(
                "job {} has not finished",
                job.job_id
            ))),
        }
    }

    pub fn prompt(&self) -> &MusicPrompt {
        &self.prompt
    }

    pub fn audio_url(&self) -> &str {
        &self.audio_url
    }
}
