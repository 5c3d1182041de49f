use serde::{Deserialize, Serialize};

pub use book::{BookDescriptor, Volume, VolumeList, NO_DESCRIPTION};
pub use generation::{
    GenerationJob, GenerationPreferences, GenerationResult, JobStatus, MoodCategory, MusicPrompt,
    StyleCategory,
};
pub use library::{NewSavedAudio, SaveOutcome, SavedAudio, SavedBook};

mod book;
mod generation;
mod library;

/// Request body for soundtrack generation
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateMusicRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "book::deserialize_categories")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub preferences: Option<GenerationPreferences>,
}

impl GenerateMusicRequest {
    /// The request as a catalog book; the id is optional on this endpoint
    pub fn into_book(self) -> (BookDescriptor, Option<GenerationPreferences>) {
        let book = BookDescriptor {
            id: self.id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            authors: Vec::new(),
            description: self.description.unwrap_or_default(),
            categories: self.categories,
            thumbnail_url: None,
        };
        (book, self.preferences)
    }
}

/// Query string of the book search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub books: Vec<BookDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedStatus {
    pub saved: bool,
}

/// Health check response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in RFC3339 format
    pub timestamp: String,
}
