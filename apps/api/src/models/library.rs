use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BookDescriptor;

/// A book kept in the user's library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBook {
    #[serde(flatten)]
    pub book: BookDescriptor,
    pub saved_at: DateTime<Utc>,
}

impl SavedBook {
    pub fn new(book: BookDescriptor) -> Self {
        Self {
            book,
            saved_at: Utc::now(),
        }
    }
}

/// Body of a save-audio request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavedAudio {
    pub audio_url: String,
    pub music_prompt: String,
    pub book_title: String,
    pub book_id: String,
    #[serde(default)]
    pub book_thumbnail: Option<String>,
}

/// A generated soundtrack kept in the user's library, at most one per book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAudio {
    pub id: String,
    pub audio_url: String,
    pub music_prompt: String,
    pub book_title: String,
    pub book_id: String,
    pub book_thumbnail: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl From<NewSavedAudio> for SavedAudio {
    fn from(audio: NewSavedAudio) -> Self {
        Self {
            id: format!("audio_{}", Uuid::new_v4().simple()),
            audio_url: audio.audio_url,
            music_prompt: audio.music_prompt,
            book_title: audio.book_title,
            book_id: audio.book_id,
            book_thumbnail: audio.book_thumbnail,
            saved_at: Utc::now(),
        }
    }
}

/// Result of a library mutation, mirrored back to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub success: bool,
    pub message: String,
}

impl SaveOutcome {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }

    pub fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}
