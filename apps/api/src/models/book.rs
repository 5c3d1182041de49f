use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder shown for catalog entries without a description
pub const NO_DESCRIPTION: &str = "No description available";

pub(crate) fn deserialize_categories<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrVec {
        String(String),
        Vec(Vec<String>),
        Null,
    }

    match StringOrVec::deserialize(deserializer)? {
        StringOrVec::String(s) => {
            // Handle comma-separated categories or single category
            if s.trim().is_empty() {
                Ok(Vec::new())
            } else {
                Ok(s.split(',').map(|s| s.trim().to_string()).collect())
            }
        }
        StringOrVec::Vec(v) => Ok(v),
        StringOrVec::Null => Ok(Vec::new()),
    }
}

/// A book as returned by the catalog. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDescriptor {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_categories")]
    pub categories: Vec<String>,
    #[serde(default, alias = "thumbnail")]
    pub thumbnail_url: Option<String>,
}

impl BookDescriptor {
    /// Description to hand to the prompt synthesizer, `None` when blank
    pub fn description(&self) -> Option<&str> {
        let description = self.description.trim();
        if description.is_empty() {
            None
        } else {
            Some(description)
        }
    }
}

/// Google Books `volumes` search response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeList {
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
    pub small_thumbnail: Option<String>,
}

impl From<Volume> for BookDescriptor {
    fn from(volume: Volume) -> Self {
        let info = volume.volume_info;
        Self {
            id: volume.id,
            title: info.title,
            authors: info.authors,
            description: info
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            categories: info.categories,
            thumbnail_url: info
                .image_links
                .and_then(|links| links.thumbnail.or(links.small_thumbnail)),
        }
    }
}
