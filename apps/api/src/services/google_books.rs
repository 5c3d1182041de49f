use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, error};

use crate::{
    error::ApiError,
    models::{BookDescriptor, Volume, VolumeList},
};

const MAX_RESULTS: &str = "10";

/// Third-party book catalog
#[async_trait]
pub trait BookCatalog: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<BookDescriptor>, ApiError>;

    async fn get_book(&self, id: &str) -> Result<BookDescriptor, ApiError>;
}

#[derive(Debug, Clone)]
pub struct GoogleBooksClient {
    client: Client,
    base_url: String,
}

impl GoogleBooksClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Volume lookup URL with `id` encoded as a single path segment.
    fn volume_url(&self, id: &str) -> Result<Url, ApiError> {
        if matches!(id.trim(), "" | "." | "..") {
            return Err(ApiError::InvalidInput(format!("Invalid book id: '{}'", id)));
        }

        let mut url = Url::parse(&format!("{}/books/v1/volumes", self.base_url)).map_err(|e| {
            ApiError::InternalError(format!("Invalid Google Books base URL: {}", e))
        })?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InternalError("Google Books base URL cannot hold a path".to_string()))?
            .push(id);
        Ok(url)
    }
}

#[async_trait]
impl BookCatalog for GoogleBooksClient {
    async fn search(&self, query: &str) -> Result<Vec<BookDescriptor>, ApiError> {
        debug!("Searching Google Books for '{}'", query);
        let response = self
            .client
            .get(format!("{}/books/v1/volumes", self.base_url))
            .query(&[("q", query), ("maxResults", MAX_RESULTS)])
            .send()
            .await
            .map_err(|e| {
                ApiError::ExternalServiceError(format!("Google Books request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Google Books search failed: {}", status);
            return Err(ApiError::ExternalServiceError(format!(
                "Failed to fetch books: {}",
                status
            )));
        }

        let volumes: VolumeList = response.json().await.map_err(|e| {
            ApiError::SerializationError(format!("Failed to parse Google Books response: {}", e))
        })?;

        debug!(
            "Google Books returned {} of {} volumes",
            volumes.items.len(),
            volumes.total_items
        );
        Ok(volumes.items.into_iter().map(BookDescriptor::from).collect())
    }

    async fn get_book(&self, id: &str) -> Result<BookDescriptor, ApiError> {
        let url = self.volume_url(id)?;
        debug!("Fetching Google Books volume {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                ApiError::ExternalServiceError(format!("Google Books request failed: {}", e))
            })?;

        match response.status() {
            StatusCode::OK => {
                let volume: Volume = response.json().await.map_err(|e| {
                    ApiError::SerializationError(format!(
                        "Failed to parse Google Books volume: {}",
                        e
                    ))
                })?;
                Ok(volume.into())
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(format!("book {}", id))),
            status => Err(ApiError::ExternalServiceError(format!(
                "Failed to fetch book details: {}",
                status
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleBooksClient {
        GoogleBooksClient::new(Client::new(), "https://books.example.com/")
    }

    #[test]
    fn test_volume_url_plain_id() {
        let url = client().volume_url("zyTCAlFPjgYC").unwrap();
        assert_eq!(
            url.as_str(),
            "https://books.example.com/books/v1/volumes/zyTCAlFPjgYC"
        );
    }

    #[test]
    fn test_volume_url_escapes_reserved_characters() {
        let url = client().volume_url("a/b?c#d").unwrap();
        assert_eq!(
            url.as_str(),
            "https://books.example.com/books/v1/volumes/a%2Fb%3Fc%23d"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_volume_url_rejects_dot_segments() {
        for id in ["", ".", ".."] {
            assert!(matches!(
                client().volume_url(id),
                Err(ApiError::InvalidInput(_))
            ));
        }
    }
}
