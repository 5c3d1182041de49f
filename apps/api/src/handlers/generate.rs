use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{
    error::{ApiError, GenerationError},
    models::GenerateMusicRequest,
    services::SoundtrackService,
};

/// Bounds concurrent generations and ties them to server shutdown
#[derive(Clone)]
pub struct GenerationGate {
    permits: Arc<Semaphore>,
    shutdown: CancellationToken,
}

impl GenerationGate {
    pub fn new(max_concurrent: usize, shutdown: CancellationToken) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent)),
            shutdown,
        }
    }

    fn admit(&self) -> Result<(SemaphorePermit<'_>, CancellationToken), ApiError> {
        let permit = self.permits.try_acquire().map_err(|_| {
            warn!("Rejecting generation request: all slots busy");
            ApiError::Busy
        })?;
        Ok((permit, self.shutdown.child_token()))
    }
}

pub fn generate_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/generate-music").route(web::post().to(generate_music)));
}

/// Generate a soundtrack for the book in the request body
pub async fn generate_music(
    request: Json<GenerateMusicRequest>,
    soundtrack: web::Data<SoundtrackService>,
    gate: web::Data<GenerationGate>,
) -> Result<HttpResponse, ApiError> {
    let (book, preferences) = request.into_inner().into_book();

    // Invalid requests are answered before taking a generation slot.
    if book.title.trim().is_empty() {
        return Err(GenerationError::InvalidRequest("Book title is required".to_string()).into());
    }

    let (_permit, cancel) = gate.admit()?;
    let result = soundtrack
        .generate_soundtrack(&book, preferences.as_ref(), &cancel)
        .await?;

    Ok(HttpResponse::Ok().json(result))
}
