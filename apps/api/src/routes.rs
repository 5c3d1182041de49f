use actix_web::{web, Scope};

use crate::handlers::{books_config, generate_config, health_check, library_config};

/// Configure all routes for the API
pub fn api_routes() -> Scope {
    web::scope("/api")
        .service(health_check)
        .configure(generate_config)
        .configure(books_config)
        .configure(library_config)
}
