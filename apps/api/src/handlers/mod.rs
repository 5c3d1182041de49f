pub mod books;
pub mod generate;
pub mod health;
pub mod library;

pub use books::books_config;
pub use generate::{generate_config, GenerationGate};
pub use health::health_check;
pub use library::library_config;

use actix_web::web;

use crate::error::ApiError;

/// Undecodable JSON bodies are answered with the usual `{error}` body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::InvalidInput(err.to_string()).into())
}

/// Same for query strings that do not match the expected shape.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::InvalidInput(err.to_string()).into())
}
