use actix_web::{get, web, HttpResponse};
use log::info;

use crate::{
    error::ApiError,
    models::{SearchQuery, SearchResponse},
    services::BookCatalog,
};

/// Search the catalog by free text
#[get("/search")]
pub async fn search_books(
    params: web::Query<SearchQuery>,
    catalog: web::Data<dyn BookCatalog>,
) -> Result<HttpResponse, ApiError> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(ApiError::InvalidInput("Query cannot be empty".to_string()));
    }

    let books = catalog.search(query).await?;
    info!("Search '{}' returned {} books", query, books.len());
    Ok(HttpResponse::Ok().json(SearchResponse { books }))
}

#[get("/{id}")]
pub async fn get_book(
    path: web::Path<String>,
    catalog: web::Data<dyn BookCatalog>,
) -> Result<HttpResponse, ApiError> {
    let book = catalog.get_book(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(book))
}

pub fn books_config(cfg: &mut web::ServiceConfig) {
    // `/search` must be registered before the `/{id}` catch-all.
    cfg.service(web::scope("/books").service(search_books).service(get_book));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::query_config;
    use crate::models::BookDescriptor;
    use actix_web::{http::StatusCode, test, App};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    struct FixedCatalog;

    #[async_trait]
    impl BookCatalog for FixedCatalog {
        async fn search(&self, query: &str) -> Result<Vec<BookDescriptor>, ApiError> {
            Ok(vec![BookDescriptor {
                id: "dune-1".to_string(),
                title: format!("{} result", query),
                authors: vec!["Frank Herbert".to_string()],
                description: "Spice".to_string(),
                categories: vec!["Science Fiction".to_string()],
                thumbnail_url: None,
            }])
        }

        async fn get_book(&self, id: &str) -> Result<BookDescriptor, ApiError> {
            Err(ApiError::NotFound(format!("book {}", id)))
        }
    }

    fn catalog() -> web::Data<dyn BookCatalog> {
        let catalog: Arc<dyn BookCatalog> = Arc::new(FixedCatalog);
        web::Data::from(catalog)
    }

    #[actix_web::test]
    async fn test_search_returns_books() {
        let app =
            test::init_service(App::new().app_data(catalog()).configure(books_config)).await;

        let req = test::TestRequest::get()
            .uri("/books/search?q=dune")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["books"][0]["title"], "dune result");
        assert_eq!(body["books"][0]["thumbnailUrl"], Value::Null);
    }

    #[actix_web::test]
    async fn test_empty_query_is_rejected() {
        let app =
            test::init_service(App::new().app_data(catalog()).configure(books_config)).await;

        let req = test::TestRequest::get().uri("/books/search?q=%20").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_malformed_query_is_json_error() {
        let app = test::init_service(
            App::new()
                .app_data(query_config())
                .app_data(catalog())
                .configure(books_config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/books/search?q=dune&q=again")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn test_unknown_book_is_not_found() {
        let app =
            test::init_service(App::new().app_data(catalog()).configure(books_config)).await;

        let req = test::TestRequest::get().uri("/books/missing").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
