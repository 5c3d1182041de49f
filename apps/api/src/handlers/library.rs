use actix_web::{
    delete, get, post,
    web::{self, Json},
    HttpResponse,
};

use crate::{
    error::ApiError,
    models::{BookDescriptor, NewSavedAudio, SavedStatus},
    services::LibraryService,
};

#[get("/books")]
pub async fn list_books(library: web::Data<LibraryService>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(library.saved_books().await?))
}

#[post("/books")]
pub async fn save_book(
    book: Json<BookDescriptor>,
    library: web::Data<LibraryService>,
) -> Result<HttpResponse, ApiError> {
    let book = book.into_inner();
    if book.id.trim().is_empty() {
        return Err(ApiError::InvalidInput("Book id is required".to_string()));
    }
    Ok(HttpResponse::Ok().json(library.save_book(book).await?))
}

#[delete("/books/{id}")]
pub async fn remove_book(
    path: web::Path<String>,
    library: web::Data<LibraryService>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(library.remove_book(&path).await?))
}

#[get("/books/{id}/saved")]
pub async fn is_book_saved(
    path: web::Path<String>,
    library: web::Data<LibraryService>,
) -> Result<HttpResponse, ApiError> {
    let saved = library.is_book_saved(&path).await?;
    Ok(HttpResponse::Ok().json(SavedStatus { saved }))
}

#[get("/audios")]
pub async fn list_audios(library: web::Data<LibraryService>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(library.saved_audios().await?))
}

#[post("/audios")]
pub async fn save_audio(
    audio: Json<NewSavedAudio>,
    library: web::Data<LibraryService>,
) -> Result<HttpResponse, ApiError> {
    let audio = audio.into_inner();
    if audio.book_id.trim().is_empty() || audio.audio_url.trim().is_empty() {
        return Err(ApiError::InvalidInput(
            "bookId and audioUrl are required".to_string(),
        ));
    }
    Ok(HttpResponse::Ok().json(library.save_audio(audio).await?))
}

#[delete("/audios/{id}")]
pub async fn remove_audio(
    path: web::Path<String>,
    library: web::Data<LibraryService>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(library.remove_audio(&path).await?))
}

#[get("/audios/book/{book_id}/saved")]
pub async fn is_audio_saved(
    path: web::Path<String>,
    library: web::Data<LibraryService>,
) -> Result<HttpResponse, ApiError> {
    let saved = library.is_audio_saved(&path).await?;
    Ok(HttpResponse::Ok().json(SavedStatus { saved }))
}

pub fn library_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/library")
            .service(list_books)
            .service(save_book)
            .service(remove_book)
            .service(is_book_saved)
            .service(list_audios)
            .service(save_audio)
            .service(remove_audio)
            .service(is_audio_saved),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::json_config;
    use crate::services::MemoryStore;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn library() -> web::Data<LibraryService> {
        web::Data::new(LibraryService::new(Arc::new(MemoryStore::new())))
    }

    #[actix_web::test]
    async fn test_book_lifecycle() {
        let app =
            test::init_service(App::new().app_data(library()).configure(library_config)).await;

        let book = json!({
            "id": "dune-1",
            "title": "Dune",
            "authors": ["Frank Herbert"],
            "description": "Spice",
            "categories": ["Science Fiction"],
            "thumbnailUrl": null
        });

        let req = test::TestRequest::post()
            .uri("/library/books")
            .set_json(&book)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "success": true, "message": "Book saved successfully" }));

        let req = test::TestRequest::post()
            .uri("/library/books")
            .set_json(&book)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], false);

        let req = test::TestRequest::get().uri("/library/books").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], "dune-1");
        assert!(body[0]["savedAt"].is_string());

        let req = test::TestRequest::get()
            .uri("/library/books/dune-1/saved")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "saved": true }));

        let req = test::TestRequest::delete()
            .uri("/library/books/dune-1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::delete()
            .uri("/library/books/dune-1")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "success": true, "message": "Book removed" }));
    }

    #[actix_web::test]
    async fn test_audio_lifecycle() {
        let app =
            test::init_service(App::new().app_data(library()).configure(library_config)).await;

        let req = test::TestRequest::post()
            .uri("/library/audios")
            .set_json(json!({
                "audioUrl": "https://example.com/dune.mp3",
                "musicPrompt": "ambient electronic",
                "bookTitle": "Dune",
                "bookId": "dune-1",
                "bookThumbnail": null
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);

        let req = test::TestRequest::get()
            .uri("/library/audios/book/dune-1/saved")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "saved": true }));

        let req = test::TestRequest::get().uri("/library/audios").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body[0]["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("audio_"));

        let req = test::TestRequest::delete()
            .uri(&format!("/library/audios/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/library/audios/book/dune-1/saved")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "saved": false }));
    }

    #[actix_web::test]
    async fn test_audio_without_book_id_is_rejected() {
        let app =
            test::init_service(App::new().app_data(library()).configure(library_config)).await;

        let req = test::TestRequest::post()
            .uri("/library/audios")
            .set_json(json!({
                "audioUrl": "https://example.com/dune.mp3",
                "musicPrompt": "ambient",
                "bookTitle": "Dune",
                "bookId": " "
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_undecodable_book_is_json_error() {
        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(library())
                .configure(library_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/library/books")
            .set_json(json!({ "id": 7, "title": "Dune" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}
