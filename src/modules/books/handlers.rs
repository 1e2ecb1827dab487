//! HTTP handlers for the Books module.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use shelf_http::{error::AppError, ApiJson};

use super::models::{BookId, BookView, CreateBook, CreatedBook, Message, UpdateStatus};
use super::store::{BookError, BookStore};

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::NotFound { .. } => AppError::not_found(err.to_string()),
            BookError::InvalidInput { message, fields } => AppError::invalid_input(
                fields
                    .into_iter()
                    .map(|field| json!({"field": field, "error": "required"}))
                    .collect(),
                message,
            ),
            BookError::IdExhausted { .. } => AppError::Internal(err.into()),
        }
    }
}

pub async fn list_books(State(store): State<Arc<BookStore>>) -> Json<Vec<BookId>> {
    Json(store.list().await)
}

pub async fn get_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<BookId>,
) -> Result<Json<BookView>, AppError> {
    let book = store.get(&id).await?;
    Ok(Json(book.into()))
}

pub async fn create_book(
    State(store): State<Arc<BookStore>>,
    ApiJson(request): ApiJson<CreateBook>,
) -> Result<Json<CreatedBook>, AppError> {
    let new_book = request.validate()?;
    let id = store.create(new_book).await?;
    tracing::info!(book_id = %id, "book added");
    Ok(Json(CreatedBook { id }))
}

/// Unknown ids answer 404 even when the status is also missing.
pub async fn update_book_status(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<BookId>,
    ApiJson(request): ApiJson<UpdateStatus>,
) -> Result<Json<Message>, AppError> {
    if !store.contains(&id).await {
        return Err(BookError::not_found(id).into());
    }
    let status = request.validate()?;
    store.update_status(&id, status).await?;
    tracing::info!(book_id = %id, status = %status, "book status updated");
    Ok(Json(Message::new("Book status updated")))
}

pub async fn delete_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<BookId>,
) -> Result<Json<Message>, AppError> {
    store.delete(&id).await?;
    tracing::info!(book_id = %id, "book deleted");
    Ok(Json(Message::new("Book deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::from(BookError::not_found("nope")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_input_maps_to_400_with_field_details() {
        let error = AppError::from(BookError::invalid_input(
            "Title and author are required",
            vec!["title"],
        ));
        match &error {
            AppError::InvalidInput { details, message, .. } => {
                assert_eq!(message, "Title and author are required");
                assert_eq!(details[0]["field"], "title");
            }
            other => panic!("expected invalid input, got {other:?}"),
        }
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn id_exhaustion_is_internal() {
        let error = AppError::from(BookError::IdExhausted { attempts: 16 });
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
