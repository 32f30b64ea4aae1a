//! HTTP endpoints for book information; every handler is a thin call into the facade.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        OriginalUri, Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use bookinfo_http::error::AppError;

use super::facade::{BookInformationFacade, BookInformationRequest, BookInformationResponse};

type FacadeState = State<Arc<dyn BookInformationFacade>>;

/// Routes relative to the module mount point
pub fn router(facade: Arc<dyn BookInformationFacade>) -> Router {
    Router::new()
        .route("/", get(list_book_information).post(create_book_information))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_book_information)
                .put(update_book_information)
                .delete(delete_book_information),
        )
        .with_state(facade)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "book-information module is healthy"
}

async fn list_book_information(
    State(facade): FacadeState,
) -> Result<Json<Vec<BookInformationResponse>>, AppError> {
    Ok(Json(facade.list().await?))
}

async fn get_book_information(
    State(facade): FacadeState,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BookInformationResponse>, AppError> {
    let Path(id) = id?;
    Ok(Json(facade.get(id).await?))
}

async fn create_book_information(
    State(facade): FacadeState,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<BookInformationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = body?;
    let created = facade.create(request).await?;

    let location = format!("{}/{}", uri.path().trim_end_matches('/'), created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

async fn update_book_information(
    State(facade): FacadeState,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<BookInformationRequest>, JsonRejection>,
) -> Result<Json<BookInformationResponse>, AppError> {
    let Path(id) = id?;
    let Json(request) = body?;
    Ok(Json(facade.update(id, request).await?))
}

async fn delete_book_information(
    State(facade): FacadeState,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    facade.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
