//! REST API module.
//!
//! JSON routes for superheroes and countries, all wrapped in the
//! `{ success, data }` envelope.

mod countries;
mod superheroes;

pub use countries::*;
pub use superheroes::*;

use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            status: StatusCode::OK,
        }
    }

    /// Envelope for a newly created resource (201).
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::new(data)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// JSON body extractor whose rejections use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Routes mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/superheroes",
            get(list_superheroes).post(create_superhero),
        )
        .route("/superheroes/veterans", get(list_veterans))
        .route(
            "/superheroes/search/{attribute}/{value}",
            get(search_superheroes),
        )
        .route(
            "/superheroes/{id}",
            get(get_superhero)
                .put(update_superhero)
                .delete(delete_superhero),
        )
        .route("/countries", get(list_countries).post(create_country))
        .route(
            "/countries/{id}",
            get(get_country).put(update_country).delete(delete_country),
        )
}
