//! Superhero API endpoints.

use axum::extract::{Path, State};

use super::{success, ApiJson, ApiResponse, ApiResult};
use crate::errors::AppError;
use crate::mapper;
use crate::models::{DeleteOutcome, Superhero, SuperheroInput, UpsertOutcome};
use crate::AppState;

/// GET /api/superheroes - List all superheroes.
pub async fn list_superheroes(State(state): State<AppState>) -> ApiResult<Vec<Superhero>> {
    let records = state.repo.find_all(&state.superhero_scope()).await?;
    success(records.into_iter().map(Superhero::from).collect())
}

/// GET /api/superheroes/{id} - Get a single superhero.
pub async fn get_superhero(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Superhero> {
    success(find_superhero(&state, &id).await?)
}

/// POST /api/superheroes - Create a superhero.
pub async fn create_superhero(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SuperheroInput>,
) -> ApiResult<Superhero> {
    let hero = save_superhero(&state, None, &input).await?;
    Ok(ApiResponse::created(hero))
}

/// PUT /api/superheroes/{id} - Replace a superhero.
pub async fn update_superhero(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<SuperheroInput>,
) -> ApiResult<Superhero> {
    success(save_superhero(&state, Some(&id), &input).await?)
}

/// DELETE /api/superheroes/{id} - Delete a superhero and return it.
pub async fn delete_superhero(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Superhero> {
    success(remove_superhero(&state, &id).await?)
}

/// GET /api/superheroes/search/{attribute}/{value} - Substring search on one attribute.
pub async fn search_superheroes(
    State(state): State<AppState>,
    Path((attribute, value)): Path<(String, String)>,
) -> ApiResult<Vec<Superhero>> {
    let records = state
        .repo
        .find_by_attribute(&attribute, &value, &state.superhero_scope())
        .await?;
    success(records.into_iter().map(Superhero::from).collect())
}

/// GET /api/superheroes/veterans - Earth-born heroes over 30 with several powers.
pub async fn list_veterans(State(state): State<AppState>) -> ApiResult<Vec<Superhero>> {
    let records = state.repo.find_veterans(&state.superhero_scope()).await?;
    success(records.into_iter().map(Superhero::from).collect())
}

// Operations shared with the HTML pages

pub(crate) async fn find_superhero(state: &AppState, id: &str) -> Result<Superhero, AppError> {
    state
        .repo
        .find_one(id, &state.superhero_scope())
        .await?
        .map(Superhero::from)
        .ok_or_else(|| AppError::NotFound(format!("Superhero {} not found", id)))
}

/// Validate and store a superhero; without an id a new one is created.
pub(crate) async fn save_superhero(
    state: &AppState,
    id: Option<&str>,
    input: &SuperheroInput,
) -> Result<Superhero, AppError> {
    let errors = input.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let fields = mapper::superhero_input_to_record(input, &state.config.default_author);
    match state
        .repo
        .upsert_matching(id, &fields, &state.superhero_scope())
        .await?
    {
        UpsertOutcome::Created(record) | UpsertOutcome::Updated(record) => Ok(record.into()),
        UpsertOutcome::NotFound => Err(AppError::NotFound(format!(
            "Superhero {} not found",
            id.unwrap_or_default()
        ))),
    }
}

pub(crate) async fn remove_superhero(state: &AppState, id: &str) -> Result<Superhero, AppError> {
    match state
        .repo
        .delete_matching(id, &state.superhero_scope())
        .await?
    {
        DeleteOutcome::Deleted(record) => {
            tracing::info!(%id, name = %record.nombre_super_heroe, "Deleted superhero");
            Ok(record.into())
        }
        DeleteOutcome::NotFound => Err(AppError::NotFound(format!("Superhero {} not found", id))),
    }
}
