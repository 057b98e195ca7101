//! Country API endpoints.
//!
//! Countries are records carrying the import author tag; every lookup and
//! write is filtered on it.

use axum::extract::{Path, State};

use super::{success, ApiJson, ApiResponse, ApiResult};
use crate::errors::AppError;
use crate::mapper;
use crate::models::{CountryInput, DeleteOutcome, DisplayCountry, UpsertOutcome};
use crate::AppState;

/// GET /api/countries - List imported and user-added countries.
pub async fn list_countries(State(state): State<AppState>) -> ApiResult<Vec<DisplayCountry>> {
    success(all_countries(&state).await?)
}

/// GET /api/countries/{id} - Get a single country.
pub async fn get_country(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DisplayCountry> {
    success(find_country(&state, &id).await?)
}

/// POST /api/countries - Create a country.
pub async fn create_country(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CountryInput>,
) -> ApiResult<DisplayCountry> {
    let country = save_country(&state, None, &input).await?;
    Ok(ApiResponse::created(country))
}

/// PUT /api/countries/{id} - Replace a country.
pub async fn update_country(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<CountryInput>,
) -> ApiResult<DisplayCountry> {
    success(save_country(&state, Some(&id), &input).await?)
}

/// DELETE /api/countries/{id} - Delete a country and return it.
pub async fn delete_country(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DisplayCountry> {
    success(remove_country(&state, &id).await?)
}

pub(crate) async fn all_countries(state: &AppState) -> Result<Vec<DisplayCountry>, AppError> {
    let records = state.repo.find_all(&state.country_scope()).await?;
    Ok(records.iter().map(mapper::to_display_record).collect())
}

pub(crate) async fn find_country(state: &AppState, id: &str) -> Result<DisplayCountry, AppError> {
    state
        .repo
        .find_by_id_and_author(id, &state.config.import_author)
        .await?
        .map(|record| mapper::to_display_record(&record))
        .ok_or_else(|| AppError::NotFound(format!("Country {} not found", id)))
}

/// Validate and store a country; without an id a new one is created.
pub(crate) async fn save_country(
    state: &AppState,
    id: Option<&str>,
    input: &CountryInput,
) -> Result<DisplayCountry, AppError> {
    let errors = input.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let fields = mapper::country_input_to_record(input, &state.config.import_author);
    match state
        .repo
        .upsert_matching(id, &fields, &state.country_scope())
        .await?
    {
        UpsertOutcome::Created(record) | UpsertOutcome::Updated(record) => {
            Ok(mapper::to_display_record(&record))
        }
        UpsertOutcome::NotFound => Err(AppError::NotFound(format!(
            "Country {} not found",
            id.unwrap_or_default()
        ))),
    }
}

pub(crate) async fn remove_country(state: &AppState, id: &str) -> Result<DisplayCountry, AppError> {
    match state
        .repo
        .delete_by_id(id, Some(&state.config.import_author))
        .await?
    {
        DeleteOutcome::Deleted(record) => {
            tracing::info!(%id, name = %record.nombre_super_heroe, "Deleted country");
            Ok(mapper::to_display_record(&record))
        }
        DeleteOutcome::NotFound => Err(AppError::NotFound(format!("Country {} not found", id))),
    }
}
