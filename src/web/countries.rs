//! Country pages under `/paises`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form,
};
use serde_json::json;

use super::{ok_page, render_page, FindForm, NoticeQuery, PageResult, CREATED, DELETED};
use crate::api::{all_countries, find_country, remove_country, save_country};
use crate::errors::AppError;
use crate::models::{CountryForm, DisplayCountry};
use crate::AppState;

const DASHBOARD_TITLE: &str = "Países";
const ADD_TITLE: &str = "Agregar País";
const EDIT_TITLE: &str = "Editar País";
const DELETE_TITLE: &str = "Eliminar País";

pub async fn index() -> Redirect {
    Redirect::to("/paises/dashboard")
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> PageResult {
    let countries = all_countries(&state).await?;

    let success = match query.message.as_deref() {
        Some(CREATED) => Some("País agregado correctamente"),
        Some(DELETED) => Some("País eliminado correctamente"),
        _ => None,
    };

    ok_page(
        &state,
        "countries/dashboard",
        DASHBOARD_TITLE,
        json!({
            "countries": countries,
            "totals": totals(&countries),
            "success": success,
        }),
    )
}

/// Count plus population and area sums, skipping unreadable values.
fn totals(countries: &[DisplayCountry]) -> serde_json::Value {
    let population: f64 = countries.iter().filter_map(|c| c.population_value()).sum();
    let area: f64 = countries.iter().filter_map(|c| c.area.as_f64()).sum();
    json!({
        "count": countries.len(),
        "population": population.to_string(),
        "area": area.to_string(),
    })
}

pub async fn add_page(State(state): State<AppState>) -> PageResult {
    ok_page(&state, "countries/add", ADD_TITLE, json!({}))
}

pub async fn add_submit(
    State(state): State<AppState>,
    Form(form): Form<CountryForm>,
) -> PageResult {
    let result = match form.to_input() {
        Ok(input) => save_country(&state, None, &input).await,
        Err(errors) => Err(AppError::Validation(errors)),
    };

    match result {
        Ok(country) => {
            tracing::info!(id = %country.id, name = %country.name, "Created country");
            Ok(Redirect::to(&format!("/paises/dashboard?message={}", CREATED)).into_response())
        }
        Err(AppError::Validation(errors)) => render_page(
            &state,
            StatusCode::BAD_REQUEST,
            "countries/add",
            ADD_TITLE,
            json!({ "form": form, "errors": errors }),
        ),
        Err(err) => Err(err.into()),
    }
}

pub async fn edit_page(State(state): State<AppState>) -> PageResult {
    ok_page(&state, "countries/edit", EDIT_TITLE, json!({}))
}

pub async fn edit_find(State(state): State<AppState>, Form(find): Form<FindForm>) -> PageResult {
    match find_country(&state, &find.id).await {
        Ok(country) => ok_page(
            &state,
            "countries/edit",
            EDIT_TITLE,
            json!({ "id": country.id, "form": CountryForm::from(&country) }),
        ),
        Err(err) => lookup_failed(&state, "countries/edit", EDIT_TITLE, err),
    }
}

pub async fn edit_save(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<CountryForm>,
) -> PageResult {
    let result = match form.to_input() {
        Ok(input) => save_country(&state, Some(&id), &input).await,
        Err(errors) => Err(AppError::Validation(errors)),
    };

    match result {
        Ok(country) => ok_page(
            &state,
            "countries/edit",
            EDIT_TITLE,
            json!({
                "id": country.id,
                "form": CountryForm::from(&country),
                "success": "País editado con éxito",
            }),
        ),
        Err(AppError::Validation(errors)) => render_page(
            &state,
            StatusCode::BAD_REQUEST,
            "countries/edit",
            EDIT_TITLE,
            json!({ "id": id, "form": form, "errors": errors }),
        ),
        Err(err) => Err(err.into()),
    }
}

pub async fn delete_page(State(state): State<AppState>) -> PageResult {
    ok_page(&state, "countries/delete", DELETE_TITLE, json!({}))
}

pub async fn delete_find(State(state): State<AppState>, Form(find): Form<FindForm>) -> PageResult {
    match find_country(&state, &find.id).await {
        Ok(country) => ok_page(
            &state,
            "countries/delete",
            DELETE_TITLE,
            json!({ "country": country }),
        ),
        Err(err) => lookup_failed(&state, "countries/delete", DELETE_TITLE, err),
    }
}

pub async fn delete_confirm(State(state): State<AppState>, Path(id): Path<String>) -> PageResult {
    remove_country(&state, &id).await?;
    Ok(Redirect::to(&format!("/paises/dashboard?message={}", DELETED)).into_response())
}

fn lookup_failed(state: &AppState, page: &str, title: &str, err: AppError) -> PageResult {
    let (status, message) = match err {
        AppError::NotFound(_) => (StatusCode::NOT_FOUND, "País no encontrado"),
        AppError::Validation(_) => (StatusCode::BAD_REQUEST, "ID inválido"),
        other => return Err(other.into()),
    };
    render_page(state, status, page, title, json!({ "error": message }))
}
