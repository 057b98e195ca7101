//! Superhero pages.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form,
};
use serde_json::json;

use super::{ok_page, render_page, FindForm, NoticeQuery, PageResult, CREATED, DELETED};
use crate::api::{find_superhero, remove_superhero, save_superhero};
use crate::errors::AppError;
use crate::models::{Superhero, SuperheroForm};
use crate::AppState;

const LIST_TITLE: &str = "Listado de Superhéroes";
const ADD_TITLE: &str = "Agregar Superhéroe";
const EDIT_TITLE: &str = "Editar Superhéroe";
const DELETE_TITLE: &str = "Eliminación de Superhéroe";

const NOT_FOUND_MESSAGE: &str = "Superhéroe no encontrado";
const INVALID_ID_MESSAGE: &str = "ID inválido";

pub async fn index() -> Redirect {
    Redirect::to("/superheroes/listado")
}

pub async fn list_page(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> PageResult {
    let records = state.repo.find_all(&state.superhero_scope()).await?;
    let superheroes: Vec<Superhero> = records.into_iter().map(Superhero::from).collect();

    let success = match query.message.as_deref() {
        Some(CREATED) => Some("El superhéroe fue guardado correctamente en la base de datos"),
        Some(DELETED) => Some("Superhéroe eliminado correctamente"),
        _ => None,
    };

    ok_page(
        &state,
        "heroes/list",
        LIST_TITLE,
        json!({ "superheroes": superheroes, "success": success }),
    )
}

pub async fn add_page(State(state): State<AppState>) -> PageResult {
    ok_page(&state, "heroes/add", ADD_TITLE, json!({}))
}

pub async fn add_submit(
    State(state): State<AppState>,
    Form(form): Form<SuperheroForm>,
) -> PageResult {
    let result = match form.to_input() {
        Ok(input) => save_superhero(&state, None, &input).await,
        Err(errors) => Err(AppError::Validation(errors)),
    };

    match result {
        Ok(hero) => {
            tracing::info!(id = %hero.id, name = %hero.nombre_super_heroe, "Created superhero");
            Ok(Redirect::to(&format!("/superheroes/listado?message={}", CREATED)).into_response())
        }
        Err(AppError::Validation(errors)) => render_page(
            &state,
            StatusCode::BAD_REQUEST,
            "heroes/add",
            ADD_TITLE,
            json!({ "form": form, "errors": errors }),
        ),
        Err(err) => Err(err.into()),
    }
}

pub async fn edit_page(State(state): State<AppState>) -> PageResult {
    ok_page(&state, "heroes/edit", EDIT_TITLE, json!({}))
}

pub async fn edit_find(State(state): State<AppState>, Form(find): Form<FindForm>) -> PageResult {
    match find_superhero(&state, &find.id).await {
        Ok(hero) => ok_page(
            &state,
            "heroes/edit",
            EDIT_TITLE,
            json!({ "id": hero.id, "form": SuperheroForm::from(&hero) }),
        ),
        Err(err) => lookup_failed(&state, "heroes/edit", EDIT_TITLE, err),
    }
}

pub async fn edit_save(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<SuperheroForm>,
) -> PageResult {
    let result = match form.to_input() {
        Ok(input) => save_superhero(&state, Some(&id), &input).await,
        Err(errors) => Err(AppError::Validation(errors)),
    };

    match result {
        Ok(hero) => ok_page(
            &state,
            "heroes/edit",
            EDIT_TITLE,
            json!({
                "id": hero.id,
                "form": SuperheroForm::from(&hero),
                "success": "Superhéroe editado con éxito",
            }),
        ),
        Err(AppError::Validation(errors)) => render_page(
            &state,
            StatusCode::BAD_REQUEST,
            "heroes/edit",
            EDIT_TITLE,
            json!({ "id": id, "form": form, "errors": errors }),
        ),
        Err(err) => Err(err.into()),
    }
}

pub async fn delete_page(State(state): State<AppState>) -> PageResult {
    ok_page(&state, "heroes/delete", DELETE_TITLE, json!({}))
}

pub async fn delete_find(State(state): State<AppState>, Form(find): Form<FindForm>) -> PageResult {
    match find_superhero(&state, &find.id).await {
        Ok(hero) => ok_page(
            &state,
            "heroes/delete",
            DELETE_TITLE,
            json!({ "superhero": hero }),
        ),
        Err(err) => lookup_failed(&state, "heroes/delete", DELETE_TITLE, err),
    }
}

pub async fn delete_confirm(State(state): State<AppState>, Path(id): Path<String>) -> PageResult {
    remove_superhero(&state, &id).await?;
    Ok(Redirect::to(&format!("/superheroes/listado?message={}", DELETED)).into_response())
}

/// Re-render a find form after a failed lookup.
fn lookup_failed(state: &AppState, page: &str, title: &str, err: AppError) -> PageResult {
    let (status, message) = match err {
        AppError::NotFound(_) => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
        AppError::Validation(_) => (StatusCode::BAD_REQUEST, INVALID_ID_MESSAGE),
        other => return Err(other.into()),
    };
    render_page(state, status, page, title, json!({ "error": message }))
}
