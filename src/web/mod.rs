//! Server-rendered HTML pages.
//!
//! Create and delete answer with a 303 redirect to the listing carrying a
//! `message` key; validation failures re-render the form with the submitted
//! values and one message per field.

mod countries;
mod superheroes;
pub mod templates;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use handlebars::{Handlebars, TemplateError};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::AppState;

/// Message keys carried by post-redirect-get responses.
pub const CREATED: &str = "created";
pub const DELETED: &str = "deleted";

/// Compiled page templates.
pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        for (name, source) in templates::PARTIALS {
            registry.register_partial(name, source)?;
        }
        for (name, source) in templates::PAGES {
            registry.register_template_string(name, source)?;
        }
        Ok(Self { registry })
    }

    /// Render `page` with `data`, then wrap it in the layout.
    pub fn render(&self, page: &str, title: &str, data: &Value) -> Result<String, AppError> {
        let body = self.registry.render(page, data)?;
        Ok(self
            .registry
            .render("layout", &json!({ "title": title, "body": body }))?)
    }
}

/// An [`AppError`] answered with an HTML page instead of the JSON envelope.
#[derive(Debug)]
pub struct HtmlError(pub AppError);

impl From<AppError> for HtmlError {
    fn from(err: AppError) -> Self {
        HtmlError(err)
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!("Page failed: {}", self.0);
        }
        let body = format!(
            "<!DOCTYPE html>\n<html lang=\"es\">\n<head><meta charset=\"utf-8\"><title>Error {code}</title></head>\n\
             <body><h1>Error {code}</h1><p>{message}</p><p><a href=\"/\">Volver al inicio</a></p></body>\n</html>\n",
            code = status.as_u16(),
            message = handlebars::html_escape(&self.0.public_message()),
        );
        (status, Html(body)).into_response()
    }
}

type PageResult = Result<Response, HtmlError>;

/// Query of a listing page reached through a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub message: Option<String>,
}

/// Body of the find-by-id forms.
#[derive(Debug, Default, Deserialize)]
pub struct FindForm {
    #[serde(default)]
    pub id: String,
}

fn render_page(
    state: &AppState,
    status: StatusCode,
    page: &str,
    title: &str,
    data: Value,
) -> PageResult {
    let html = state.views.render(page, title, &data)?;
    Ok((status, Html(html)).into_response())
}

fn ok_page(state: &AppState, page: &str, title: &str, data: Value) -> PageResult {
    render_page(state, StatusCode::OK, page, title, data)
}

/// GET / - Landing page.
pub async fn home(State(state): State<AppState>) -> PageResult {
    ok_page(&state, "home", "Superhéroes y Países", json!({}))
}

/// Fallback for unknown paths; JSON under `/api`, HTML elsewhere.
pub async fn not_found(State(state): State<AppState>, uri: Uri) -> Response {
    if uri.path().starts_with("/api/") || uri.path() == "/api" {
        return AppError::NotFound(format!("No route for {}", uri.path())).into_response();
    }
    render_page(
        &state,
        StatusCode::NOT_FOUND,
        "error",
        "Página no encontrada",
        json!({ "message": format!("La ruta {} no existe", uri.path()) }),
    )
    .into_response()
}

/// HTML routes for superheroes and countries.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/superheroes", get(superheroes::index))
        .route("/superheroes/listado", get(superheroes::list_page))
        .route(
            "/superheroes/add",
            get(superheroes::add_page).post(superheroes::add_submit),
        )
        .route("/superheroes/edit", get(superheroes::edit_page))
        .route("/superheroes/edit/find", post(superheroes::edit_find))
        .route("/superheroes/edit/{id}/save", post(superheroes::edit_save))
        .route("/superheroes/delete", get(superheroes::delete_page))
        .route("/superheroes/delete/find", post(superheroes::delete_find))
        .route(
            "/superheroes/delete/{id}/confirm",
            post(superheroes::delete_confirm),
        )
        .route("/paises", get(countries::index))
        .route("/paises/dashboard", get(countries::dashboard))
        .route(
            "/paises/agregar",
            get(countries::add_page).post(countries::add_submit),
        )
        .route("/paises/editar", get(countries::edit_page))
        .route("/paises/editar/buscar", post(countries::edit_find))
        .route("/paises/editar/{id}", post(countries::edit_save))
        .route("/paises/eliminar", get(countries::delete_page))
        .route("/paises/eliminar/buscar", post(countries::delete_find))
        .route("/paises/eliminar/{id}", post(countries::delete_confirm))
}
