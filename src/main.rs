//! Heroes Backend
//!
//! Superhero and country catalogue with SQLite persistence, a JSON API,
//! server-rendered pages and a country import job.

mod api;
mod config;
mod db;
mod errors;
mod import;
mod mapper;
mod models;
mod source;
mod web;

use std::sync::Arc;

use axum::{routing::get, Router};
use clap::{Parser, Subcommand};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use db::Repository;
use import::ImportOptions;
use models::RecordFilter;
use source::RestCountriesClient;
use web::Views;

/// Command line interface.
#[derive(Debug, Parser)]
#[command(name = "heroes-backend", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the API and HTML pages (default)
    Serve,
    /// Fetch the external country list and store it
    Import {
        /// Keep only Spanish-speaking countries
        #[arg(long)]
        spanish_only: bool,
        /// Remove previously imported countries first
        #[arg(long)]
        replace: bool,
    },
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub views: Arc<Views>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Records visible as superheroes: everything not imported as a country.
    pub fn superhero_scope(&self) -> RecordFilter {
        RecordFilter::ExcludeAuthor(self.config.import_author.clone())
    }

    /// Records visible as countries.
    pub fn country_scope(&self) -> RecordFilter {
        RecordFilter::Author(self.config.import_author.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Database path: {:?}", config.db_path);

    // Initialize database
    let pool = db::init_database(&config.db_path, &config.import_author).await?;
    let repo = Arc::new(Repository::new(pool));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, repo).await,
        Command::Import {
            spanish_only,
            replace,
        } => {
            let client = RestCountriesClient::from_config(&config)?;
            let options = ImportOptions {
                author: config.import_author.clone(),
                spanish_only,
                replace,
            };
            tracing::info!(
                url = %config.countries_url,
                spanish_only,
                replace,
                "Starting country import"
            );

            match import::run_import(&repo, &client, &options).await {
                Ok(report) => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(error = %e, "Country import aborted, nothing was stored");
                    Err(e.into())
                }
            }
        }
    }
}

async fn serve(config: Config, repo: Arc<Repository>) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting Heroes Backend");
    tracing::info!("Bind address: {}", config.bind_addr);

    let state = AppState {
        repo,
        views: Arc::new(Views::new()?),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::routes())
        .merge(web::routes())
        .route("/health", get(health_check))
        .fallback(web::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod tests;
