//! One-shot import of the external country list into the store.

use serde::Serialize;

use crate::db::Repository;
use crate::errors::AppError;
use crate::mapper;
use crate::models::RecordFields;
use crate::source::RestCountriesClient;

/// ISO 639-3 code used by the Spanish-speaking filter.
pub const SPANISH: &str = "spa";

/// Import job options.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Author tag written on every imported record
    pub author: String,
    /// Keep only countries listing Spanish among their languages
    pub spanish_only: bool,
    /// Remove previously imported records in the same transaction
    pub replace: bool,
}

/// Summary of a finished import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub fetched: usize,
    pub selected: usize,
    pub inserted: usize,
    pub removed: u64,
}

/// Fetch, filter, map and store the country list.
///
/// Nothing is written unless the fetch succeeds.
pub async fn run_import(
    repo: &Repository,
    client: &RestCountriesClient,
    options: &ImportOptions,
) -> Result<ImportReport, AppError> {
    let countries = client.fetch_all().await?;
    let fetched = countries.len();

    let records: Vec<RecordFields> = countries
        .iter()
        .filter(|country| !options.spanish_only || country.speaks(SPANISH))
        .map(|country| mapper::to_stored_record(country, &options.author))
        .collect();
    let selected = records.len();

    let (removed, inserted) = if options.replace {
        let (removed, inserted) = repo.replace_by_author(&options.author, &records).await?;
        (removed, inserted.len())
    } else {
        (0, repo.insert_many(&records).await?.len())
    };

    let report = ImportReport {
        fetched,
        selected,
        inserted,
        removed,
    };
    tracing::info!(
        fetched = report.fetched,
        selected = report.selected,
        inserted = report.inserted,
        removed = report.removed,
        author = %options.author,
        "Country import finished"
    );
    Ok(report)
}
