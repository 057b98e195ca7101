//! Schema mapping between country data and the shared record document.
//!
//! Countries are persisted in superhero-shaped documents:
//!
//! | record field       | country value                          |
//! |--------------------|----------------------------------------|
//! | `nombreSuperHeroe` | common name                            |
//! | `nombreReal`       | capital                                |
//! | `edad`             | GINI index                             |
//! | `planetaOrigen`    | region                                 |
//! | `debilidad`        | subregion                              |
//! | `poderes`          | `"Población: N"`, `"Área: N km²"`      |
//! | `aliados`          | border codes                           |
//! | `enemigos`         | timezones                              |
//! | `area`             | area in km² (schema v2)                |
//!
//! The forward direction never fails: upstream gaps resolve to fixed
//! defaults. The backward direction never fails either: anything that
//! cannot be read back degrades to a placeholder text.

use crate::models::{
    CountryFields, CountryInput, DisplayCountry, DisplayValue, ExternalCountry, RecordFields,
    StoredRecord, SuperheroInput,
};

pub const POPULATION_PREFIX: &str = "Población: ";
pub const AREA_PREFIX: &str = "Área: ";
pub const AREA_SUFFIX: &str = " km²";
const ENTRY_DELIMITER: &str = ": ";

pub const UNKNOWN_NAME: &str = "Desconocido";
pub const UNKNOWN_CAPITAL: &str = "Desconocida";
pub const UNKNOWN_REGION: &str = "Desconocido";
pub const NO_TIMEZONES: &str = "Sin información";
pub const UNAVAILABLE: &str = "No disponible";

/// Resolve an upstream country into concrete values, applying defaults.
pub fn country_fields(external: &ExternalCountry) -> CountryFields {
    let name = external
        .name
        .as_ref()
        .and_then(|n| n.common.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNKNOWN_NAME)
        .to_string();

    let capital = external
        .capital
        .as_ref()
        .and_then(|c| c.first())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNKNOWN_CAPITAL)
        .to_string();

    let gini = external
        .gini
        .as_ref()
        .and_then(|by_year| by_year.values().next().copied())
        .unwrap_or(0.0);

    CountryFields {
        name,
        capital,
        region: text_or(external.region.as_deref(), UNKNOWN_REGION),
        subregion: text_or(external.subregion.as_deref(), UNKNOWN_REGION),
        gini,
        population: external.population.unwrap_or(0.0),
        area: external.area,
        borders: external.borders.clone().unwrap_or_default(),
        timezones: external
            .timezones
            .clone()
            .unwrap_or_else(|| vec![NO_TIMEZONES.to_string()]),
    }
}

/// Forward transform: upstream country to a stored document tagged with `author`.
pub fn to_stored_record(external: &ExternalCountry, author: &str) -> RecordFields {
    encode_country(&country_fields(external), author)
}

/// Encode resolved country values into the shared document layout.
pub fn encode_country(country: &CountryFields, author: &str) -> RecordFields {
    let area = country.area.unwrap_or(0.0);
    RecordFields {
        nombre_super_heroe: country.name.clone(),
        nombre_real: country.capital.clone(),
        edad: country.gini,
        planeta_origen: country.region.clone(),
        debilidad: country.subregion.clone(),
        poderes: vec![
            format!("{}{}", POPULATION_PREFIX, country.population),
            format!("{}{}{}", AREA_PREFIX, area, AREA_SUFFIX),
        ],
        aliados: country.borders.clone(),
        enemigos: country.timezones.clone(),
        area: country.area,
        autor: author.to_string(),
    }
}

/// Forward transform for a user-submitted country.
pub fn country_input_to_record(input: &CountryInput, author: &str) -> RecordFields {
    let country = CountryFields {
        name: text_or(Some(input.name.as_str()), UNKNOWN_NAME),
        capital: text_or(Some(input.capital.as_str()), UNKNOWN_CAPITAL),
        region: text_or(input.region.as_deref(), UNKNOWN_REGION),
        subregion: text_or(input.subregion.as_deref(), UNKNOWN_REGION),
        gini: input.gini.unwrap_or(0.0),
        population: input.population.unwrap_or(0) as f64,
        area: input.area,
        borders: input.borders.iter().map(|b| b.trim().to_string()).collect(),
        timezones: input.timezones.iter().map(|t| t.trim().to_string()).collect(),
    };
    encode_country(&country, author)
}

/// Backward transform: stored document to the country display view.
pub fn to_display_record(stored: &StoredRecord) -> DisplayCountry {
    let population = decode_entry(&stored.poderes, POPULATION_PREFIX)
        .filter(|value| value.parse::<f64>().is_ok_and(f64::is_finite))
        .unwrap_or_else(|| UNAVAILABLE.to_string());

    let area = stored
        .area
        .or_else(|| decode_area(&stored.poderes))
        .map(DisplayValue::Number)
        .unwrap_or_else(|| DisplayValue::Text(UNAVAILABLE.to_string()));

    DisplayCountry {
        id: stored.id.clone(),
        name: stored.nombre_super_heroe.clone(),
        capital: stored.nombre_real.clone(),
        region: stored.planeta_origen.clone(),
        subregion: stored.debilidad.clone(),
        borders: stored.aliados.clone(),
        timezones: stored.enemigos.clone(),
        gini: stored.edad,
        population,
        area,
        author: stored.autor.clone(),
        created_at: stored.created_at.clone(),
    }
}

/// Read the area back out of the legacy `poderes` encoding.
pub fn decode_area(poderes: &[String]) -> Option<f64> {
    decode_entry(poderes, AREA_PREFIX).and_then(|value| {
        value
            .trim_end_matches(AREA_SUFFIX)
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
    })
}

/// Find the entry starting with `prefix` and return the text after its delimiter.
fn decode_entry(poderes: &[String], prefix: &str) -> Option<String> {
    poderes
        .iter()
        .find(|entry| entry.starts_with(prefix))
        .and_then(|entry| entry.split(ENTRY_DELIMITER).nth(1))
        .map(|value| value.trim().to_string())
}

/// Superhero input to the shared document layout.
pub fn superhero_input_to_record(input: &SuperheroInput, author: &str) -> RecordFields {
    let trimmed = |items: &[String]| -> Vec<String> {
        items.iter().map(|item| item.trim().to_string()).collect()
    };
    RecordFields {
        nombre_super_heroe: input.nombre_super_heroe.trim().to_string(),
        nombre_real: input.nombre_real.trim().to_string(),
        edad: input.edad.unwrap_or(0) as f64,
        planeta_origen: input.planeta_origen.trim().to_string(),
        debilidad: input.debilidad.trim().to_string(),
        poderes: trimmed(&input.poderes),
        aliados: trimmed(&input.aliados),
        enemigos: trimmed(&input.enemigos),
        area: None,
        autor: author.to_string(),
    }
}

fn text_or(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}
