//! Country shapes: the upstream payload, user input, and the display view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{check_length, split_list};
use crate::errors::FieldError;

/// Country name block as served by the upstream API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExternalName {
    #[serde(default)]
    pub common: Option<String>,
    #[serde(default)]
    pub official: Option<String>,
}

/// The upstream serves `capital` as a list, but older payloads used a scalar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Capital {
    One(String),
    Many(Vec<String>),
}

impl Capital {
    /// First capital, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            Capital::One(name) => Some(name.as_str()),
            Capital::Many(names) => names.first().map(String::as_str),
        }
    }
}

/// One element of the upstream country list. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExternalCountry {
    pub name: Option<ExternalName>,
    pub capital: Option<Capital>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub borders: Option<Vec<String>>,
    pub area: Option<f64>,
    pub population: Option<f64>,
    /// GINI index keyed by survey year
    pub gini: Option<BTreeMap<String, f64>>,
    pub timezones: Option<Vec<String>>,
    /// Language names keyed by ISO 639-3 code
    pub languages: Option<BTreeMap<String, String>>,
}

impl ExternalCountry {
    /// Whether the country lists `code` among its languages.
    pub fn speaks(&self, code: &str) -> bool {
        self.languages
            .as_ref()
            .is_some_and(|langs| langs.contains_key(code))
    }
}

/// Fully-resolved country values, with upstream gaps already defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFields {
    pub name: String,
    pub capital: String,
    pub region: String,
    pub subregion: String,
    pub gini: f64,
    pub population: f64,
    pub area: Option<f64>,
    pub borders: Vec<String>,
    pub timezones: Vec<String>,
}

/// Request body for creating or replacing a country.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CountryInput {
    pub name: String,
    pub capital: String,
    pub borders: Vec<String>,
    pub area: Option<f64>,
    pub population: Option<u64>,
    pub gini: Option<f64>,
    pub timezones: Vec<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
}

impl CountryInput {
    /// Validate user input, collecting one message per offending field.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        check_length(&mut errors, "name", "Name", &self.name, 3, 90);
        check_length(&mut errors, "capital", "Capital", &self.capital, 3, 90);

        if !self.borders.iter().all(|b| is_country_code(b.trim())) {
            errors.push(FieldError::new(
                "borders",
                "Each border must be a 3-letter uppercase code",
            ));
        }

        match self.area {
            Some(area) if area.is_finite() && area >= 1.0 => {}
            _ => errors.push(FieldError::new("area", "Area must be a positive number")),
        }

        match self.population {
            Some(population) if population >= 1 => {}
            _ => errors.push(FieldError::new(
                "population",
                "Population must be a positive integer",
            )),
        }

        if let Some(gini) = self.gini {
            if !(0.0..=100.0).contains(&gini) {
                errors.push(FieldError::new("gini", "GINI must be between 0 and 100"));
            }
        }

        if self.timezones.iter().any(|tz| tz.trim().is_empty()) {
            errors.push(FieldError::new(
                "timezones",
                "Each timezone must be a non-empty string",
            ));
        }

        errors
    }
}

fn is_country_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

/// HTML form submission for a country; list fields are comma-separated.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CountryForm {
    pub name: String,
    pub capital: String,
    pub borders: String,
    pub area: String,
    pub population: String,
    pub gini: String,
    pub timezones: String,
    pub region: String,
    pub subregion: String,
}

impl CountryForm {
    /// Parse and validate the form into an API input.
    pub fn to_input(&self) -> Result<CountryInput, Vec<FieldError>> {
        let mut errors = Vec::new();

        let area = parse_optional::<f64>(
            &self.area,
            "area",
            "Area must be a positive number",
            &mut errors,
        );
        let population = parse_optional::<u64>(
            &self.population,
            "population",
            "Population must be a positive integer",
            &mut errors,
        );
        let gini = parse_optional::<f64>(
            &self.gini,
            "gini",
            "GINI must be between 0 and 100",
            &mut errors,
        );

        let input = CountryInput {
            name: self.name.trim().to_string(),
            capital: self.capital.trim().to_string(),
            borders: split_list(&self.borders),
            area,
            population,
            gini,
            timezones: split_list(&self.timezones),
            region: non_blank(&self.region),
            subregion: non_blank(&self.subregion),
        };

        let remaining: Vec<FieldError> = input
            .validate()
            .into_iter()
            .filter(|e| !errors.iter().any(|prev| prev.field == e.field))
            .collect();
        errors.extend(remaining);

        if errors.is_empty() {
            Ok(input)
        } else {
            Err(errors)
        }
    }
}

fn parse_optional<T: std::str::FromStr>(
    raw: &str,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// A numeric display value that degrades to a placeholder text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DisplayValue {
    Number(f64),
    Text(String),
}

impl DisplayValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DisplayValue::Number(n) => Some(*n),
            DisplayValue::Text(_) => None,
        }
    }
}

impl std::fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayValue::Number(n) => write!(f, "{}", n),
            DisplayValue::Text(text) => f.write_str(text),
        }
    }
}

/// A country as returned by the API and rendered by templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayCountry {
    pub id: String,
    pub name: String,
    pub capital: String,
    pub region: String,
    pub subregion: String,
    pub borders: Vec<String>,
    pub timezones: Vec<String>,
    pub gini: f64,
    pub population: String,
    pub area: DisplayValue,
    pub author: String,
    pub created_at: String,
}

impl DisplayCountry {
    /// Population as a number, when the stored encoding could be read.
    pub fn population_value(&self) -> Option<f64> {
        self.population.parse().ok()
    }
}

impl From<&DisplayCountry> for CountryForm {
    fn from(country: &DisplayCountry) -> Self {
        Self {
            name: country.name.clone(),
            capital: country.capital.clone(),
            borders: country.borders.join(", "),
            area: country.area.as_f64().map(|a| a.to_string()).unwrap_or_default(),
            population: country
                .population_value()
                .map(|_| country.population.clone())
                .unwrap_or_default(),
            gini: country.gini.to_string(),
            timezones: country.timezones.join(", "),
            region: country.region.clone(),
            subregion: country.subregion.clone(),
        }
    }
}
