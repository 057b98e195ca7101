//! Superhero view over the shared record document.

use serde::{Deserialize, Serialize};

use super::{check_length, split_list, StoredRecord};
use crate::errors::FieldError;

/// A superhero as returned by the API and rendered by templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Superhero {
    pub id: String,
    pub nombre_super_heroe: String,
    pub nombre_real: String,
    pub edad: i64,
    pub planeta_origen: String,
    pub debilidad: String,
    pub poderes: Vec<String>,
    pub aliados: Vec<String>,
    pub enemigos: Vec<String>,
    pub autor: String,
    pub created_at: String,
}

impl From<StoredRecord> for Superhero {
    fn from(record: StoredRecord) -> Self {
        Self {
            id: record.id,
            nombre_super_heroe: record.nombre_super_heroe,
            nombre_real: record.nombre_real,
            edad: record.edad.round() as i64,
            planeta_origen: record.planeta_origen,
            debilidad: record.debilidad,
            poderes: record.poderes,
            aliados: record.aliados,
            enemigos: record.enemigos,
            autor: record.autor,
            created_at: record.created_at,
        }
    }
}

/// Request body for creating or replacing a superhero.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperheroInput {
    #[serde(default)]
    pub nombre_super_heroe: String,
    #[serde(default)]
    pub nombre_real: String,
    #[serde(default)]
    pub edad: Option<i64>,
    #[serde(default)]
    pub planeta_origen: String,
    #[serde(default)]
    pub debilidad: String,
    #[serde(default)]
    pub poderes: Vec<String>,
    #[serde(default)]
    pub aliados: Vec<String>,
    #[serde(default)]
    pub enemigos: Vec<String>,
}

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 60;

impl SuperheroInput {
    /// Validate user input, collecting one message per offending field.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        check_length(
            &mut errors,
            "nombreSuperHeroe",
            "Superhero name",
            &self.nombre_super_heroe,
            NAME_MIN,
            NAME_MAX,
        );
        check_length(
            &mut errors,
            "nombreReal",
            "Real name",
            &self.nombre_real,
            NAME_MIN,
            NAME_MAX,
        );

        match self.edad {
            None => errors.push(FieldError::new("edad", "Age is required")),
            Some(age) if age < 0 => {
                errors.push(FieldError::new("edad", "Age must be an integer >= 0"))
            }
            Some(_) => {}
        }

        if self.poderes.is_empty() {
            errors.push(FieldError::new("poderes", "At least one power is required"));
        } else if !all_within(&self.poderes) {
            errors.push(FieldError::new(
                "poderes",
                "Each power must be between 3 and 60 characters",
            ));
        }
        if !all_within(&self.aliados) {
            errors.push(FieldError::new(
                "aliados",
                "Each ally must be between 3 and 60 characters",
            ));
        }
        if !all_within(&self.enemigos) {
            errors.push(FieldError::new(
                "enemigos",
                "Each enemy must be between 3 and 60 characters",
            ));
        }

        errors
    }
}

fn all_within(items: &[String]) -> bool {
    items.iter().all(|item| {
        let len = item.trim().chars().count();
        (NAME_MIN..=NAME_MAX).contains(&len)
    })
}

/// HTML form submission for a superhero; list fields are comma-separated.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuperheroForm {
    pub nombre_super_heroe: String,
    pub nombre_real: String,
    pub edad: String,
    pub planeta_origen: String,
    pub debilidad: String,
    pub poderes: String,
    pub aliados: String,
    pub enemigos: String,
}

impl SuperheroForm {
    /// Parse and validate the form into an API input.
    pub fn to_input(&self) -> Result<SuperheroInput, Vec<FieldError>> {
        let mut errors = Vec::new();

        let edad = match self.edad.trim() {
            "" => None,
            raw => match raw.parse::<i64>() {
                Ok(age) => Some(age),
                Err(_) => {
                    errors.push(FieldError::new("edad", "Age must be an integer >= 0"));
                    Some(0)
                }
            },
        };

        let input = SuperheroInput {
            nombre_super_heroe: self.nombre_super_heroe.trim().to_string(),
            nombre_real: self.nombre_real.trim().to_string(),
            edad,
            planeta_origen: self.planeta_origen.trim().to_string(),
            debilidad: self.debilidad.trim().to_string(),
            poderes: split_list(&self.poderes),
            aliados: split_list(&self.aliados),
            enemigos: split_list(&self.enemigos),
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

impl From<&Superhero> for SuperheroForm {
    fn from(hero: &Superhero) -> Self {
        Self {
            nombre_super_heroe: hero.nombre_super_heroe.clone(),
            nombre_real: hero.nombre_real.clone(),
            edad: hero.edad.to_string(),
            planeta_origen: hero.planeta_origen.clone(),
            debilidad: hero.debilidad.clone(),
            poderes: hero.poderes.join(", "),
            aliados: hero.aliados.join(", "),
            enemigos: hero.enemigos.join(", "),
        }
    }
}
