//! The persisted document shared by superheroes and countries.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, FieldError};

/// One row of the `records` collection.
///
/// Country records reuse the superhero fields and are told apart only by
/// `autor`; see the mapper for the field correspondence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: String,
    pub nombre_super_heroe: String,
    pub nombre_real: String,
    pub edad: f64,
    pub planeta_origen: String,
    pub debilidad: String,
    pub poderes: Vec<String>,
    pub aliados: Vec<String>,
    pub enemigos: Vec<String>,
    /// Direct area in km², written since schema v2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    pub autor: String,
    pub created_at: String,
}

/// The mapped, writable part of a record (everything but identity and timestamps).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordFields {
    pub nombre_super_heroe: String,
    pub nombre_real: String,
    pub edad: f64,
    pub planeta_origen: String,
    pub debilidad: String,
    pub poderes: Vec<String>,
    pub aliados: Vec<String>,
    pub enemigos: Vec<String>,
    pub area: Option<f64>,
    pub autor: String,
}

impl RecordFields {
    /// Check the document shape before it is written.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = Vec::new();
        if self.nombre_super_heroe.trim().is_empty() {
            errors.push(FieldError::new("nombreSuperHeroe", "Name is required"));
        }
        if self.nombre_real.trim().is_empty() {
            errors.push(FieldError::new("nombreReal", "Real name is required"));
        }
        if !self.edad.is_finite() {
            errors.push(FieldError::new("edad", "Age must be a finite number"));
        }
        if self.area.is_some_and(|a| !a.is_finite() || a < 0.0) {
            errors.push(FieldError::new("area", "Area must be a non-negative number"));
        }
        if self.autor.trim().is_empty() {
            errors.push(FieldError::new("autor", "Author is required"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }

    /// Assign a fresh identity and creation time.
    pub fn into_new_record(self) -> StoredRecord {
        StoredRecord {
            id: uuid::Uuid::new_v4().to_string(),
            nombre_super_heroe: self.nombre_super_heroe,
            nombre_real: self.nombre_real,
            edad: self.edad,
            planeta_origen: self.planeta_origen,
            debilidad: self.debilidad,
            poderes: self.poderes,
            aliados: self.aliados,
            enemigos: self.enemigos,
            area: self.area,
            autor: self.autor,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Which records a store query may see, by author tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    All,
    Author(String),
    ExcludeAuthor(String),
}

/// Result of an insert-or-replace.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Created(StoredRecord),
    Updated(StoredRecord),
    NotFound,
}

/// Result of a delete by identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(StoredRecord),
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> RecordFields {
        RecordFields {
            nombre_super_heroe: "Spider-Man".to_string(),
            nombre_real: "Peter Parker".to_string(),
            edad: 25.0,
            autor: "Isabel".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_accepts_complete_record() {
        assert!(fields().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_every_blank_field() {
        let record = RecordFields {
            nombre_super_heroe: " ".to_string(),
            autor: String::new(),
            area: Some(-1.0),
            ..fields()
        };
        let err = record.validate().unwrap_err();
        let names: Vec<_> = err.field_errors().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["nombreSuperHeroe", "area", "autor"]);
    }

    #[test]
    fn test_new_record_gets_identity() {
        let a = fields().into_new_record();
        let b = fields().into_new_record();
        assert_ne!(a.id, b.id);
        assert!(uuid::Uuid::parse_str(&a.id).is_ok());
        assert!(!a.created_at.is_empty());
    }

    #[test]
    fn test_serializes_with_document_field_names() {
        let value = serde_json::to_value(fields().into_new_record()).unwrap();
        assert_eq!(value["nombreSuperHeroe"], "Spider-Man");
        assert_eq!(value["planetaOrigen"], "");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("area").is_none());
    }
}
