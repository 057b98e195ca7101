//! Data models for the superhero and country catalogue.
//!
//! Both domains persist through the same flat `StoredRecord` document; the
//! typed views in `superhero` and `country` are what handlers and templates see.

mod country;
mod record;
mod superhero;

pub use country::*;
pub use record::*;
pub use superhero::*;

use crate::errors::FieldError;

/// Splits a comma-separated form value into trimmed, non-empty items.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pushes an error unless the trimmed value is between `min` and `max` characters.
pub(crate) fn check_length(
    errors: &mut Vec<FieldError>,
    field: &str,
    label: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(FieldError::new(field, format!("{} is required", label)));
    } else if len < min || len > max {
        errors.push(FieldError::new(
            field,
            format!("{} must be between {} and {} characters", label, min, max),
        ));
    }
}
