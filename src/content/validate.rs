//! Field-level validation shared by blocks and pages.

use regex::Regex;
use thiserror::Error;

/// A write rejected because one field broke its declared constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Prefix the field path, e.g. `heading` -> `content[0].hero.heading`.
    pub fn nested(self, prefix: &str) -> Self {
        Self {
            field: format!("{}.{}", prefix, self.field),
            message: self.message,
        }
    }
}

pub type ValidationResult = Result<(), ValidationError>;

/// Anything that can check its own field constraints before being persisted.
pub trait Validate {
    fn validate(&self) -> ValidationResult;
}

lazy_static::lazy_static! {
    /// Valid slug pattern: lowercase letters, numbers, and hyphens
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    static ref URL_REGEX: Regex = Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap();

    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$").unwrap();
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

pub fn required(field: &str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "This field is required"));
    }
    Ok(())
}

/// Length is counted in characters, not bytes.
pub fn max_len(field: &str, value: &str, max: usize) -> ValidationResult {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::new(
            field,
            format!("Ensure this value has at most {} characters (it has {})", max, len),
        ));
    }
    Ok(())
}

/// Required text bounded by `max`.
pub fn char_field(field: &str, value: &str, max: usize) -> ValidationResult {
    required(field, value)?;
    max_len(field, value, max)
}

/// Optional text bounded by `max`. `None` and blank both pass.
pub fn opt_char_field(field: &str, value: Option<&str>, max: usize) -> ValidationResult {
    match value {
        Some(v) => max_len(field, v, max),
        None => Ok(()),
    }
}

pub fn int_range(field: &str, value: i32, min: i32, max: i32) -> ValidationResult {
    if value < min {
        return Err(ValidationError::new(
            field,
            format!("Ensure this value is greater than or equal to {}", min),
        ));
    }
    if value > max {
        return Err(ValidationError::new(
            field,
            format!("Ensure this value is less than or equal to {}", max),
        ));
    }
    Ok(())
}

pub fn url(field: &str, value: &str) -> ValidationResult {
    if !URL_REGEX.is_match(value) {
        return Err(ValidationError::new(field, "Enter a valid URL"));
    }
    Ok(())
}

pub fn opt_url(field: &str, value: Option<&str>) -> ValidationResult {
    match value {
        Some(v) if !v.is_empty() => url(field, v),
        _ => Ok(()),
    }
}

/// Blank is allowed; anything else must look like an address.
pub fn email(field: &str, value: &str) -> ValidationResult {
    if !value.is_empty() && !EMAIL_REGEX.is_match(value) {
        return Err(ValidationError::new(field, "Enter a valid email address"));
    }
    Ok(())
}

pub fn slug(field: &str, value: &str) -> ValidationResult {
    char_field(field, value, 255)?;
    if !is_valid_slug(value) {
        return Err(ValidationError::new(
            field,
            "Slug must contain only lowercase letters, numbers, and hyphens",
        ));
    }
    Ok(())
}

/// Validate every item of a list, indexing the field path on failure.
pub fn each<T>(
    field: &str,
    items: &[T],
    check: impl Fn(&str, &T) -> ValidationResult,
) -> ValidationResult {
    for (i, item) in items.iter().enumerate() {
        check(&format!("{}[{}]", field, i), item)?;
    }
    Ok(())
}

/// Split a comma-joined field into trimmed, non-empty items.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
