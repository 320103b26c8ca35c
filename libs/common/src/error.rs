//! Custom error types for the common library
//!
//! This module defines the configuration error and the field-level
//! validation error collection shared by the services.

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

/// Custom error type for configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error occurred while reading or merging configuration sources
    #[error("Configuration source error: {0}")]
    Source(#[from] ::config::ConfigError),

    /// Configuration was loaded but holds unusable values
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Field-level validation failures, keyed by wire field name
///
/// Serializes as a JSON object mapping each field to its list of messages,
/// in the order the fields first failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: IndexMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Fold another set of errors into this one
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for a field, if any
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_group_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add("login", "Login is required");
        errors.add("firstName", "First name is required");
        errors.add("login", "Unallowed chars in Login");

        assert_eq!(
            errors.get("login"),
            Some(&["Login is required".to_string(), "Unallowed chars in Login".to_string()][..])
        );
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["login", "firstName"]);
    }

    #[test]
    fn test_validation_errors_serialize_as_object() {
        let mut errors = ValidationErrors::new();
        errors.add("login", "Unallowed chars in Login");

        let value = serde_json::to_value(&errors).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({ "login": ["Unallowed chars in Login"] })
        );
    }

    #[test]
    fn test_empty_errors_are_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
