//! Field-level validation messages.
//!
//! Handlers collect every problem with a request before failing so the client
//! can show all of them at once. Keys are the camelCase JSON field names.

use std::collections::BTreeMap;

use serde::Serialize;

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single message for a single field.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one message was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Trimmed, non-empty text or a "required" message.
pub(crate) fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    max_len: usize,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, format!("{field} is required"));
    } else if trimmed.chars().count() > max_len {
        errors.add(field, format!("{field} must be at most {max_len} characters"));
    }
    trimmed.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_messages_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add("password", "too short");
        errors.add("password", "needs a digit");
        errors.add("email", "invalid");

        assert_eq!(errors.field("password").len(), 2);
        assert_eq!(errors.field("email"), ["invalid".to_string()]);
        assert!(errors.field("name").is_empty());
    }

    #[test]
    fn test_serializes_as_map() {
        let errors = ValidationErrors::single("name", "name is required");
        let json = serde_json::to_value(&errors).unwrap_or_default();
        assert_eq!(json, serde_json::json!({ "name": ["name is required"] }));
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());
        assert!(ValidationErrors::single("a", "b").into_result().is_err());
    }

    #[test]
    fn test_required_text() {
        let mut errors = ValidationErrors::new();
        assert_eq!(required_text(&mut errors, "name", "  Mugs ", 10), "Mugs");
        assert!(errors.is_empty());

        required_text(&mut errors, "name", "   ", 10);
        required_text(&mut errors, "description", "abcdef", 3);
        assert_eq!(errors.field("name"), ["name is required".to_string()]);
        assert_eq!(errors.field("description").len(), 1);
    }

    #[test]
    fn test_display_joins_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("b", "second");
        errors.add("a", "first");
        assert_eq!(errors.to_string(), "a: first; b: second");
    }
}
