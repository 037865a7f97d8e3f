//! Collect-all field validation shared by the intake and directory workflows.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use validator::ValidateEmail;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every invalid or missing field found in a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.fields.iter().map(|error| error.field).collect();
        names.dedup();
        names
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|error| error.field == field)
    }

    /// Messages grouped per field, the shape returned to HTTP callers.
    pub fn by_field(&self) -> BTreeMap<&'static str, Vec<String>> {
        let mut grouped: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for error in &self.fields {
            grouped
                .entry(error.field)
                .or_default()
                .push(error.message.clone());
        }
        grouped
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fields: {}", self.field_names().join(", "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default)]
pub(crate) struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub(crate) fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Trimmed value, or a "required" error when missing or blank.
    pub(crate) fn required(
        &mut self,
        field: &'static str,
        value: Option<String>,
        max_len: usize,
    ) -> Option<String> {
        match optional_text(value) {
            Some(text) => self.bounded(field, text, max_len),
            None => {
                self.push(field, "this field is required");
                None
            }
        }
    }

    /// Trimmed value, `None` when absent or blank.
    pub(crate) fn optional(
        &mut self,
        field: &'static str,
        value: Option<String>,
        max_len: usize,
    ) -> Option<String> {
        optional_text(value).and_then(|text| self.bounded(field, text, max_len))
    }

    pub(crate) fn required_email(
        &mut self,
        field: &'static str,
        value: Option<String>,
    ) -> Option<String> {
        let email = self.required(field, value, MAX_EMAIL_LEN)?;
        if email.validate_email() {
            Some(email)
        } else {
            self.push(field, "enter a valid email address");
            None
        }
    }

    fn bounded(&mut self, field: &'static str, text: String, max_len: usize) -> Option<String> {
        if text.chars().count() > max_len {
            self.push(
                field,
                format!("ensure this field has no more than {max_len} characters"),
            );
            None
        } else {
            Some(text)
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn into_error(self) -> ValidationError {
        ValidationError {
            fields: self.errors,
        }
    }
}

pub(crate) const MAX_EMAIL_LEN: usize = 254;

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_failure() {
        let mut errors = FieldErrors::default();
        assert!(errors.required("name", Some("   ".to_string()), 10).is_none());
        assert!(errors.required_email("email", Some("nope".to_string())).is_none());
        assert!(errors
            .optional("phone", Some("0123456789012".to_string()), 5)
            .is_none());

        let error = errors.into_error();
        assert_eq!(error.field_names(), vec!["name", "email", "phone"]);
        assert_eq!(error.to_string(), "invalid fields: name, email, phone");
    }

    #[test]
    fn blank_optional_values_become_absent() {
        let mut errors = FieldErrors::default();
        assert_eq!(errors.optional("city", Some("  ".to_string()), 100), None);
        assert_eq!(
            errors.optional("city", Some(" Pune ".to_string()), 100),
            Some("Pune".to_string())
        );
        assert!(errors.is_empty());
    }
}
