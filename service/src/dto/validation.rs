use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::error::GenericError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Field-level feedback from a rejected write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn into_result(self) -> Result<(), GenericError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(GenericError::Validation(self))
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .iter()
                .map(|e| format!("{} {}", e.field, e.message))
                .join("; ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_errors_pass() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn errors_are_listed_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("priority", "must be between 1 and 8");
        errors.add("golfer_id", "has already been picked");
        assert!(errors.has_field("golfer_id"));
        assert!(!errors.has_field("drafted"));
        assert_eq!(
            errors.to_string(),
            "priority must be between 1 and 8; golfer_id has already been picked"
        );
        assert!(errors.into_result().unwrap_err().is_validation());
    }
}
