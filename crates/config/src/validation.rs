//! Validation helpers shared by the config sections

pub use crate::error::ValidationError;

/// A named section of the config file that can check and merge itself
pub trait ConfigSection: Default {
    /// Returns every problem found; empty means valid
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Merges another section into this one; values from `other` win
    fn merge(&mut self, other: Self);

    /// Returns the section name for error reporting
    fn section_name(&self) -> &'static str;
}

/// Common validators for config values
pub struct Validator;

impl Validator {
    /// Validates that a numeric value is within a range
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            Err(ValidationError::with_value(
                field,
                format!("must be between {} and {}", min, max),
                value,
            ))
        } else {
            Ok(())
        }
    }

    /// Validates that a string is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new(field, "must not be empty"))
        } else {
            Ok(())
        }
    }

    /// Validates that a string is a UUID
    pub fn uuid(value: &str, field: &str) -> Result<(), ValidationError> {
        uuid::Uuid::parse_str(value)
            .map(|_| ())
            .map_err(|_| ValidationError::with_value(field, "must be a UUID", value))
    }

    /// Collects multiple validation results into a single result
    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range() {
        assert!(Validator::in_range(16, 16, 1000, "test").is_ok());
        assert!(Validator::in_range(1000, 16, 1000, "test").is_ok());
        assert!(Validator::in_range(15, 16, 1000, "test").is_err());
        assert!(Validator::in_range(1001, 16, 1000, "test").is_err());
    }

    #[test]
    fn test_not_empty() {
        assert!(Validator::not_empty("resonance.db", "test").is_ok());
        assert!(Validator::not_empty("   ", "test").is_err());
    }

    #[test]
    fn test_uuid() {
        assert!(Validator::uuid("67e55044-10b1-426f-9247-bb680e5fe0c8", "test").is_ok());
        let err = Validator::uuid("me", "app.active_profile").unwrap_err();
        assert_eq!(err.value.as_deref(), Some("me"));
    }

    #[test]
    fn test_collect_errors() {
        assert!(Validator::collect_errors(vec![Ok(()), Ok(())]).is_ok());

        let result = Validator::collect_errors(vec![
            Ok(()),
            Err(ValidationError::new("field1", "error1")),
            Err(ValidationError::new("field2", "error2")),
        ]);
        assert_eq!(result.unwrap_err().len(), 2);
    }
}
