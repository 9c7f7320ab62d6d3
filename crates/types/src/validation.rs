// Path: crates/types/src/validation.rs

//! The outcome of a validation stage.
//!
//! A [`ValidationResult`] is immutable once built. Validators accumulate errors in a
//! [`ValidationResultBuilder`], which is consumed by `build`, so one stage can never
//! append to a result another stage already handed out.

use crate::error::{ConsensusError, ErrorCode};

/// An ordered list of consensus errors, optionally carrying the validated value.
///
/// Valid if and only if the error list is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult<T = ()> {
    errors: Vec<ConsensusError>,
    data: Option<T>,
}

impl<T> Default for ValidationResult<T> {
    fn default() -> Self {
        Self {
            errors: Vec::new(),
            data: None,
        }
    }
}

impl<T> ValidationResult<T> {
    /// A valid result carrying `data`.
    pub fn valid(data: T) -> Self {
        Self {
            errors: Vec::new(),
            data: Some(data),
        }
    }

    /// A result holding the given errors.
    pub fn with_errors(errors: Vec<ConsensusError>) -> Self {
        Self { errors, data: None }
    }

    /// A result holding one error.
    pub fn with_error(error: impl Into<ConsensusError>) -> Self {
        Self::with_errors(vec![error.into()])
    }

    /// True when no error was recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The recorded errors, in the order they were found.
    pub fn errors(&self) -> &[ConsensusError] {
        &self.errors
    }

    /// The numeric codes of the recorded errors.
    pub fn error_codes(&self) -> Vec<u32> {
        self.errors.iter().map(ErrorCode::code).collect()
    }

    /// The first recorded error.
    pub fn first_error(&self) -> Option<&ConsensusError> {
        self.errors.first()
    }

    /// The carried value, if any.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Takes the carried value.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Splits the result into its errors and value.
    pub fn into_parts(self) -> (Vec<ConsensusError>, Option<T>) {
        (self.errors, self.data)
    }

    /// Replaces the carried value, keeping the errors.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValidationResult<U> {
        ValidationResult {
            errors: self.errors,
            data: self.data.map(f),
        }
    }

    /// Drops the carried value.
    pub fn without_data(self) -> ValidationResult {
        ValidationResult {
            errors: self.errors,
            data: None,
        }
    }
}

/// Append-only accumulator for one validation stage.
#[derive(Debug, Default)]
#[must_use = "a builder does nothing until it is built"]
pub struct ValidationResultBuilder {
    errors: Vec<ConsensusError>,
}

impl ValidationResultBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one error.
    pub fn add_error(&mut self, error: impl Into<ConsensusError>) -> &mut Self {
        self.errors.push(error.into());
        self
    }

    /// Records several errors.
    pub fn add_errors<E: Into<ConsensusError>>(
        &mut self,
        errors: impl IntoIterator<Item = E>,
    ) -> &mut Self {
        self.errors.extend(errors.into_iter().map(Into::into));
        self
    }

    /// Records every error of a finished result and returns its value.
    pub fn merge<T>(&mut self, result: ValidationResult<T>) -> Option<T> {
        let (errors, data) = result.into_parts();
        self.errors.extend(errors);
        data
    }

    /// True while no error has been recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Freezes the accumulated errors into a result without a value.
    pub fn build(self) -> ValidationResult {
        ValidationResult::with_errors(self.errors)
    }

    /// Freezes the accumulated errors; the value is attached only if there are none.
    pub fn build_with<T>(self, data: T) -> ValidationResult<T> {
        if self.errors.is_empty() {
            ValidationResult::valid(data)
        } else {
            ValidationResult::with_errors(self.errors)
        }
    }
}
