//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy maps violations to a request error.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationViolation {
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl ValidationViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }
}

/// Validation rule trait - produces violations for one value
pub trait ValidationRule<T: ?Sized> {
    fn check(&self, value: &T) -> Option<ValidationViolation>;
}

/// Inclusive numeric range
pub struct RangeRule<N> {
    pub field: &'static str,
    pub min: N,
    pub max: N,
}

impl<N> RangeRule<N> {
    pub const fn new(field: &'static str, min: N, max: N) -> Self {
        Self { field, min, max }
    }
}

impl<N> ValidationRule<N> for RangeRule<N>
where
    N: PartialOrd + std::fmt::Display + Copy,
{
    fn check(&self, value: &N) -> Option<ValidationViolation> {
        // NaN compares false both ways and is rejected too
        if *value >= self.min && *value <= self.max {
            return None;
        }
        Some(ValidationViolation {
            field: self.field.to_string(),
            message: "Value out of range".to_string(),
            expected: Some(format!("{} to {}", self.min, self.max)),
            actual: Some(value.to_string()),
        })
    }
}

/// Character-count bounds for text fields
pub struct LengthRule {
    pub field: &'static str,
    pub min: usize,
    pub max: usize,
}

impl LengthRule {
    pub const fn new(field: &'static str, min: usize, max: usize) -> Self {
        Self { field, min, max }
    }
}

impl ValidationRule<str> for LengthRule {
    fn check(&self, value: &str) -> Option<ValidationViolation> {
        let len = value.chars().count();
        if len >= self.min && len <= self.max {
            return None;
        }
        Some(ValidationViolation {
            field: self.field.to_string(),
            message: "Length out of range".to_string(),
            expected: Some(format!("{} to {} characters", self.min, self.max)),
            actual: Some(format!("{} characters", len)),
        })
    }
}

/// Collects violations across rules
#[derive(Debug, Default)]
pub struct Violations(Vec<ValidationViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check<T: ?Sized>(&mut self, rule: &impl ValidationRule<T>, value: &T) -> &mut Self {
        if let Some(v) = rule.check(value) {
            self.0.push(v);
        }
        self
    }

    pub fn check_opt<T>(&mut self, rule: &impl ValidationRule<T>, value: Option<&T>) -> &mut Self {
        if let Some(value) = value {
            self.check(rule, value);
        }
        self
    }

    /// Policy: any violation rejects the request
    pub fn into_result(self) -> Result<(), ServiceError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(self.0))
        }
    }
}

/// Implemented by every request type that carries range constraints
pub trait Validate {
    fn collect_violations(&self, violations: &mut Violations);

    fn validate(&self) -> Result<(), ServiceError> {
        let mut violations = Violations::new();
        self.collect_violations(&mut violations);
        violations.into_result()
    }
}
