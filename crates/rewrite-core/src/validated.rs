//! Accumulating validation results.
//!
//! Unlike `Result`, combining two `Validated` values keeps the failures of
//! both sides, so every problem with a recipe's options is reported at once.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One rejected option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub property: String,
    pub invalid_value: Option<String>,
    pub message: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.invalid_value {
            Some(value) => write!(f, "{} was '{}' but {}", self.property, value, self.message),
            None => write!(f, "{} {}", self.property, self.message),
        }
    }
}

/// `value()` was called on an invalid result
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid options: {}", summarize(.0))]
pub struct ValidationError(pub Vec<Failure>);

fn summarize(failures: &[Failure]) -> String {
    failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[derive(Debug, Clone, PartialEq)]
pub enum Validated<T> {
    Valid(T),
    Invalid(Vec<Failure>),
}

impl<T> Validated<T> {
    pub fn valid(value: T) -> Self {
        Validated::Valid(value)
    }

    pub fn invalid(property: impl Into<String>, invalid_value: Option<String>, message: impl Into<String>) -> Self {
        Validated::Invalid(vec![Failure {
            property: property.into(),
            invalid_value,
            message: message.into(),
        }])
    }

    /// Valid when `value` is present
    pub fn required(property: impl Into<String>, value: Option<T>) -> Self {
        match value {
            Some(value) => Validated::Valid(value),
            None => Validated::invalid(property, None, "is required"),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validated::Valid(_))
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    pub fn failures(&self) -> &[Failure] {
        match self {
            Validated::Valid(_) => &[],
            Validated::Invalid(failures) => failures,
        }
    }

    /// Combine with `other`, keeping every failure from both sides. The
    /// result carries `other`'s value when both are valid.
    pub fn and<U>(self, other: Validated<U>) -> Validated<U> {
        match (self, other) {
            (Validated::Valid(_), other) => other,
            (Validated::Invalid(mut failures), other) => {
                failures.extend(other.failures().iter().cloned());
                Validated::Invalid(failures)
            }
        }
    }

    /// Like [`Validated::and`] but keeps both values
    pub fn zip<U>(self, other: Validated<U>) -> Validated<(T, U)> {
        match (self, other) {
            (Validated::Valid(a), Validated::Valid(b)) => Validated::Valid((a, b)),
            (left, right) => {
                let mut failures = left.failures().to_vec();
                failures.extend(right.failures().iter().cloned());
                Validated::Invalid(failures)
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validated<U> {
        match self {
            Validated::Valid(value) => Validated::Valid(f(value)),
            Validated::Invalid(failures) => Validated::Invalid(failures),
        }
    }

    /// Continue with a check that needs the valid value
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Validated<U>) -> Validated<U> {
        match self {
            Validated::Valid(value) => f(value),
            Validated::Invalid(failures) => Validated::Invalid(failures),
        }
    }

    /// The valid value. Fails when called on an invalid result; check
    /// [`Validated::is_valid`] first.
    pub fn value(self) -> Result<T, ValidationError> {
        match self {
            Validated::Valid(value) => Ok(value),
            Validated::Invalid(failures) => Err(ValidationError(failures)),
        }
    }

    pub fn ok(self) -> Option<T> {
        self.value().ok()
    }
}

impl<T: fmt::Display> Validated<T> {
    /// Valid when `predicate` accepts `value`
    pub fn test(
        property: impl Into<String>,
        message: impl Into<String>,
        value: T,
        predicate: impl FnOnce(&T) -> bool,
    ) -> Self {
        if predicate(&value) {
            Validated::Valid(value)
        } else {
            let shown = value.to_string();
            Validated::invalid(property, Some(shown), message)
        }
    }
}

impl Validated<()> {
    /// Neutral element for folding many checks with `and`
    pub fn none() -> Self {
        Validated::Valid(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_accumulates_both_sides() {
        let version = Validated::<String>::invalid("version", Some("x.y".into()), "is not a version selector");
        let distribution = Validated::<String>::invalid("distribution", Some("src".into()), "must be one of bin, all");

        let combined = version.and(distribution);
        assert!(combined.is_invalid());
        let messages: Vec<_> = combined.failures().iter().map(|f| f.property.as_str()).collect();
        assert_eq!(messages, vec!["version", "distribution"]);
    }

    #[test]
    fn test_and_keeps_right_value() {
        let combined = Validated::valid(1).and(Validated::valid("two"));
        assert_eq!(combined.value(), Ok("two"));
    }

    #[test]
    fn test_and_with_valid_left_keeps_right_failures() {
        let combined = Validated::valid(()).and(Validated::<()>::required("key", None));
        assert_eq!(combined.failures().len(), 1);
        assert_eq!(combined.failures()[0].message, "is required");
    }

    #[test]
    fn test_value_on_invalid_fails() {
        let invalid = Validated::<u8>::invalid("port", Some("-1".into()), "must be positive");
        let err = invalid.value().unwrap_err();
        assert_eq!(err.to_string(), "invalid options: port was '-1' but must be positive");
    }

    #[test]
    fn test_predicate() {
        let ok = Validated::test("distribution", "must be one of bin, all", "bin", |d| ["bin", "all"].contains(d));
        let bad = Validated::test("distribution", "must be one of bin, all", "src", |d| ["bin", "all"].contains(d));

        assert!(ok.is_valid());
        assert_eq!(bad.failures()[0].invalid_value.as_deref(), Some("src"));
    }

    #[test]
    fn test_zip_collects_everything() {
        let zipped = Validated::<u8>::required("a", None).zip(Validated::<u8>::required("b", None));
        assert_eq!(zipped.failures().len(), 2);
    }
}
