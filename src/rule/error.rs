//! Error types for rule construction and rule application.

use thiserror::Error;

/// Recoverable anomalies raised while a rule writes values.
///
/// Each of these aborts only the value contribution that raised it. The rule
/// keeps going and the anomaly is reported to the
/// [`RuleObserver`](super::RuleObserver) as [`RuleEvent::Anomaly`](super::RuleEvent::Anomaly).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// A variable was written before any pattern bound it.
    #[error("Variable ${feature} is used before it is bound")]
    UndefinedVariable {
        /// Feature name
        feature: String,
    },

    /// Scalar arithmetic produced a value outside the feature's range.
    #[error("Scalar {feature}={value} is outside the declared range")]
    ScalarRange {
        /// Feature name
        feature: String,
        /// The computed, rejected value
        value: i32,
    },

    /// Scalar arithmetic on a feature the segment does not carry.
    #[error("Cannot apply {operation} to absent scalar {feature}")]
    InvalidScalarOperation {
        /// Feature name
        feature: String,
        /// The operation, rendered (e.g. `+1`)
        operation: String,
    },
}

/// Errors raised while assembling rules from primitives.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuleBuildError {
    /// A bounded repeat may only wrap pattern-only primitives.
    #[error("Repeat may only contain pattern primitives, found {0}")]
    MutatingPrimitiveInRepeat(String),

    /// A bounded repeat with `min > max`.
    #[error("Repeat bounds are inverted: min {min} > max {max}")]
    InvertedRepeatBounds {
        /// Lower bound
        min: usize,
        /// Upper bound
        max: usize,
    },

    /// Application probability outside `[0, 1]`.
    #[error("Application probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    /// Rules must be named.
    #[error("Rule name is empty")]
    EmptyName,
}
