//! Error types for feature definition and value construction.

use thiserror::Error;

/// Errors raised while declaring features or building values for them.
///
/// These are contract violations: the caller asked for something the feature
/// model cannot represent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeatureError {
    /// A feature with this name already exists in the set.
    #[error("Feature '{0}' is already defined")]
    DuplicateFeature(String),

    /// No feature with this name exists in the set.
    #[error("Feature '{0}' is not defined")]
    UnknownFeature(String),

    /// The value kind does not belong to the feature's kind.
    ///
    /// For example `+` requested from a unary feature, or a scalar number
    /// requested from a binary feature.
    #[error("Value {value} is not valid for {kind} feature '{feature}'")]
    InvalidValue {
        /// Feature name
        feature: String,
        /// Feature kind, rendered
        kind: &'static str,
        /// Offending value, rendered
        value: String,
    },

    /// A scalar value lies outside the feature's declared range.
    #[error("Scalar value {value} is outside the range of feature '{feature}'")]
    OutOfRange {
        /// Feature name
        feature: String,
        /// Offending value
        value: i32,
    },

    /// A scalar step has no negation in `i32`.
    #[error("Step {delta} cannot be subtracted from scalar feature '{feature}'")]
    StepOverflow {
        /// Feature name
        feature: String,
        /// Requested step
        delta: i32,
    },

    /// A scalar feature declared a minimum greater than its maximum.
    #[error("Scalar feature '{feature}' has min {min} > max {max}")]
    InvalidRange {
        /// Feature name
        feature: String,
        /// Declared minimum
        min: i32,
        /// Declared maximum
        max: i32,
    },

    /// A node feature was required.
    #[error("Feature '{0}' is not a node feature")]
    NotANode(String),

    /// A scalar feature was required.
    #[error("Feature '{0}' is not a scalar feature")]
    NotScalar(String),

    /// A node feature was used where a value-bearing feature is required.
    #[error("Node feature '{0}' cannot hold a value directly")]
    NodeHasNoValue(String),
}

/// A specialized `Result` type for feature operations.
pub type Result<T> = std::result::Result<T, FeatureError>;
