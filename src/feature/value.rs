//! Concrete feature values.
//!
//! A [`FeatureValue`] is a `(feature, value)` pair small enough to be `Copy`.
//! Values can only be created through the owning [`Feature`](super::Feature),
//! which validates the value against the feature's kind and range, so every
//! logical value has exactly one representation and equality is a plain
//! two-word comparison.

use std::fmt;

use super::FeatureId;

/// The value half of a [`FeatureValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    /// The feature is absent. Never stored in a matrix.
    Null,
    /// The single value of a unary feature.
    Present,
    /// `+` of a binary feature.
    Plus,
    /// `-` of a binary feature.
    Minus,
    /// A number of a scalar feature.
    Scalar(i32),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the number carried by a scalar value.
    #[inline]
    pub fn as_scalar(&self) -> Option<i32> {
        match self {
            Value::Scalar(n) => Some(*n),
            _ => None,
        }
    }
}

/// One concrete value bound to its feature.
///
/// # Examples
///
/// ```
/// use phonorule::feature::{FeatureSet, Value};
///
/// let mut features = FeatureSet::new();
/// let voice = features.add_binary("voice").unwrap();
///
/// let plus = voice.plus().unwrap();
/// assert_eq!(plus, voice.plus().unwrap());
/// assert_eq!(plus.value(), Value::Plus);
/// assert_eq!(plus.feature(), voice.id());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureValue {
    feature: FeatureId,
    value: Value,
}

impl FeatureValue {
    #[inline]
    pub(crate) const fn new(feature: FeatureId, value: Value) -> Self {
        Self { feature, value }
    }

    /// The feature this value belongs to.
    #[inline]
    pub fn feature(&self) -> FeatureId {
        self.feature
    }

    /// The value itself.
    #[inline]
    pub fn value(&self) -> Value {
        self.value
    }

    /// Returns `true` if this is the feature's null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

/// Renders a value the way rule descriptions write it, given the feature name.
pub(crate) fn render(name: &str, value: Value) -> String {
    match value {
        Value::Null => format!("*{}", name),
        Value::Present => name.to_string(),
        Value::Plus => format!("+{}", name),
        Value::Minus => format!("-{}", name),
        Value::Scalar(n) => format!("{}={}", name, n),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Present => write!(f, "present"),
            Value::Plus => write!(f, "+"),
            Value::Minus => write!(f, "-"),
            Value::Scalar(n) => write!(f, "{}", n),
        }
    }
}
