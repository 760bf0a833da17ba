//! Single-feature value producers used by combiners.

use smallvec::SmallVec;
use std::fmt;

use super::context::{Binding, RuleContext};
use crate::feature::{Feature, FeatureError, FeatureMatrix, FeatureValue, Result, Value};
use crate::rule::RuleError;

/// Overrides produced by one [`Producer`].
pub type Overrides = SmallVec<[FeatureValue; 8]>;

/// One member of a [`MatrixCombiner`](super::MatrixCombiner).
#[derive(Debug, Clone)]
pub enum Producer {
    /// Write a concrete value; `Value::Null` removes the feature.
    Value {
        /// Written feature
        feature: Feature,
        /// Written value
        value: Value,
    },
    /// Write the value a pattern variable bound.
    Variable(Feature),
    /// Null every descendant of a node (`*Place`).
    NodeNull {
        /// The node feature
        node: Feature,
        /// Its non-node descendants
        descendants: Vec<Feature>,
    },
    /// Write back the descendant group a node variable bound.
    NodeVariable {
        /// The node feature
        node: Feature,
        /// Its non-node descendants
        descendants: Vec<Feature>,
    },
    /// Add `delta` to the current scalar value (negative to subtract).
    Add {
        /// Scalar feature
        feature: Feature,
        /// Amount added
        delta: i32,
    },
}

impl Producer {
    /// Write a concrete value, validated against the feature.
    pub fn value(feature: &Feature, value: Value) -> Result<Self> {
        feature.value(value)?;
        Ok(Producer::Value {
            feature: feature.clone(),
            value,
        })
    }

    /// Write the value bound to a variable.
    pub fn variable(feature: &Feature) -> Result<Self> {
        if feature.is_node() {
            return Err(FeatureError::NodeHasNoValue(feature.name().to_string()));
        }
        Ok(Producer::Variable(feature.clone()))
    }

    /// Null every descendant of `node`.
    pub fn node_null(node: &Feature) -> Result<Self> {
        if !node.is_node() {
            return Err(FeatureError::NotANode(node.name().to_string()));
        }
        Ok(Producer::NodeNull {
            descendants: node.descendants(),
            node: node.clone(),
        })
    }

    /// Write back a node variable's group.
    pub fn node_variable(node: &Feature) -> Result<Self> {
        if !node.is_node() {
            return Err(FeatureError::NotANode(node.name().to_string()));
        }
        Ok(Producer::NodeVariable {
            descendants: node.descendants(),
            node: node.clone(),
        })
    }

    /// Scalar increment.
    pub fn add(feature: &Feature, delta: i32) -> Result<Self> {
        if !feature.is_scalar() {
            return Err(FeatureError::NotScalar(feature.name().to_string()));
        }
        Ok(Producer::Add {
            feature: feature.clone(),
            delta,
        })
    }

    /// Scalar decrement.
    pub fn subtract(feature: &Feature, delta: i32) -> Result<Self> {
        let negated = delta.checked_neg().ok_or_else(|| FeatureError::StepOverflow {
            feature: feature.name().to_string(),
            delta,
        })?;
        Self::add(feature, negated)
    }

    /// Compute this producer's overrides against the segment's `current`
    /// matrix.
    ///
    /// On error nothing is produced; the caller skips this contribution.
    pub fn produce(
        &self,
        ctx: &RuleContext,
        current: &FeatureMatrix,
    ) -> std::result::Result<Overrides, RuleError> {
        let mut out = Overrides::new();
        match self {
            Producer::Value { feature, value } => {
                out.push(FeatureValue::new(feature.id(), *value));
            }
            Producer::Variable(feature) => match ctx.binding(feature.id()) {
                Some(Binding::Value(v)) => out.push(FeatureValue::new(feature.id(), *v)),
                _ => {
                    return Err(RuleError::UndefinedVariable {
                        feature: feature.name().to_string(),
                    })
                }
            },
            Producer::NodeNull { descendants, .. } => {
                out.extend(descendants.iter().map(Feature::null));
            }
            Producer::NodeVariable { node, .. } => match ctx.binding(node.id()) {
                Some(Binding::Group(group)) => out.extend(group.iter().copied()),
                _ => {
                    return Err(RuleError::UndefinedVariable {
                        feature: node.name().to_string(),
                    })
                }
            },
            Producer::Add { feature, delta } => {
                let Some(n) = current.value_of(feature.id()).as_scalar() else {
                    return Err(RuleError::InvalidScalarOperation {
                        feature: feature.name().to_string(),
                        operation: format!("{:+}", delta),
                    });
                };
                let next = n.checked_add(*delta).ok_or_else(|| RuleError::ScalarRange {
                    feature: feature.name().to_string(),
                    value: if *delta > 0 { i32::MAX } else { i32::MIN },
                })?;
                let value = feature.scalar(next).map_err(|_| RuleError::ScalarRange {
                    feature: feature.name().to_string(),
                    value: next,
                })?;
                out.push(value);
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Producer::Value { feature, value } => {
                write!(f, "{}", crate::feature::render(feature.name(), *value))
            }
            Producer::Variable(feature) => write!(f, "${}", feature.name()),
            Producer::NodeNull { node, .. } => write!(f, "*{}", node.name()),
            Producer::NodeVariable { node, .. } => write!(f, "${}", node.name()),
            Producer::Add { feature, delta } => write!(f, "{}={:+}", feature.name(), delta),
        }
    }
}
