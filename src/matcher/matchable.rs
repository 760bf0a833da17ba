//! Single-feature tests against a matrix.

use smallvec::SmallVec;
use std::fmt;

use super::context::{Binding, RuleContext};
use crate::feature::{Feature, FeatureError, FeatureMatrix, FeatureValue, Result, Value};

/// Ordering tests on scalar features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `<>`
    Ne,
}

impl Comparison {
    /// Applies the comparison. An absent value (`None`) fails every
    /// comparison except `<>`, which it satisfies.
    pub fn test(self, value: Option<i32>, operand: i32) -> bool {
        match (self, value) {
            (Comparison::Ne, None) => true,
            (_, None) => false,
            (Comparison::Lt, Some(n)) => n < operand,
            (Comparison::Gt, Some(n)) => n > operand,
            (Comparison::Le, Some(n)) => n <= operand,
            (Comparison::Ge, Some(n)) => n >= operand,
            (Comparison::Ne, Some(n)) => n != operand,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Gt => ">",
            Comparison::Le => "<=",
            Comparison::Ge => ">=",
            Comparison::Ne => "<>",
        }
    }
}

/// One member of a [`MatrixMatcher`](super::MatrixMatcher) conjunction.
#[derive(Debug, Clone)]
pub enum Matchable {
    /// The matrix holds exactly this value; `Value::Null` means "absent".
    Value {
        /// Tested feature
        feature: Feature,
        /// Expected value
        value: Value,
    },
    /// Binds on first use, then requires agreement with the binding.
    Variable(Feature),
    /// At least one descendant of the node is non-null.
    NodeExists {
        /// The node feature
        node: Feature,
        /// Its non-node descendants
        descendants: Vec<Feature>,
    },
    /// Every descendant of the node is null.
    NodeNull {
        /// The node feature
        node: Feature,
        /// Its non-node descendants
        descendants: Vec<Feature>,
    },
    /// Binds the whole descendant group on first use, then requires the
    /// group to be equal.
    NodeVariable {
        /// The node feature
        node: Feature,
        /// Its non-node descendants
        descendants: Vec<Feature>,
    },
    /// Scalar ordering test.
    Compare {
        /// Tested scalar feature
        feature: Feature,
        /// The comparison
        op: Comparison,
        /// Right-hand side
        operand: i32,
    },
}

fn require_node(node: &Feature) -> Result<Vec<Feature>> {
    if node.is_node() {
        Ok(node.descendants())
    } else {
        Err(FeatureError::NotANode(node.name().to_string()))
    }
}

pub(crate) fn snapshot(descendants: &[Feature], m: &FeatureMatrix) -> SmallVec<[FeatureValue; 8]> {
    descendants
        .iter()
        .map(|f| m.get(f.id()).unwrap_or_else(|| f.null()))
        .collect()
}

impl Matchable {
    /// Test for a concrete value, validated against the feature.
    pub fn value(feature: &Feature, value: Value) -> Result<Self> {
        feature.value(value)?;
        Ok(Matchable::Value {
            feature: feature.clone(),
            value,
        })
    }

    /// Test for the value held by `value`.
    pub fn of(features: &crate::feature::FeatureSet, value: FeatureValue) -> Result<Self> {
        let feature = features
            .get_by_id(value.feature())
            .ok_or_else(|| FeatureError::UnknownFeature(value.feature().to_string()))?;
        Ok(Matchable::Value {
            feature: feature.clone(),
            value: value.value(),
        })
    }

    /// Pattern variable over a value-bearing feature.
    pub fn variable(feature: &Feature) -> Result<Self> {
        if feature.is_node() {
            return Err(FeatureError::NodeHasNoValue(feature.name().to_string()));
        }
        Ok(Matchable::Variable(feature.clone()))
    }

    /// Node-exists test.
    pub fn node_exists(node: &Feature) -> Result<Self> {
        Ok(Matchable::NodeExists {
            descendants: require_node(node)?,
            node: node.clone(),
        })
    }

    /// Node-null test.
    pub fn node_null(node: &Feature) -> Result<Self> {
        Ok(Matchable::NodeNull {
            descendants: require_node(node)?,
            node: node.clone(),
        })
    }

    /// Node variable.
    pub fn node_variable(node: &Feature) -> Result<Self> {
        Ok(Matchable::NodeVariable {
            descendants: require_node(node)?,
            node: node.clone(),
        })
    }

    /// Scalar comparison.
    pub fn compare(feature: &Feature, op: Comparison, operand: i32) -> Result<Self> {
        if !feature.is_scalar() {
            return Err(FeatureError::NotScalar(feature.name().to_string()));
        }
        Ok(Matchable::Compare {
            feature: feature.clone(),
            op,
            operand,
        })
    }

    /// Test `m`, binding variables in `ctx` on first use.
    pub fn matches(&self, ctx: &mut RuleContext, m: &FeatureMatrix) -> bool {
        match self {
            Matchable::Value { feature, value } => m.value_of(feature.id()) == *value,
            Matchable::Variable(feature) => {
                let actual = m.value_of(feature.id());
                match ctx.binding(feature.id()) {
                    Some(Binding::Value(bound)) => *bound == actual,
                    Some(Binding::Group(_)) => false,
                    None => {
                        ctx.bind(feature.id(), Binding::Value(actual));
                        true
                    }
                }
            }
            Matchable::NodeExists { descendants, .. } => {
                descendants.iter().any(|f| m.contains(f.id()))
            }
            Matchable::NodeNull { descendants, .. } => {
                descendants.iter().all(|f| !m.contains(f.id()))
            }
            Matchable::NodeVariable { node, descendants } => {
                let group = snapshot(descendants, m);
                match ctx.binding(node.id()) {
                    Some(Binding::Group(bound)) => *bound == group,
                    Some(Binding::Value(_)) => false,
                    None => {
                        ctx.bind(node.id(), Binding::Group(group));
                        true
                    }
                }
            }
            Matchable::Compare { feature, op, operand } => {
                op.test(m.value_of(feature.id()).as_scalar(), *operand)
            }
        }
    }
}

impl fmt::Display for Matchable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matchable::Value { feature, value } => {
                write!(f, "{}", crate::feature::render(feature.name(), *value))
            }
            Matchable::Variable(feature) => write!(f, "${}", feature.name()),
            Matchable::NodeExists { node, .. } => write!(f, "{}", node.name()),
            Matchable::NodeNull { node, .. } => write!(f, "*{}", node.name()),
            Matchable::NodeVariable { node, .. } => write!(f, "${}", node.name()),
            Matchable::Compare { feature, op, operand } => {
                write!(f, "{}{}{}", feature.name(), op.symbol(), operand)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureSet;

    #[test]
    fn test_comparison_with_absent_value() {
        assert!(!Comparison::Lt.test(None, 3));
        assert!(!Comparison::Gt.test(None, 3));
        assert!(!Comparison::Le.test(None, 3));
        assert!(!Comparison::Ge.test(None, 3));
        assert!(Comparison::Ne.test(None, 3));
        assert!(Comparison::Le.test(Some(3), 3));
        assert!(!Comparison::Ne.test(Some(3), 3));
    }

    #[test]
    fn test_variable_binds_then_agrees() {
        let mut set = FeatureSet::new();
        let voice = set.add_binary("voice").unwrap();
        let var = Matchable::variable(&voice).unwrap();
        let voiced = FeatureMatrix::new([voice.plus().unwrap()]);
        let voiceless = FeatureMatrix::new([voice.minus().unwrap()]);

        let mut ctx = RuleContext::new();
        assert!(var.matches(&mut ctx, &voiced));
        assert!(var.matches(&mut ctx, &voiced));
        assert!(!var.matches(&mut ctx, &voiceless));
    }

    #[test]
    fn test_node_tests() {
        let mut set = FeatureSet::new();
        let labial = set.add_unary("labial").unwrap();
        let coronal = set.add_unary("coronal").unwrap();
        let place = set.add_node("Place", &[labial.clone(), coronal.clone()]).unwrap();

        let exists = Matchable::node_exists(&place).unwrap();
        let null = Matchable::node_null(&place).unwrap();
        let var = Matchable::node_variable(&place).unwrap();

        let lab = FeatureMatrix::new([labial.present().unwrap()]);
        let cor = FeatureMatrix::new([coronal.present().unwrap()]);
        let none = FeatureMatrix::empty();

        let mut ctx = RuleContext::new();
        assert!(exists.matches(&mut ctx, &lab));
        assert!(!exists.matches(&mut ctx, &none));
        assert!(null.matches(&mut ctx, &none));
        assert!(!null.matches(&mut ctx, &cor));

        assert!(var.matches(&mut ctx, &lab));
        assert!(var.matches(&mut ctx, &lab));
        assert!(!var.matches(&mut ctx, &cor));

        assert!(Matchable::node_exists(&labial).is_err());
    }

    #[test]
    fn test_display() {
        let mut set = FeatureSet::new();
        let voice = set.add_binary("voice").unwrap();
        let height = set.add_scalar("height", None, None).unwrap();
        assert_eq!(Matchable::value(&voice, Value::Minus).unwrap().to_string(), "-voice");
        assert_eq!(Matchable::variable(&voice).unwrap().to_string(), "$voice");
        assert_eq!(
            Matchable::compare(&height, Comparison::Ge, 2).unwrap().to_string(),
            "height>=2"
        );
        assert!(Matchable::compare(&voice, Comparison::Lt, 1).is_err());
    }
}
