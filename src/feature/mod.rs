//! Features, feature values and feature matrices.
//!
//! This module holds the categorical state model every other part of the
//! crate works on:
//!
//! - [`Feature`] - a named dimension (unary, binary, scalar or node)
//! - [`FeatureValue`] - one concrete value of a feature
//! - [`FeatureMatrix`] - the sparse, immutable set of values describing a segment
//! - [`FeatureSet`] - the registry that creates features and resolves names
//!
//! Features are created once through a [`FeatureSet`] and live as long as any
//! handle to them does. A [`Feature`] handle is reference counted, so patterns
//! can hold on to the features they mention without borrowing the registry.
//!
//! # Examples
//!
//! ```
//! use phonorule::feature::{FeatureMatrix, FeatureSet};
//!
//! let mut features = FeatureSet::new();
//! let voice = features.add_binary("voice").unwrap();
//! let height = features.add_scalar("height", Some(0), Some(3)).unwrap();
//!
//! let m = FeatureMatrix::new([voice.plus().unwrap(), height.scalar(2).unwrap()]);
//! assert_eq!(m.weight(), 2);
//! assert_eq!(m.describe(&features), "[+voice height=2]");
//! ```

pub mod error;
mod matrix;
mod value;

pub use error::{FeatureError, Result};
pub use matrix::FeatureMatrix;
pub use value::{FeatureValue, Value};
pub(crate) use value::render;

use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Dense identifier of a feature within its [`FeatureSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(u32);

impl FeatureId {
    /// Returns the raw index.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureId({})", self.0)
    }
}

/// The kind of a feature, which decides the values it admits.
#[derive(Debug, Clone)]
pub enum FeatureKind {
    /// Present or absent.
    Unary,
    /// `+`, `-` or absent.
    Binary,
    /// A number, optionally bounded on either side.
    Scalar {
        /// Inclusive lower bound
        min: Option<i32>,
        /// Inclusive upper bound
        max: Option<i32>,
    },
    /// A grouping of other features. Holds no value itself.
    Node {
        /// Direct children, in declaration order
        children: Vec<Feature>,
    },
}

impl FeatureKind {
    fn label(&self) -> &'static str {
        match self {
            FeatureKind::Unary => "unary",
            FeatureKind::Binary => "binary",
            FeatureKind::Scalar { .. } => "scalar",
            FeatureKind::Node { .. } => "node",
        }
    }
}

#[derive(Debug)]
struct FeatureDef {
    id: FeatureId,
    name: String,
    kind: FeatureKind,
}

/// A named dimension of description.
///
/// Cloning a `Feature` clones a handle; equality and hashing use the id.
#[derive(Debug, Clone)]
pub struct Feature(Arc<FeatureDef>);

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Feature {}

impl Hash for Feature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl Feature {
    /// The feature's id.
    #[inline]
    pub fn id(&self) -> FeatureId {
        self.0.id
    }

    /// The feature's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The feature's kind.
    #[inline]
    pub fn kind(&self) -> &FeatureKind {
        &self.0.kind
    }

    /// Returns `true` for node features.
    #[inline]
    pub fn is_node(&self) -> bool {
        matches!(self.0.kind, FeatureKind::Node { .. })
    }

    /// Returns `true` for scalar features.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        matches!(self.0.kind, FeatureKind::Scalar { .. })
    }

    /// Declared scalar range, `(None, None)` for unbounded or non-scalar features.
    pub fn range(&self) -> (Option<i32>, Option<i32>) {
        match self.0.kind {
            FeatureKind::Scalar { min, max } => (min, max),
            _ => (None, None),
        }
    }

    /// The canonical null value of this feature.
    #[inline]
    pub fn null(&self) -> FeatureValue {
        FeatureValue::new(self.0.id, Value::Null)
    }

    /// Builds a value of this feature after checking it against the kind.
    ///
    /// `Value::Null` is always accepted for value-bearing features.
    pub fn value(&self, value: Value) -> Result<FeatureValue> {
        let accepted = match (&self.0.kind, value) {
            (FeatureKind::Node { .. }, _) => {
                return Err(FeatureError::NodeHasNoValue(self.0.name.clone()))
            }
            (_, Value::Null) => true,
            (FeatureKind::Unary, Value::Present) => true,
            (FeatureKind::Binary, Value::Plus | Value::Minus) => true,
            (FeatureKind::Scalar { min, max }, Value::Scalar(n)) => {
                if min.map_or(false, |lo| n < lo) || max.map_or(false, |hi| n > hi) {
                    return Err(FeatureError::OutOfRange {
                        feature: self.0.name.clone(),
                        value: n,
                    });
                }
                true
            }
            _ => false,
        };

        if accepted {
            Ok(FeatureValue::new(self.0.id, value))
        } else {
            Err(FeatureError::InvalidValue {
                feature: self.0.name.clone(),
                kind: self.0.kind.label(),
                value: value.to_string(),
            })
        }
    }

    /// The value of a unary feature.
    pub fn present(&self) -> Result<FeatureValue> {
        self.value(Value::Present)
    }

    /// `+` of a binary feature.
    pub fn plus(&self) -> Result<FeatureValue> {
        self.value(Value::Plus)
    }

    /// `-` of a binary feature.
    pub fn minus(&self) -> Result<FeatureValue> {
        self.value(Value::Minus)
    }

    /// A number of a scalar feature.
    pub fn scalar(&self, n: i32) -> Result<FeatureValue> {
        self.value(Value::Scalar(n))
    }

    /// Direct children of a node feature; empty for other kinds.
    pub fn children(&self) -> &[Feature] {
        match &self.0.kind {
            FeatureKind::Node { children } => children,
            _ => &[],
        }
    }

    /// All non-node features reachable below this node, depth first.
    ///
    /// A non-node feature has no descendants.
    pub fn descendants(&self) -> Vec<Feature> {
        let mut out = Vec::new();
        let mut stack: Vec<&Feature> = self.children().iter().rev().collect();
        while let Some(f) = stack.pop() {
            if f.is_node() {
                stack.extend(f.children().iter().rev());
            } else if !out.contains(f) {
                out.push(f.clone());
            }
        }
        out
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

/// Registry of features.
///
/// Feature names are unique within a set. Ids are dense and assigned in
/// creation order.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    features: Vec<Feature>,
    by_name: FxHashMap<String, FeatureId>,
}

impl FeatureSet {
    /// Create an empty feature set.
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, name: &str, kind: FeatureKind) -> Result<Feature> {
        if self.by_name.contains_key(name) {
            return Err(FeatureError::DuplicateFeature(name.to_string()));
        }
        let id = FeatureId(self.features.len() as u32);
        let feature = Feature(Arc::new(FeatureDef {
            id,
            name: name.to_string(),
            kind,
        }));
        self.by_name.insert(name.to_string(), id);
        self.features.push(feature.clone());
        Ok(feature)
    }

    /// Declare a unary feature.
    pub fn add_unary(&mut self, name: &str) -> Result<Feature> {
        self.add(name, FeatureKind::Unary)
    }

    /// Declare a binary feature.
    pub fn add_binary(&mut self, name: &str) -> Result<Feature> {
        self.add(name, FeatureKind::Binary)
    }

    /// Declare a scalar feature with optional inclusive bounds.
    pub fn add_scalar(&mut self, name: &str, min: Option<i32>, max: Option<i32>) -> Result<Feature> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(FeatureError::InvalidRange {
                    feature: name.to_string(),
                    min: lo,
                    max: hi,
                });
            }
        }
        self.add(name, FeatureKind::Scalar { min, max })
    }

    /// Declare a node feature grouping `children`.
    ///
    /// Children must already belong to this set.
    pub fn add_node(&mut self, name: &str, children: &[Feature]) -> Result<Feature> {
        for child in children {
            if self.get_by_id(child.id()) != Some(child) {
                return Err(FeatureError::UnknownFeature(child.name().to_string()));
            }
        }
        self.add(
            name,
            FeatureKind::Node {
                children: children.to_vec(),
            },
        )
    }

    /// Look a feature up by name.
    pub fn get(&self, name: &str) -> Option<&Feature> {
        self.by_name.get(name).map(|id| &self.features[id.index()])
    }

    /// Look a feature up by name, failing with [`FeatureError::UnknownFeature`].
    pub fn require(&self, name: &str) -> Result<&Feature> {
        self.get(name)
            .ok_or_else(|| FeatureError::UnknownFeature(name.to_string()))
    }

    /// Look a feature up by id.
    pub fn get_by_id(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(id.index())
    }

    /// All features in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if no features are declared.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The matrix naming every value-bearing feature as null.
    ///
    /// Useful as the source of a combiner that resets a segment wholesale.
    pub fn null_values(&self) -> Vec<FeatureValue> {
        self.features
            .iter()
            .filter(|f| !f.is_node())
            .map(Feature::null)
            .collect()
    }
}
