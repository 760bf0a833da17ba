//! Sparse, immutable feature matrices.

use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use super::value::render;
use super::{FeatureId, FeatureSet, FeatureValue, Value};

/// The set of values describing one segment.
///
/// A matrix maps features to values and never stores a null entry: a feature
/// that is absent reads back as [`Value::Null`]. Matrices are immutable and
/// cheap to clone (the entries are shared); "changing" a segment means
/// replacing its matrix with a new one. [`FeatureMatrix::ptr_eq`] tells the
/// two cases apart.
///
/// Equality and hashing compare values, not identity.
///
/// # Examples
///
/// ```
/// use phonorule::feature::{FeatureMatrix, FeatureSet, Value};
///
/// let mut features = FeatureSet::new();
/// let voice = features.add_binary("voice").unwrap();
/// let nasal = features.add_binary("nasal").unwrap();
///
/// let m = FeatureMatrix::new([voice.plus().unwrap(), nasal.null()]);
/// assert_eq!(m.weight(), 1);
/// assert_eq!(m.value_of(voice.id()), Value::Plus);
/// assert_eq!(m.value_of(nasal.id()), Value::Null);
///
/// // Round trip through the non-null values
/// assert_eq!(FeatureMatrix::new(m.iter()), m);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FeatureMatrix {
    /// Non-null entries sorted by feature id, one per feature.
    values: Arc<[FeatureValue]>,
}

impl FeatureMatrix {
    /// Build a matrix from values.
    ///
    /// Null values are dropped. When a feature appears more than once, the
    /// last occurrence wins.
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = FeatureValue>,
    {
        let mut entries: SmallVec<[FeatureValue; 16]> = SmallVec::new();
        for v in values {
            match entries.binary_search_by_key(&v.feature(), FeatureValue::feature) {
                Ok(i) => entries[i] = v,
                Err(i) => entries.insert(i, v),
            }
        }
        entries.retain(|v| !v.is_null());
        Self {
            values: entries.into_vec().into(),
        }
    }

    /// The matrix with no values.
    pub fn empty() -> Self {
        Self {
            values: Arc::from(Vec::new()),
        }
    }

    /// The stored value for `feature`, if any.
    pub fn get(&self, feature: FeatureId) -> Option<FeatureValue> {
        self.values
            .binary_search_by_key(&feature, FeatureValue::feature)
            .ok()
            .map(|i| self.values[i])
    }

    /// The value of `feature`, [`Value::Null`] when absent.
    #[inline]
    pub fn value_of(&self, feature: FeatureId) -> Value {
        self.get(feature).map_or(Value::Null, |v| v.value())
    }

    /// Returns `true` if `feature` has a non-null value.
    #[inline]
    pub fn contains(&self, feature: FeatureId) -> bool {
        self.get(feature).is_some()
    }

    /// Number of non-null entries.
    #[inline]
    pub fn weight(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the matrix has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-null values in feature-id order.
    pub fn iter(&self) -> impl Iterator<Item = FeatureValue> + '_ {
        self.values.iter().copied()
    }

    /// One value per value-bearing feature of `features`, nulls included.
    pub fn iter_with_nulls<'a>(
        &'a self,
        features: &'a FeatureSet,
    ) -> impl Iterator<Item = FeatureValue> + 'a {
        features
            .iter()
            .filter(|f| !f.is_node())
            .map(move |f| self.get(f.id()).unwrap_or_else(|| f.null()))
    }

    /// Returns `true` if both matrices share the same storage.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.values, &b.values)
    }

    /// Renders the matrix with feature names, e.g. `[+voice height=2]`.
    pub fn describe(&self, features: &FeatureSet) -> String {
        let parts: Vec<String> = self
            .values
            .iter()
            .map(|v| match features.get_by_id(v.feature()) {
                Some(f) => render(f.name(), v.value()),
                None => format!("{}:{}", v.feature().index(), v.value()),
            })
            .collect();
        format!("[{}]", parts.join(" "))
    }
}

impl Default for FeatureMatrix {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for FeatureMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.values.iter().map(|v| (v.feature().index(), v.value())))
            .finish()
    }
}

impl FromIterator<FeatureValue> for FeatureMatrix {
    fn from_iter<I: IntoIterator<Item = FeatureValue>>(iter: I) -> Self {
        Self::new(iter)
    }
}
