//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::feature::FeatureError;
use crate::rule::RuleBuildError;
use crate::segment::SegmentError;
use crate::syllable::SyllableError;

/// Any error the engine can raise.
///
/// Recoverable value anomalies ([`RuleError`](crate::rule::RuleError)) are
/// not here: they go to the [`RuleObserver`](crate::rule::RuleObserver).
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid feature declaration or value.
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Contract violation or structural failure on the word.
    #[error(transparent)]
    Segment(#[from] SegmentError),

    /// A rule could not be assembled.
    #[error(transparent)]
    RuleBuild(#[from] RuleBuildError),

    /// Syllabification failed.
    #[error(transparent)]
    Syllable(#[from] SyllableError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
