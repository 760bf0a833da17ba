//! Diagnostic events raised while rules run.
//!
//! The engine performs no I/O. Callers pass a [`RuleObserver`] into every
//! application and decide what to do with the events: drop them
//! ([`NoopObserver`]), keep them ([`RecordingObserver`]) or forward them to
//! `tracing` ([`TracingObserver`]).

use std::sync::Arc;

use super::RuleError;
use crate::segment::SegmentId;

/// Something that happened while a rule ran.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleEvent {
    /// A rule started a pass over the word.
    Entered {
        /// Rule name
        rule: Arc<str>,
    },
    /// A rule matched and rewrote one window.
    Applied {
        /// Rule name
        rule: Arc<str>,
        /// The window's anchor
        anchor: SegmentId,
    },
    /// A rule finished its pass.
    Exited {
        /// Rule name
        rule: Arc<str>,
        /// Number of windows rewritten during the pass
        applications: usize,
    },
    /// A value contribution failed and was skipped.
    Anomaly {
        /// Rule name
        rule: Arc<str>,
        /// What went wrong
        error: RuleError,
    },
    /// Persistent rules were still changing the word when the pass cap was hit.
    PersistenceLimit {
        /// Passes run before giving up
        passes: usize,
    },
}

impl RuleEvent {
    /// The rule the event belongs to, if any.
    pub fn rule(&self) -> Option<&str> {
        match self {
            RuleEvent::Entered { rule }
            | RuleEvent::Applied { rule, .. }
            | RuleEvent::Exited { rule, .. }
            | RuleEvent::Anomaly { rule, .. } => Some(&**rule),
            RuleEvent::PersistenceLimit { .. } => None,
        }
    }
}

/// Receives [`RuleEvent`]s.
pub trait RuleObserver {
    /// Handle one event.
    fn notify(&mut self, event: &RuleEvent);
}

impl<F> RuleObserver for F
where
    F: FnMut(&RuleEvent),
{
    fn notify(&mut self, event: &RuleEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RuleObserver for NoopObserver {
    #[inline]
    fn notify(&mut self, _event: &RuleEvent) {}
}

/// Keeps every event, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Vec<RuleEvent>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events seen so far.
    pub fn events(&self) -> &[RuleEvent] {
        &self.events
    }

    /// Only the anomalies.
    pub fn anomalies(&self) -> Vec<&RuleError> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RuleEvent::Anomaly { error, .. } => Some(error),
                _ => None,
            })
            .collect()
    }

    /// How often `rule` applied.
    pub fn applications(&self, rule: &str) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RuleEvent::Applied { rule: r, .. } if &**r == rule))
            .count()
    }

    /// Drop recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl RuleObserver for RecordingObserver {
    fn notify(&mut self, event: &RuleEvent) {
        self.events.push(event.clone());
    }
}

/// Forwards events to `tracing`.
///
/// Pass entry and exit go to `trace`, applications to `debug`, anomalies and
/// the persistence cap to `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RuleObserver for TracingObserver {
    fn notify(&mut self, event: &RuleEvent) {
        match event {
            RuleEvent::Entered { rule } => tracing::trace!(rule = %rule, "entering rule"),
            RuleEvent::Applied { rule, anchor } => {
                tracing::debug!(rule = %rule, anchor = %anchor, "rule applied")
            }
            RuleEvent::Exited { rule, applications } => {
                tracing::trace!(rule = %rule, applications, "exiting rule")
            }
            RuleEvent::Anomaly { rule, error } => {
                tracing::warn!(rule = %rule, error = %error, "value skipped")
            }
            RuleEvent::PersistenceLimit { passes } => {
                tracing::warn!(passes, "persistent rules did not converge")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer() {
        let mut word = crate::word::Word::new([crate::feature::FeatureMatrix::empty()]);
        let anchor = word.push_back(crate::feature::FeatureMatrix::empty());
        let mut observer = RecordingObserver::new();
        let rule: Arc<str> = Arc::from("devoicing");
        observer.notify(&RuleEvent::Entered { rule: rule.clone() });
        observer.notify(&RuleEvent::Applied {
            rule: rule.clone(),
            anchor,
        });
        observer.notify(&RuleEvent::Anomaly {
            rule: rule.clone(),
            error: RuleError::UndefinedVariable {
                feature: "voice".to_string(),
            },
        });
        observer.notify(&RuleEvent::Exited {
            rule,
            applications: 1,
        });

        assert_eq!(observer.events().len(), 4);
        assert_eq!(observer.applications("devoicing"), 1);
        assert_eq!(observer.applications("other"), 0);
        assert_eq!(observer.anomalies().len(), 1);
        assert_eq!(observer.events()[0].rule(), Some("devoicing"));

        observer.clear();
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_closure_observer() {
        let mut count = 0;
        {
            let mut observer = |_: &RuleEvent| count += 1;
            observer.notify(&RuleEvent::PersistenceLimit { passes: 3 });
        }
        assert_eq!(count, 1);
    }
}
