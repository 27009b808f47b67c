use crate::reader::types::{SliceDescriptor, UnitId};
use std::sync::Arc;

/// Outcome of one finished unit, as reported to progress callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    /// The slice was drained; carries the document count.
    Succeeded { documents: usize },
    /// The unit failed; carries the rendered error.
    Failed { error: String },
}

/// Emitted every time a unit finishes, in completion order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub unit: UnitId,
    pub slice: SliceDescriptor,
    pub outcome: UnitOutcome,
    /// Units finished so far, including this one.
    pub completed: usize,
    pub total: usize,
}

impl ProgressEvent {
    /// Fraction of units finished, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Type alias for a thread-safe progress callback.
pub type ProgressFn = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;
