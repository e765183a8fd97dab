//! Generation event types

use serde::{Deserialize, Serialize};

use crate::phase::Phase;
use crate::record::RecordId;

/// Events emitted while a conversion runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationEvent {
    /// A conversion started
    Started { source_url: String },

    /// A phase was entered
    PhaseStarted {
        phase: Phase,
        /// Zero-based position of the phase
        index: usize,
        total: usize,
    },

    /// A phase's hold and its collaborator call both finished
    PhaseFinished { phase: Phase },

    /// The record is built; it is committed to history right after this
    Completed { record_id: RecordId },

    /// A collaborator failed
    Failed { message: String },

    /// The run was aborted
    Cancelled,

    /// Rewording of the active record started
    RegenerateStarted { record_id: RecordId },

    /// Rewording finished
    RegenerateFinished { record_id: RecordId, changed: bool },
}

impl GenerationEvent {
    /// Check if this is the last event of a run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationEvent::Completed { .. }
                | GenerationEvent::Failed { .. }
                | GenerationEvent::Cancelled
                | GenerationEvent::RegenerateFinished { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(GenerationEvent::Cancelled.is_terminal());
        assert!(GenerationEvent::Failed { message: "x".into() }.is_terminal());
        assert!(
            !GenerationEvent::PhaseStarted {
                phase: Phase::ReadingContent,
                index: 0,
                total: 3
            }
            .is_terminal()
        );
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let json = serde_json::to_value(GenerationEvent::PhaseFinished {
            phase: Phase::OrganizingNarrative,
        })
        .unwrap();
        assert_eq!(json["type"], "phase_finished");
        assert_eq!(json["phase"], "organizing_narrative");
    }
}
