//! Per-URL lifecycle state. `Failed` is reachable from every other state;
//! every other transition moves strictly forward.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlState {
    Discovered,
    Scheduled,
    Fetching,
    Extracted,
    Reconstructed,
    Chunked,
    Emitted,
    Failed,
}

impl UrlState {
    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: UrlState) -> bool {
        if next == UrlState::Failed {
            return self != UrlState::Emitted && self != UrlState::Failed;
        }
        matches!(
            (self, next),
            (UrlState::Discovered, UrlState::Scheduled)
                | (UrlState::Scheduled, UrlState::Fetching)
                | (UrlState::Fetching, UrlState::Extracted)
                | (UrlState::Extracted, UrlState::Reconstructed)
                | (UrlState::Extracted, UrlState::Chunked)
                | (UrlState::Reconstructed, UrlState::Chunked)
                | (UrlState::Chunked, UrlState::Emitted)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_reachable_from_any_non_terminal_state() {
        for state in [
            UrlState::Discovered,
            UrlState::Scheduled,
            UrlState::Fetching,
            UrlState::Extracted,
            UrlState::Reconstructed,
            UrlState::Chunked,
        ] {
            assert!(state.can_transition_to(UrlState::Failed));
        }
        assert!(!UrlState::Emitted.can_transition_to(UrlState::Failed));
        assert!(!UrlState::Failed.can_transition_to(UrlState::Failed));
    }

    #[test]
    fn extract_may_skip_reconstruct() {
        assert!(UrlState::Extracted.can_transition_to(UrlState::Chunked));
    }

    #[test]
    fn no_backward_transitions() {
        assert!(!UrlState::Chunked.can_transition_to(UrlState::Fetching));
    }
}
