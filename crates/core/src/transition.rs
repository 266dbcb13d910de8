//! Project status state machine.

use crate::error::CoreError;
use crate::status::ProjectStatus;

use ProjectStatus::*;

/// Statuses reachable in one step from `from`. `Archived` is terminal.
pub fn allowed_transitions(from: ProjectStatus) -> &'static [ProjectStatus] {
    match from {
        Pending => &[InProgress, Cancelled],
        InProgress => &[Review, Pending, Cancelled],
        Review => &[Completed, InProgress, Cancelled],
        Completed => &[Archived, InProgress],
        Archived => &[],
        Cancelled => &[Pending],
    }
}

pub fn can_transition(from: ProjectStatus, to: ProjectStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Reject any move that is not in the transition table, including
/// staying in the same status.
pub fn validate_transition(current: ProjectStatus, requested: ProjectStatus) -> Result<(), CoreError> {
    if can_transition(current, requested) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition { current, requested })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const TABLE: &[(ProjectStatus, ProjectStatus)] = &[
        (Pending, InProgress),
        (Pending, Cancelled),
        (InProgress, Review),
        (InProgress, Pending),
        (InProgress, Cancelled),
        (Review, Completed),
        (Review, InProgress),
        (Review, Cancelled),
        (Completed, Archived),
        (Completed, InProgress),
        (Cancelled, Pending),
    ];

    #[test]
    fn every_pair_follows_the_table() {
        for &from in ProjectStatus::ALL {
            for &to in ProjectStatus::ALL {
                let listed = TABLE.contains(&(from, to));
                let result = validate_transition(from, to);
                if listed {
                    assert!(result.is_ok(), "{from} -> {to} should be allowed");
                } else {
                    assert_matches!(
                        result,
                        Err(CoreError::InvalidTransition { current, requested })
                            if current == from && requested == to
                    );
                }
            }
        }
    }

    #[test]
    fn archived_is_terminal() {
        assert!(allowed_transitions(Archived).is_empty());
    }

    #[test]
    fn reopening_and_reactivation_are_allowed() {
        assert!(can_transition(Completed, InProgress));
        assert!(can_transition(Cancelled, Pending));
    }

    #[test]
    fn self_transition_is_rejected() {
        assert!(!can_transition(Review, Review));
    }
}
