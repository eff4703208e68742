//! Invoice approval workflow.
//!
//! The state machine itself is pure; persisting the transition and
//! queueing the customer notification are the repository's concern, so the
//! transition stays testable without a database and a delivery failure can
//! never block an approval.

use chrono::{DateTime, Utc};

use crate::invoice::error::InvoiceError;
use crate::invoice::types::InvoiceState;

/// A validated workflow transition with its audit timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceAction {
    /// A new invoice was submitted for review.
    Submit {
        /// State after the transition (`Pending`).
        new_state: InvoiceState,
        /// When the submission happened.
        submitted_at: DateTime<Utc>,
    },
    /// A pending invoice was approved.
    Approve {
        /// State after the transition (`Approved`).
        new_state: InvoiceState,
        /// When the approval happened.
        approved_at: DateTime<Utc>,
    },
}

impl InvoiceAction {
    /// The state the invoice moves to.
    #[must_use]
    pub const fn new_state(&self) -> InvoiceState {
        match self {
            Self::Submit { new_state, .. } | Self::Approve { new_state, .. } => *new_state,
        }
    }
}

/// Stateless service validating invoice workflow transitions.
pub struct InvoiceWorkflow;

impl InvoiceWorkflow {
    /// Submit a new invoice for review.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvalidTransition` unless the invoice is `New`.
    pub fn submit(current_state: InvoiceState) -> Result<InvoiceAction, InvoiceError> {
        match current_state {
            InvoiceState::New => Ok(InvoiceAction::Submit {
                new_state: InvoiceState::Pending,
                submitted_at: Utc::now(),
            }),
            _ => Err(InvoiceError::InvalidTransition {
                from: current_state,
                to: InvoiceState::Pending,
            }),
        }
    }

    /// Approve a pending invoice.
    ///
    /// Approval is one-way; approving anything but a `Pending` invoice is
    /// rejected, which also guarantees the customer notification is queued
    /// at most once per invoice.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvalidTransition` unless the invoice is `Pending`.
    pub fn approve(current_state: InvoiceState) -> Result<InvoiceAction, InvoiceError> {
        match current_state {
            InvoiceState::Pending => Ok(InvoiceAction::Approve {
                new_state: InvoiceState::Approved,
                approved_at: Utc::now(),
            }),
            _ => Err(InvoiceError::InvalidTransition {
                from: current_state,
                to: InvoiceState::Approved,
            }),
        }
    }

    /// Check if a state transition is valid.
    ///
    /// Valid transitions:
    /// - New -> Pending (submit)
    /// - Pending -> Approved (approve)
    #[must_use]
    pub fn is_valid_transition(from: InvoiceState, to: InvoiceState) -> bool {
        matches!(
            (from, to),
            (InvoiceState::New, InvoiceState::Pending)
                | (InvoiceState::Pending, InvoiceState::Approved)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_from_new() {
        let action = InvoiceWorkflow::submit(InvoiceState::New).unwrap();
        assert_eq!(action.new_state(), InvoiceState::Pending);
    }

    #[test]
    fn test_submit_from_pending_fails() {
        let result = InvoiceWorkflow::submit(InvoiceState::Pending);
        assert!(matches!(
            result,
            Err(InvoiceError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_approve_from_pending() {
        let action = InvoiceWorkflow::approve(InvoiceState::Pending).unwrap();
        assert_eq!(action.new_state(), InvoiceState::Approved);
    }

    #[test]
    fn test_approve_from_new_fails() {
        let result = InvoiceWorkflow::approve(InvoiceState::New);
        assert_eq!(
            result,
            Err(InvoiceError::InvalidTransition {
                from: InvoiceState::New,
                to: InvoiceState::Approved,
            })
        );
    }

    #[test]
    fn test_approve_twice_fails() {
        let action = InvoiceWorkflow::approve(InvoiceState::Pending).unwrap();
        let result = InvoiceWorkflow::approve(action.new_state());
        assert_eq!(
            result,
            Err(InvoiceError::InvalidTransition {
                from: InvoiceState::Approved,
                to: InvoiceState::Approved,
            })
        );
    }

    #[test]
    fn test_is_valid_transition() {
        assert!(InvoiceWorkflow::is_valid_transition(
            InvoiceState::New,
            InvoiceState::Pending
        ));
        assert!(InvoiceWorkflow::is_valid_transition(
            InvoiceState::Pending,
            InvoiceState::Approved
        ));

        assert!(!InvoiceWorkflow::is_valid_transition(
            InvoiceState::New,
            InvoiceState::Approved
        ));
        assert!(!InvoiceWorkflow::is_valid_transition(
            InvoiceState::Approved,
            InvoiceState::Pending
        ));
        assert!(!InvoiceWorkflow::is_valid_transition(
            InvoiceState::Approved,
            InvoiceState::New
        ));
    }
}
