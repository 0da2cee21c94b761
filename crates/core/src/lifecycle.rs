//! Participant and booking lifecycle state machines.
//!
//! Three independent status columns drive the registration workflow:
//!
//! - payment: `pending -> proof_submitted -> completed` (rejection returns
//!   the record to `pending`);
//! - accreditation: `pending -> completed | declined`, only once the
//!   payment is `completed`;
//! - booking: `pending -> confirmed -> cancelled`.
//!
//! Handlers call `apply` to compute the next status and surface a
//! [`CoreError::Conflict`] when the transition is not allowed. The
//! repositories repeat the guard in their `WHERE` clauses so concurrent
//! requests cannot race past it.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status string constants (match CHECK constraints in the migrations)
// ---------------------------------------------------------------------------

pub const PAYMENT_PENDING: &str = "pending";
pub const PAYMENT_PROOF_SUBMITTED: &str = "proof_submitted";
pub const PAYMENT_COMPLETED: &str = "completed";

pub const ACCREDITATION_PENDING: &str = "pending";
pub const ACCREDITATION_COMPLETED: &str = "completed";
pub const ACCREDITATION_DECLINED: &str = "declined";

pub const BOOKING_PENDING: &str = "pending";
pub const BOOKING_CONFIRMED: &str = "confirmed";
pub const BOOKING_CANCELLED: &str = "cancelled";

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

/// Payment status of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    ProofSubmitted,
    Completed,
}

/// Actions that move a registration's payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentAction {
    /// Participant uploads (or replaces) a bank-transfer proof.
    SubmitProof,
    /// Admin confirms the money arrived.
    Approve,
    /// Admin rejects the submitted proof.
    Reject,
}

impl PaymentStatus {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => PAYMENT_PENDING,
            Self::ProofSubmitted => PAYMENT_PROOF_SUBMITTED,
            Self::Completed => PAYMENT_COMPLETED,
        }
    }

    /// Parse from the database string representation.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            PAYMENT_PENDING => Ok(Self::Pending),
            PAYMENT_PROOF_SUBMITTED => Ok(Self::ProofSubmitted),
            PAYMENT_COMPLETED => Ok(Self::Completed),
            other => Err(CoreError::Validation(format!(
                "Unknown payment status: '{other}'"
            ))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Compute the status that results from applying `action`.
    pub fn apply(self, action: PaymentAction) -> Result<Self, CoreError> {
        use PaymentAction::*;
        use PaymentStatus::*;

        match (self, action) {
            (Pending | ProofSubmitted, SubmitProof) => Ok(ProofSubmitted),
            (Pending | ProofSubmitted, Approve) => Ok(Completed),
            (ProofSubmitted, Reject) => Ok(Pending),
            (Pending, Reject) => Err(CoreError::Conflict(
                "No payment proof has been submitted".into(),
            )),
            (Completed, _) => Err(CoreError::Conflict("Payment is already completed".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// Accreditation
// ---------------------------------------------------------------------------

/// On-site accreditation (check-in) status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccreditationStatus {
    Pending,
    Completed,
    Declined,
}

/// Actions a validator can take on accreditation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccreditationAction {
    Accredit,
    Decline,
}

impl AccreditationStatus {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => ACCREDITATION_PENDING,
            Self::Completed => ACCREDITATION_COMPLETED,
            Self::Declined => ACCREDITATION_DECLINED,
        }
    }

    /// Parse from the database string representation.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            ACCREDITATION_PENDING => Ok(Self::Pending),
            ACCREDITATION_COMPLETED => Ok(Self::Completed),
            ACCREDITATION_DECLINED => Ok(Self::Declined),
            other => Err(CoreError::Validation(format!(
                "Unknown accreditation status: '{other}'"
            ))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Compute the status that results from a validator action.
    ///
    /// Leaving `pending` requires the payment to be `completed`.
    pub fn apply(
        self,
        action: AccreditationAction,
        payment: PaymentStatus,
    ) -> Result<Self, CoreError> {
        match self {
            Self::Completed => {
                return Err(CoreError::Conflict(
                    "Participant is already accredited".into(),
                ))
            }
            Self::Declined => {
                return Err(CoreError::Conflict(
                    "Accreditation was declined; an admin override is required".into(),
                ))
            }
            Self::Pending => {}
        }

        ensure_payment_completed(payment)?;

        Ok(match action {
            AccreditationAction::Accredit => Self::Completed,
            AccreditationAction::Decline => Self::Declined,
        })
    }

    /// Admin manual override to an arbitrary target status.
    ///
    /// Resetting to `pending` is always allowed; any other target still
    /// requires a completed payment.
    pub fn override_to(self, target: Self, payment: PaymentStatus) -> Result<Self, CoreError> {
        if target != Self::Pending {
            ensure_payment_completed(payment)?;
        }
        Ok(target)
    }
}

fn ensure_payment_completed(payment: PaymentStatus) -> Result<(), CoreError> {
    if payment != PaymentStatus::Completed {
        return Err(CoreError::Conflict(format!(
            "Payment is not completed (current status: {})",
            payment.as_str()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

/// Hotel booking (accommodation) status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Confirm,
    Cancel,
}

impl BookingStatus {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => BOOKING_PENDING,
            Self::Confirmed => BOOKING_CONFIRMED,
            Self::Cancelled => BOOKING_CANCELLED,
        }
    }

    /// Parse from the database string representation.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            BOOKING_PENDING => Ok(Self::Pending),
            BOOKING_CONFIRMED => Ok(Self::Confirmed),
            BOOKING_CANCELLED => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown booking status: '{other}'"
            ))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Compute the status that results from applying `action`.
    pub fn apply(self, action: BookingAction) -> Result<Self, CoreError> {
        match (self, action) {
            (Self::Pending, BookingAction::Confirm) => Ok(Self::Confirmed),
            (Self::Confirmed, BookingAction::Confirm) => {
                Err(CoreError::Conflict("Booking is already confirmed".into()))
            }
            (Self::Pending | Self::Confirmed, BookingAction::Cancel) => Ok(Self::Cancelled),
            (Self::Cancelled, _) => Err(CoreError::Conflict("Booking is cancelled".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // -- payment --

    #[test]
    fn payment_happy_path() {
        let s = PaymentStatus::Pending;
        let s = s.apply(PaymentAction::SubmitProof).unwrap();
        assert_eq!(s, PaymentStatus::ProofSubmitted);
        let s = s.apply(PaymentAction::Approve).unwrap();
        assert_eq!(s, PaymentStatus::Completed);
        assert!(s.is_terminal());
    }

    #[test]
    fn payment_rejection_returns_to_pending() {
        let s = PaymentStatus::ProofSubmitted
            .apply(PaymentAction::Reject)
            .unwrap();
        assert_eq!(s, PaymentStatus::Pending);
    }

    #[test]
    fn payment_proof_can_be_replaced() {
        let s = PaymentStatus::ProofSubmitted
            .apply(PaymentAction::SubmitProof)
            .unwrap();
        assert_eq!(s, PaymentStatus::ProofSubmitted);
    }

    #[test]
    fn payment_admin_can_approve_without_proof() {
        let s = PaymentStatus::Pending.apply(PaymentAction::Approve).unwrap();
        assert_eq!(s, PaymentStatus::Completed);
    }

    #[test]
    fn payment_reject_without_proof_conflicts() {
        assert_matches!(
            PaymentStatus::Pending.apply(PaymentAction::Reject),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn completed_payment_is_frozen() {
        for action in [
            PaymentAction::SubmitProof,
            PaymentAction::Approve,
            PaymentAction::Reject,
        ] {
            assert_matches!(
                PaymentStatus::Completed.apply(action),
                Err(CoreError::Conflict(_))
            );
        }
    }

    #[test]
    fn payment_status_parse_round_trips_known_values() {
        for s in [PAYMENT_PENDING, PAYMENT_PROOF_SUBMITTED, PAYMENT_COMPLETED] {
            assert_eq!(PaymentStatus::parse(s).unwrap().as_str(), s);
        }
        assert_matches!(PaymentStatus::parse("paid"), Err(CoreError::Validation(_)));
    }

    // -- accreditation --

    #[test]
    fn accreditation_requires_completed_payment() {
        for payment in [PaymentStatus::Pending, PaymentStatus::ProofSubmitted] {
            let result =
                AccreditationStatus::Pending.apply(AccreditationAction::Accredit, payment);
            assert_matches!(result, Err(CoreError::Conflict(msg)) if msg.contains("not completed"));
        }
    }

    #[test]
    fn decline_also_requires_completed_payment() {
        assert_matches!(
            AccreditationStatus::Pending
                .apply(AccreditationAction::Decline, PaymentStatus::Pending),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn accredit_after_payment() {
        let s = AccreditationStatus::Pending
            .apply(AccreditationAction::Accredit, PaymentStatus::Completed)
            .unwrap();
        assert_eq!(s, AccreditationStatus::Completed);
    }

    #[test]
    fn double_accreditation_conflicts() {
        let result = AccreditationStatus::Completed
            .apply(AccreditationAction::Accredit, PaymentStatus::Completed);
        assert_matches!(result, Err(CoreError::Conflict(msg)) if msg.contains("already accredited"));
    }

    #[test]
    fn declined_needs_override() {
        assert_matches!(
            AccreditationStatus::Declined
                .apply(AccreditationAction::Accredit, PaymentStatus::Completed),
            Err(CoreError::Conflict(_))
        );
        let s = AccreditationStatus::Declined
            .override_to(AccreditationStatus::Completed, PaymentStatus::Completed)
            .unwrap();
        assert_eq!(s, AccreditationStatus::Completed);
    }

    #[test]
    fn override_reset_to_pending_ignores_payment() {
        let s = AccreditationStatus::Completed
            .override_to(AccreditationStatus::Pending, PaymentStatus::Pending)
            .unwrap();
        assert_eq!(s, AccreditationStatus::Pending);
    }

    #[test]
    fn override_cannot_bypass_payment() {
        assert_matches!(
            AccreditationStatus::Pending
                .override_to(AccreditationStatus::Completed, PaymentStatus::ProofSubmitted),
            Err(CoreError::Conflict(_))
        );
    }

    // -- booking --

    #[test]
    fn booking_confirm_then_cancel() {
        let s = BookingStatus::Pending.apply(BookingAction::Confirm).unwrap();
        assert_eq!(s, BookingStatus::Confirmed);
        let s = s.apply(BookingAction::Cancel).unwrap();
        assert_eq!(s, BookingStatus::Cancelled);
        assert!(s.is_terminal());
    }

    #[test]
    fn pending_booking_can_be_cancelled() {
        assert_eq!(
            BookingStatus::Pending.apply(BookingAction::Cancel).unwrap(),
            BookingStatus::Cancelled
        );
    }

    #[test]
    fn cancelled_booking_is_terminal() {
        assert_matches!(
            BookingStatus::Cancelled.apply(BookingAction::Confirm),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            BookingStatus::Cancelled.apply(BookingAction::Cancel),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn statuses_serialize_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::ProofSubmitted).unwrap(),
            "\"proof_submitted\""
        );
        assert_eq!(
            serde_json::to_string(&AccreditationStatus::Declined).unwrap(),
            "\"declined\""
        );
    }
}
