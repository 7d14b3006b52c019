//! Action submission state machine.
//!
//! Each player holds at most one pending submission per round:
//!
//! ```text
//! None → Submitted → { Valid, Invalid } → None
//! ```
//!
//! A placed submission waits in `Submitted` until checked against live game
//! state, and is re-validated whenever that state changes. One that turns
//! invalid before resolution is cleared automatically with a reason, never
//! resolved against stale state. Every transition yields a
//! [`SubmissionStatus`] snapshot for the transport layer.

use crate::catalog::AbilityId;
use crate::error::{CombatError, ErrorSeverity};
use crate::types::{SubmissionStamp, TargetId};

/// Lifecycle state of the submission slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationState {
    /// No submission this round.
    #[default]
    None,
    /// Placed but not yet validated.
    Submitted,
    /// Checked against live state and ready to resolve.
    Valid,
    /// Failed re-validation; slot was cleared so the player may resubmit.
    Invalid,
}

/// Policy rejection of a submit call. Returned as a value, never thrown.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubmitError {
    #[error("an action is already submitted this round")]
    AlreadySubmitted,

    #[error("unknown ability '{0}'")]
    UnknownAbility(String),

    #[error("ability '{0}' is not unlocked")]
    AbilityLocked(String),

    #[error("ability '{0}' is on cooldown")]
    AbilityOnCooldown(String),

    #[error("a target is required")]
    MissingTarget,

    #[error("cannot act while stunned")]
    Stunned,
}

impl CombatError for SubmitError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownAbility(_) | Self::MissingTarget => ErrorSeverity::Validation,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadySubmitted => "SUBMIT_ALREADY_SUBMITTED",
            Self::UnknownAbility(_) => "SUBMIT_UNKNOWN_ABILITY",
            Self::AbilityLocked(_) => "SUBMIT_ABILITY_LOCKED",
            Self::AbilityOnCooldown(_) => "SUBMIT_ABILITY_ON_COOLDOWN",
            Self::MissingTarget => "SUBMIT_MISSING_TARGET",
            Self::Stunned => "SUBMIT_STUNNED",
        }
    }
}

/// Why a previously accepted submission became invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidReason {
    #[error("nothing has been submitted")]
    NothingSubmitted,

    #[error("the targeted player is no longer alive")]
    TargetDead,

    #[error("the targeted player has left the game")]
    TargetMissing,

    #[error("the monster is already dead")]
    MonsterDead,

    #[error("the ability went on cooldown")]
    AbilityOnCooldown,

    #[error("the ability is no longer unlocked")]
    AbilityLocked,

    #[error("the player disconnected")]
    Disconnected,
}

/// A player's pending action for the current round.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionSubmission {
    pub ability: AbilityId,
    pub target: TargetId,
    pub submitted_at: SubmissionStamp,
    pub valid: bool,
    pub invalid_reason: Option<InvalidReason>,
}

impl ActionSubmission {
    pub fn new(ability: AbilityId, target: TargetId, submitted_at: SubmissionStamp) -> Self {
        Self {
            ability,
            target,
            submitted_at,
            valid: true,
            invalid_reason: None,
        }
    }
}

/// Snapshot of the slot after a transition, consumable by the transport
/// layer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubmissionStatus {
    pub has_submitted: bool,
    pub is_valid: bool,
    pub validation_state: ValidationState,
    pub action: Option<ActionSubmission>,
}

/// Result of a submit call: either the accepted action or a reason.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubmitOutcome {
    pub success: bool,
    pub action: Option<ActionSubmission>,
    pub reason: Option<SubmitError>,
}

impl SubmitOutcome {
    pub fn accepted(action: ActionSubmission) -> Self {
        Self {
            success: true,
            action: Some(action),
            reason: None,
        }
    }

    pub fn rejected(reason: SubmitError) -> Self {
        Self {
            success: false,
            action: None,
            reason: Some(reason),
        }
    }
}

/// Result of a re-validation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationReport {
    pub is_valid: bool,
    pub reason: Option<InvalidReason>,
}

impl ValidationReport {
    pub const fn valid() -> Self {
        Self {
            is_valid: true,
            reason: None,
        }
    }

    pub const fn invalid(reason: InvalidReason) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason),
        }
    }
}

/// The single pending-submission slot a player holds per round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubmissionSlot {
    state: ValidationState,
    action: Option<ActionSubmission>,
    /// Most recent submission that passed validation; survives clears for
    /// the persisted record.
    last_valid: Option<ActionSubmission>,
}

impl SubmissionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        self.action.is_some()
    }

    pub fn state(&self) -> ValidationState {
        self.state
    }

    pub fn pending(&self) -> Option<&ActionSubmission> {
        self.action.as_ref()
    }

    pub fn last_valid(&self) -> Option<&ActionSubmission> {
        self.last_valid.as_ref()
    }

    /// Accepts a submission that already passed policy checks.
    ///
    /// Enforces the one-pending-submission invariant; the caller performs
    /// ability and target checks first. The slot holds the action in
    /// `Submitted` until a validation pass promotes it to `Valid`.
    pub fn accept(&mut self, action: ActionSubmission) -> Result<SubmissionStatus, SubmitError> {
        if self.action.is_some() {
            return Err(SubmitError::AlreadySubmitted);
        }
        self.state = ValidationState::Submitted;
        self.action = Some(action);
        Ok(self.status())
    }

    /// Marks the pending submission invalid and clears the slot so the
    /// player may resubmit.
    pub fn invalidate(&mut self, reason: InvalidReason) -> ValidationReport {
        if let Some(action) = &mut self.action {
            action.valid = false;
            action.invalid_reason = Some(reason);
        }
        self.state = ValidationState::Invalid;
        self.action = None;
        ValidationReport::invalid(reason)
    }

    /// Promotes the pending submission to `Valid` after a validation pass.
    pub fn confirm_valid(&mut self) -> ValidationReport {
        let Some(action) = &self.action else {
            return ValidationReport::invalid(InvalidReason::NothingSubmitted);
        };
        self.last_valid = Some(action.clone());
        self.state = ValidationState::Valid;
        ValidationReport::valid()
    }

    /// Removes and returns the submission if it is valid, for resolution.
    pub fn take_valid(&mut self) -> Option<ActionSubmission> {
        if self.state != ValidationState::Valid {
            return None;
        }
        self.state = ValidationState::None;
        self.action.take()
    }

    /// Resets the slot for a new round. Only the round orchestrator may
    /// call this.
    pub fn clear(&mut self) {
        self.state = ValidationState::None;
        self.action = None;
    }

    /// Snapshot of the current slot state.
    pub fn status(&self) -> SubmissionStatus {
        SubmissionStatus {
            has_submitted: self.action.is_some(),
            is_valid: self.state == ValidationState::Valid && self.action.is_some(),
            validation_state: self.state,
            action: self.action.clone(),
        }
    }
}
