//! Common error infrastructure for nightfall-core.
//!
//! Domain-specific errors (e.g. `SubmitError`, `LoadoutError`) are defined in
//! their respective modules alongside the operations they validate. This
//! module provides the shared severity classification used by the runtime to
//! decide how an error is surfaced.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: rejected-by-policy conditions the player can react to
///   (duplicate submit, ability on cooldown). Returned as values, never fatal.
/// - **Validation**: invalid input that should be rejected without retry
///   (unknown ability id, missing target).
/// - **Fatal**: malformed content configuration. A content bug, not a player
///   error; detected eagerly at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - the player may retry with a different action.
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    Validation,

    /// Fatal error - content configuration is broken, cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all nightfall-core errors.
///
/// Provides a uniform interface for classification across error types.
/// No single player's error may abort resolution for others: anything
/// non-fatal degrades to "no action this round".
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for error categorization, metrics, and testing.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
