//! Three-valued outcome type with severity lattice.
//!
//! The outcome type represents the settlement of a task or promise:
//!
//! - `Ok(T)`: the computation completed with a value
//! - `Failed(Fault)`: the computation's own logic reported an error
//! - `Cancelled(CancelReason)`: the computation was terminated forcibly
//!
//! These form a severity lattice: `Ok < Failed < Cancelled`. When
//! aggregating outcomes, the worst one wins.

use super::cancel::CancelReason;
use core::fmt;

/// Payload for a failure raised inside a computation's own logic.
///
/// Carries the failure message across task boundaries and delegation layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    message: String,
}

impl Fault {
    /// Creates a new fault with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// The three-valued settlement of a task or promise.
///
/// Forms a severity lattice where worse outcomes dominate:
/// `Ok < Failed < Cancelled`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Completion with a value.
    Ok(T),
    /// Failure raised by the computation's own logic.
    Failed(Fault),
    /// Forced termination.
    Cancelled(CancelReason),
}

impl<T> Outcome<T> {
    /// Returns the severity level of this outcome (0 = Ok, 2 = Cancelled).
    #[must_use]
    pub const fn severity(&self) -> u8 {
        match self {
            Self::Ok(_) => 0,
            Self::Failed(_) => 1,
            Self::Cancelled(_) => 2,
        }
    }

    /// Returns true if this outcome is `Ok`.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns true if this outcome is `Failed`.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns true if this outcome is `Cancelled`.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Returns the value if `Ok`, discarding the settlement otherwise.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            _ => None,
        }
    }

    /// Maps the success value using the provided function.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Ok(value) => Outcome::Ok(f(value)),
            Self::Failed(fault) => Outcome::Failed(fault),
            Self::Cancelled(reason) => Outcome::Cancelled(reason),
        }
    }

    /// Converts this outcome to a standard `Result`, with failure and
    /// cancellation as errors.
    pub fn into_result(self) -> Result<T, OutcomeError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Failed(fault) => Err(OutcomeError::Failed(fault)),
            Self::Cancelled(reason) => Err(OutcomeError::Cancelled(reason)),
        }
    }

    /// Returns the success value or panics.
    ///
    /// # Panics
    ///
    /// Panics if the outcome is not `Ok`.
    #[track_caller]
    pub fn unwrap(self) -> T {
        match self {
            Self::Ok(value) => value,
            Self::Failed(fault) => {
                panic!("called `Outcome::unwrap()` on a `Failed` value: {fault}")
            }
            Self::Cancelled(reason) => {
                panic!("called `Outcome::unwrap()` on a `Cancelled` value: {reason}")
            }
        }
    }

    /// Returns the success value or a default.
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Self::Ok(value) => value,
            _ => default,
        }
    }
}

/// Error type for converting an [`Outcome`] to a `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeError {
    /// Failure raised by the computation.
    Failed(Fault),
    /// Forced termination.
    Cancelled(CancelReason),
}

impl fmt::Display for OutcomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(fault) => write!(f, "failed: {fault}"),
            Self::Cancelled(reason) => write!(f, "cancelled: {reason}"),
        }
    }
}

impl std::error::Error for OutcomeError {}

/// Compares two outcomes by severity and returns the worse one.
///
/// This is the lattice join operation; the first argument wins ties.
pub fn join_outcomes<T>(a: Outcome<T>, b: Outcome<T>) -> Outcome<T> {
    if a.severity() >= b.severity() {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CancelKind;

    #[test]
    fn severity_ordering() {
        let ok: Outcome<i32> = Outcome::Ok(42);
        let failed: Outcome<i32> = Outcome::Failed(Fault::new("boom"));
        let cancelled: Outcome<i32> = Outcome::Cancelled(CancelReason::default());

        assert!(ok.severity() < failed.severity());
        assert!(failed.severity() < cancelled.severity());
    }

    #[test]
    fn predicates() {
        let ok: Outcome<i32> = Outcome::Ok(1);
        let failed: Outcome<i32> = Outcome::Failed(Fault::new("boom"));
        let cancelled: Outcome<i32> = Outcome::Cancelled(CancelReason::shutdown());

        assert!(ok.is_ok() && !ok.is_failed() && !ok.is_cancelled());
        assert!(failed.is_failed());
        assert!(cancelled.is_cancelled());
    }

    #[test]
    fn map_transforms_only_ok() {
        let ok: Outcome<i32> = Outcome::Ok(21);
        assert_eq!(ok.map(|v| v * 2), Outcome::Ok(42));

        let failed: Outcome<i32> = Outcome::Failed(Fault::new("boom"));
        assert!(failed.map(|v| v * 2).is_failed());
    }

    #[test]
    fn into_result_distinguishes_settlements() {
        let ok: Outcome<i32> = Outcome::Ok(42);
        assert_eq!(ok.into_result(), Ok(42));

        let cancelled: Outcome<i32> = Outcome::Cancelled(CancelReason::shutdown());
        match cancelled.into_result() {
            Err(OutcomeError::Cancelled(reason)) => assert_eq!(reason.kind, CancelKind::Shutdown),
            other => panic!("expected cancelled, got {other:?}"),
        }
    }

    #[test]
    fn join_takes_worse() {
        let ok: Outcome<i32> = Outcome::Ok(1);
        let cancelled: Outcome<i32> = Outcome::Cancelled(CancelReason::default());
        assert!(join_outcomes(ok, cancelled).is_cancelled());

        let a: Outcome<i32> = Outcome::Ok(1);
        let b: Outcome<i32> = Outcome::Ok(2);
        assert_eq!(join_outcomes(a, b), Outcome::Ok(1));
    }

    #[test]
    #[should_panic(expected = "called `Outcome::unwrap()` on a `Failed` value")]
    fn unwrap_panics_on_failed() {
        let failed: Outcome<i32> = Outcome::Failed(Fault::new("boom"));
        let _ = failed.unwrap();
    }

    #[test]
    fn unwrap_or_returns_default() {
        let cancelled: Outcome<i32> = Outcome::Cancelled(CancelReason::default());
        assert_eq!(cancelled.unwrap_or(9), 9);
    }
}
