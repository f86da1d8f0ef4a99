//! Pending-or-settled value holders.
//!
//! A [`Promise`] is created pending and settles exactly once with an
//! [`Outcome`]: resolved with a value, failed with a [`Fault`], or
//! cancelled. Clones share the same cell, so the creator can hand the
//! promise to any number of waiters; the scheduler returns one from every
//! spawn so other tasks can await the spawned task's result.
//!
//! Resolution is single-shot and enforced: a second [`Promise::resolve`]
//! (or [`Promise::fail`]) returns [`Error::PromiseAlreadyResolved`] and
//! leaves the stored outcome untouched. Cancellation is a forced path and
//! therefore idempotent: [`Promise::cancel`] reports whether this call
//! performed the transition.

use crate::coro::{Coroutine, Step};
use crate::error::Error;
use crate::types::{CancelReason, Fault, Outcome};
use core::fmt;
use std::cell::RefCell;
use std::rc::Rc;

/// A value holder that is either pending or settled with an [`Outcome`].
///
/// Single-threaded by design: clones share one cell via `Rc`.
///
/// # Example
///
/// ```
/// use carousel::{Outcome, Promise};
///
/// let promise: Promise<u32> = Promise::new();
/// assert!(!promise.is_settled());
///
/// promise.resolve(7).expect("first resolution");
/// assert!(promise.resolve(8).is_err());
/// assert_eq!(promise.outcome(), Some(Outcome::Ok(7)));
/// ```
pub struct Promise<T> {
    cell: Rc<RefCell<Option<Outcome<T>>>>,
}

impl<T> Promise<T> {
    /// Creates a new pending promise.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cell: Rc::new(RefCell::new(None)),
        }
    }

    /// Returns true if the promise has settled (resolved, failed, or
    /// cancelled).
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.cell.borrow().is_some()
    }

    /// Settles the promise with a value.
    ///
    /// Resolution is single-shot: if the promise already settled this
    /// returns [`Error::PromiseAlreadyResolved`] and changes nothing.
    pub fn resolve(&self, value: T) -> Result<(), Error> {
        self.settle(Outcome::Ok(value))
    }

    /// Settles the promise with a failure.
    ///
    /// Same single-shot rule as [`Promise::resolve`].
    pub fn fail(&self, fault: Fault) -> Result<(), Error> {
        self.settle(Outcome::Failed(fault))
    }

    /// Forces the promise into the cancelled settlement.
    ///
    /// Returns true if this call performed the transition, false if the
    /// promise had already settled. Waiters observe
    /// [`Outcome::Cancelled`], distinguishable from a produced value.
    pub fn cancel(&self, reason: CancelReason) -> bool {
        self.settle(Outcome::Cancelled(reason)).is_ok()
    }

    /// Returns a computation that yields while the promise is pending and
    /// completes with the settled outcome.
    #[must_use]
    pub fn wait(&self) -> Wait<T> {
        Wait {
            promise: self.clone(),
            finished: false,
        }
    }

    fn settle(&self, outcome: Outcome<T>) -> Result<(), Error> {
        let mut slot = self.cell.borrow_mut();
        if slot.is_some() {
            return Err(Error::PromiseAlreadyResolved);
        }
        *slot = Some(outcome);
        Ok(())
    }
}

impl<T: Clone> Promise<T> {
    /// Returns a clone of the settled outcome, or `None` while pending.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome<T>> {
        self.cell.borrow().clone()
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.cell.borrow() {
            None => "pending",
            Some(Outcome::Ok(_)) => "resolved",
            Some(Outcome::Failed(_)) => "failed",
            Some(Outcome::Cancelled(_)) => "cancelled",
        };
        write!(f, "Promise({state})")
    }
}

/// A computation that awaits a [`Promise`]: yields while pending,
/// completes with the settled [`Outcome`]. Created by [`Promise::wait`].
#[derive(Debug)]
pub struct Wait<T> {
    promise: Promise<T>,
    finished: bool,
}

impl<T: Clone> Coroutine for Wait<T> {
    type Yield = ();
    type Return = Outcome<T>;

    fn resume(&mut self, _input: ()) -> Step<(), Outcome<T>> {
        assert!(!self.finished, "wait resumed after completion");
        match self.promise.outcome() {
            Some(outcome) => {
                self.finished = true;
                Step::Complete(outcome)
            }
            None => Step::Yielded(()),
        }
    }

    fn close(&mut self, _reason: &CancelReason) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CancelKind;

    #[test]
    fn resolve_is_single_shot() {
        let promise = Promise::new();
        assert!(promise.resolve(1).is_ok());
        assert_eq!(promise.resolve(2), Err(Error::PromiseAlreadyResolved));
        assert_eq!(promise.outcome(), Some(Outcome::Ok(1)));
    }

    #[test]
    fn fail_settles_once() {
        let promise: Promise<u32> = Promise::new();
        assert!(promise.fail(Fault::new("boom")).is_ok());
        assert_eq!(
            promise.fail(Fault::new("again")),
            Err(Error::PromiseAlreadyResolved)
        );
        assert_eq!(promise.outcome(), Some(Outcome::Failed(Fault::new("boom"))));
    }

    #[test]
    fn cancel_is_idempotent_and_forced() {
        let promise: Promise<u32> = Promise::new();
        assert!(promise.cancel(CancelReason::shutdown()));
        assert!(!promise.cancel(CancelReason::shutdown()));

        match promise.outcome() {
            Some(Outcome::Cancelled(reason)) => assert_eq!(reason.kind, CancelKind::Shutdown),
            other => panic!("expected cancelled, got {other:?}"),
        }
    }

    #[test]
    fn cancel_does_not_override_resolution() {
        let promise = Promise::new();
        promise.resolve(5).expect("first resolution");
        assert!(!promise.cancel(CancelReason::shutdown()));
        assert_eq!(promise.outcome(), Some(Outcome::Ok(5)));
    }

    #[test]
    fn clones_share_the_cell() {
        let promise = Promise::new();
        let observer = promise.clone();
        promise.resolve("done").expect("first resolution");
        assert_eq!(observer.outcome(), Some(Outcome::Ok("done")));
    }

    #[test]
    fn wait_yields_until_settled() {
        let promise = Promise::new();
        let mut wait = promise.wait();

        assert_eq!(wait.resume(()), Step::Yielded(()));
        assert_eq!(wait.resume(()), Step::Yielded(()));

        promise.resolve(11).expect("first resolution");
        assert_eq!(wait.resume(()), Step::Complete(Outcome::Ok(11)));
    }

    #[test]
    fn wait_observes_cancellation() {
        let promise: Promise<u32> = Promise::new();
        let mut wait = promise.wait();
        assert!(wait.resume(()).is_yielded());

        promise.cancel(CancelReason::user("abandoned"));
        match wait.resume(()) {
            Step::Complete(outcome) => assert!(outcome.is_cancelled()),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "resumed after completion")]
    fn wait_panics_after_completion() {
        let promise = Promise::new();
        promise.resolve(1).expect("first resolution");
        let mut wait = promise.wait();
        assert!(wait.resume(()).is_complete());
        let _ = wait.resume(());
    }

    #[test]
    fn debug_reports_settlement() {
        let promise: Promise<u32> = Promise::new();
        assert_eq!(format!("{promise:?}"), "Promise(pending)");
        promise.resolve(1).expect("first resolution");
        assert_eq!(format!("{promise:?}"), "Promise(resolved)");
    }
}
