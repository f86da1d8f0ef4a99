//! Cooperative delay: a computation that completes after a deadline.

use super::clock::Clock;
use crate::coro::{Coroutine, Step};
use crate::types::{CancelReason, Time};
use std::rc::Rc;
use std::time::Duration;

/// A computation that completes once its clock reaches a deadline, and
/// yields on every resume before that.
///
/// This is how a unit of work sleeps without blocking the loop's other
/// work: each resume before the deadline yields once and returns control.
///
/// # Deadline arming
///
/// [`Delay::new`] arms its deadline lazily, on the *first* resume
/// (`now + duration`). A delay sitting behind earlier stages of a
/// [`then`](crate::coro::CoroutineExt::then) chain therefore starts
/// counting when execution reaches it, not when the chain was built.
/// [`Delay::until`] arms eagerly at an absolute instant instead.
///
/// A zero-length delay completes on its first resume with no yields.
#[derive(Debug)]
pub struct Delay {
    clock: Rc<dyn Clock>,
    state: DelayState,
}

#[derive(Debug, Clone, Copy)]
enum DelayState {
    Unarmed { duration: Duration },
    Armed { deadline: Time },
    Finished,
}

impl Delay {
    /// Creates a delay that completes `duration` after its first resume.
    #[must_use]
    pub fn new(clock: Rc<dyn Clock>, duration: Duration) -> Self {
        Self {
            clock,
            state: DelayState::Unarmed { duration },
        }
    }

    /// Creates a delay that completes at the absolute instant `deadline`.
    #[must_use]
    pub fn until(clock: Rc<dyn Clock>, deadline: Time) -> Self {
        Self {
            clock,
            state: DelayState::Armed { deadline },
        }
    }

    /// Returns the deadline, or `None` while the delay is not yet armed.
    #[must_use]
    pub const fn deadline(&self) -> Option<Time> {
        match self.state {
            DelayState::Armed { deadline } => Some(deadline),
            DelayState::Unarmed { .. } | DelayState::Finished => None,
        }
    }
}

impl Coroutine for Delay {
    type Yield = ();
    type Return = ();

    fn resume(&mut self, _input: ()) -> Step<(), ()> {
        match self.state {
            DelayState::Unarmed { duration } => {
                let deadline = self.clock.now() + duration;
                if self.clock.now() >= deadline {
                    self.state = DelayState::Finished;
                    Step::Complete(())
                } else {
                    self.state = DelayState::Armed { deadline };
                    Step::Yielded(())
                }
            }
            DelayState::Armed { deadline } => {
                if self.clock.now() >= deadline {
                    self.state = DelayState::Finished;
                    Step::Complete(())
                } else {
                    Step::Yielded(())
                }
            }
            DelayState::Finished => panic!("delay resumed after completion"),
        }
    }

    fn close(&mut self, _reason: &CancelReason) {
        self.state = DelayState::Finished;
    }
}
