//! Sequencing adapters: delegation (`Then`) and result mapping (`Map`).

use super::{Coroutine, Step};
use crate::types::CancelReason;
use std::mem;

/// Delegates to a first computation, then continues with a second built
/// from its result. Created by [`CoroutineExt::then`](super::CoroutineExt::then).
pub struct Then<A, B, F> {
    state: ThenState<A, B, F>,
}

enum ThenState<A, B, F> {
    First { first: A, continuation: F },
    Second { second: B },
    Finished,
}

impl<A, B, F> Then<A, B, F> {
    pub(super) fn new(first: A, continuation: F) -> Self {
        Self {
            state: ThenState::First {
                first,
                continuation,
            },
        }
    }
}

impl<Input, A, B, F> Coroutine<Input> for Then<A, B, F>
where
    Input: Copy,
    A: Coroutine<Input>,
    B: Coroutine<Input, Yield = A::Yield>,
    F: FnOnce(A::Return) -> B,
{
    type Yield = A::Yield;
    type Return = B::Return;

    fn resume(&mut self, input: Input) -> Step<Self::Yield, Self::Return> {
        // The state is taken out so the continuation can be consumed by
        // value; every non-terminal branch must put a state back.
        match mem::replace(&mut self.state, ThenState::Finished) {
            ThenState::First {
                mut first,
                continuation,
            } => match first.resume(input) {
                Step::Yielded(value) => {
                    self.state = ThenState::First {
                        first,
                        continuation,
                    };
                    Step::Yielded(value)
                }
                Step::Complete(result) => {
                    // Delegation hand-off: the continuation runs within the
                    // same resume call, so no extra yield is observed.
                    let mut second = continuation(result);
                    match second.resume(input) {
                        Step::Yielded(value) => {
                            self.state = ThenState::Second { second };
                            Step::Yielded(value)
                        }
                        Step::Complete(result) => Step::Complete(result),
                        Step::Failed(fault) => Step::Failed(fault),
                    }
                }
                Step::Failed(fault) => Step::Failed(fault),
            },
            ThenState::Second { mut second } => match second.resume(input) {
                Step::Yielded(value) => {
                    self.state = ThenState::Second { second };
                    Step::Yielded(value)
                }
                Step::Complete(result) => Step::Complete(result),
                Step::Failed(fault) => Step::Failed(fault),
            },
            ThenState::Finished => panic!("coroutine resumed after completion"),
        }
    }

    fn close(&mut self, reason: &CancelReason) {
        match &mut self.state {
            ThenState::First { first, .. } => first.close(reason),
            ThenState::Second { second } => second.close(reason),
            ThenState::Finished => {}
        }
        self.state = ThenState::Finished;
    }
}

/// Transforms the completion result of a computation. Created by
/// [`CoroutineExt::map`](super::CoroutineExt::map).
pub struct Map<C, F> {
    inner: C,
    transform: Option<F>,
}

impl<C, F> Map<C, F> {
    pub(super) fn new(inner: C, transform: F) -> Self {
        Self {
            inner,
            transform: Some(transform),
        }
    }
}

impl<Input, C, F, U> Coroutine<Input> for Map<C, F>
where
    C: Coroutine<Input>,
    F: FnOnce(C::Return) -> U,
{
    type Yield = C::Yield;
    type Return = U;

    fn resume(&mut self, input: Input) -> Step<Self::Yield, U> {
        match self.inner.resume(input) {
            Step::Yielded(value) => Step::Yielded(value),
            Step::Complete(result) => match self.transform.take() {
                Some(transform) => Step::Complete(transform(result)),
                None => panic!("coroutine resumed after completion"),
            },
            Step::Failed(fault) => Step::Failed(fault),
        }
    }

    fn close(&mut self, reason: &CancelReason) {
        self.inner.close(reason);
        self.transform = None;
    }
}
