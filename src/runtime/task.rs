//! Type-erased task storage for the event loop.
//!
//! A `Task` binds one top-level computation to the promise it settles.
//! The output type is erased behind [`StoredTask`] so the loop can keep
//! heterogeneous tasks in a single queue.

use crate::coro::{Coroutine, Step};
use crate::error::Error;
use crate::promise::Promise;
use crate::types::{CancelReason, TaskId};
use tracing::{trace, warn};

/// What a single step of a task produced, from the loop's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskPoll {
    /// The computation suspended; the task must be re-queued.
    Yielded,
    /// The computation finished and the promise settled; drop the task.
    Finished,
}

/// A type-erased task stored in the loop's queues.
pub(crate) trait StoredTask {
    /// The loop-assigned task id.
    fn id(&self) -> TaskId;

    /// Resumes the owned computation by one step.
    ///
    /// Stepping a finished task is a lifecycle bug and reported as
    /// [`Error::ResumedAfterCompletion`]; a failure raised by the
    /// computation itself settles the promise and surfaces as
    /// [`Error::TaskFailed`].
    fn step(&mut self) -> Result<TaskPoll, Error>;

    /// Force-terminates the computation and cancels the promise.
    /// Idempotent.
    fn close(&mut self, reason: &CancelReason);
}

pub(crate) struct Task<C, T>
where
    C: Coroutine<Yield = (), Return = T>,
{
    id: TaskId,
    work: C,
    promise: Promise<T>,
    finished: bool,
    steps: u64,
}

impl<C, T> Task<C, T>
where
    C: Coroutine<Yield = (), Return = T>,
{
    pub(crate) fn new(id: TaskId, work: C, promise: Promise<T>) -> Self {
        Self {
            id,
            work,
            promise,
            finished: false,
            steps: 0,
        }
    }
}

impl<C, T> StoredTask for Task<C, T>
where
    C: Coroutine<Yield = (), Return = T>,
{
    fn id(&self) -> TaskId {
        self.id
    }

    fn step(&mut self) -> Result<TaskPoll, Error> {
        if self.finished {
            return Err(Error::ResumedAfterCompletion { task: self.id });
        }
        self.steps += 1;
        trace!(task = %self.id, step = self.steps, "task step");

        match self.work.resume(()) {
            Step::Yielded(()) => Ok(TaskPoll::Yielded),
            Step::Complete(value) => {
                self.finished = true;
                if self.promise.resolve(value).is_err() {
                    // Someone resolved the promise out from under the task;
                    // the first settlement wins.
                    warn!(task = %self.id, "task promise was already settled");
                }
                trace!(task = %self.id, steps = self.steps, "task complete");
                Ok(TaskPoll::Finished)
            }
            Step::Failed(fault) => {
                self.finished = true;
                if self.promise.fail(fault.clone()).is_err() {
                    warn!(task = %self.id, "task promise was already settled");
                }
                Err(Error::TaskFailed {
                    task: self.id,
                    fault,
                })
            }
        }
    }

    fn close(&mut self, reason: &CancelReason) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.work.close(reason);
        self.promise.cancel(reason.clone());
        trace!(task = %self.id, %reason, "task closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coro::{from_fn, ready};
    use crate::types::{CancelKind, Fault, Outcome};

    #[test]
    fn step_resolves_promise_on_completion() {
        let promise = Promise::new();
        let mut task = Task::new(TaskId::new(0), ready(5), promise.clone());

        assert_eq!(task.step(), Ok(TaskPoll::Finished));
        assert_eq!(promise.outcome(), Some(Outcome::Ok(5)));
    }

    #[test]
    fn step_after_completion_is_a_typed_error() {
        let promise = Promise::new();
        let mut task = Task::new(TaskId::new(3), ready(5), promise);

        assert_eq!(task.step(), Ok(TaskPoll::Finished));
        assert_eq!(
            task.step(),
            Err(Error::ResumedAfterCompletion {
                task: TaskId::new(3)
            })
        );
    }

    #[test]
    fn failure_settles_promise_and_surfaces() {
        let promise: Promise<u32> = Promise::new();
        let work = from_fn(|()| Step::<(), u32>::Failed(Fault::new("boom")));
        let mut task = Task::new(TaskId::new(1), work, promise.clone());

        assert_eq!(
            task.step(),
            Err(Error::TaskFailed {
                task: TaskId::new(1),
                fault: Fault::new("boom"),
            })
        );
        assert_eq!(promise.outcome(), Some(Outcome::Failed(Fault::new("boom"))));
    }

    #[test]
    fn close_cancels_promise() {
        let promise: Promise<u32> = Promise::new();
        let work = from_fn(|()| Step::<(), u32>::Yielded(()));
        let mut task = Task::new(TaskId::new(2), work, promise.clone());

        assert_eq!(task.step(), Ok(TaskPoll::Yielded));
        task.close(&CancelReason::shutdown());
        task.close(&CancelReason::shutdown()); // idempotent

        match promise.outcome() {
            Some(Outcome::Cancelled(reason)) => assert_eq!(reason.kind, CancelKind::Shutdown),
            other => panic!("expected cancelled, got {other:?}"),
        }
    }

    #[test]
    fn close_after_completion_preserves_resolution() {
        let promise = Promise::new();
        let mut task = Task::new(TaskId::new(4), ready(7), promise.clone());

        assert_eq!(task.step(), Ok(TaskPoll::Finished));
        task.close(&CancelReason::shutdown());
        assert_eq!(promise.outcome(), Some(Outcome::Ok(7)));
    }
}
