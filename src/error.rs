//! Error types and error handling strategy.
//!
//! Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - Normal completion travels through [`Step`](crate::coro::Step), never
//!   through the error channel
//! - Programming errors (mismanaged task lifecycle) are distinct from task
//!   failures and from cancellation
//!
//! # Taxonomy
//!
//! - **Lifecycle misuse**: [`Error::ResumedAfterCompletion`],
//!   [`Error::PromiseAlreadyResolved`], [`Error::LoopTerminated`]: the
//!   driver or caller broke a contract
//! - **Task failures**: [`Error::TaskFailed`], an error raised inside a
//!   unit of work's own logic, propagated unchanged to whatever drives the
//!   top-level task
//! - **Policy stops**: [`Error::PassBudgetExhausted`], the configured
//!   starvation bound fired

use crate::runtime::LoopState;
use crate::types::{Fault, TaskId};

/// Convenience alias for results with the crate error type.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for scheduler operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A task whose computation already completed was stepped again.
    #[error("task {task} resumed after completion")]
    ResumedAfterCompletion {
        /// The task that was stepped after finishing.
        task: TaskId,
    },

    /// A promise that already settled was resolved again.
    #[error("promise already resolved")]
    PromiseAlreadyResolved,

    /// A task's computation reported a failure.
    #[error("task {task} failed: {fault}")]
    TaskFailed {
        /// The failing task.
        task: TaskId,
        /// The failure raised by the task's own logic.
        fault: Fault,
    },

    /// The loop hit its configured pass bound with work still pending.
    #[error("pass budget of {limit} exhausted with {remaining} tasks pending")]
    PassBudgetExhausted {
        /// The configured bound.
        limit: u64,
        /// Tasks still pending when the bound fired.
        remaining: usize,
    },

    /// A run operation was invoked on a loop in a terminal state.
    #[error("event loop already terminated ({state})")]
    LoopTerminated {
        /// The terminal state the loop is in.
        state: LoopState,
    },

    /// An internal invariant was violated.
    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = Error::ResumedAfterCompletion {
            task: TaskId::new(3),
        };
        assert_eq!(err.to_string(), "task T3 resumed after completion");

        let err = Error::TaskFailed {
            task: TaskId::new(1),
            fault: Fault::new("boom"),
        };
        assert_eq!(err.to_string(), "task T1 failed: boom");

        let err = Error::PassBudgetExhausted {
            limit: 8,
            remaining: 2,
        };
        assert_eq!(
            err.to_string(),
            "pass budget of 8 exhausted with 2 tasks pending"
        );
    }
}
