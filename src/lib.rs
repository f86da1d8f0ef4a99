//! Carousel: a single-threaded cooperative task scheduler built on
//! resumable computations.
//!
//! # Overview
//!
//! Carousel schedules units of work that suspend themselves voluntarily.
//! Exactly one computation is ever executing; concurrency is interleaving,
//! not parallelism. A unit of work is anything implementing [`Coroutine`]:
//! each `resume` advances it to its next suspension point or to completion,
//! reported as an explicit [`Step`] value rather than through the error
//! channel.
//!
//! # Core Guarantees
//!
//! - **Round-robin fairness**: every ready task gets exactly one step per
//!   scheduling pass; a task that yields re-queues at the tail
//! - **Single-shot resolution**: a [`Promise`] settles exactly once; a second
//!   resolution is a typed error, never a silent overwrite
//! - **Cancellation is observable**: waiters can always tell "cancelled"
//!   from "produced a value" and from "failed"
//! - **No hidden globals**: spawning and time flow through an explicitly
//!   threaded [`LoopHandle`], never process-wide state
//!
//! # Module Structure
//!
//! - [`coro`]: The resumable-computation primitive ([`Coroutine`], [`Step`])
//!   and its combinators
//! - [`time`]: Clock capability and the cooperative [`Delay`]
//! - [`promise`]: Pending-or-settled value holders
//! - [`runtime`]: The event loop and its configuration
//! - [`types`]: Core types (identifiers, outcomes, cancellation reasons)
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```
//! use carousel::{from_fn, ready, CoroutineExt, EventLoop, Outcome, Step};
//!
//! let mut tick = 0u32;
//! let work = from_fn(move |()| {
//!     tick += 1;
//!     if tick < 3 {
//!         Step::Yielded(())
//!     } else {
//!         Step::Complete(tick)
//!     }
//! })
//! .then(|count| ready(count * 10));
//!
//! let outcome = EventLoop::run(work).expect("loop failed");
//! assert_eq!(outcome, Outcome::Ok(30));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod coro;
pub mod error;
pub mod promise;
pub mod runtime;
pub mod time;
pub mod types;

pub use coro::{from_fn, ready, Coroutine, CoroutineExt, FromFn, Map, Ready, Step, Then};
pub use error::{Error, Result};
pub use promise::{Promise, Wait};
pub use runtime::{EventLoop, LoopConfig, LoopHandle, LoopState};
pub use time::{Clock, Delay, ManualClock, MonotonicClock};
pub use types::{
    join_outcomes, CancelKind, CancelReason, Fault, Outcome, OutcomeError, TaskId, Time,
};
