//! The round-robin event loop.
//!
//! The loop owns a ready queue of tasks and repeatedly advances each by
//! one suspension step. A full traversal of the queue is a *pass*: the
//! loop snapshots the queue length, steps each of those tasks exactly
//! once (yielded tasks re-queue at the tail, finished tasks are dropped),
//! and then admits tasks spawned during the pass. It completes when the
//! queue stays empty across a full pass.
//!
//! Round-robin single-step draining gives every ready task a bounded
//! opportunity to progress per pass, producing interleaved output for
//! independently progressing tasks while exactly one computation is ever
//! executing.

use super::config::LoopConfig;
use super::task::{StoredTask, Task, TaskPoll};
use crate::coro::Coroutine;
use crate::error::Error;
use crate::promise::Promise;
use crate::time::{Clock, Delay, MonotonicClock};
use crate::types::{CancelReason, Outcome, TaskId, Time};
use core::fmt;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, trace};

/// Lifecycle state of an [`EventLoop`].
///
/// `Completed` and `Stopped` are terminal: the loop cannot be restarted,
/// and spawns against it settle immediately as cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// Not yet started.
    Idle,
    /// Actively scheduling.
    Running,
    /// All work drained; terminal.
    Completed,
    /// Stopped externally or by policy; terminal.
    Stopped,
}

impl LoopState {
    /// Returns true for the terminal states.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// State shared between the loop and its handles.
struct Shared {
    /// Tasks spawned but not yet admitted to the ready queue.
    spawned: VecDeque<Box<dyn StoredTask>>,
    /// Per-loop task id counter.
    next_task: u64,
    /// The loop's time source.
    clock: Rc<dyn Clock>,
    /// Set once the loop reaches a terminal state.
    closed: bool,
}

/// A cloneable capability for spawning work onto an [`EventLoop`] and
/// reading its clock.
///
/// The handle replaces any notion of a process-wide "current loop": code
/// that needs to spawn from inside a task captures a handle explicitly
/// when the task is built.
pub struct LoopHandle {
    shared: Rc<RefCell<Shared>>,
}

impl LoopHandle {
    /// Schedules `work` as a new task and returns the promise it settles.
    ///
    /// The task is admitted to the ready queue at the next pass boundary.
    /// If the loop already terminated, the promise comes back cancelled
    /// (shutdown reason) instead of queueing work that can never run.
    pub fn spawn<C, T>(&self, work: C) -> Promise<T>
    where
        C: Coroutine<Yield = (), Return = T> + 'static,
        T: 'static,
    {
        let mut shared = self.shared.borrow_mut();
        let id = TaskId::new(shared.next_task);
        shared.next_task += 1;

        let promise = Promise::new();
        if shared.closed {
            debug!(task = %id, "spawn on terminated loop; cancelling immediately");
            promise.cancel(CancelReason::shutdown());
        } else {
            shared
                .spawned
                .push_back(Box::new(Task::new(id, work, promise.clone())));
            trace!(task = %id, "task spawned");
        }
        promise
    }

    /// Returns a [`Delay`] driven by the loop's clock.
    #[must_use]
    pub fn delay(&self, duration: Duration) -> Delay {
        Delay::new(self.clock(), duration)
    }

    /// Returns the loop's clock.
    #[must_use]
    pub fn clock(&self) -> Rc<dyn Clock> {
        Rc::clone(&self.shared.borrow().clock)
    }

    /// Returns the current time on the loop's clock.
    #[must_use]
    pub fn now(&self) -> Time {
        self.shared.borrow().clock.now()
    }
}

impl Clone for LoopHandle {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl fmt::Debug for LoopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("LoopHandle")
            .field("pending_spawns", &shared.spawned.len())
            .field("closed", &shared.closed)
            .finish()
    }
}

/// A single-threaded cooperative task scheduler.
///
/// See the [module docs](self) for the scheduling model. The loop is not
/// a singleton: any number of loops can coexist, each owning its tasks.
///
/// A task is in the ready queue at most once at any instant: the loop
/// moves a task out of the queue while stepping it, so a task can never
/// be scheduled twice in one pass.
pub struct EventLoop {
    config: LoopConfig,
    state: LoopState,
    ready: VecDeque<Box<dyn StoredTask>>,
    shared: Rc<RefCell<Shared>>,
    passes: u64,
    steps: u64,
}

impl EventLoop {
    /// Creates a loop with the default configuration and a monotonic
    /// clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    /// Creates a loop with the given configuration and a monotonic clock.
    #[must_use]
    pub fn with_config(config: LoopConfig) -> Self {
        Self::with_clock(config, Rc::new(MonotonicClock::new()))
    }

    /// Creates a loop with the given configuration and clock.
    ///
    /// Tests pass a [`ManualClock`](crate::time::ManualClock) here to make
    /// time-dependent scheduling deterministic.
    #[must_use]
    pub fn with_clock(config: LoopConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            config,
            state: LoopState::Idle,
            ready: VecDeque::new(),
            shared: Rc::new(RefCell::new(Shared {
                spawned: VecDeque::new(),
                next_task: 0,
                clock,
                closed: false,
            })),
            passes: 0,
            steps: 0,
        }
    }

    /// Returns a cloneable handle for spawning onto this loop.
    #[must_use]
    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            shared: Rc::clone(&self.shared),
        }
    }

    /// Schedules `work` as a new task and returns the promise it settles.
    ///
    /// Equivalent to `self.handle().spawn(work)`.
    pub fn spawn<C, T>(&self, work: C) -> Promise<T>
    where
        C: Coroutine<Yield = (), Return = T> + 'static,
        T: 'static,
    {
        self.handle().spawn(work)
    }

    /// Returns the loop's lifecycle state.
    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Returns the number of completed scheduling passes.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Returns the number of task steps executed.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Returns the number of tasks waiting to run (ready plus not yet
    /// admitted).
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.ready.len() + self.shared.borrow().spawned.len()
    }

    /// Returns the current time on the loop's clock.
    #[must_use]
    pub fn now(&self) -> Time {
        self.shared.borrow().clock.now()
    }

    /// Runs scheduling passes until the ready queue stays empty across a
    /// full pass, then transitions to `Completed`.
    ///
    /// A task-body failure propagates immediately as
    /// [`Error::TaskFailed`], leaving the loop `Running` with the
    /// remaining tasks queued: the caller decides between calling this
    /// again to keep going and [`EventLoop::stop`] to cancel the rest.
    pub fn run_until_complete(&mut self) -> Result<(), Error> {
        loop {
            self.run_pass()?;
            if self.state.is_terminal() {
                return Ok(());
            }
        }
    }

    /// Executes a single scheduling pass.
    ///
    /// Admits spawned tasks, then gives each task that was ready at the
    /// start of the pass exactly one step, then admits tasks spawned
    /// during the pass. If the queue is empty the loop transitions to
    /// `Completed` instead. Returns [`Error::LoopTerminated`] when called
    /// on a finished loop.
    pub fn run_pass(&mut self) -> Result<(), Error> {
        if self.state.is_terminal() {
            return Err(Error::LoopTerminated { state: self.state });
        }
        self.state = LoopState::Running;
        self.admit_spawned();

        if self.ready.is_empty() {
            debug!(passes = self.passes, steps = self.steps, "event loop completed");
            self.finish(LoopState::Completed);
            return Ok(());
        }

        if let Some(limit) = self.config.max_passes {
            if self.passes >= limit {
                let remaining = self.pending_tasks();
                debug!(limit, remaining, "pass budget exhausted; cancelling remaining tasks");
                self.close_all(&CancelReason::starved());
                self.finish(LoopState::Stopped);
                return Err(Error::PassBudgetExhausted { limit, remaining });
            }
        }

        self.passes += 1;
        let scheduled = self.ready.len();
        trace!(pass = self.passes, ready = scheduled, "pass started");

        for _ in 0..scheduled {
            let Some(mut task) = self.ready.pop_front() else {
                break;
            };
            self.steps += 1;
            match task.step() {
                Ok(TaskPoll::Yielded) => self.ready.push_back(task),
                Ok(TaskPoll::Finished) => {}
                Err(error) => return Err(error),
            }
        }

        self.admit_spawned();
        Ok(())
    }

    /// Stops the loop: closes every remaining task (spawn queue included)
    /// with a shutdown cancellation, clears both queues, and transitions
    /// to `Stopped`. Idempotent.
    pub fn stop(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        let remaining = self.pending_tasks();
        debug!(remaining, "event loop stopped");
        self.close_all(&CancelReason::shutdown());
        self.finish(LoopState::Stopped);
    }

    /// Builds a loop, spawns `work`, runs to completion, and returns the
    /// task's outcome.
    ///
    /// On failure the remaining tasks are stopped before the error is
    /// returned.
    pub fn run<C, T>(work: C) -> Result<Outcome<T>, Error>
    where
        C: Coroutine<Yield = (), Return = T> + 'static,
        T: Clone + 'static,
    {
        let mut event_loop = Self::new();
        let promise = event_loop.spawn(work);
        if let Err(error) = event_loop.run_until_complete() {
            event_loop.stop();
            return Err(error);
        }
        promise
            .outcome()
            .ok_or(Error::Internal("root task left its promise pending"))
    }

    /// Moves tasks from the spawn queue into the ready queue, preserving
    /// spawn order.
    fn admit_spawned(&mut self) {
        let mut shared = self.shared.borrow_mut();
        while let Some(task) = shared.spawned.pop_front() {
            self.ready.push_back(task);
        }
    }

    fn close_all(&mut self, reason: &CancelReason) {
        // Mark the loop closed and detach the spawn queue before running
        // any close handler, so a spawn attempted from inside one settles
        // as cancelled instead of re-entering the queue mid-teardown.
        let detached: Vec<Box<dyn StoredTask>> = {
            let mut shared = self.shared.borrow_mut();
            shared.closed = true;
            shared.spawned.drain(..).collect()
        };
        for mut task in self.ready.drain(..) {
            task.close(reason);
        }
        for mut task in detached {
            task.close(reason);
        }
    }

    fn finish(&mut self, state: LoopState) {
        self.shared.borrow_mut().closed = true;
        self.state = state;
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("state", &self.state)
            .field("pending_tasks", &self.pending_tasks())
            .field("passes", &self.passes)
            .field("steps", &self.steps)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coro::{from_fn, ready, Step};
    use crate::types::CancelKind;

    #[test]
    fn empty_loop_completes_immediately() {
        let mut event_loop = EventLoop::new();
        assert_eq!(event_loop.state(), LoopState::Idle);

        event_loop.run_until_complete().expect("empty run");
        assert_eq!(event_loop.state(), LoopState::Completed);
        assert_eq!(event_loop.passes(), 0);
    }

    #[test]
    fn run_on_terminated_loop_is_an_error() {
        let mut event_loop = EventLoop::new();
        event_loop.run_until_complete().expect("empty run");

        assert_eq!(
            event_loop.run_pass(),
            Err(Error::LoopTerminated {
                state: LoopState::Completed
            })
        );
    }

    #[test]
    fn spawn_queues_until_pass_boundary() {
        let event_loop = EventLoop::new();
        let _promise = event_loop.spawn(ready(1));
        assert_eq!(event_loop.pending_tasks(), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut event_loop = EventLoop::new();
        let promise = event_loop.spawn(from_fn(|()| Step::<(), u32>::Yielded(())));

        event_loop.stop();
        event_loop.stop();
        assert_eq!(event_loop.state(), LoopState::Stopped);
        assert_eq!(event_loop.pending_tasks(), 0);
        assert!(matches!(
            promise.outcome(),
            Some(Outcome::Cancelled(reason)) if reason.kind == CancelKind::Shutdown
        ));
    }

    #[test]
    fn spawn_after_termination_settles_cancelled() {
        let mut event_loop = EventLoop::new();
        event_loop.stop();

        let promise = event_loop.spawn(ready(1));
        assert!(matches!(
            promise.outcome(),
            Some(Outcome::Cancelled(reason)) if reason.is_shutdown()
        ));
        assert_eq!(event_loop.pending_tasks(), 0);
    }

    #[test]
    fn debug_output_is_compact() {
        let event_loop = EventLoop::new();
        let rendered = format!("{event_loop:?}");
        assert!(rendered.contains("state: Idle"));
    }
}
