#![allow(dead_code)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use carousel::{from_fn, Coroutine, Step};
use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

/// Installs a fmt subscriber once per test binary. Controlled with
/// `RUST_LOG` as usual.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A computation that takes exactly `total` steps (`total - 1` yields,
/// then completion with `total`).
pub fn finite_steps(total: u64) -> impl Coroutine<Yield = (), Return = u64> {
    assert!(total >= 1, "a computation takes at least one step");
    let mut remaining = total;
    from_fn(move |()| {
        remaining -= 1;
        if remaining == 0 {
            Step::Complete(total)
        } else {
            Step::Yielded(())
        }
    })
}

/// A computation that never completes on its own.
pub fn endless() -> impl Coroutine<Yield = (), Return = ()> {
    from_fn(|()| Step::Yielded(()))
}
