//! Run a closure on its own thread and pick up the result later.
//!
//! [`run`] wraps a closure in a [`TaskFuture`], which is consumed in one of
//! three ways:
//!
//! ```rust,no_run
//! use tether::event_loop::Scope;
//!
//! // Block: run inline on this thread.
//! let sum = tether::run(|| 1 + 1).get();
//!
//! // Continue: run on a worker thread, call back on this thread.
//! let scope = Scope::new();
//! let done = scope.clone();
//! tether::run(move || sum * 21).then(move |answer| {
//!     assert_eq!(answer, 42);
//!     done.exit();
//! });
//! scope.exec();
//!
//! // Suspend: keep servicing this thread's event loop until the value arrives.
//! let greeting = tether::wait(|| "hello".to_string());
//! assert_eq!(greeting, "hello");
//! ```
//!
//! Continuations are delivered by the per-thread [`event_loop`], so a thread
//! that uses `then` has to run a [`Scope`](event_loop::Scope) or call
//! [`event_loop::process_events`] for them to fire.

pub mod runtime;

pub use runtime::*;

pub use tether_macros::*;
