//! Debounced autosave with an error/retry state machine.
//!
//! [`AutosaveMachine`] holds the state and is driven with explicit clock
//! readings, so any event loop can run it (the WASM bridge polls it from
//! JS timers). With the `runtime` feature, [`Autosave`] runs the same
//! machine on a tokio task and calls an injected async save function.

mod machine;
#[cfg(feature = "runtime")]
mod driver;

pub use machine::{AutosaveConfig, AutosaveMachine, AutosaveStatus, SaveError};
#[cfg(feature = "runtime")]
pub use driver::{Autosave, SaveFn, SaveFuture};
