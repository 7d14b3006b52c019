//! Session runtime over the deterministic combat core.
//!
//! This crate hosts live game instances: it wires the content bundle into
//! `nightfall-core`, owns per-session state, and persists snapshots between
//! rounds. Rule decisions never happen here; the runtime only sequences
//! calls into the engine and records what came back.

pub mod error;
pub mod session;
pub mod store;

pub use error::{Result, SessionError, StoreError};
pub use session::{GameSession, SessionSnapshot};
pub use store::SessionStore;
