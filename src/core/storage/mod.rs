//! Storage layer for editing sessions.
//!
//! Sessions are persisted as JSON documents so that a session's
//! full state, including its revision version, survives restarts.
//!
//! # Session Storage Structure
//!
//! ```text
//! {data_dir}/sessions/
//! ├── .lock
//! ├── {session-id-1}.json
//! └── {session-id-2}.json
//! ```

mod session;

pub use session::{SessionStore, StoreLock};
