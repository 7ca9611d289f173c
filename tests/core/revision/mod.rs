//! Revision controller tests
//!
//! Session creation, text and strategy edits, chunk metadata and
//! concurrent writers racing on the same version.

mod test_edits;
mod test_sessions;
