//! End-to-end scenario tests for the Warden engine.
//!
//! The tests drive the full pipeline — fingerprint, streak, penalty,
//! lottery — over in-memory collaborators, checking the behaviors a channel
//! actually observes: echo reposts, escalating mutes, role rotations, and
//! the operator-override feedback loop.

pub mod helpers;
