//! # warden-runtime — Composition, storage, and scheduling.
//!
//! Wires the Warden subsystems into a running engine:
//! - [`storage::RocksLedger`] — durable point/role storage backed by RocksDB
//! - [`storage::MemoryLedger`] — in-memory store for tests and simulation
//! - [`moderator::Moderator`] — the inbound message/operator pipeline
//! - [`scheduler::RotationScheduler`] — daily anchor-aligned role rotation
//! - [`config::WardenConfig`] — engine configuration

pub mod config;
pub mod media;
pub mod moderator;
pub mod scheduler;
pub mod storage;

pub use config::WardenConfig;
pub use media::HttpMediaFetcher;
pub use moderator::Moderator;
pub use scheduler::RotationScheduler;
pub use storage::{MemoryLedger, RocksLedger};
