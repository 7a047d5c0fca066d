//! Template version store and access gate.
//!
//! Requests flow one way: [`gate::AccessGate`] decides whether the caller may
//! act, [`allocator::VersionAllocator`] assigns the next per-branch version
//! number and commits the snapshot, and [`lifecycle::TemplateLifecycle`]
//! owns the template head record. [`service::Vellum`] wires the three
//! together for callers.

pub mod allocator;
pub mod config;
pub mod error;
pub mod gate;
pub mod identity;
pub mod lifecycle;
pub mod service;
pub mod store;

pub use allocator::{VersionAllocator, VersionRecord};
pub use config::AllocatorConfig;
pub use error::{DenyReason, ErrorKind, Result, VellumError};
pub use gate::{AccessGate, Decision};
pub use service::Vellum;
