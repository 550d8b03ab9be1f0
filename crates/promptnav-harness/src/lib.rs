#![forbid(unsafe_code)]

//! Test fixtures for promptnav.
//!
//! - [`fake_host`]: in-memory [`promptnav_core::HostDocument`] and
//!   [`promptnav_core::OverlaySurface`] implementations that record every
//!   scroll, mount, and reconcile.
//! - [`mutation_storm`]: deterministic observer-batch generators for
//!   exercising the debouncer.

pub mod fake_host;
pub mod mutation_storm;

pub use fake_host::{FakeDocument, FakeNodeId, FakeSurface, MountedPanel, ScrollRecord};
pub use mutation_storm::{BurstPattern, MutationStorm};
