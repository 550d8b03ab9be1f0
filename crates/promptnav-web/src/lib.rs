#![forbid(unsafe_code)]

//! Browser binding for promptnav.
//!
//! On `wasm32` this crate boots a [`promptnav_core::SyncSession`] against
//! the live page: it implements the host traits on `web-sys`, observes the
//! chat container with a `MutationObserver`, arms `setTimeout` rebuild
//! timers, and routes document-wide pointer events to the drag/resize
//! controller. The `Navigator` export lets hosts restart the session with a
//! custom JSON configuration or stop it.
//!
//! The helpers below compile everywhere so they can be tested natively.

pub mod clock;
pub mod console_log;
pub mod observer;
pub mod style;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::Navigator;

pub use clock::HostClock;
pub use console_log::{ConsoleMakeWriter, ConsoleMethod};
