#![forbid(unsafe_code)]

//! Synchronization engine for the promptnav navigation overlay.
//!
//! # Role in promptnav
//! `promptnav-core` keeps a floating panel of prompt shortcuts in sync with a
//! chat document the crate does not own. It never touches a real DOM: the
//! embedding host implements [`host::HostDocument`] (read side) and
//! [`host::OverlaySurface`] (write side), pushes mutation summaries, and
//! advances time explicitly.
//!
//! # Primary responsibilities
//! - **Extraction**: [`extractor::MessageExtractor`] turns the host document
//!   into ordered [`message::MessageRecord`] values.
//! - **Panel building**: [`panel::PanelBuilder`] mounts or reconciles the
//!   single overlay panel.
//! - **Direct manipulation**: [`manipulation::ManipulationController`] turns
//!   pointer samples into drag/resize geometry updates.
//! - **Scheduling**: [`scheduler::RebuildScheduler`] coalesces mutation bursts
//!   into one debounced rebuild.
//! - **Session**: [`session::SyncSession`] ties the above together with an
//!   explicit start/stop lifecycle.
//!
//! # Determinism
//! No threads, no sleeping, no wall clock. Every time-dependent operation
//! takes `now: Duration` from the host, which keeps the engine usable on
//! `wasm32-unknown-unknown` and trivially testable natively.

pub mod config;
pub mod error;
pub mod extractor;
pub mod geometry;
pub mod host;
pub mod manipulation;
pub mod message;
pub mod panel;
pub mod scheduler;
pub mod session;

pub use config::NavigatorConfig;
pub use error::NavError;
pub use extractor::{ExtractionReport, MessageExtractor, SelectorExtractor};
pub use geometry::{PanelGeometry, PanelPosition, PanelSize, PointerPosition, SizeLimits};
pub use host::{HostDocument, OverlaySurface, ScrollBehavior, ScrollBlock, ScrollOptions};
pub use manipulation::{
    ManipulationController, ManipulationDispatch, ManipulationIgnoredReason, ManipulationOutcome,
    ManipulationPhase, ManipulationRegion, ManipulationState,
};
pub use message::{AuthorRole, MessageRecord};
pub use panel::{PanelBuilder, PanelItem, PanelShell, PanelView, RebuildOutcome};
pub use scheduler::{
    DebounceSignal, Debouncer, MutationKind, MutationRecord, RebuildScheduler, RebuildTrigger,
    SchedulerSignal, SchedulerState,
};
pub use session::{SessionState, StartReport, SyncSession};
