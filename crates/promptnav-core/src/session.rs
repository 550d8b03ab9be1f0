#![forbid(unsafe_code)]

//! The synchronization session.
//!
//! [`SyncSession`] is constructed once per page and owns everything that must
//! outlive a single rebuild: configuration, the extraction strategy, the
//! scheduler, the drag/resize controller, and the panel shell. Hosts drive it:
//!
//! 1. [`SyncSession::start`] locates the observed container and arms the
//!    settle timer.
//! 2. Observer batches go to [`SyncSession::notify_mutations`]; a returned
//!    delay means "arm a timer".
//! 3. Timer callbacks call [`SyncSession::poll`], which runs at most one
//!    rebuild.
//! 4. Pointer events go to the `pointer_*` methods.
//!
//! No method returns an error or panics on host trouble; failures become
//! [`RebuildOutcome`] values and log lines, and the panel is left stale or
//! absent until the next trigger.

use core::time::Duration;

use tracing::{debug, warn};

use crate::config::NavigatorConfig;
use crate::error::NavError;
use crate::extractor::MessageExtractor;
use crate::geometry::{PanelGeometry, PointerPosition};
use crate::host::{HostDocument, OverlaySurface, ScrollOptions};
use crate::manipulation::{ManipulationController, ManipulationDispatch, ManipulationRegion};
use crate::panel::{PanelBuilder, PanelShell, RebuildOutcome};
use crate::scheduler::{MutationRecord, RebuildScheduler, SchedulerSignal};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    /// `observing` is false when the container was missing at start; only the
    /// initial rebuild will run.
    Running { observing: bool },
    Stopped,
}

/// What [`SyncSession::start`] found.
#[derive(Debug, Clone, PartialEq)]
pub struct StartReport<N> {
    /// Container the host must observe, if it exists.
    pub container: Option<N>,
    /// Deadline of the initial settle rebuild.
    pub initial_due: Duration,
    /// Delay the host should arm its settle timer for.
    pub initial_delay: Duration,
}

/// Keeps the overlay in sync with the host document.
#[derive(Debug)]
pub struct SyncSession<E, H> {
    config: NavigatorConfig,
    extractor: E,
    builder: PanelBuilder,
    scheduler: RebuildScheduler,
    controller: ManipulationController,
    shell: PanelShell,
    state: SessionState,
    /// Scroll targets of the items currently shown, in list order.
    targets: Vec<H>,
}

impl<E, H: Clone> SyncSession<E, H> {
    pub fn new(config: NavigatorConfig, extractor: E) -> Self {
        Self {
            builder: PanelBuilder::from_config(&config),
            scheduler: RebuildScheduler::new(config.settle_delay(), config.debounce_window()),
            controller: ManipulationController::new(config.size_limits),
            shell: PanelShell::new(config.initial_geometry),
            state: SessionState::Created,
            targets: Vec::new(),
            extractor,
            config,
        }
    }

    /// Bind to the host container and arm the initial rebuild.
    ///
    /// A missing container is a degradation, not an error: the session runs
    /// the initial rebuild only. Calling `start` again re-arms the settle
    /// timer and looks the container up afresh.
    pub fn start<D>(&mut self, doc: &D, now: Duration) -> StartReport<D::Node>
    where
        D: HostDocument<Node = H>,
    {
        let container = doc.query_first(&self.config.container_selector);
        if container.is_none() {
            warn!(
                selector = %self.config.container_selector,
                "host container not found; mutation observation disabled"
            );
        }
        let initial_due = self.scheduler.arm_initial(now);
        self.state = SessionState::Running {
            observing: container.is_some(),
        };
        debug!(
            observing = container.is_some(),
            initial_due = ?initial_due,
            "sync session started"
        );
        StartReport {
            container,
            initial_due,
            initial_delay: self.config.settle_delay(),
        }
    }

    /// Feed an observer batch. Returns the delay to arm a timer for when a
    /// new rebuild was scheduled.
    pub fn notify_mutations(
        &mut self,
        records: &[MutationRecord],
        now: Duration,
    ) -> Option<Duration> {
        if self.state != (SessionState::Running { observing: true }) {
            return None;
        }
        match self.scheduler.on_mutations(records, now) {
            SchedulerSignal::Scheduled { due, delay } => {
                debug!(due = ?due, "rebuild scheduled");
                Some(delay)
            }
            SchedulerSignal::Coalesced { .. } | SchedulerSignal::Ignored => None,
        }
    }

    /// Run the due rebuild, if any.
    pub fn poll<D, S>(&mut self, now: Duration, doc: &D, surface: &mut S) -> Option<RebuildOutcome>
    where
        D: HostDocument<Node = H>,
        S: OverlaySurface<H>,
        E: MessageExtractor<D>,
    {
        if !matches!(self.state, SessionState::Running { .. }) {
            return None;
        }
        let trigger = self.scheduler.poll(now)?;
        debug!(trigger = ?trigger, "rebuild fired");
        Some(self.rebuild_now(doc, surface))
    }

    /// Extract and rebuild immediately, outside the scheduler.
    pub fn rebuild_now<D, S>(&mut self, doc: &D, surface: &mut S) -> RebuildOutcome
    where
        D: HostDocument<Node = H>,
        S: OverlaySurface<H>,
        E: MessageExtractor<D>,
    {
        let messages = self.extractor.extract(doc);
        let outcome = match self.builder.rebuild(surface, &messages, &mut self.shell) {
            Ok(outcome) => outcome,
            Err(NavError::MountTargetUnavailable) => {
                debug!("document body unavailable; rebuild deferred to next trigger");
                RebuildOutcome::SkippedMountUnavailable
            }
            Err(err) => {
                warn!(error = %err, "panel mount failed");
                RebuildOutcome::Failed(err)
            }
        };
        match outcome {
            RebuildOutcome::Mounted { .. } | RebuildOutcome::Reconciled { .. } => {
                self.targets = messages.into_iter().map(|m| m.source_handle).collect();
                if !self.builder.carries_over_geometry() {
                    self.controller.cancel();
                }
            }
            RebuildOutcome::SkippedEmpty => {
                debug!("no user messages; panel left as is");
            }
            RebuildOutcome::SkippedMountUnavailable | RebuildOutcome::Failed(_) => {}
        }
        outcome
    }

    /// Scroll the source node of item `index` into view.
    pub fn activate<D>(&self, index: usize, doc: &D) -> bool
    where
        D: HostDocument<Node = H>,
    {
        match self.targets.get(index) {
            Some(node) => {
                doc.scroll_into_view(node, ScrollOptions::default());
                true
            }
            None => false,
        }
    }

    /// Pointer-down on the panel. `rendered` is the panel's measured geometry,
    /// when the host can provide it.
    pub fn pointer_down(
        &mut self,
        region: ManipulationRegion,
        pointer_id: u32,
        pointer: PointerPosition,
        rendered: Option<PanelGeometry>,
    ) -> ManipulationDispatch {
        if let Some(geometry) = rendered {
            self.shell.set_geometry(geometry);
        }
        self.controller
            .pointer_down(region, pointer_id, pointer, self.shell.geometry())
    }

    /// Document-wide pointer-move; pushes changed geometry to the surface.
    pub fn pointer_move<S>(
        &mut self,
        pointer_id: u32,
        pointer: PointerPosition,
        surface: &mut S,
    ) -> ManipulationDispatch
    where
        S: OverlaySurface<H>,
    {
        let dispatch = self.controller.pointer_move(pointer_id, pointer);
        if let Some(geometry) = dispatch.geometry {
            self.shell.set_geometry(geometry);
            if self.shell.is_mounted() {
                surface.apply_geometry(self.builder.panel_id(), geometry);
            }
        }
        dispatch
    }

    /// Document-wide pointer-up.
    pub fn pointer_up(&mut self, pointer_id: u32) -> ManipulationDispatch {
        self.controller.pointer_up(pointer_id)
    }

    /// Abort any drag or resize in progress.
    pub fn cancel_interaction(&mut self) -> ManipulationDispatch {
        self.controller.cancel()
    }

    /// Cancel pending work and remove the panel.
    pub fn stop<S>(&mut self, surface: &mut S)
    where
        S: OverlaySurface<H>,
    {
        self.scheduler.cancel_all();
        self.controller.cancel();
        if self.shell.is_mounted() {
            surface.remove_panel(self.builder.panel_id());
            self.shell.mark_unmounted();
        }
        self.targets.clear();
        self.state = SessionState::Stopped;
        debug!("sync session stopped");
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn shell(&self) -> &PanelShell {
        &self.shell
    }

    #[must_use]
    pub const fn scheduler(&self) -> &RebuildScheduler {
        &self.scheduler
    }

    #[must_use]
    pub const fn controller(&self) -> &ManipulationController {
        &self.controller
    }

    #[must_use]
    pub const fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Earliest pending rebuild deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Number of items in the panel as last rebuilt.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.targets.len()
    }

    /// Scroll targets of the current items.
    #[must_use]
    pub fn targets(&self) -> &[H] {
        &self.targets
    }
}
