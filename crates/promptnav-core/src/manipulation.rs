#![forbid(unsafe_code)]

//! Drag and resize state machine for the panel shell.
//!
//! The controller is a pure function of pointer samples: it never touches the
//! host. Hosts forward pointer-down from the panel's handles and pointer-move /
//! pointer-up from document-wide listeners, then apply the returned geometry.
//!
//! - one active pointer at a time,
//! - drag keeps the grab offset between pointer and panel corner, unclamped,
//! - resize adds the pointer delta to the size recorded at pointer-down,
//!   clamped to [`SizeLimits`].

use tracing::trace;

use crate::geometry::{PanelGeometry, PanelPosition, PanelSize, PointerPosition, SizeLimits};

/// Where a pointer-down landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManipulationRegion {
    /// The panel header.
    DragHandle,
    /// The resize corner.
    ResizeHandle,
    /// Anywhere else, including the item list.
    Outside,
}

/// Interaction currently in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManipulationState {
    Idle,
    Dragging {
        pointer_id: u32,
        /// Pointer minus panel top-left at pointer-down.
        offset: PointerPosition,
    },
    Resizing {
        pointer_id: u32,
        origin: PointerPosition,
        start_size: PanelSize,
    },
}

impl ManipulationState {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    const fn pointer_id(&self) -> Option<u32> {
        match self {
            Self::Idle => None,
            Self::Dragging { pointer_id, .. } | Self::Resizing { pointer_id, .. } => {
                Some(*pointer_id)
            }
        }
    }
}

/// Lifecycle phase of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManipulationPhase {
    PointerDown,
    PointerMove,
    PointerUp,
    Cancel,
}

/// Why a pointer signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManipulationIgnoredReason {
    OutsideHandle,
    InteractionInProgress,
    NoActiveInteraction,
    PointerMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManipulationOutcome {
    Started,
    GeometryUpdated,
    Ended,
    Ignored(ManipulationIgnoredReason),
}

/// Result of one pointer dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulationDispatch {
    pub phase: ManipulationPhase,
    pub pointer_id: Option<u32>,
    /// New shell geometry to apply, when it changed.
    pub geometry: Option<PanelGeometry>,
    pub outcome: ManipulationOutcome,
}

impl ManipulationDispatch {
    const fn ignored(
        phase: ManipulationPhase,
        pointer_id: Option<u32>,
        reason: ManipulationIgnoredReason,
    ) -> Self {
        Self {
            phase,
            pointer_id,
            geometry: None,
            outcome: ManipulationOutcome::Ignored(reason),
        }
    }

    #[must_use]
    pub const fn accepted(&self) -> bool {
        !matches!(self.outcome, ManipulationOutcome::Ignored(_))
    }
}

/// Drag/resize controller for one panel shell.
#[derive(Debug, Clone)]
pub struct ManipulationController {
    state: ManipulationState,
    limits: SizeLimits,
    /// Geometry captured at pointer-down; moves are computed against it.
    base: PanelGeometry,
}

impl ManipulationController {
    #[must_use]
    pub fn new(limits: SizeLimits) -> Self {
        Self {
            state: ManipulationState::Idle,
            limits,
            base: PanelGeometry::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> ManipulationState {
        self.state
    }

    /// Start a drag or resize. `geometry` is the panel as currently rendered.
    pub fn pointer_down(
        &mut self,
        region: ManipulationRegion,
        pointer_id: u32,
        pointer: PointerPosition,
        geometry: PanelGeometry,
    ) -> ManipulationDispatch {
        let phase = ManipulationPhase::PointerDown;
        if self.state.is_active() {
            return self.log(ManipulationDispatch::ignored(
                phase,
                Some(pointer_id),
                ManipulationIgnoredReason::InteractionInProgress,
            ));
        }
        self.state = match region {
            ManipulationRegion::DragHandle => ManipulationState::Dragging {
                pointer_id,
                offset: PointerPosition::new(
                    pointer.x - geometry.position.x,
                    pointer.y - geometry.position.y,
                ),
            },
            ManipulationRegion::ResizeHandle => ManipulationState::Resizing {
                pointer_id,
                origin: pointer,
                start_size: geometry.size,
            },
            ManipulationRegion::Outside => {
                return self.log(ManipulationDispatch::ignored(
                    phase,
                    Some(pointer_id),
                    ManipulationIgnoredReason::OutsideHandle,
                ));
            }
        };
        self.base = geometry;
        self.log(ManipulationDispatch {
            phase,
            pointer_id: Some(pointer_id),
            geometry: None,
            outcome: ManipulationOutcome::Started,
        })
    }

    /// Track the pointer while an interaction is open.
    pub fn pointer_move(
        &mut self,
        pointer_id: u32,
        pointer: PointerPosition,
    ) -> ManipulationDispatch {
        let phase = ManipulationPhase::PointerMove;
        if let Some(reason) = self.reject(pointer_id) {
            return self.log(ManipulationDispatch::ignored(phase, Some(pointer_id), reason));
        }
        let geometry = match self.state {
            ManipulationState::Dragging { offset, .. } => self.base.with_position(
                PanelPosition::new(pointer.x - offset.x, pointer.y - offset.y),
            ),
            ManipulationState::Resizing {
                origin, start_size, ..
            } => self.base.with_size(self.limits.clamp(PanelSize::new(
                start_size.width + (pointer.x - origin.x),
                start_size.height + (pointer.y - origin.y),
            ))),
            ManipulationState::Idle => {
                return self.log(ManipulationDispatch::ignored(
                    phase,
                    Some(pointer_id),
                    ManipulationIgnoredReason::NoActiveInteraction,
                ));
            }
        };
        self.base = geometry;
        self.log(ManipulationDispatch {
            phase,
            pointer_id: Some(pointer_id),
            geometry: Some(geometry),
            outcome: ManipulationOutcome::GeometryUpdated,
        })
    }

    /// End the interaction owned by `pointer_id`.
    pub fn pointer_up(&mut self, pointer_id: u32) -> ManipulationDispatch {
        let phase = ManipulationPhase::PointerUp;
        if let Some(reason) = self.reject(pointer_id) {
            return self.log(ManipulationDispatch::ignored(phase, Some(pointer_id), reason));
        }
        self.state = ManipulationState::Idle;
        self.log(ManipulationDispatch {
            phase,
            pointer_id: Some(pointer_id),
            geometry: None,
            outcome: ManipulationOutcome::Ended,
        })
    }

    /// Abort any interaction (blur, lost capture, panel discarded).
    pub fn cancel(&mut self) -> ManipulationDispatch {
        let pointer_id = self.state.pointer_id();
        if !self.state.is_active() {
            return ManipulationDispatch::ignored(
                ManipulationPhase::Cancel,
                None,
                ManipulationIgnoredReason::NoActiveInteraction,
            );
        }
        self.state = ManipulationState::Idle;
        self.log(ManipulationDispatch {
            phase: ManipulationPhase::Cancel,
            pointer_id,
            geometry: None,
            outcome: ManipulationOutcome::Ended,
        })
    }

    fn reject(&self, pointer_id: u32) -> Option<ManipulationIgnoredReason> {
        match self.state.pointer_id() {
            None => Some(ManipulationIgnoredReason::NoActiveInteraction),
            Some(active) if active != pointer_id => {
                Some(ManipulationIgnoredReason::PointerMismatch)
            }
            Some(_) => None,
        }
    }

    fn log(&self, dispatch: ManipulationDispatch) -> ManipulationDispatch {
        trace!(
            phase = ?dispatch.phase,
            pointer_id = ?dispatch.pointer_id,
            outcome = ?dispatch.outcome,
            "manipulation dispatch"
        );
        dispatch
    }
}

impl Default for ManipulationController {
    fn default() -> Self {
        Self::new(SizeLimits::default())
    }
}
