#![forbid(unsafe_code)]

//! Panel building and reconciliation.
//!
//! The panel is split in two halves:
//! - the **shell** (container, title, resize corner, geometry), which lives as
//!   long as the host leaves it attached, and
//! - the **items** (one button per user message), which are rebuilt from
//!   fresh extraction data every time.
//!
//! When geometry carry-over is enabled and the shell is still attached, a
//! rebuild only swaps the item list. Otherwise any panel carrying the
//! identifier is removed before a fresh shell is mounted, so the document
//! never holds two panels.

use tracing::{debug, warn};

use crate::config::NavigatorConfig;
use crate::error::NavError;
use crate::geometry::PanelGeometry;
use crate::host::OverlaySurface;
use crate::message::MessageRecord;

/// One actionable entry of the panel list.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelItem<H> {
    /// Position in the list (and in document order).
    pub index: usize,
    /// Button text: the full prompt, truncation is left to styling.
    pub label: String,
    /// Hover text carrying the full prompt.
    pub tooltip: String,
    /// Node scrolled into view on activation.
    pub target: H,
}

/// Everything needed to mount a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView<H> {
    pub panel_id: String,
    pub title: String,
    pub items: Vec<PanelItem<H>>,
    /// Whether the resize corner is rendered.
    pub resizable: bool,
}

/// Mount state and geometry of the panel shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelShell {
    mounted: bool,
    geometry: PanelGeometry,
}

impl PanelShell {
    #[must_use]
    pub const fn new(geometry: PanelGeometry) -> Self {
        Self {
            mounted: false,
            geometry,
        }
    }

    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub const fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    pub fn set_geometry(&mut self, geometry: PanelGeometry) {
        self.geometry = geometry;
    }

    pub fn mark_unmounted(&mut self) {
        self.mounted = false;
    }
}

/// Result of one rebuild attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RebuildOutcome {
    /// A fresh shell was mounted after removing `removed` stale panels.
    Mounted { items: usize, removed: usize },
    /// The attached shell kept its geometry; only items were replaced.
    Reconciled { items: usize },
    /// No user messages: nothing was touched, any prior panel stays as is.
    SkippedEmpty,
    /// The document body is not there yet; the next trigger retries.
    SkippedMountUnavailable,
    /// The host rejected the mount; the next trigger retries.
    Failed(NavError),
}

impl RebuildOutcome {
    /// Number of items now shown, if the panel was touched.
    #[must_use]
    pub const fn items(&self) -> Option<usize> {
        match self {
            Self::Mounted { items, .. } | Self::Reconciled { items } => Some(*items),
            _ => None,
        }
    }
}

/// Builds the overlay from extracted messages.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelBuilder {
    panel_id: String,
    title: String,
    initial_geometry: PanelGeometry,
    carry_over_geometry: bool,
}

impl PanelBuilder {
    #[must_use]
    pub fn from_config(config: &NavigatorConfig) -> Self {
        Self {
            panel_id: config.panel_id.clone(),
            title: config.title.clone(),
            initial_geometry: config.initial_geometry,
            carry_over_geometry: config.carry_over_geometry,
        }
    }

    #[must_use]
    pub fn panel_id(&self) -> &str {
        &self.panel_id
    }

    #[must_use]
    pub const fn carries_over_geometry(&self) -> bool {
        self.carry_over_geometry
    }

    /// Describe the panel for `messages`, one item per message in order.
    #[must_use]
    pub fn build<H: Clone>(&self, messages: &[MessageRecord<H>]) -> PanelView<H> {
        PanelView {
            panel_id: self.panel_id.clone(),
            title: self.title.clone(),
            items: build_items(messages),
            resizable: true,
        }
    }

    /// Bring the overlay in line with `messages`.
    ///
    /// Empty input is a no-op. A missing mount target is reported before the
    /// document is touched, so a stale panel is never removed without a
    /// replacement.
    pub fn rebuild<H, S>(
        &self,
        surface: &mut S,
        messages: &[MessageRecord<H>],
        shell: &mut PanelShell,
    ) -> Result<RebuildOutcome, NavError>
    where
        H: Clone,
        S: OverlaySurface<H>,
    {
        if messages.is_empty() {
            return Ok(RebuildOutcome::SkippedEmpty);
        }
        if !surface.body_available() {
            return Err(NavError::MountTargetUnavailable);
        }

        if self.carry_over_geometry && shell.mounted && surface.panel_present(&self.panel_id) {
            let items = build_items(messages);
            match surface.replace_items(&self.panel_id, &items) {
                Ok(()) => {
                    return Ok(RebuildOutcome::Reconciled { items: items.len() });
                }
                Err(err) => {
                    warn!(error = %err, "item reconcile failed; remounting panel");
                }
            }
        }

        let view = self.build(messages);
        let removed = surface.remove_panel(&self.panel_id);
        shell.mounted = false;
        if !self.carry_over_geometry {
            shell.geometry = self.initial_geometry;
        }
        surface.mount_panel(&view, shell.geometry)?;
        shell.mounted = true;
        debug!(
            panel_id = %self.panel_id,
            items = view.items.len(),
            removed,
            "panel mounted"
        );
        Ok(RebuildOutcome::Mounted {
            items: view.items.len(),
            removed,
        })
    }
}

fn build_items<H: Clone>(messages: &[MessageRecord<H>]) -> Vec<PanelItem<H>> {
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| PanelItem {
            index,
            label: message.display_text.clone(),
            tooltip: message.display_text.clone(),
            target: message.source_handle.clone(),
        })
        .collect()
}
