#![forbid(unsafe_code)]

//! Host seams.
//!
//! The engine reads the chat document through [`HostDocument`] and writes the
//! overlay through [`OverlaySurface`]. The `wasm32` binding implements both on
//! `web-sys`; tests implement them in memory.

use crate::error::NavError;
use crate::geometry::PanelGeometry;
use crate::panel::{PanelItem, PanelView};

/// How a scroll animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

/// Vertical alignment of the scrolled node in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBlock {
    Start,
    #[default]
    Center,
    End,
    Nearest,
}

/// Options for [`HostDocument::scroll_into_view`]; defaults to a smooth,
/// centered scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollOptions {
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

/// Read access to the host document.
///
/// Implementations must query live state on every call and must not fail:
/// a selector the host cannot evaluate yields no nodes.
pub trait HostDocument {
    /// Live handle to a host node.
    type Node: Clone + core::fmt::Debug;

    /// All nodes matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;

    /// First node matching `selector`.
    fn query_first(&self, selector: &str) -> Option<Self::Node>;

    /// Attribute value of `node`.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Rendered text of the first descendant of `node` matching `selector`.
    fn query_text(&self, node: &Self::Node, selector: &str) -> Option<String>;

    /// Scroll `node` into view at its current position.
    fn scroll_into_view(&self, node: &Self::Node, options: ScrollOptions);
}

/// Write access to the overlay, keyed by the panel identifier.
pub trait OverlaySurface<H> {
    /// Whether the mount target (document body) exists.
    fn body_available(&self) -> bool;

    /// Whether a panel with `panel_id` is currently attached.
    fn panel_present(&self, panel_id: &str) -> bool;

    /// Remove every panel carrying `panel_id`; returns how many were removed.
    fn remove_panel(&mut self, panel_id: &str) -> usize;

    /// Build and attach a fresh panel shell with its items.
    fn mount_panel(&mut self, view: &PanelView<H>, geometry: PanelGeometry)
    -> Result<(), NavError>;

    /// Replace the item list inside an attached panel, leaving the shell alone.
    fn replace_items(&mut self, panel_id: &str, items: &[PanelItem<H>]) -> Result<(), NavError>;

    /// Push shell geometry to the attached panel.
    fn apply_geometry(&mut self, panel_id: &str, geometry: PanelGeometry);
}
