#![forbid(unsafe_code)]

//! In-memory host document and overlay surface.
//!
//! [`FakeDocument`] models a chat transcript as a flat list of message nodes.
//! A node's vertical position is derived from its current index, so moving or
//! inserting nodes shifts the positions recorded by later scrolls, which is
//! what the "scroll resolves the live node" property is checked against.
//!
//! [`FakeSurface`] keeps mounted panels in a `Vec` so duplicate panels are
//! observable rather than silently merged.

use std::cell::RefCell;

use promptnav_core::config::{
    DEFAULT_CONTAINER_SELECTOR, DEFAULT_MESSAGE_SELECTOR, DEFAULT_ROLE_ATTRIBUTE,
    DEFAULT_TEXT_SELECTOR,
};
use promptnav_core::{
    HostDocument, NavError, OverlaySurface, PanelGeometry, PanelItem, PanelView, ScrollOptions,
};

/// Vertical distance between consecutive message nodes.
pub const NODE_PITCH_PX: f64 = 100.0;

/// Handle to a fake node. `FakeNodeId::CONTAINER` is the observed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FakeNodeId(pub u32);

impl FakeNodeId {
    pub const CONTAINER: Self = Self(0);
}

#[derive(Debug, Clone)]
struct FakeMessage {
    id: FakeNodeId,
    role: Option<String>,
    text: Option<String>,
}

/// One recorded `scroll_into_view` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRecord {
    pub node: FakeNodeId,
    /// Position of the node at the moment of the scroll.
    pub top: f64,
    pub options: ScrollOptions,
}

/// Flat chat transcript using the default selectors.
#[derive(Debug)]
pub struct FakeDocument {
    messages: Vec<FakeMessage>,
    container: bool,
    next_id: u32,
    scrolls: RefCell<Vec<ScrollRecord>>,
}

impl FakeDocument {
    /// Empty transcript with the container present.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            container: true,
            next_id: 1,
            scrolls: RefCell::new(Vec::new()),
        }
    }

    /// Transcript alternating user prompts and assistant replies.
    #[must_use]
    pub fn with_conversation(prompts: &[&str]) -> Self {
        let mut doc = Self::new();
        for prompt in prompts {
            doc.push_user(prompt);
            doc.push_assistant("ok");
        }
        doc
    }

    pub fn set_container_present(&mut self, present: bool) {
        self.container = present;
    }

    pub fn push_user(&mut self, text: &str) -> FakeNodeId {
        self.push(Some("user"), Some(text))
    }

    pub fn push_assistant(&mut self, text: &str) -> FakeNodeId {
        self.push(Some("assistant"), Some(text))
    }

    /// User node whose text container is missing.
    pub fn push_user_without_text(&mut self) -> FakeNodeId {
        self.push(Some("user"), None)
    }

    pub fn push(&mut self, role: Option<&str>, text: Option<&str>) -> FakeNodeId {
        let id = self.allocate();
        self.messages.push(FakeMessage {
            id,
            role: role.map(str::to_owned),
            text: text.map(str::to_owned),
        });
        id
    }

    /// Insert a user message at the top of the transcript.
    pub fn prepend_user(&mut self, text: &str) -> FakeNodeId {
        let id = self.allocate();
        self.messages.insert(
            0,
            FakeMessage {
                id,
                role: Some("user".to_owned()),
                text: Some(text.to_owned()),
            },
        );
        id
    }

    pub fn remove(&mut self, node: FakeNodeId) {
        self.messages.retain(|m| m.id != node);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Current vertical position of `node`.
    #[must_use]
    pub fn top_of(&self, node: FakeNodeId) -> Option<f64> {
        self.messages
            .iter()
            .position(|m| m.id == node)
            .map(|index| index as f64 * NODE_PITCH_PX)
    }

    #[must_use]
    pub fn scrolls(&self) -> Vec<ScrollRecord> {
        self.scrolls.borrow().clone()
    }

    #[must_use]
    pub fn user_texts(&self) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| m.role.as_deref() == Some("user"))
            .filter_map(|m| m.text.clone())
            .collect()
    }

    fn allocate(&mut self) -> FakeNodeId {
        let id = FakeNodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn find(&self, node: FakeNodeId) -> Option<&FakeMessage> {
        self.messages.iter().find(|m| m.id == node)
    }
}

impl Default for FakeDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDocument for FakeDocument {
    type Node = FakeNodeId;

    fn query_all(&self, selector: &str) -> Vec<FakeNodeId> {
        if selector != DEFAULT_MESSAGE_SELECTOR {
            return Vec::new();
        }
        self.messages
            .iter()
            .filter(|m| m.role.is_some())
            .map(|m| m.id)
            .collect()
    }

    fn query_first(&self, selector: &str) -> Option<FakeNodeId> {
        (selector == DEFAULT_CONTAINER_SELECTOR && self.container).then_some(FakeNodeId::CONTAINER)
    }

    fn attribute(&self, node: &FakeNodeId, name: &str) -> Option<String> {
        if name != DEFAULT_ROLE_ATTRIBUTE {
            return None;
        }
        self.find(*node).and_then(|m| m.role.clone())
    }

    fn query_text(&self, node: &FakeNodeId, selector: &str) -> Option<String> {
        if selector != DEFAULT_TEXT_SELECTOR {
            return None;
        }
        self.find(*node).and_then(|m| m.text.clone())
    }

    fn scroll_into_view(&self, node: &FakeNodeId, options: ScrollOptions) {
        // Detached nodes scroll nowhere, like the DOM.
        if let Some(top) = self.top_of(*node) {
            self.scrolls.borrow_mut().push(ScrollRecord {
                node: *node,
                top,
                options,
            });
        }
    }
}

/// A panel attached to the fake body.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedPanel {
    pub id: String,
    pub title: String,
    pub labels: Vec<String>,
    pub tooltips: Vec<String>,
    pub targets: Vec<FakeNodeId>,
    pub geometry: PanelGeometry,
    pub resizable: bool,
    /// Increments on every fresh mount; unchanged by reconciles.
    pub generation: u64,
}

/// Overlay surface recording every operation.
#[derive(Debug)]
pub struct FakeSurface {
    body: bool,
    panels: Vec<MountedPanel>,
    generation: u64,
    mounts: usize,
    reconciles: usize,
    removals: usize,
    geometry_updates: usize,
}

impl FakeSurface {
    #[must_use]
    pub fn new() -> Self {
        Self {
            body: true,
            panels: Vec::new(),
            generation: 0,
            mounts: 0,
            reconciles: 0,
            removals: 0,
            geometry_updates: 0,
        }
    }

    pub fn set_body_available(&mut self, available: bool) {
        self.body = available;
    }

    /// Simulate the host page wiping the panel out from under the session.
    pub fn detach_externally(&mut self, panel_id: &str) {
        self.panels.retain(|p| p.id != panel_id);
    }

    /// Simulate a leftover panel from an earlier script instance.
    pub fn inject_foreign(&mut self, panel_id: &str) {
        self.panels.push(MountedPanel {
            id: panel_id.to_owned(),
            title: "stale".to_owned(),
            labels: Vec::new(),
            tooltips: Vec::new(),
            targets: Vec::new(),
            geometry: PanelGeometry::default(),
            resizable: false,
            generation: 0,
        });
    }

    #[must_use]
    pub fn panels(&self) -> &[MountedPanel] {
        &self.panels
    }

    #[must_use]
    pub fn count(&self, panel_id: &str) -> usize {
        self.panels.iter().filter(|p| p.id == panel_id).count()
    }

    #[must_use]
    pub fn panel(&self, panel_id: &str) -> Option<&MountedPanel> {
        self.panels.iter().find(|p| p.id == panel_id)
    }

    /// Click item `index` of the panel: scroll through the handle the panel
    /// itself holds, like a DOM click handler would.
    pub fn click(&self, panel_id: &str, index: usize, doc: &FakeDocument) -> bool {
        let Some(target) = self.panel(panel_id).and_then(|p| p.targets.get(index)) else {
            return false;
        };
        doc.scroll_into_view(target, ScrollOptions::default());
        true
    }

    #[must_use]
    pub const fn mounts(&self) -> usize {
        self.mounts
    }

    #[must_use]
    pub const fn reconciles(&self) -> usize {
        self.reconciles
    }

    #[must_use]
    pub const fn removals(&self) -> usize {
        self.removals
    }

    #[must_use]
    pub const fn geometry_updates(&self) -> usize {
        self.geometry_updates
    }
}

impl Default for FakeSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlaySurface<FakeNodeId> for FakeSurface {
    fn body_available(&self) -> bool {
        self.body
    }

    fn panel_present(&self, panel_id: &str) -> bool {
        self.panels.iter().any(|p| p.id == panel_id)
    }

    fn remove_panel(&mut self, panel_id: &str) -> usize {
        let before = self.panels.len();
        self.panels.retain(|p| p.id != panel_id);
        let removed = before - self.panels.len();
        self.removals += removed;
        removed
    }

    fn mount_panel(
        &mut self,
        view: &PanelView<FakeNodeId>,
        geometry: PanelGeometry,
    ) -> Result<(), NavError> {
        if !self.body {
            return Err(NavError::MountTargetUnavailable);
        }
        self.generation += 1;
        self.mounts += 1;
        self.panels.push(MountedPanel {
            id: view.panel_id.clone(),
            title: view.title.clone(),
            labels: view.items.iter().map(|i| i.label.clone()).collect(),
            tooltips: view.items.iter().map(|i| i.tooltip.clone()).collect(),
            targets: view.items.iter().map(|i| i.target).collect(),
            geometry,
            resizable: view.resizable,
            generation: self.generation,
        });
        Ok(())
    }

    fn replace_items(
        &mut self,
        panel_id: &str,
        items: &[PanelItem<FakeNodeId>],
    ) -> Result<(), NavError> {
        let Some(panel) = self.panels.iter_mut().find(|p| p.id == panel_id) else {
            return Err(NavError::host("replace_items", "panel detached"));
        };
        panel.labels = items.iter().map(|i| i.label.clone()).collect();
        panel.tooltips = items.iter().map(|i| i.tooltip.clone()).collect();
        panel.targets = items.iter().map(|i| i.target).collect();
        self.reconciles += 1;
        Ok(())
    }

    fn apply_geometry(&mut self, panel_id: &str, geometry: PanelGeometry) {
        for panel in self.panels.iter_mut().filter(|p| p.id == panel_id) {
            panel.geometry = geometry;
        }
        self.geometry_updates += 1;
    }
}
