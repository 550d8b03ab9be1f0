#![forbid(unsafe_code)]

//! Navigator configuration.
//!
//! Every field defaults to the values the overlay has always shipped with, so
//! `NavigatorConfig::default()` is the production configuration. Hosts that
//! target a different chat markup override the selectors from JSON:
//!
//! ```json
//! {
//!   "container_selector": "#thread",
//!   "text_selector": ".whitespace-pre-wrap",
//!   "debounce_ms": 250
//! }
//! ```

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::NavError;
use crate::geometry::{PanelGeometry, SizeLimits};

/// Well-known identifier of the overlay panel.
pub const DEFAULT_PANEL_ID: &str = "prompt-sidebar";
/// Panel heading, also the drag handle.
pub const DEFAULT_TITLE: &str = "🚀 Quick Prompts";
pub const DEFAULT_CONTAINER_SELECTOR: &str = "main";
pub const DEFAULT_MESSAGE_SELECTOR: &str = "div[data-message-author-role]";
pub const DEFAULT_ROLE_ATTRIBUTE: &str = "data-message-author-role";
pub const DEFAULT_TEXT_SELECTOR: &str = ".break-words > div";
/// Time given to the host page to load its own content before the first rebuild.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 2000;
/// Debounce window for mutation-triggered rebuilds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Tunables for extraction, scheduling, and the panel shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Identifier used to find (and remove) the panel.
    pub panel_id: String,
    /// Heading text.
    pub title: String,
    /// Region observed for added nodes.
    pub container_selector: String,
    /// Nodes carrying an author role.
    pub message_selector: String,
    /// Attribute holding the author role.
    pub role_attribute: String,
    /// Text container, relative to a message node.
    pub text_selector: String,
    pub settle_delay_ms: u64,
    pub debounce_ms: u64,
    /// Geometry of a freshly mounted shell.
    pub initial_geometry: PanelGeometry,
    pub size_limits: SizeLimits,
    /// Keep shell geometry and in-flight interactions across rebuilds.
    ///
    /// `false` restores destroy-and-recreate: every rebuild remounts the shell
    /// at `initial_geometry` and drops any drag or resize in progress.
    pub carry_over_geometry: bool,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            panel_id: DEFAULT_PANEL_ID.to_owned(),
            title: DEFAULT_TITLE.to_owned(),
            container_selector: DEFAULT_CONTAINER_SELECTOR.to_owned(),
            message_selector: DEFAULT_MESSAGE_SELECTOR.to_owned(),
            role_attribute: DEFAULT_ROLE_ATTRIBUTE.to_owned(),
            text_selector: DEFAULT_TEXT_SELECTOR.to_owned(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            initial_geometry: PanelGeometry::default(),
            size_limits: SizeLimits::default(),
            carry_over_geometry: true,
        }
    }
}

impl NavigatorConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(s: &str) -> Result<Self, NavError> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| NavError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, NavError> {
        serde_json::to_string_pretty(self).map_err(|e| NavError::InvalidConfig(e.to_string()))
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), NavError> {
        let required = [
            ("panel_id", &self.panel_id),
            ("container_selector", &self.container_selector),
            ("message_selector", &self.message_selector),
            ("role_attribute", &self.role_attribute),
            ("text_selector", &self.text_selector),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(NavError::InvalidConfig(format!("{name} must not be empty")));
            }
        }
        if self.debounce_ms == 0 {
            return Err(NavError::InvalidConfig(
                "debounce_ms must be at least 1".to_owned(),
            ));
        }
        let limits = self.size_limits;
        if !(limits.min_width.is_finite() && limits.min_width > 0.0)
            || !(limits.min_height.is_finite() && limits.min_height > 0.0)
        {
            return Err(NavError::InvalidConfig(
                "size_limits must be positive".to_owned(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    #[must_use]
    pub const fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
