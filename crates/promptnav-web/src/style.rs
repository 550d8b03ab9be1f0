#![forbid(unsafe_code)]

//! Inline styles and hit-test selectors for the overlay.
//!
//! The panel is styled entirely inline so it renders the same regardless of
//! host stylesheets. Geometry lives in `left`/`top`/`width`/`height` on a
//! `position: fixed` shell.

use promptnav_core::{ManipulationRegion, PanelGeometry};

/// Class of the resize corner inside the shell.
pub const RESIZE_CLASS: &str = "promptnav-resize";

/// Attribute carrying an item's list index on its button.
pub const INDEX_ATTR: &str = "data-promptnav-index";

const SHELL_BASE: &str = "position: fixed; z-index: 2147483647; box-sizing: border-box; \
     overflow: hidden; display: flex; flex-direction: column; \
     background: #202123; color: #ececf1; border: 1px solid #4d4d4f; \
     border-radius: 8px; font: 13px/1.4 system-ui, sans-serif; \
     box-shadow: 0 4px 16px rgba(0, 0, 0, 0.35);";

/// Title bar; doubles as the drag handle.
pub const HANDLE_STYLE: &str = "margin: 0; padding: 8px 12px; cursor: move; user-select: none; \
     font-size: 14px; border-bottom: 1px solid #4d4d4f;";

pub const LIST_STYLE: &str =
    "list-style: none; margin: 0; padding: 4px 0; overflow-y: auto; flex: 1;";

pub const BUTTON_STYLE: &str = "display: block; width: 100%; padding: 6px 12px; border: 0; \
     background: transparent; color: inherit; text-align: left; cursor: pointer; \
     white-space: nowrap; overflow: hidden; text-overflow: ellipsis;";

pub const RESIZE_STYLE: &str = "position: absolute; right: 0; bottom: 0; width: 14px; \
     height: 14px; cursor: nwse-resize; \
     background: linear-gradient(135deg, transparent 50%, #8e8ea0 50%);";

/// CSS pixel value.
#[must_use]
pub fn px(value: f64) -> String {
    format!("{value}px")
}

/// Geometry as `(property, value)` pairs for `style.setProperty`.
#[must_use]
pub fn geometry_properties(geometry: PanelGeometry) -> [(&'static str, String); 4] {
    [
        ("left", px(geometry.position.x)),
        ("top", px(geometry.position.y)),
        ("width", px(geometry.size.width)),
        ("height", px(geometry.size.height)),
    ]
}

/// Full inline style of a freshly mounted shell.
#[must_use]
pub fn shell_style(geometry: PanelGeometry) -> String {
    let mut style = String::from(SHELL_BASE);
    for (property, value) in geometry_properties(geometry) {
        style.push(' ');
        style.push_str(property);
        style.push_str(": ");
        style.push_str(&value);
        style.push(';');
    }
    style
}

/// Selector matching the drag handle of panel `panel_id`.
#[must_use]
pub fn handle_selector(panel_id: &str) -> String {
    format!("#{panel_id} > h3")
}

/// Selector matching the resize corner of panel `panel_id`.
#[must_use]
pub fn resize_selector(panel_id: &str) -> String {
    format!("#{panel_id} > .{RESIZE_CLASS}")
}

/// Selector matching the item buttons of panel `panel_id`.
#[must_use]
pub fn item_selector(panel_id: &str) -> String {
    format!("#{panel_id} button[{INDEX_ATTR}]")
}

/// Map hit-test results to a region. The resize corner wins when both match.
#[must_use]
pub const fn classify_region(in_handle: bool, in_resize: bool) -> ManipulationRegion {
    match (in_handle, in_resize) {
        (_, true) => ManipulationRegion::ResizeHandle,
        (true, false) => ManipulationRegion::DragHandle,
        (false, false) => ManipulationRegion::Outside,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn px_drops_trailing_zero_fraction() {
        assert_eq!(px(300.0), "300px");
        assert_eq!(px(190.5), "190.5px");
        assert_eq!(px(-12.0), "-12px");
    }

    #[test]
    fn shell_style_is_fixed_and_carries_geometry() {
        let style = shell_style(PanelGeometry::new(190.0, 245.0, 350.0, 380.0));
        assert!(style.starts_with("position: fixed;"));
        assert!(style.ends_with("left: 190px; top: 245px; width: 350px; height: 380px;"));
    }

    #[test]
    fn geometry_properties_order() {
        let names: Vec<_> = geometry_properties(PanelGeometry::default())
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["left", "top", "width", "height"]);
    }

    #[test]
    fn selectors_are_scoped_to_panel() {
        assert_eq!(handle_selector("prompt-sidebar"), "#prompt-sidebar > h3");
        assert_eq!(
            resize_selector("prompt-sidebar"),
            "#prompt-sidebar > .promptnav-resize"
        );
        assert_eq!(
            item_selector("prompt-sidebar"),
            "#prompt-sidebar button[data-promptnav-index]"
        );
    }

    #[test]
    fn region_classification() {
        assert_eq!(classify_region(true, false), ManipulationRegion::DragHandle);
        assert_eq!(classify_region(false, true), ManipulationRegion::ResizeHandle);
        assert_eq!(classify_region(true, true), ManipulationRegion::ResizeHandle);
        assert_eq!(classify_region(false, false), ManipulationRegion::Outside);
    }
}
