//! Window snapshots.
//!
//! A [`WindowRecord`] is built fresh on every query; there is no long-lived
//! window object.  Derived fields (`icon`, `short_address`) are computed at
//! construction and never re-derived.

use crate::icon::IconResolver;

/// Name of the hidden workspace that minimized windows are parked in.
pub const MINIMIZED_WORKSPACE: &str = "special:minimum";

/// Prefix shared by every Hyprland special workspace name.
pub const SPECIAL_PREFIX: &str = "special:";

/// A snapshot of one window at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    /// Compositor-assigned identifier; the only stable identity.
    pub address: String,
    pub title: String,
    pub class_name: String,
    /// Meaningless when [`is_minimized`](Self::is_minimized) is set.
    pub workspace_id: i32,
    /// Empty, a regular name, or `special:<name>`.
    pub workspace_name: String,
    pub is_minimized: bool,
    pub icon: String,
    /// Last four characters of the address, for debug display.
    pub short_address: String,
}

impl WindowRecord {
    /// Build a record for a window reported live by the compositor.
    ///
    /// The window counts as minimized iff it sits in
    /// [`MINIMIZED_WORKSPACE`].
    pub fn live(
        address: impl Into<String>,
        title: impl Into<String>,
        class_name: impl Into<String>,
        workspace_id: i32,
        workspace_name: impl Into<String>,
        icons: &IconResolver,
    ) -> Self {
        let workspace_name = workspace_name.into();
        let is_minimized = workspace_name == MINIMIZED_WORKSPACE;
        Self::build(
            address.into(),
            title.into(),
            class_name.into(),
            workspace_id,
            workspace_name,
            is_minimized,
            icons,
        )
    }

    /// Build a record for a window known only from the minimized store.
    pub fn minimized(
        address: impl Into<String>,
        title: impl Into<String>,
        class_name: impl Into<String>,
        icons: &IconResolver,
    ) -> Self {
        Self::build(
            address.into(),
            title.into(),
            class_name.into(),
            0,
            MINIMIZED_WORKSPACE.to_string(),
            true,
            icons,
        )
    }

    fn build(
        address: String,
        title: String,
        class_name: String,
        workspace_id: i32,
        workspace_name: String,
        is_minimized: bool,
        icons: &IconResolver,
    ) -> Self {
        let icon = icons.icon_for(&class_name).to_string();
        let short_address = short_address(&address);
        Self {
            address,
            title,
            class_name,
            workspace_id,
            workspace_name,
            is_minimized,
            icon,
            short_address,
        }
    }

    /// Whether the window lives in any special workspace.
    pub fn in_special_workspace(&self) -> bool {
        self.workspace_name.starts_with(SPECIAL_PREFIX)
    }

    /// Special workspace name without the `special:` prefix.
    pub fn special_name(&self) -> Option<&str> {
        self.workspace_name.strip_prefix(SPECIAL_PREFIX)
    }

    /// `Hidden` for minimized windows, `WS <id>` otherwise.
    pub fn status(&self) -> String {
        if self.is_minimized {
            "Hidden".to_string()
        } else {
            format!("WS {}", self.workspace_id)
        }
    }

    /// `"{icon} {class} - {title} [{status}]"`, as persisted in the store.
    pub fn display_title(&self) -> String {
        format!(
            "{} {} - {} [{}]",
            self.icon,
            self.class_name,
            self.title,
            self.status()
        )
    }
}

fn short_address(address: &str) -> String {
    let count = address.chars().count();
    address.chars().skip(count.saturating_sub(4)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_record_in_minimum_is_minimized() {
        let icons = IconResolver::new();
        let w = WindowRecord::live("0x5599aa10", "t", "firefox", -99, MINIMIZED_WORKSPACE, &icons);
        assert!(w.is_minimized);
        assert!(w.in_special_workspace());
        assert_eq!(w.special_name(), Some("minimum"));
    }

    #[test]
    fn other_special_workspaces_are_not_minimized() {
        let icons = IconResolver::new();
        let w = WindowRecord::live("0x1", "t", "kitty", -98, "special:scratch", &icons);
        assert!(!w.is_minimized);
        assert!(w.in_special_workspace());
        assert_eq!(w.special_name(), Some("scratch"));
    }

    #[test]
    fn short_address_is_last_four_chars() {
        let icons = IconResolver::new();
        let w = WindowRecord::live("0x5599aa10", "", "", 1, "1", &icons);
        assert_eq!(w.short_address, "aa10");
        let w = WindowRecord::live("0x1", "", "", 1, "1", &icons);
        assert_eq!(w.short_address, "0x1");
    }

    #[test]
    fn display_title_shows_status() {
        let icons = IconResolver::new();
        let live = WindowRecord::live("0x1", "Inbox", "kitty", 3, "3", &icons);
        assert_eq!(live.display_title(), format!("{} kitty - Inbox [WS 3]", live.icon));
        let hidden = WindowRecord::minimized("0x2", "Inbox", "kitty", &icons);
        assert_eq!(hidden.display_title(), format!("{} kitty - Inbox [Hidden]", hidden.icon));
        assert_eq!(hidden.workspace_id, 0);
    }
}
