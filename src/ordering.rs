//! Display order of the switcher list.
//!
//! The focused window comes first so that a quick Alt+Tab lands on the
//! second row.  Everything else is grouped by workspace, and minimized
//! windows always sink to the bottom.

use crate::window::WindowRecord;

/// Order `windows` for display.
///
/// The record whose address equals `active_address` (first match only) is
/// placed first.  The rest are stably sorted by workspace id, with minimized
/// windows mapped past every real workspace, then non-minimized before
/// minimized.  Without a match nothing is prepended.
pub fn order(windows: Vec<WindowRecord>, active_address: Option<&str>) -> Vec<WindowRecord> {
    let mut current = None;
    let mut others = Vec::with_capacity(windows.len());
    for window in windows {
        if current.is_none() && Some(window.address.as_str()) == active_address {
            current = Some(window);
        } else {
            others.push(window);
        }
    }

    others.sort_by_key(sort_key);

    let mut ordered = Vec::with_capacity(others.len() + 1);
    ordered.extend(current);
    ordered.extend(others);
    ordered
}

fn sort_key(window: &WindowRecord) -> (i32, bool) {
    let workspace = if window.is_minimized {
        i32::MAX
    } else {
        window.workspace_id
    };
    (workspace, window.is_minimized)
}
