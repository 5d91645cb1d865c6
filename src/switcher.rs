//! The controller that ties the compositor client, the aggregator and the
//! ordering together.
//!
//! [`Switcher`] owns the ordered window list and the selection cursor, and
//! reacts to [`UiEvent`]s through a small dispatch table.  It knows nothing
//! about GTK; the visualizer renders whatever [`Switcher::windows`] and
//! [`Switcher::selected_index`] report after each event.

use crate::aggregate::{all_windows, ReconciliationPolicy};
use crate::command::{Flow, UiEvent};
use crate::hyprland::client::CompositorClient;
use crate::ordering::order;
use crate::traits::Hyprctl;
use crate::window::WindowRecord;
use log::{debug, info, warn};
use std::collections::HashMap;

type Handler<H> = fn(&mut Switcher<H>) -> Flow;

/// Window-list controller.
///
/// # Typical usage
///
/// ```ignore
/// let client = CompositorClient::new(HyprctlCommand::default(), cache, store);
/// let mut switcher = Switcher::new(client, ReconciliationPolicy::Live);
/// switcher.refresh();
/// switcher.dispatch(UiEvent::Next);
/// ```
pub struct Switcher<H: Hyprctl> {
    client: CompositorClient<H>,
    policy: ReconciliationPolicy,
    windows: Vec<WindowRecord>,
    index: usize,
    handlers: HashMap<UiEvent, Handler<H>>,
}

impl<H: Hyprctl> Switcher<H> {
    pub fn new(client: CompositorClient<H>, policy: ReconciliationPolicy) -> Self {
        let mut handlers: HashMap<UiEvent, Handler<H>> = HashMap::with_capacity(UiEvent::ALL.len());
        handlers.insert(UiEvent::Next, Self::on_next);
        handlers.insert(UiEvent::Prev, Self::on_prev);
        handlers.insert(UiEvent::Activate, Self::on_activate);
        handlers.insert(UiEvent::Close, Self::on_close);

        Self {
            client,
            policy,
            windows: Vec::new(),
            index: 0,
            handlers,
        }
    }

    pub fn client(&self) -> &CompositorClient<H> {
        &self.client
    }

    pub fn policy(&self) -> ReconciliationPolicy {
        self.policy
    }

    /// Re-query the compositor, merge, order, and put the cursor on the
    /// first row.
    pub fn refresh(&mut self) {
        let windows = all_windows(&self.client, self.policy);
        let active = self.client.focused_window().map(|w| w.address);
        self.windows = order(windows, active.as_deref());
        self.index = 0;
        debug!("refreshed: {} window(s), active {:?}", self.windows.len(), active);
    }

    /// The ordered list as of the last [`refresh`](Self::refresh).
    pub fn windows(&self) -> &[WindowRecord] {
        &self.windows
    }

    pub fn selected_index(&self) -> usize {
        self.index
    }

    /// The record under the cursor, if the list is not empty.
    pub fn selected(&self) -> Option<&WindowRecord> {
        self.windows.get(self.index)
    }

    /// Advance the cursor, wrapping past the last row.
    pub fn next(&mut self) {
        if !self.windows.is_empty() {
            self.index = (self.index + 1) % self.windows.len();
        }
    }

    /// Move the cursor back, wrapping before the first row.
    pub fn prev(&mut self) {
        if !self.windows.is_empty() {
            let len = self.windows.len();
            self.index = (self.index + len - 1) % len;
        }
    }

    /// Put the cursor on `index`.  Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.windows.len() {
            self.index = index;
            true
        } else {
            false
        }
    }

    /// Focus (or restore) the selected window.
    pub fn activate(&mut self) -> bool {
        let Some(window) = self.selected() else {
            return false;
        };
        info!("activating {} ({})", window.short_address, window.class_name);
        let ok = self.client.focus(window);
        if !ok {
            warn!("could not focus {}", window.short_address);
        }
        ok
    }

    /// Minimize the selected window and re-derive the list.
    pub fn minimize_selected(&mut self) -> bool {
        let Some(window) = self.selected() else {
            return false;
        };
        let ok = self.client.minimize(window);
        if ok {
            let keep = self.index;
            self.refresh();
            self.select(keep.min(self.windows.len().saturating_sub(1)));
        }
        ok
    }

    /// `"{n}/{total} - {class} ({status})"` for the selected row.
    pub fn status_line(&self) -> Option<String> {
        self.selected().map(|w| {
            format!(
                "{}/{} - {} ({})",
                self.index + 1,
                self.windows.len(),
                w.class_name,
                w.status()
            )
        })
    }

    /// Run the handler registered for `event`.
    pub fn dispatch(&mut self, event: UiEvent) -> Flow {
        debug!("event: {}", event);
        match self.handlers.get(&event).copied() {
            Some(handler) => handler(self),
            None => Flow::Redraw,
        }
    }

    //  handlers

    fn on_next(&mut self) -> Flow {
        self.next();
        Flow::Redraw
    }

    fn on_prev(&mut self) -> Flow {
        self.prev();
        Flow::Redraw
    }

    fn on_activate(&mut self) -> Flow {
        self.activate();
        Flow::Quit
    }

    fn on_close(&mut self) -> Flow {
        Flow::Quit
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyprland::cache::SnapshotCache;
    use crate::hyprland::client::tests::{FakeCtl, CLIENTS};
    use crate::store::MinimizedStore;

    fn make_switcher<'a>(ctl: &'a FakeCtl, dir: &tempfile::TempDir) -> Switcher<&'a FakeCtl> {
        ctl.reply("clients -j", CLIENTS);
        ctl.reply(
            "activewindow -j",
            r#"{"address": "0x1002", "class": "Alacritty", "workspace": {"id": 1, "name": "1"}}"#,
        );
        ctl.reply("activeworkspace -j", r#"{"id": 1, "name": "1"}"#);
        let store = MinimizedStore::new(dir.path().join("windows.json"));
        let client = CompositorClient::new(ctl, SnapshotCache::new(std::time::Duration::ZERO), store);
        let mut s = Switcher::new(client, ReconciliationPolicy::Live);
        s.refresh();
        s
    }

    fn addresses<H: Hyprctl>(s: &Switcher<H>) -> Vec<&str> {
        s.windows().iter().map(|w| w.address.as_str()).collect()
    }

    #[test]
    fn refresh_orders_active_first() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        let s = make_switcher(&ctl, &dir);
        // 0x1004 sits in a special workspace (negative id) and is not minimized.
        assert_eq!(addresses(&s), vec!["0x1002", "0x1004", "0x1001", "0x1003"]);
        assert_eq!(s.selected_index(), 0);
    }

    #[test]
    fn next_and_prev_wrap() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        let mut s = make_switcher(&ctl, &dir);

        s.prev();
        assert_eq!(s.selected_index(), 3);
        s.next();
        assert_eq!(s.selected_index(), 0);
        for _ in 0..5 {
            s.next();
        }
        assert_eq!(s.selected_index(), 1);
    }

    #[test]
    fn cycling_an_empty_list_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        let store = MinimizedStore::new(dir.path().join("windows.json"));
        let client = CompositorClient::new(&ctl, SnapshotCache::default(), store);
        let mut s = Switcher::new(client, ReconciliationPolicy::Live);
        s.refresh();

        s.next();
        s.prev();
        assert_eq!(s.selected_index(), 0);
        assert!(s.selected().is_none());
        assert!(!s.activate());
        assert_eq!(s.status_line(), None);
    }

    #[test]
    fn select_ignores_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        let mut s = make_switcher(&ctl, &dir);
        assert!(s.select(2));
        assert!(!s.select(9));
        assert_eq!(s.selected_index(), 2);
    }

    #[test]
    fn status_line_describes_selection() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        let mut s = make_switcher(&ctl, &dir);
        assert_eq!(s.status_line().as_deref(), Some("1/4 - Alacritty (WS 1)"));
        s.prev();
        assert_eq!(s.status_line().as_deref(), Some("4/4 - Spotify (Hidden)"));
    }

    #[test]
    fn dispatch_table_routes_events() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        let mut s = make_switcher(&ctl, &dir);

        assert_eq!(s.dispatch(UiEvent::Next), Flow::Redraw);
        assert_eq!(s.dispatch(UiEvent::Next), Flow::Redraw);
        assert_eq!(s.dispatch(UiEvent::Prev), Flow::Redraw);
        assert_eq!(s.selected_index(), 1);
        assert_eq!(s.dispatch(UiEvent::Close), Flow::Quit);
        assert_eq!(ctl.count("dispatch"), 0, "close must not touch focus");
    }

    #[test]
    fn activate_focuses_selected_window() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        let mut s = make_switcher(&ctl, &dir);
        s.select(2);

        assert_eq!(s.dispatch(UiEvent::Activate), Flow::Quit);
        assert_eq!(
            ctl.dispatches(),
            vec!["workspace 2", "focuswindow address:0x1001", "bringactivetotop"]
        );
    }

    #[test]
    fn activate_on_minimized_row_restores() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        let mut s = make_switcher(&ctl, &dir);
        s.select(3);

        assert!(s.activate());
        assert_eq!(ctl.dispatches()[0], "movetoworkspace 1,address:0x1003");
    }

    #[test]
    fn minimize_selected_records_and_refreshes() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        let mut s = make_switcher(&ctl, &dir);
        s.select(2);

        assert!(s.minimize_selected());
        assert_eq!(s.client().store().entries()[0].address, "0x1001");
        assert_eq!(ctl.count("clients"), 2);
        assert_eq!(s.selected_index(), 2);
    }
}
