//! One-shot subcommands: `minimize`, `restore`, `restore-all`,
//! `restore-last` and `show`.
//!
//! These run without the overlay and without the instance lock; they share
//! the compositor client and the minimized-window store with the switcher.

use crate::hyprland::client::CompositorClient;
use crate::traits::Hyprctl;
use crate::window::WindowRecord;
use log::{debug, info, warn};
use serde::Serialize;

/// Icon shown in the Waybar module.
pub const STATUS_GLYPH: &str = "\u{f0638}";

/// Minimize the focused window unless its class is in `ignore`.
pub fn minimize_focused<H: Hyprctl>(client: &CompositorClient<H>, ignore: &[String]) -> bool {
    let Some(window) = client.focused_window() else {
        info!("no focused window to minimize");
        return false;
    };
    if ignore.iter().any(|c| *c == window.class_name) {
        debug!("not minimizing {} (class {})", window.short_address, window.class_name);
        return false;
    }
    client.minimize(&window)
}

/// Restore the window at `address`.
///
/// The stored entry supplies the title and class when there is one; an
/// address the store does not know is still moved back.
pub fn restore_address<H: Hyprctl>(client: &CompositorClient<H>, address: &str) -> bool {
    let window = client
        .store()
        .list(client.icons())
        .into_iter()
        .find(|w| w.address == address)
        .unwrap_or_else(|| WindowRecord::minimized(address, "", "", client.icons()));
    client.restore(&window)
}

/// Restore every stored window, oldest first.  Returns how many came back.
pub fn restore_all<H: Hyprctl>(client: &CompositorClient<H>) -> usize {
    let stored = client.store().list(client.icons());
    let total = stored.len();
    let restored = stored.iter().filter(|w| client.restore(w)).count();
    if restored < total {
        warn!("restored {} of {} window(s)", restored, total);
    }
    restored
}

/// Restore the most recently minimized window.
pub fn restore_last<H: Hyprctl>(client: &CompositorClient<H>) -> bool {
    match client.store().list(client.icons()).pop() {
        Some(window) => client.restore(&window),
        None => {
            info!("nothing to restore");
            false
        }
    }
}

#[derive(Debug, Serialize)]
struct WaybarStatus {
    text: String,
    class: &'static str,
    tooltip: String,
}

/// The Waybar custom-module line for `count` minimized windows.
pub fn waybar_status(count: usize) -> String {
    let status = if count > 0 {
        WaybarStatus {
            text: format!("{} {}", STATUS_GLYPH, count),
            class: "has-windows",
            tooltip: format!("{} minimized windows", count),
        }
    } else {
        WaybarStatus {
            text: STATUS_GLYPH.to_string(),
            class: "empty",
            tooltip: "No minimized windows".to_string(),
        }
    };
    serde_json::to_string(&status).unwrap_or_default()
}

/// Ask Waybar to re-run its module (`pkill -RTMIN+<signal> waybar`).
pub fn signal_waybar(signal: Option<u8>) {
    let Some(signal) = signal else {
        return;
    };
    let flag = format!("-RTMIN+{}", signal);
    match std::process::Command::new("pkill").args([flag.as_str(), "waybar"]).output() {
        Ok(out) => debug!("pkill {} waybar: {}", flag, out.status),
        Err(e) => debug!("pkill unavailable: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyprland::cache::SnapshotCache;
    use crate::hyprland::client::tests::FakeCtl;
    use crate::store::{MinimizedEntry, MinimizedStore};

    fn client<'a>(ctl: &'a FakeCtl, dir: &tempfile::TempDir) -> CompositorClient<&'a FakeCtl> {
        let store = MinimizedStore::new(dir.path().join("windows.json"));
        CompositorClient::new(ctl, SnapshotCache::default(), store)
    }

    fn stash(c: &CompositorClient<&FakeCtl>, addr: &str, class: &str) {
        let w = WindowRecord::minimized(addr, "title", class, c.icons());
        c.store().upsert(MinimizedEntry::from_window(&w));
    }

    fn ignore() -> Vec<String> {
        vec!["wofi".to_string()]
    }

    #[test]
    fn minimize_focused_parks_the_active_window() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        ctl.reply(
            "activewindow -j",
            r#"{"address": "0xabc", "title": "Inbox", "class": "firefox", "workspace": {"id": 2, "name": "2"}}"#,
        );
        let c = client(&ctl, &dir);

        assert!(minimize_focused(&c, &ignore()));
        assert_eq!(ctl.dispatches(), vec!["movetoworkspacesilent special:minimum,address:0xabc"]);
        assert_eq!(c.store().entries()[0].address, "0xabc");
    }

    #[test]
    fn minimize_focused_skips_ignored_class() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        ctl.reply(
            "activewindow -j",
            r#"{"address": "0xabc", "class": "wofi", "workspace": {"id": 1}}"#,
        );
        let c = client(&ctl, &dir);

        assert!(!minimize_focused(&c, &ignore()));
        assert_eq!(ctl.count("dispatch"), 0);
        assert!(c.store().entries().is_empty());
    }

    #[test]
    fn minimize_focused_without_focus() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        ctl.reply("activewindow -j", "{}");
        let c = client(&ctl, &dir);
        assert!(!minimize_focused(&c, &ignore()));
    }

    #[test]
    fn restore_address_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        ctl.reply("activeworkspace -j", r#"{"id": 3}"#);
        let c = client(&ctl, &dir);
        stash(&c, "0x1", "kitty");
        stash(&c, "0x2", "kitty");

        assert!(restore_address(&c, "0x1"));
        assert_eq!(ctl.dispatches()[0], "movetoworkspace 3,address:0x1");
        let left: Vec<String> = c.store().entries().into_iter().map(|e| e.address).collect();
        assert_eq!(left, vec!["0x2"]);
    }

    #[test]
    fn restore_unknown_address_still_moves_it() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        ctl.reply("activeworkspace -j", r#"{"id": 1}"#);
        let c = client(&ctl, &dir);
        assert!(restore_address(&c, "0xfeed"));
        assert_eq!(ctl.dispatches()[0], "movetoworkspace 1,address:0xfeed");
    }

    #[test]
    fn restore_last_takes_newest_entry() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        ctl.reply("activeworkspace -j", r#"{"id": 1}"#);
        let c = client(&ctl, &dir);
        stash(&c, "0x1", "kitty");
        stash(&c, "0x2", "kitty");

        assert!(restore_last(&c));
        assert_eq!(ctl.dispatches()[0], "movetoworkspace 1,address:0x2");
        assert_eq!(c.store().entries().len(), 1);
    }

    #[test]
    fn restore_last_on_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        let c = client(&ctl, &dir);
        assert!(!restore_last(&c));
        assert_eq!(ctl.count("dispatch"), 0);
    }

    #[test]
    fn restore_all_empties_store() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        ctl.reply("activeworkspace -j", r#"{"id": 1}"#);
        let c = client(&ctl, &dir);
        stash(&c, "0x1", "kitty");
        stash(&c, "0x2", "firefox");

        assert_eq!(restore_all(&c), 2);
        assert!(c.store().entries().is_empty());
    }

    #[test]
    fn restore_all_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = FakeCtl::default();
        ctl.reply("activeworkspace -j", r#"{"id": 1}"#);
        ctl.fail("dispatch movetoworkspace");
        let c = client(&ctl, &dir);
        stash(&c, "0x1", "kitty");

        assert_eq!(restore_all(&c), 0);
        assert_eq!(c.store().entries().len(), 1);
    }

    #[test]
    fn waybar_lines() {
        assert_eq!(
            waybar_status(3),
            "{\"text\":\"\u{f0638} 3\",\"class\":\"has-windows\",\"tooltip\":\"3 minimized windows\"}"
        );
        assert_eq!(
            waybar_status(0),
            "{\"text\":\"\u{f0638}\",\"class\":\"empty\",\"tooltip\":\"No minimized windows\"}"
        );
    }
}
