//! Typed window queries and actions on top of a [`Hyprctl`] executor.
//!
//! Queries degrade to "no data" on any failure: a command that could not
//! run and a reply that is not the JSON we expect both produce an empty list
//! or `None`.  Actions report a plain `bool`.
//!
//! Hyprland does not stack windows atomically with a single dispatch, so
//! focus and restore follow up with `bringactivetotop` (and restore with a
//! second `workspace`/`focuswindow`) to make the window actually visible.

use super::cache::SnapshotCache;
use crate::icon::IconResolver;
use crate::store::{MinimizedEntry, MinimizedStore};
use crate::traits::Hyprctl;
use crate::window::{WindowRecord, MINIMIZED_WORKSPACE};
use log::{debug, info, warn};
use serde::Deserialize;

//  Minimal serde structs for the JSON we care about

/// Subset of one element of `clients -j` (also the shape of
/// `activewindow -j`).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClientJson {
    address: String,
    title: String,
    class: String,
    workspace: WorkspaceRefJson,
}

/// `{"id": .., "name": ..}` as nested in a client.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct WorkspaceRefJson {
    id: i32,
    name: String,
}

impl Default for WorkspaceRefJson {
    fn default() -> Self {
        Self {
            id: 1,
            name: String::new(),
        }
    }
}

/// Subset of `activeworkspace -j`.
#[derive(Debug, Deserialize)]
struct ActiveWorkspaceJson {
    id: i32,
}

impl ClientJson {
    fn into_record(self, icons: &IconResolver) -> WindowRecord {
        WindowRecord::live(
            self.address,
            self.title,
            self.class,
            self.workspace.id,
            self.workspace.name,
            icons,
        )
    }
}

/// Parse a `clients -j` reply.  Anything malformed yields an empty list.
pub fn parse_clients(raw: &str, icons: &IconResolver) -> Vec<WindowRecord> {
    match serde_json::from_str::<Vec<ClientJson>>(raw) {
        Ok(clients) => clients.into_iter().map(|c| c.into_record(icons)).collect(),
        Err(e) => {
            warn!("unexpected clients reply: {}", e);
            Vec::new()
        }
    }
}

/// Parse an `activewindow -j` reply.
///
/// Hyprland answers `{}` when nothing is focused; that, like a malformed
/// reply, yields `None`.
pub fn parse_active_window(raw: &str, icons: &IconResolver) -> Option<WindowRecord> {
    match serde_json::from_str::<ClientJson>(raw) {
        Ok(client) if client.address.is_empty() => None,
        Ok(client) => Some(client.into_record(icons)),
        Err(e) => {
            warn!("unexpected activewindow reply: {}", e);
            None
        }
    }
}

/// Parse an `activeworkspace -j` reply into the workspace id.
pub fn parse_workspace_id(raw: &str) -> Option<i32> {
    match serde_json::from_str::<ActiveWorkspaceJson>(raw) {
        Ok(ws) => Some(ws.id),
        Err(e) => {
            warn!("unexpected activeworkspace reply: {}", e);
            None
        }
    }
}

/// Compositor-facing service.
///
/// Owns the executor, the staleness cache for the client list, the
/// minimized-window store it writes to, and the icon resolver used to build
/// records.
pub struct CompositorClient<H: Hyprctl> {
    ctl: H,
    cache: SnapshotCache,
    store: MinimizedStore,
    icons: IconResolver,
}

impl<H: Hyprctl> CompositorClient<H> {
    pub fn new(ctl: H, cache: SnapshotCache, store: MinimizedStore) -> Self {
        Self {
            ctl,
            cache,
            store,
            icons: IconResolver::new(),
        }
    }

    pub fn ctl(&self) -> &H {
        &self.ctl
    }

    pub fn store(&self) -> &MinimizedStore {
        &self.store
    }

    pub fn icons(&self) -> &IconResolver {
        &self.icons
    }

    /// Every window the compositor reports, hidden workspaces included.
    ///
    /// Served from the staleness cache when the last reply is fresh enough.
    pub fn list_all_windows(&self) -> Vec<WindowRecord> {
        match self.cache.get_or_fetch(|| self.ctl.run(&["clients", "-j"])) {
            Some(raw) => parse_clients(&raw, &self.icons),
            None => Vec::new(),
        }
    }

    /// The window holding input focus, if any.
    pub fn focused_window(&self) -> Option<WindowRecord> {
        let raw = self.ctl.run(&["activewindow", "-j"])?;
        parse_active_window(&raw, &self.icons)
    }

    /// Id of the workspace currently shown on the focused monitor.
    pub fn active_workspace(&self) -> Option<i32> {
        let raw = self.ctl.run(&["activeworkspace", "-j"])?;
        parse_workspace_id(&raw)
    }

    /// Bring `window` to the front, restoring it first if minimized.
    ///
    /// Returns whether the `focuswindow` dispatch succeeded; the trailing
    /// restack is best effort.
    pub fn focus(&self, window: &WindowRecord) -> bool {
        if window.is_minimized {
            return self.restore(window);
        }

        if let Some(special) = window.special_name() {
            if !self.dispatch(&["togglespecialworkspace", special]) {
                return false;
            }
        } else if window.workspace_id > 0 {
            self.dispatch(&["workspace", window.workspace_id.to_string().as_str()]);
        }

        let focused = self.dispatch(&["focuswindow", address_selector(window).as_str()]);
        self.dispatch(&["bringactivetotop"]);
        info!("focus {} ({}): {}", window.short_address, window.class_name, focused);
        focused
    }

    /// Park `window` in the hidden workspace and remember it in the store.
    pub fn minimize(&self, window: &WindowRecord) -> bool {
        if window.is_minimized {
            return true;
        }

        let target = format!("{},{}", MINIMIZED_WORKSPACE, address_selector(window));
        if !self.dispatch(&["movetoworkspacesilent", target.as_str()]) {
            warn!("minimize {} failed", window.short_address);
            return false;
        }

        self.cache.invalidate();
        self.store.upsert(MinimizedEntry::from_window(window));
        info!("minimized {} ({})", window.short_address, window.class_name);
        true
    }

    /// Move `window` out of the hidden workspace onto the active one.
    pub fn restore(&self, window: &WindowRecord) -> bool {
        if !window.is_minimized {
            return true;
        }

        let Some(workspace) = self.active_workspace() else {
            warn!("restore {}: active workspace unknown", window.short_address);
            return false;
        };
        let workspace = workspace.to_string();

        let target = format!("{},{}", workspace, address_selector(window));
        if !self.dispatch(&["movetoworkspace", target.as_str()]) {
            warn!("restore {} failed", window.short_address);
            return false;
        }

        self.cache.invalidate();
        self.dispatch(&["workspace", workspace.as_str()]);
        self.dispatch(&["focuswindow", address_selector(window).as_str()]);
        self.dispatch(&["bringactivetotop"]);
        self.store.remove(&window.address);
        info!("restored {} to workspace {}", window.short_address, workspace);
        true
    }

    //  internals

    /// `hyprctl dispatch <args>`; true when Hyprland answers `ok`.
    fn dispatch(&self, args: &[&str]) -> bool {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("dispatch");
        full.extend_from_slice(args);
        match self.ctl.run(&full) {
            Some(reply) if reply.trim() == "ok" => true,
            Some(reply) => {
                debug!("dispatch {} rejected: {}", args.join(" "), reply.trim());
                false
            }
            None => false,
        }
    }
}

fn address_selector(window: &WindowRecord) -> String {
    format!("address:{}", window.address)
}
