//! Merging live compositor state with the minimized-window store.
//!
//! Two sources can describe the same window: the compositor's client list
//! and the store this tool writes when minimizing.  They disagree whenever a
//! window is moved out of `special:minimum` by something other than
//! hyprtabs, or closed while hidden.  [`ReconciliationPolicy`] picks which
//! source answers "what windows exist"; whichever is chosen, the result
//! never contains an address twice.

use crate::hyprland::client::CompositorClient;
use crate::traits::Hyprctl;
use crate::window::WindowRecord;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// How the window list is sourced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationPolicy {
    /// The compositor is the only authority.  Windows parked in
    /// `special:minimum` are listed as minimized; the store is not read.
    #[default]
    Live,
    /// Live windows outside special workspaces, followed by the store's
    /// minimized set.  A stored address that is also live is dropped; one
    /// the compositor still reports in `special:minimum` takes the live
    /// record's data.
    Split,
}

/// Merge `live` and `stored` under `policy`.
///
/// Duplicates within a source collapse to one record: the last occurrence's
/// data at the first occurrence's position.
pub fn reconcile(
    live: Vec<WindowRecord>,
    stored: Vec<WindowRecord>,
    policy: ReconciliationPolicy,
) -> Vec<WindowRecord> {
    match policy {
        ReconciliationPolicy::Live => dedup_last_wins(live),
        ReconciliationPolicy::Split => {
            let (visible, special): (Vec<_>, Vec<_>) =
                live.into_iter().partition(|w| !w.in_special_workspace());
            let mut merged = dedup_last_wins(visible);
            let seen: HashSet<String> = merged.iter().map(|w| w.address.clone()).collect();
            // The compositor's copy of a hidden window is fresher than the
            // stored one.
            let hidden_live: HashMap<String, WindowRecord> = special
                .into_iter()
                .filter(|w| w.is_minimized)
                .map(|w| (w.address.clone(), w))
                .collect();
            let hidden = dedup_last_wins(
                stored
                    .into_iter()
                    .filter(|w| !seen.contains(&w.address))
                    .map(|w| hidden_live.get(&w.address).cloned().unwrap_or(w))
                    .collect(),
            );
            merged.extend(hidden);
            merged
        }
    }
}

/// Every window to offer in the switcher, per `policy`.
pub fn all_windows<H: Hyprctl>(
    client: &CompositorClient<H>,
    policy: ReconciliationPolicy,
) -> Vec<WindowRecord> {
    let live = client.list_all_windows();
    let stored = match policy {
        ReconciliationPolicy::Live => Vec::new(),
        ReconciliationPolicy::Split => client.store().list(client.icons()),
    };
    let windows = reconcile(live, stored, policy);
    debug!("{} window(s) under {:?} policy", windows.len(), policy);
    windows
}

fn dedup_last_wins(records: Vec<WindowRecord>) -> Vec<WindowRecord> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut out: Vec<WindowRecord> = Vec::with_capacity(records.len());
    for record in records {
        match index.get(&record.address) {
            Some(&i) => out[i] = record,
            None => {
                index.insert(record.address.clone(), out.len());
                out.push(record);
            }
        }
    }
    out
}
