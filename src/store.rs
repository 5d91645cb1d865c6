//! Persistent record of the windows this tool has minimized.
//!
//! The document is a JSON array at a fixed path, rewritten in full
//! (pretty-printed with four-space indentation) on every change:
//!
//! ```json
//! [
//!     {
//!         "address": "0x55d1c2a0",
//!         "display_title": "\u{f269} firefox - Inbox [WS 2]",
//!         "class": "firefox",
//!         "original_title": "Inbox",
//!         "preview": "",
//!         "icon": "\u{f269}"
//!     }
//! ]
//! ```
//!
//! The store is best effort.  A missing or corrupt document reads as empty,
//! and write failures are logged and swallowed; nothing here ever reaches
//! the caller as an error.  Read-modify-write is not atomic: two processes
//! writing the same file can lose updates.

use crate::icon::IconResolver;
use crate::window::WindowRecord;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One minimized window, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimizedEntry {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub display_title: String,
    #[serde(default, rename = "class")]
    pub class_name: String,
    #[serde(default)]
    pub original_title: String,
    /// Reserved; always written empty.
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub icon: String,
}

impl MinimizedEntry {
    /// Capture the display details of `window` at the moment it is minimized.
    pub fn from_window(window: &WindowRecord) -> Self {
        Self {
            address: window.address.clone(),
            display_title: window.display_title(),
            class_name: window.class_name.clone(),
            original_title: window.title.clone(),
            preview: String::new(),
            icon: window.icon.clone(),
        }
    }
}

/// Errors from reading or writing the document.  Internal only.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed set of [`MinimizedEntry`]s, at most one per address.
#[derive(Debug, Clone)]
pub struct MinimizedStore {
    path: PathBuf,
}

impl MinimizedStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every persisted entry, in document order.
    pub fn entries(&self) -> Vec<MinimizedEntry> {
        match self.read() {
            Ok(entries) => entries,
            Err(e) => {
                debug!("minimized store unreadable, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Every persisted entry as a minimized [`WindowRecord`].
    pub fn list(&self, icons: &IconResolver) -> Vec<WindowRecord> {
        self.entries()
            .into_iter()
            .map(|e| WindowRecord::minimized(e.address, e.original_title, e.class_name, icons))
            .collect()
    }

    /// Replace the entry with the same address, or append it.
    pub fn upsert(&self, entry: MinimizedEntry) {
        let address = entry.address.clone();
        let mut entries = self.entries();
        match entries.iter_mut().find(|e| e.address == entry.address) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        match self.write(&entries) {
            Ok(()) => debug!("stored minimized window {}", address),
            Err(e) => warn!("failed to store minimized window {}: {}", address, e),
        }
    }

    /// Drop every entry for `address`.
    pub fn remove(&self, address: &str) {
        let entries = match self.read() {
            Ok(entries) => entries,
            Err(e) => {
                debug!("nothing to remove for {}: {}", address, e);
                return;
            }
        };
        let kept: Vec<MinimizedEntry> = entries.into_iter().filter(|e| e.address != address).collect();
        match self.write(&kept) {
            Ok(()) => debug!("removed minimized window {}", address),
            Err(e) => warn!("failed to remove minimized window {}: {}", address, e),
        }
    }

    //  internals

    fn read(&self) -> Result<Vec<MinimizedEntry>, StoreError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write(&self, entries: &[MinimizedEntry]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        entries.serialize(&mut ser)?;

        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = std::fs::File::create(&self.path).map_err(io_err)?;
        file.write_all(&buf).map_err(io_err)?;
        file.flush().map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(address: &str, title: &str) -> MinimizedEntry {
        MinimizedEntry {
            address: address.into(),
            display_title: format!("x kitty - {} [WS 1]", title),
            class_name: "kitty".into(),
            original_title: title.into(),
            preview: String::new(),
            icon: "x".into(),
        }
    }

    fn scratch_store() -> (tempfile::TempDir, MinimizedStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MinimizedStore::new(dir.path().join("state").join("windows.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_lists_empty() {
        let (_dir, store) = scratch_store();
        assert!(store.entries().is_empty());
        assert!(store.list(&IconResolver::new()).is_empty());
    }

    #[test]
    fn corrupt_file_lists_empty() {
        let (_dir, store) = scratch_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "[{\"address\": \"0x1\",").unwrap();
        assert!(store.entries().is_empty());
    }

    #[test]
    fn upsert_creates_directory_and_round_trips() {
        let (_dir, store) = scratch_store();
        let e = entry("0xabc", "Inbox");
        store.upsert(e.clone());
        assert_eq!(store.entries(), vec![e.clone()]);

        let listed = store.list(&IconResolver::new());
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].address, "0xabc");
        assert_eq!(listed[0].title, "Inbox");
        assert!(listed[0].is_minimized);
        assert_eq!(listed[0].workspace_id, 0);

        store.remove("0xabc");
        assert!(store.entries().is_empty());
    }

    #[test]
    fn upsert_keeps_one_entry_per_address_with_last_fields() {
        let (_dir, store) = scratch_store();
        store.upsert(entry("0x1", "first"));
        store.upsert(entry("0x2", "other"));
        store.upsert(entry("0x1", "second"));
        store.upsert(entry("0x1", "third"));

        let entries = store.entries();
        assert_eq!(entries.len(), 2);
        let one: Vec<_> = entries.iter().filter(|e| e.address == "0x1").collect();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0], &entry("0x1", "third"));
        // Replacement keeps the original position.
        assert_eq!(entries[0].address, "0x1");
    }

    #[test]
    fn upsert_over_corrupt_file_starts_fresh() {
        let (_dir, store) = scratch_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();
        store.upsert(entry("0x1", "t"));
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn remove_missing_address_leaves_others() {
        let (_dir, store) = scratch_store();
        store.upsert(entry("0x1", "a"));
        store.remove("0x9");
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn remove_without_file_is_silent() {
        let (_dir, store) = scratch_store();
        store.remove("0x1");
        assert!(!store.path().exists());
    }

    #[test]
    fn document_uses_wire_field_names_and_four_space_indent() {
        let (_dir, store) = scratch_store();
        store.upsert(entry("0x1", "a"));
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\n    {\n        \"address\": \"0x1\""));
        assert!(text.contains("\"class\": \"kitty\""));
        assert!(text.contains("\"preview\": \"\""));
    }

    #[test]
    fn entries_tolerate_missing_fields() {
        let (_dir, store) = scratch_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"[{"address": "0x7", "class": "foot"}]"#).unwrap();
        let entries = store.entries();
        assert_eq!(entries[0].address, "0x7");
        assert_eq!(entries[0].class_name, "foot");
        assert_eq!(entries[0].original_title, "");
    }
}
