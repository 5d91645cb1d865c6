//! Application class → display glyph lookup.
//!
//! Glyphs come from the Nerd Fonts private-use area, so the overlay font
//! needs Nerd Font coverage to render them.

use std::cell::RefCell;
use std::collections::HashMap;

/// Pattern reserved for the fallback glyph.
pub const DEFAULT_PATTERN: &str = "default";

/// `(pattern, glyph)` pairs.  Patterns are lowercase and must not overlap:
/// a class matching two patterns gets whichever comes first here.
pub const ICONS: &[(&str, &str)] = &[
    ("firefox", "\u{f269}"),
    ("alacritty", "\u{f120}"),
    ("discord", "\u{f066f}"),
    ("steam", "\u{f1b6}"),
    ("chromium", "\u{f268}"),
    ("microsoft-edge", "\u{f282}"),
    ("code", "\u{f0a1e}"),
    ("spotify", "\u{f1bc}"),
    (DEFAULT_PATTERN, "\u{f05b2}"),
];

/// Resolves a window class to a glyph, memoizing every answer.
///
/// The memo lives as long as the resolver and is never invalidated; the
/// mapping is a pure function of [`ICONS`].
#[derive(Debug, Default)]
pub struct IconResolver {
    memo: RefCell<HashMap<String, &'static str>>,
}

impl IconResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Glyph for `class_name`.
    pub fn icon_for(&self, class_name: &str) -> &'static str {
        if let Some(icon) = self.memo.borrow().get(class_name).copied() {
            return icon;
        }
        let icon = lookup(class_name);
        self.memo.borrow_mut().insert(class_name.to_string(), icon);
        icon
    }

    /// Number of distinct classes resolved so far.
    pub fn memoized(&self) -> usize {
        self.memo.borrow().len()
    }
}

fn lookup(class_name: &str) -> &'static str {
    let class_lower = class_name.to_lowercase();
    ICONS
        .iter()
        .filter(|(pattern, _)| *pattern != DEFAULT_PATTERN)
        .find(|(pattern, _)| class_lower.contains(pattern))
        .map(|(_, icon)| *icon)
        .unwrap_or_else(default_icon)
}

fn default_icon() -> &'static str {
    ICONS
        .iter()
        .find(|(pattern, _)| *pattern == DEFAULT_PATTERN)
        .map(|(_, icon)| *icon)
        .unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_substring_match() {
        let icons = IconResolver::new();
        assert_eq!(icons.icon_for("firefox"), "\u{f269}");
        assert_eq!(icons.icon_for("org.mozilla.Firefox"), "\u{f269}");
        assert_eq!(icons.icon_for("Alacritty"), "\u{f120}");
        assert_eq!(icons.icon_for("Code"), "\u{f0a1e}");
    }

    #[test]
    fn unknown_class_gets_default() {
        let icons = IconResolver::new();
        assert_eq!(icons.icon_for("kitty"), default_icon());
        assert_eq!(icons.icon_for(""), default_icon());
    }

    #[test]
    fn class_named_default_is_not_special() {
        // The fallback row is never matched as a pattern.
        let icons = IconResolver::new();
        assert_eq!(icons.icon_for("my-default-app"), default_icon());
    }

    #[test]
    fn answers_are_memoized_per_class() {
        let icons = IconResolver::new();
        icons.icon_for("firefox");
        icons.icon_for("firefox");
        icons.icon_for("Firefox");
        assert_eq!(icons.memoized(), 2);
    }

    #[test]
    fn patterns_do_not_overlap() {
        let patterns: Vec<&str> = ICONS
            .iter()
            .map(|(p, _)| *p)
            .filter(|p| *p != DEFAULT_PATTERN)
            .collect();
        for a in &patterns {
            for b in &patterns {
                if a != b {
                    assert!(!a.contains(b), "{a} contains {b}");
                }
            }
        }
    }
}
