// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! Icon name catalog.
//!
//! The vector art itself lives in the plugin bundle; the relay only validates names so it can
//! substitute the placeholder for unknown requests and disclose that in the outcome text.

/// Substituted when a requested icon name is not in the catalog.
pub const PLACEHOLDER_ICON: &str = "square";

/// Names the plugin bundle ships art for.
pub const ICON_NAMES: &[&str] = &[
    "alert-circle",
    "alert-triangle",
    "archive",
    "arrow-down",
    "arrow-left",
    "arrow-right",
    "arrow-up",
    "bell",
    "bookmark",
    "calendar",
    "camera",
    "check",
    "check-circle",
    "chevron-down",
    "chevron-left",
    "chevron-right",
    "chevron-up",
    "circle",
    "clock",
    "cloud",
    "copy",
    "download",
    "edit",
    "external-link",
    "eye",
    "file",
    "filter",
    "folder",
    "globe",
    "heart",
    "home",
    "image",
    "info",
    "link",
    "lock",
    "mail",
    "map-pin",
    "menu",
    "message-circle",
    "minus",
    "moon",
    "paperclip",
    "phone",
    "play",
    "plus",
    "search",
    "settings",
    "share",
    "shopping-cart",
    "square",
    "star",
    "sun",
    "trash",
    "upload",
    "user",
    "users",
    "x",
    "x-circle",
    "zap",
];

/// Resolves a requested icon name. Returns the name to use on the wire and whether the
/// placeholder was substituted.
pub fn resolve(requested: &str) -> (&'static str, bool) {
    match ICON_NAMES.iter().find(|name| **name == requested) {
        Some(name) => (name, false),
        None => (PLACEHOLDER_ICON, true),
    }
}
