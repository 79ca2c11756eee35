// src/util.rs

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::Path;

pub const RED: &str = "31";

/// Read a UTF-8 file into a String with a clear error message.
pub fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file {:?}", path))
}

/// Last path component of a directory, or an empty string for `/`.
///
/// Example:
/// /home/me/src/order-service → order-service
pub fn dir_base_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Color is used only when stderr is a terminal and `NO_COLOR` is unset.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("\x1b[{}m{}\x1b[0m", color, text)
    } else {
        text.to_string()
    }
}
