// SPDX-License-Identifier: GPL-3.0-only

//! JSON layout loader.
//!
//! Layout descriptions list the sections of a keyboard, the keys of each
//! section and the symbol table of each key. Loading produces a populated
//! [`Keyboard`](crate::keyboard::Keyboard) ready for input.
//!
//! # Features
//!
//! - **Permissive validation**: Only a layout without sections is rejected; other
//!   problems come back as warnings in a [`ParseResult`]
//! - **Keysym symbols**: Slots name an XKB keysym and get label, category and
//!   modifier mask from it
//! - **Custom symbols**: Slots may define name, label, icon and modifiers directly
//! - **Pluggable sources**: [`LayoutLoader`] resolves layout names, from a
//!   directory ([`DirectoryLoader`]) or from the built-in set
//!   ([`crate::resources::BuiltinLoader`])
//! - **Fallback**: [`load_with_fallback`] tries the named layout, then
//!   [`DEFAULT_LAYOUT`], skipping sources that are missing or broken
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use softkey::input::EventQueue;
//! use softkey::layout::{build_keyboard, parse_layout_file};
//!
//! let result = parse_layout_file("layouts/us.json")?;
//! for warning in &result.warnings {
//!     eprintln!("{}", warning);
//! }
//! let keyboard = build_keyboard(&result.layout, EventQueue::new());
//! ```

// Sub-modules
pub mod parser;
pub mod types;
pub mod validation;

// Re-export public API - Error handling types
pub use types::{ParseError, ParseResult, Severity, ValidationIssue};

// Re-export public API - Parser functions
pub use parser::{
    build_keyboard, build_symbol, load_keyboard_from_string, parse_layout_file,
    parse_layout_from_string,
};

// Re-export public API - Data structures
pub use types::{KeyDef, LayoutDef, SectionDef, SymbolDef};

use crate::app_settings::DEFAULT_LAYOUT;
use crate::resources::BuiltinLoader;
use std::path::{Path, PathBuf};

/// Extension of layout files.
pub const LAYOUT_EXTENSION: &str = "json";

/// A source of layout descriptions, addressed by name.
pub trait LayoutLoader {
    /// Loads and validates the layout called `name`.
    fn load(&self, name: &str) -> Result<ParseResult<LayoutDef>, ParseError>;

    /// Names of the layouts this source offers, sorted.
    fn available(&self) -> Vec<String>;
}

/// Loads `<name>.json` from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    dir: PathBuf,
}

impl DirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LayoutLoader for DirectoryLoader {
    fn load(&self, name: &str) -> Result<ParseResult<LayoutDef>, ParseError> {
        let path = self.dir.join(format!("{}.{}", name, LAYOUT_EXTENSION));
        if !path.is_file() {
            return Err(ParseError::unknown_layout(name, self.available()));
        }
        parse_layout_file(path)
    }

    fn available(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == LAYOUT_EXTENSION))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        names.sort();
        names
    }
}

/// Where a layout may come from, most preferred first.
///
/// For each of `name` and [`DEFAULT_LAYOUT`], `layout_dir` is tried before the
/// built-in set.
pub fn layout_sources<'a>(
    name: &'a str,
    layout_dir: Option<&Path>,
) -> Vec<(&'a str, Box<dyn LayoutLoader>)> {
    let mut sources: Vec<(&str, Box<dyn LayoutLoader>)> = Vec::new();
    let mut add_by_name = |name: &'a str| {
        if let Some(dir) = layout_dir {
            sources.push((name, Box::new(DirectoryLoader::new(dir))));
        }
        sources.push((name, Box::new(BuiltinLoader)));
    };

    add_by_name(name);
    if name != DEFAULT_LAYOUT {
        add_by_name(DEFAULT_LAYOUT);
    }
    sources
}

/// Loads the first layout source from [`layout_sources`] that parses.
///
/// Missing sources are skipped quietly, broken ones with a warning. Only when
/// every source fails is the last error returned.
pub fn load_with_fallback(
    name: &str,
    layout_dir: Option<&Path>,
) -> Result<ParseResult<LayoutDef>, ParseError> {
    let mut last_error = None;
    for (candidate, loader) in layout_sources(name, layout_dir) {
        match loader.load(candidate) {
            Ok(result) => {
                if candidate != name {
                    tracing::warn!("Layout '{}' unavailable, using '{}'", name, candidate);
                }
                return Ok(result);
            }
            Err(e @ ParseError::UnknownLayout { .. }) => {
                tracing::debug!("No layout '{}' in this source", candidate);
                last_error = Some(e);
            }
            Err(e) => {
                tracing::warn!("Failed to load layout '{}': {}, skipping", candidate, e);
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| ParseError::unknown_layout(name, Vec::new())))
}

// ============================================================================
// Module Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::EventQueue;
    use std::fs;
    use tempfile::TempDir;

    const SMALL: &str = r#"{"name": "small", "sections": [{"name": "main", "keys": [
        {"name": "ABC123", "groups": [[{"name": "ABC123", "label": "123"}]]},
        {"name": "AC01", "keycode": 30, "groups": [[{"keysym": "a"}, {"keysym": "A"}]]}
    ]}]}"#;

    /// Test the directory loader finds layouts by name and lists them
    #[test]
    fn test_directory_loader() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("small.json"), SMALL).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a layout").unwrap();

        let loader = DirectoryLoader::new(dir.path());
        assert_eq!(loader.available(), vec!["small".to_string()]);

        let result = loader.load("small").unwrap();
        assert!(!result.has_warnings(), "Unexpected warnings: {:?}", result.warnings);

        let keyboard = build_keyboard(&result.layout, EventQueue::new());
        assert!(keyboard.find_key_by_name("AC01").is_some());
    }

    /// Test unknown names report the available layouts
    #[test]
    fn test_directory_loader_unknown() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("small.json"), SMALL).unwrap();

        match DirectoryLoader::new(dir.path()).load("big") {
            Err(ParseError::UnknownLayout { name, available }) => {
                assert_eq!(name, "big");
                assert_eq!(available, vec!["small".to_string()]);
            }
            other => panic!("Expected UnknownLayout, got {:?}", other),
        }
    }

    /// Test a layout in the directory shadows the built-in one
    #[test]
    fn test_fallback_prefers_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("us.json"), SMALL).unwrap();

        let result = load_with_fallback(DEFAULT_LAYOUT, Some(dir.path())).unwrap();
        assert_eq!(result.layout.name, "small");
    }

    /// Test a malformed layout is skipped in favour of the built-in default
    #[test]
    fn test_fallback_skips_malformed_layout() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("de.json"), "{\n  \"name\": \"de\",\n  \"sect").unwrap();

        let result = load_with_fallback("de", Some(dir.path())).unwrap();
        assert_eq!(result.layout.name, DEFAULT_LAYOUT, "Should fall back to the default");

        let keyboard = build_keyboard(&result.layout, EventQueue::new());
        assert!(keyboard.find_key_by_name("AD01").is_some());
    }

    /// Test unknown names fall back without a layout directory
    #[test]
    fn test_fallback_unknown_name() {
        let result = load_with_fallback("fr", None).unwrap();
        assert_eq!(result.layout.name, DEFAULT_LAYOUT);
    }

    /// Test the source order: requested name first, directory before built-in
    #[test]
    fn test_layout_sources_order() {
        let dir = TempDir::new().unwrap();
        let names: Vec<&str> = layout_sources("de", Some(dir.path()))
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["de", "de", DEFAULT_LAYOUT, DEFAULT_LAYOUT]);

        assert_eq!(layout_sources(DEFAULT_LAYOUT, None).len(), 1);
    }
}
