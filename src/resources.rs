// SPDX-License-Identifier: GPL-3.0-only

//! Layouts compiled into the binary.

use crate::layout::{
    validation::validate_layout, LayoutDef, LayoutLoader, ParseError, ParseResult,
    LAYOUT_EXTENSION,
};
use rust_embed::Embed;

/// Layout descriptions embedded from `resources/layouts`.
#[derive(Embed)]
#[folder = "resources/layouts/"]
#[include = "*.json"]
pub struct BuiltinLayouts;

/// Raw JSON of a built-in layout.
pub fn builtin_layout_json(name: &str) -> Option<Vec<u8>> {
    BuiltinLayouts::get(&format!("{}.{}", name, LAYOUT_EXTENSION))
        .map(|file| file.data.into_owned())
}

/// Names of all built-in layouts, sorted.
pub fn builtin_layout_names() -> Vec<String> {
    let mut names: Vec<String> = BuiltinLayouts::iter()
        .filter_map(|path| {
            path.strip_suffix(&format!(".{}", LAYOUT_EXTENSION))
                .map(String::from)
        })
        .collect();
    names.sort();
    names
}

/// Loader for the built-in layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLoader;

impl LayoutLoader for BuiltinLoader {
    fn load(&self, name: &str) -> Result<ParseResult<LayoutDef>, ParseError> {
        let data = builtin_layout_json(name)
            .ok_or_else(|| ParseError::unknown_layout(name, builtin_layout_names()))?;
        let layout: LayoutDef = serde_json::from_slice(&data)
            .map_err(|e| ParseError::json_error_with_path(e, format!("builtin:{}", name)))?;
        validate_layout(layout).map_err(|e| e.with_path(format!("builtin:{}", name)))
    }

    fn available(&self) -> Vec<String> {
        builtin_layout_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_settings::{DEFAULT_LAYOUT, LEVEL_TOGGLE_KEY};
    use crate::input::{EventQueue, ModifierMask};
    use crate::layout::build_keyboard;

    /// The default layout ships and validates without warnings
    #[test]
    fn test_default_layout_is_clean() {
        assert!(builtin_layout_names().contains(&DEFAULT_LAYOUT.to_string()));

        let result = BuiltinLoader.load(DEFAULT_LAYOUT).expect("Default layout should load");
        assert!(!result.has_warnings(), "Unexpected warnings: {:?}", result.warnings);
        assert_eq!(result.layout.num_lock_mask, ModifierMask::NUM_LOCK);
    }

    /// The default layout carries the keys the level logic relies on
    #[test]
    fn test_default_layout_keys() {
        let result = BuiltinLoader.load(DEFAULT_LAYOUT).unwrap();
        let keyboard = build_keyboard(&result.layout, EventQueue::new());

        for name in [LEVEL_TOGGLE_KEY, "LFSH", "RALT", "NMLK", "KP1"] {
            assert!(keyboard.find_key_by_name(name).is_some(), "Missing key {}", name);
        }
        let shift = keyboard.find_key_by_name("LFSH").unwrap();
        assert_eq!(
            keyboard.resolve_symbol(shift).map(|s| s.modifier_mask),
            Some(ModifierMask::SHIFT)
        );
    }

    /// Unknown built-in names list the alternatives
    #[test]
    fn test_unknown_builtin() {
        match BuiltinLoader.load("klingon") {
            Err(ParseError::UnknownLayout { available, .. }) => {
                assert!(available.contains(&DEFAULT_LAYOUT.to_string()));
            }
            other => panic!("Expected UnknownLayout, got {:?}", other),
        }
    }
}
