// SPDX-License-Identifier: GPL-3.0-only

//! Layout parsing and keyboard construction.
//!
//! This module parses layout descriptions from JSON files and strings and
//! turns a validated description into a populated [`Keyboard`].

use crate::input::{symbol_from_keysym_name, KeyboardSink};
use crate::keyboard::{Key, Keyboard, Symbol, SymbolMatrix};
use crate::layout::types::{LayoutDef, ParseError, ParseResult, SymbolDef};
use crate::layout::validation::validate_layout;
use std::fs;
use std::path::Path;

/// Parses a layout description from a JSON file.
///
/// I/O failures and malformed JSON are reported with the file path attached.
///
/// # Example
///
/// ```rust,ignore
/// use softkey::layout::parse_layout_file;
///
/// match parse_layout_file("layouts/us.json") {
///     Ok(result) => {
///         println!("Loaded layout: {}", result.layout.name);
///         for warning in &result.warnings {
///             println!("  {}", warning);
///         }
///     }
///     Err(e) => eprintln!("Failed to parse layout: {}", e),
/// }
/// ```
pub fn parse_layout_file(path: impl AsRef<Path>) -> Result<ParseResult<LayoutDef>, ParseError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let json_str =
        fs::read_to_string(path).map_err(|e| ParseError::io_error_with_path(e, &display))?;

    parse_layout_from_string(&json_str).map_err(|e| e.with_path(display))
}

/// Parses a layout description from a JSON string.
pub fn parse_layout_from_string(json: &str) -> Result<ParseResult<LayoutDef>, ParseError> {
    let layout: LayoutDef = serde_json::from_str(json).map_err(ParseError::json_error)?;
    validate_layout(layout)
}

/// Parses a JSON layout and builds a keyboard reporting into `sink`.
pub fn load_keyboard_from_string<S: KeyboardSink>(
    json: &str,
    sink: S,
) -> Result<ParseResult<Keyboard<S>>, ParseError> {
    Ok(parse_layout_from_string(json)?.map(|layout| build_keyboard(&layout, sink)))
}

/// Builds a keyboard from a layout description.
///
/// Slots that cannot be resolved (unknown keysyms) are left empty; they are
/// already reported as warnings by validation.
pub fn build_keyboard<S: KeyboardSink>(layout: &LayoutDef, sink: S) -> Keyboard<S> {
    let mut keyboard = Keyboard::with_sink(sink);
    keyboard.set_num_lock_mask(layout.num_lock_mask);
    keyboard.set_alt_gr_mask(layout.alt_gr_mask);

    for outline in &layout.outlines {
        keyboard.add_outline(outline.clone());
    }

    for section_def in &layout.sections {
        let section = keyboard.create_section(section_def.name.clone(), section_def.angle);
        for key_def in &section_def.keys {
            let groups = key_def
                .groups
                .iter()
                .map(|levels| {
                    levels
                        .iter()
                        .map(|slot| slot.as_ref().and_then(build_symbol))
                        .collect()
                })
                .collect();
            let key = Key::new(key_def.name.clone(), key_def.keycode)
                .with_oref(key_def.oref)
                .with_symbols(SymbolMatrix::from_groups(groups));
            keyboard.create_key(section, key);
        }
    }

    tracing::debug!(
        "Built keyboard '{}' with {} sections",
        layout.name,
        keyboard.sections().len()
    );
    keyboard
}

/// Builds a symbol from one slot of a layout description.
pub fn build_symbol(def: &SymbolDef) -> Option<Symbol> {
    match def {
        SymbolDef::Keysym {
            keysym,
            label,
            icon,
            tooltip,
            category,
        } => {
            let mut symbol = symbol_from_keysym_name(keysym)?;
            if let Some(label) = label {
                symbol.label = Some(label.clone());
            }
            if let Some(category) = category {
                symbol.category = *category;
            }
            symbol.icon_name = icon.clone();
            symbol.tooltip = tooltip.clone();
            Some(symbol)
        }
        SymbolDef::Custom {
            name,
            label,
            icon,
            tooltip,
            category,
            modifiers,
        } => Some(Symbol {
            name: name.clone(),
            label: label.clone(),
            icon_name: icon.clone(),
            tooltip: tooltip.clone(),
            category: *category,
            modifier_mask: *modifiers,
            keysym: None,
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{EventQueue, ModifierMask};
    use crate::keyboard::{KeyId, SymbolCategory};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LAYOUT: &str = r#"{
        "name": "mini",
        "num_lock_mask": "MOD2",
        "alt_gr_mask": "MOD5",
        "outlines": [ { "points": [ {"x": 0, "y": 0}, {"x": 40, "y": 50} ] } ],
        "sections": [
            { "name": "letters", "keys": [
                { "name": "AC01", "keycode": 30, "groups": [[ {"keysym": "a"}, {"keysym": "A"}, {"keysym": "1"}, {"keysym": "exclam"} ]] },
                { "name": "LFSH", "keycode": 42, "groups": [[ {"keysym": "Shift_L", "label": "Shift"} ]] },
                { "name": "ABC123", "groups": [[ {"name": "ABC123", "label": "123", "category": "function"} ]] },
                { "name": "gap" }
            ]},
            { "name": "numpad", "angle": 0, "keys": [
                { "name": "KP1", "keycode": 79, "groups": [[ {"keysym": "KP_End"}, {"keysym": "KP_1"} ]] }
            ]}
        ]
    }"#;

    /// Test parsing a valid layout string
    #[test]
    fn test_parse_valid_json_string() {
        let result = parse_layout_from_string(LAYOUT).expect("Should parse valid JSON");
        assert!(!result.has_warnings(), "Unexpected warnings: {:?}", result.warnings);
        assert_eq!(result.layout.name, "mini");
        assert_eq!(result.layout.num_lock_mask, ModifierMask::NUM_LOCK);
        assert_eq!(result.layout.sections.len(), 2);
    }

    /// Test building a keyboard resolves keysyms and custom symbols
    #[test]
    fn test_build_keyboard() {
        let keyboard = load_keyboard_from_string(LAYOUT, EventQueue::new())
            .unwrap()
            .into_layout();

        assert_eq!(keyboard.num_lock_mask(), ModifierMask::MOD2);
        assert_eq!(keyboard.alt_gr_mask(), ModifierMask::MOD5);
        assert_eq!(keyboard.n_outlines(), 1);

        let shift = keyboard.find_key_by_name("LFSH").unwrap();
        assert_eq!(shift, KeyId::new(0, 1));
        let symbol = keyboard.resolve_symbol(shift).unwrap();
        assert_eq!(symbol.modifier_mask, ModifierMask::SHIFT);
        assert_eq!(symbol.label.as_deref(), Some("Shift"), "Label override should apply");

        let toggle = keyboard.find_key_by_name("ABC123").unwrap();
        let symbol = keyboard.resolve_symbol(toggle).unwrap();
        assert_eq!(symbol.category, SymbolCategory::Function);
        assert!(symbol.modifier_mask.is_empty());

        let gap = keyboard.find_key_by_name("gap").unwrap();
        assert!(keyboard.resolve_symbol(gap).is_none(), "Key without groups has no symbol");
    }

    /// Test unknown keysyms leave an empty slot and a warning
    #[test]
    fn test_unknown_keysym_slot_is_empty() {
        let json = r#"{"name": "x", "sections": [{"name": "s", "keys": [
            {"name": "ABC123"},
            {"name": "k", "groups": [[ {"keysym": "a"}, {"keysym": "Bogus_Sym"} ]]}
        ]}]}"#;
        let result = load_keyboard_from_string(json, EventQueue::new()).unwrap();
        assert_eq!(result.warning_count(), 1);

        let keyboard = result.into_layout();
        let key = keyboard.key(KeyId::new(0, 1)).unwrap();
        assert!(key.symbols().get(0, 1).is_none());
        assert_eq!(key.symbol(0, 1).map(|s| s.name.as_str()), Some("a"), "Falls back to (0, 0)");
    }

    /// Test handling a missing file with an I/O error
    #[test]
    fn test_parse_missing_file() {
        let err = parse_layout_file("/nonexistent/path/to/layout.json").unwrap_err();
        match &err {
            ParseError::IoError { file_path, suggestion, .. } => {
                assert!(file_path.is_some(), "Error should include file path");
                assert!(suggestion.is_some(), "Error should include suggestion");
            }
            other => panic!("Expected IoError variant, got {:?}", other),
        }
    }

    /// Test malformed JSON in a file reports path and line
    #[test]
    fn test_malformed_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\n  \"name\": \"x\",\n  \"sections\": [\n}}").unwrap();

        let err = parse_layout_file(file.path()).unwrap_err();
        match err {
            ParseError::JsonError { file_path, line_number, .. } => {
                assert!(file_path.is_some(), "Path should be attached");
                assert!(line_number.is_some(), "Line should be reported");
            }
            other => panic!("Expected JsonError, got {:?}", other),
        }
    }

    /// Test parsing a valid layout file
    #[test]
    fn test_parse_layout_file_valid() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(LAYOUT.as_bytes()).unwrap();

        let result = parse_layout_file(file.path()).unwrap();
        assert_eq!(result.layout.sections[1].name, "numpad");
    }
}
