// SPDX-License-Identifier: GPL-3.0-only

//! Validation rules for layout descriptions.
//!
//! Validation is permissive: only a layout without any section is rejected.
//! Everything else is reported as a warning and the builder falls back to a
//! sensible default (empty symbol slot, last key wins the name, ...).

use crate::app_settings::LEVEL_TOGGLE_KEY;
use crate::input::parse_keysym;
use crate::layout::types::{
    KeyDef, LayoutDef, ParseError, ParseResult, Severity, SymbolDef, ValidationIssue,
};
use std::collections::HashSet;

/// Validates a layout and returns it with warnings.
pub fn validate_layout(layout: LayoutDef) -> Result<ParseResult<LayoutDef>, ParseError> {
    let mut warnings = Vec::new();

    validate_required_fields(&layout, &mut warnings)?;
    validate_key_names(&layout, &mut warnings);
    validate_outline_refs(&layout, &mut warnings);
    validate_all_symbols(&layout, &mut warnings);

    Ok(collect_warnings(layout, warnings))
}

/// Checks the layout name and section list.
///
/// A layout without sections cannot produce a keyboard and is an error.
pub fn validate_required_fields(
    layout: &LayoutDef,
    warnings: &mut Vec<ValidationIssue>,
) -> Result<(), ParseError> {
    if layout.sections.is_empty() {
        return Err(ParseError::validation_error(vec![
            ValidationIssue::new(Severity::Error, "Layout has no sections", "sections")
                .with_suggestion("Add at least one section with keys"),
        ]));
    }

    if layout.name.is_empty() {
        warnings.push(
            ValidationIssue::warning("Layout name is empty", "name")
                .with_suggestion("Provide a descriptive name for the layout"),
        );
    }

    for (section_idx, section) in layout.sections.iter().enumerate() {
        let path = format!("sections[{}]", section_idx);
        if section.name.is_empty() {
            warnings.push(ValidationIssue::warning(
                "Section name is empty",
                format!("{}.name", path),
            ));
        }
        if section.keys.is_empty() {
            warnings.push(ValidationIssue::warning(
                format!("Section '{}' has no keys", section.name),
                format!("{}.keys", path),
            ));
        }
    }

    Ok(())
}

/// Reports empty and duplicate key names and a missing level toggle key.
pub fn validate_key_names(layout: &LayoutDef, warnings: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    let mut has_toggle = false;

    for (path, key) in keys_with_paths(layout) {
        if key.name.is_empty() {
            warnings.push(
                ValidationIssue::warning("Key name is empty", format!("{}.name", path))
                    .with_suggestion("Name every key so it can be found by name"),
            );
            continue;
        }
        if key.name == LEVEL_TOGGLE_KEY {
            has_toggle = true;
        }
        if !seen.insert(key.name.as_str()) {
            warnings.push(
                ValidationIssue::warning(
                    format!("Duplicate key name '{}'", key.name),
                    format!("{}.name", path),
                )
                .with_suggestion("Lookups by name resolve to the last key with this name"),
            );
        }
    }

    if !has_toggle {
        warnings.push(
            ValidationIssue::warning("No level toggle key", "sections")
                .with_suggestion(format!(
                    "Add a key named '{}' to reach the numbers level",
                    LEVEL_TOGGLE_KEY
                )),
        );
    }
}

/// Reports keys whose outline id is outside the outline table.
///
/// Layouts without outlines are not checked.
pub fn validate_outline_refs(layout: &LayoutDef, warnings: &mut Vec<ValidationIssue>) {
    if layout.outlines.is_empty() {
        return;
    }

    for (path, key) in keys_with_paths(layout) {
        if key.oref as usize >= layout.outlines.len() {
            warnings.push(ValidationIssue::warning(
                format!(
                    "Outline {} does not exist (layout has {})",
                    key.oref,
                    layout.outlines.len()
                ),
                format!("{}.oref", path),
            ));
        }
    }
}

fn validate_all_symbols(layout: &LayoutDef, warnings: &mut Vec<ValidationIssue>) {
    for (path, key) in keys_with_paths(layout) {
        for (group_idx, group) in key.groups.iter().enumerate() {
            for (level_idx, slot) in group.iter().enumerate() {
                let slot_path = format!("{}.groups[{}][{}]", path, group_idx, level_idx);
                if let Some(symbol) = slot {
                    validate_symbol(symbol, &slot_path, warnings);
                }
            }
        }
    }
}

/// Checks a single symbol slot.
pub fn validate_symbol(symbol: &SymbolDef, path: &str, warnings: &mut Vec<ValidationIssue>) {
    match symbol {
        SymbolDef::Keysym { keysym, .. } => {
            if parse_keysym(keysym).is_none() {
                warnings.push(
                    ValidationIssue::warning(format!("Unknown keysym '{}'", keysym), path)
                        .with_suggestion("Use an XKB keysym name or a U+XXXX codepoint"),
                );
            }
        }
        SymbolDef::Custom { name, .. } => {
            if name.is_empty() {
                warnings.push(ValidationIssue::warning("Symbol name is empty", path));
            }
        }
    }
}

fn keys_with_paths(layout: &LayoutDef) -> impl Iterator<Item = (String, &KeyDef)> {
    layout
        .sections
        .iter()
        .enumerate()
        .flat_map(|(section_idx, section)| {
            section.keys.iter().enumerate().map(move |(key_idx, key)| {
                (format!("sections[{}].keys[{}]", section_idx, key_idx), key)
            })
        })
}

/// Sorts warnings (errors first, then by field path) into a ParseResult.
pub fn collect_warnings(
    layout: LayoutDef,
    mut warnings: Vec<ValidationIssue>,
) -> ParseResult<LayoutDef> {
    warnings.sort_by(|a, b| match (a.severity, b.severity) {
        (Severity::Error, Severity::Warning) => std::cmp::Ordering::Less,
        (Severity::Warning, Severity::Error) => std::cmp::Ordering::Greater,
        _ => a.field_path.cmp(&b.field_path),
    });

    ParseResult::with_warnings(layout, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{Outline, Point};
    use crate::layout::types::SectionDef;

    fn key(name: &str, groups: Vec<Vec<Option<SymbolDef>>>) -> KeyDef {
        KeyDef {
            name: name.to_string(),
            keycode: 1,
            oref: 0,
            groups,
        }
    }

    fn layout_with(keys: Vec<KeyDef>) -> LayoutDef {
        LayoutDef {
            name: "test".into(),
            sections: vec![SectionDef {
                name: "main".into(),
                angle: 0,
                keys,
            }],
            ..LayoutDef::default()
        }
    }

    fn has_warning(result: &ParseResult<LayoutDef>, needle: &str) -> bool {
        result.warnings.iter().any(|w| w.message.contains(needle))
    }

    /// Test a layout without sections is fatal
    #[test]
    fn test_no_sections_is_error() {
        let layout = LayoutDef {
            name: "empty".into(),
            ..LayoutDef::default()
        };
        match validate_layout(layout) {
            Err(ParseError::ValidationError { issues, .. }) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].severity, Severity::Error);
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    /// Test duplicate names and missing toggle key are warnings
    #[test]
    fn test_duplicate_names_warn() {
        let layout = layout_with(vec![key("AC01", vec![]), key("AC01", vec![])]);
        let result = validate_layout(layout).unwrap();
        assert!(has_warning(&result, "Duplicate key name 'AC01'"));
        assert!(has_warning(&result, "No level toggle key"));
    }

    /// Test a well-formed layout validates cleanly
    #[test]
    fn test_clean_layout() {
        let layout = layout_with(vec![
            key("AC01", vec![vec![Some(SymbolDef::keysym("a")), Some(SymbolDef::keysym("A"))]]),
            key(LEVEL_TOGGLE_KEY, vec![]),
        ]);
        let result = validate_layout(layout).unwrap();
        assert!(!result.has_warnings(), "Unexpected warnings: {:?}", result.warnings);
    }

    /// Test unknown keysyms are reported with their slot path
    #[test]
    fn test_unknown_keysym_warns() {
        let layout = layout_with(vec![
            key("AC01", vec![vec![None, Some(SymbolDef::keysym("NoSuchKeysym"))]]),
            key(LEVEL_TOGGLE_KEY, vec![]),
        ]);
        let result = validate_layout(layout).unwrap();
        assert_eq!(result.warning_count(), 1);
        assert_eq!(result.warnings[0].field_path, "sections[0].keys[0].groups[0][1]");
    }

    /// Test dangling outline references warn only when outlines exist
    #[test]
    fn test_outline_refs() {
        let mut layout = layout_with(vec![key(LEVEL_TOGGLE_KEY, vec![])]);
        layout.sections[0].keys[0].oref = 3;
        let result = validate_layout(layout.clone()).unwrap();
        assert!(!has_warning(&result, "Outline"), "No outline table, nothing to check");

        layout.outlines.push(Outline::new(vec![Point::new(0.0, 0.0)]));
        let result = validate_layout(layout).unwrap();
        assert!(has_warning(&result, "Outline 3 does not exist"));
    }

    /// Test warnings are sorted by field path
    #[test]
    fn test_collect_warnings_sorted() {
        let result = collect_warnings(
            LayoutDef::default(),
            vec![
                ValidationIssue::warning("b", "sections[1]"),
                ValidationIssue::warning("a", "sections[0]"),
            ],
        );
        assert_eq!(result.warnings[0].field_path, "sections[0]");
    }
}
