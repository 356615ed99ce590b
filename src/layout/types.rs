// SPDX-License-Identifier: GPL-3.0-only

//! Core data types for the JSON layout loader.
//!
//! This module defines the error and warning types reported while loading a
//! layout, and the serde model of the layout description itself.

use crate::input::ModifierMask;
use crate::keyboard::{Outline, SymbolCategory};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Error Handling Types
// ============================================================================

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal error that prevents layout from being used
    Error,
    /// Non-fatal issue that should be addressed
    Warning,
}

/// A validation issue discovered while loading a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Human-readable description of the issue
    pub message: String,
    /// Path to the offending field (e.g., "sections[0].keys[3].groups[0][1]")
    pub field_path: String,
    /// Optional suggestion for how to fix the issue
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        field_path: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            field_path: field_path.into(),
            suggestion: None,
        }
    }

    /// Shorthand for a warning.
    pub fn warning(message: impl Into<String>, field_path: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message, field_path)
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity_str = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };

        write!(f, "[{}] {}: {}", severity_str, self.field_path, self.message)?;

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }

        Ok(())
    }
}

/// Error type for layout loading.
#[derive(Debug)]
pub enum ParseError {
    /// I/O error occurred while reading a layout file
    IoError {
        source: std::io::Error,
        file_path: Option<String>,
        suggestion: Option<String>,
    },

    /// Malformed JSON or a document that does not match the layout model
    JsonError {
        source: serde_json::Error,
        file_path: Option<String>,
        /// Line number reported by serde_json
        line_number: Option<usize>,
        suggestion: Option<String>,
    },

    /// Fatal validation errors
    ValidationError {
        issues: Vec<ValidationIssue>,
        file_path: Option<String>,
    },

    /// No layout with the requested name could be found
    UnknownLayout {
        name: String,
        /// Names that are available from the same source
        available: Vec<String>,
    },
}

impl ParseError {
    pub fn io_error(source: std::io::Error) -> Self {
        Self::IoError {
            source,
            file_path: None,
            suggestion: None,
        }
    }

    pub fn io_error_with_path(source: std::io::Error, file_path: impl Into<String>) -> Self {
        Self::IoError {
            source,
            file_path: Some(file_path.into()),
            suggestion: Some("Check that the file exists and you have read permissions".into()),
        }
    }

    pub fn json_error(source: serde_json::Error) -> Self {
        let line_number = Some(source.line()).filter(|line| *line > 0);
        Self::JsonError {
            source,
            file_path: None,
            line_number,
            suggestion: Some("Check the JSON syntax at the indicated line".into()),
        }
    }

    pub fn json_error_with_path(source: serde_json::Error, file_path: impl Into<String>) -> Self {
        match Self::json_error(source) {
            Self::JsonError {
                source,
                line_number,
                suggestion,
                ..
            } => Self::JsonError {
                source,
                file_path: Some(file_path.into()),
                line_number,
                suggestion,
            },
            other => other,
        }
    }

    pub fn validation_error(issues: Vec<ValidationIssue>) -> Self {
        Self::ValidationError {
            issues,
            file_path: None,
        }
    }

    pub fn unknown_layout(name: impl Into<String>, available: Vec<String>) -> Self {
        Self::UnknownLayout {
            name: name.into(),
            available,
        }
    }

    /// Attaches a file path to errors that carry one and do not have it yet.
    pub fn with_path(self, path: impl Into<String>) -> Self {
        match self {
            Self::ValidationError {
                issues,
                file_path: None,
            } => Self::ValidationError {
                issues,
                file_path: Some(path.into()),
            },
            Self::JsonError {
                source,
                file_path: None,
                line_number,
                suggestion,
            } => Self::JsonError {
                source,
                file_path: Some(path.into()),
                line_number,
                suggestion,
            },
            other => other,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::IoError {
                source,
                file_path,
                suggestion,
            } => {
                write!(f, "I/O error")?;
                if let Some(path) = file_path {
                    write!(f, " reading file '{}'", path)?;
                }
                write!(f, ": {}", source)?;
                if let Some(hint) = suggestion {
                    write!(f, "\n  Suggestion: {}", hint)?;
                }
            }
            ParseError::JsonError {
                source,
                file_path,
                line_number,
                suggestion,
            } => {
                write!(f, "JSON parsing error")?;
                if let Some(path) = file_path {
                    write!(f, " in file '{}'", path)?;
                }
                if let Some(line) = line_number {
                    write!(f, " at line {}", line)?;
                }
                write!(f, ": {}", source)?;
                if let Some(hint) = suggestion {
                    write!(f, "\n  Suggestion: {}", hint)?;
                }
            }
            ParseError::ValidationError { issues, file_path } => {
                write!(f, "Validation failed")?;
                if let Some(path) = file_path {
                    write!(f, " for file '{}'", path)?;
                }
                writeln!(f, " with {} issue(s):", issues.len())?;
                for (i, issue) in issues.iter().enumerate() {
                    write!(f, "  {}. {}", i + 1, issue)?;
                    if i + 1 < issues.len() {
                        writeln!(f)?;
                    }
                }
            }
            ParseError::UnknownLayout { name, available } => {
                write!(f, "Unknown layout '{}'", name)?;
                if !available.is_empty() {
                    write!(f, "\n  Available layouts: {}", available.join(", "))?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::IoError { source, .. } => Some(source),
            ParseError::JsonError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err)
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::json_error(err)
    }
}

// ============================================================================
// ParseResult Type
// ============================================================================

/// Result of successfully loading a layout with optional warnings.
///
/// Loading is permissive: a usable layout is returned even when non-fatal
/// issues are found.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult<T> {
    pub layout: T,
    /// Non-fatal validation warnings
    pub warnings: Vec<ValidationIssue>,
}

impl<T> ParseResult<T> {
    pub fn new(layout: T) -> Self {
        Self {
            layout,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(layout: T, warnings: Vec<ValidationIssue>) -> Self {
        Self { layout, warnings }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Consumes the result and returns the layout, discarding warnings.
    pub fn into_layout(self) -> T {
        self.layout
    }

    /// Transforms the layout, keeping the warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseResult<U> {
        ParseResult {
            layout: f(self.layout),
            warnings: self.warnings,
        }
    }
}

// ============================================================================
// Layout Data Structures
// ============================================================================

/// Root of a layout description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutDef {
    pub name: String,

    /// Modifier bits that switch sections to their num-lock level
    #[serde(default)]
    pub num_lock_mask: ModifierMask,

    #[serde(default)]
    pub alt_gr_mask: ModifierMask,

    /// Outline table, indexed by each key's `oref`
    #[serde(default)]
    pub outlines: Vec<Outline>,

    #[serde(default)]
    pub sections: Vec<SectionDef>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionDef {
    pub name: String,

    /// Rotation in degrees
    #[serde(default)]
    pub angle: i32,

    #[serde(default)]
    pub keys: Vec<KeyDef>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyDef {
    pub name: String,

    /// evdev keycode forwarded in activations
    #[serde(default)]
    pub keycode: u32,

    #[serde(default)]
    pub oref: u32,

    /// Symbol table: one list of levels per group; `null` leaves a slot empty.
    #[serde(default)]
    pub groups: Vec<Vec<Option<SymbolDef>>>,
}

/// One slot of a key's symbol table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymbolDef {
    /// Symbol derived from a keysym name, with optional overrides.
    Keysym {
        keysym: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tooltip: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<SymbolCategory>,
    },

    /// Fully custom symbol, e.g. the level toggle key.
    Custom {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tooltip: Option<String>,
        #[serde(default)]
        category: SymbolCategory,
        #[serde(default)]
        modifiers: ModifierMask,
    },
}

impl SymbolDef {
    /// Shorthand for a plain keysym slot.
    pub fn keysym(name: impl Into<String>) -> Self {
        Self::Keysym {
            keysym: name.into(),
            label: None,
            icon: None,
            tooltip: None,
            category: None,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Test JSON errors carry line number, path and suggestion
    #[test]
    fn test_json_error_includes_line_number() {
        let invalid_json = r#"{
  "name": "test",
  "sections":
}"#;

        let json_err = serde_json::from_str::<LayoutDef>(invalid_json).unwrap_err();
        let parse_err = ParseError::json_error_with_path(json_err, "test.json");

        let display_str = format!("{}", parse_err);
        assert!(display_str.contains("line"), "Error message should include line number");
        assert!(display_str.contains("test.json"), "Error message should include file path");
        assert!(display_str.contains("Suggestion"), "Error message should include suggestion");
    }

    /// Test with_path fills a missing path but keeps an existing one
    #[test]
    fn test_with_path() {
        let err = ParseError::validation_error(vec![]).with_path("a.json");
        assert!(matches!(
            err,
            ParseError::ValidationError { file_path: Some(ref p), .. } if p == "a.json"
        ));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ParseError::io_error_with_path(io, "b.json").with_path("c.json");
        assert!(format!("{}", err).contains("b.json"));
    }

    /// Test unknown layouts list alternatives
    #[test]
    fn test_unknown_layout_display() {
        let err = ParseError::unknown_layout("dvorak", vec!["us".into(), "de".into()]);
        let display = err.to_string();
        assert!(display.contains("dvorak"));
        assert!(display.contains("us, de"), "Should list available layouts");
    }

    /// Test validation issue display with suggestion
    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue::warning("Unknown keysym 'Shfit_L'", "sections[0].keys[0]")
            .with_suggestion("Did you mean 'Shift_L'?");
        let display = issue.to_string();
        assert!(display.starts_with("[WARNING] sections[0].keys[0]"));
        assert!(display.contains("Suggestion: Did you mean"));
    }

    /// Test ParseResult helpers
    #[test]
    fn test_parse_result_helpers() {
        let result = ParseResult::with_warnings(1, vec![ValidationIssue::warning("w", "x")]);
        assert!(result.has_warnings());
        assert_eq!(result.warning_count(), 1);

        let mapped = result.map(|n| n + 1);
        assert_eq!(mapped.layout, 2);
        assert_eq!(mapped.warning_count(), 1, "map should keep warnings");
        assert!(!ParseResult::new(()).has_warnings());
    }

    /// Test symbol slots deserialize as keysym, custom or empty
    #[test]
    fn test_symbol_def_variants() {
        let json = r#"[
            {"keysym": "a"},
            {"keysym": "Shift_L", "label": "⇧", "category": "function"},
            {"name": "ABC123", "label": "123", "category": "function"},
            {"name": "Hyper", "modifiers": "HYPER"},
            null
        ]"#;
        let slots: Vec<Option<SymbolDef>> = serde_json::from_str(json).unwrap();
        assert_eq!(slots[0], Some(SymbolDef::keysym("a")));
        assert!(matches!(
            &slots[1],
            Some(SymbolDef::Keysym {
                label: Some(l),
                category: Some(SymbolCategory::Function),
                ..
            }) if l == "⇧"
        ));
        assert!(matches!(&slots[2], Some(SymbolDef::Custom { name, .. }) if name == "ABC123"));
        assert!(matches!(
            &slots[3],
            Some(SymbolDef::Custom { modifiers, .. }) if *modifiers == ModifierMask::HYPER
        ));
        assert_eq!(slots[4], None);
    }

    /// Test layout defaults for omitted fields
    #[test]
    fn test_layout_defaults() {
        let json = r#"{"name": "min", "sections": [{"name": "s", "keys": [{"name": "k"}]}]}"#;
        let layout: LayoutDef = serde_json::from_str(json).unwrap();
        assert!(layout.num_lock_mask.is_empty());
        assert_eq!(layout.sections[0].angle, 0);
        assert_eq!(layout.sections[0].keys[0].keycode, 0);
        assert!(layout.sections[0].keys[0].groups.is_empty());
    }
}
