// SPDX-License-Identifier: GPL-3.0-only

//! Key symbols and the per-key symbol table.
//!
//! A [`Symbol`] describes what a key means: its label or icon, a semantic
//! category, and the modifier mask it raises when it is used as a modifier
//! key. Symbols are immutable once built; the `with_*` methods consume and
//! return a new value.

use crate::input::ModifierMask;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category of a key symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolCategory {
    /// An alphabet letter
    Letter,
    /// A function such as Return or BackSpace
    Function,
    /// A symbol without meaning of its own, only a name
    KeyName,
    User0,
    User1,
    User2,
    User3,
    User4,
    /// Used for error reporting
    #[default]
    Unknown,
}

impl SymbolCategory {
    const NAMES: [(SymbolCategory, &'static str); 8] = [
        (SymbolCategory::Letter, "letter"),
        (SymbolCategory::Function, "function"),
        (SymbolCategory::KeyName, "keyname"),
        (SymbolCategory::User0, "user0"),
        (SymbolCategory::User1, "user1"),
        (SymbolCategory::User2, "user2"),
        (SymbolCategory::User3, "user3"),
        (SymbolCategory::User4, "user4"),
    ];

    /// Returns the canonical name, or `None` for [`SymbolCategory::Unknown`].
    pub fn name(self) -> Option<&'static str> {
        Self::NAMES
            .iter()
            .find(|(category, _)| *category == self)
            .map(|(_, name)| *name)
    }

    /// Maps a category name back to the category; unknown names give `Unknown`.
    pub fn from_name(name: &str) -> Self {
        Self::NAMES
            .iter()
            .find(|(_, candidate)| *candidate == name)
            .map(|(category, _)| *category)
            .unwrap_or(SymbolCategory::Unknown)
    }
}

/// An immutable description of what a key means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Symbol name (keysym name for keysym symbols)
    pub name: String,

    /// Text drawn on the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Icon drawn instead of the label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,

    #[serde(default)]
    pub category: SymbolCategory,

    /// Modifiers this symbol raises when used as a modifier key
    #[serde(default)]
    pub modifier_mask: ModifierMask,

    /// X keysym value, when the symbol was resolved from a keysym
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keysym: Option<u32>,
}

impl Symbol {
    /// Creates a symbol with the given name and no label, icon or modifiers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            icon_name: None,
            tooltip: None,
            category: SymbolCategory::Unknown,
            modifier_mask: ModifierMask::empty(),
            keysym: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_icon_name(mut self, icon_name: impl Into<String>) -> Self {
        self.icon_name = Some(icon_name.into());
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_category(mut self, category: SymbolCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_modifier_mask(mut self, mask: ModifierMask) -> Self {
        self.modifier_mask = mask;
        self
    }

    pub fn with_keysym(mut self, keysym: u32) -> Self {
        self.keysym = Some(keysym);
        self
    }

    /// Returns `true` if the symbol raises at least one modifier.
    pub fn is_modifier(&self) -> bool {
        !self.modifier_mask.is_empty()
    }

    /// Label to draw, falling back to the symbol name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

/// Table of symbols assigned to a key, indexed by (group, level).
///
/// Slots may be empty; keys whose lookup finds nothing are non-emitting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolMatrix {
    num_groups: usize,
    num_levels: usize,
    data: Vec<Option<Symbol>>,
}

impl SymbolMatrix {
    /// Creates an empty table with the given dimensions.
    pub fn new(num_groups: usize, num_levels: usize) -> Self {
        Self {
            num_groups,
            num_levels,
            data: vec![None; num_groups * num_levels],
        }
    }

    /// Builds a table from rows of levels, one row per group.
    ///
    /// Shorter groups are padded with empty slots.
    pub fn from_groups(groups: Vec<Vec<Option<Symbol>>>) -> Self {
        let num_levels = groups.iter().map(Vec::len).max().unwrap_or(0);
        let mut matrix = Self::new(groups.len(), num_levels);
        for (group, levels) in groups.into_iter().enumerate() {
            for (level, symbol) in levels.into_iter().enumerate() {
                matrix.data[group * num_levels + level] = symbol;
            }
        }
        matrix
    }

    /// A table holding a single symbol at (0, 0).
    pub fn single(symbol: Symbol) -> Self {
        Self::from_groups(vec![vec![Some(symbol)]])
    }

    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    pub fn num_levels(&self) -> usize {
        self.num_levels
    }

    /// Returns the symbol at exactly (group, level), if any.
    pub fn get(&self, group: usize, level: usize) -> Option<&Symbol> {
        if group >= self.num_groups || level >= self.num_levels {
            return None;
        }
        self.data[group * self.num_levels + level].as_ref()
    }

    /// Stores a symbol, ignoring indices outside the table.
    pub fn set(&mut self, group: usize, level: usize, symbol: Option<Symbol>) {
        if group < self.num_groups && level < self.num_levels {
            self.data[group * self.num_levels + level] = symbol;
        }
    }

    /// Looks up (group, level), falling back to (fallback_group, fallback_level).
    pub fn get_with_fallback(
        &self,
        group: usize,
        level: usize,
        fallback_group: usize,
        fallback_level: usize,
    ) -> Option<&Symbol> {
        self.get(group, level)
            .or_else(|| self.get(fallback_group, fallback_level))
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(Option::is_none)
    }
}

// ============================================================================
// Tests
// ============================================================================
