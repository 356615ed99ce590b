// SPDX-License-Identifier: GPL-3.0-only

//! Keys and key handles.

use crate::keyboard::symbol::{Symbol, SymbolMatrix};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle to a key owned by a [`Keyboard`](crate::keyboard::Keyboard).
///
/// Handles stay valid for the lifetime of the keyboard they came from. They
/// must not be carried over to a keyboard built from another layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyId {
    /// Index of the owning section
    pub section: usize,
    /// Index of the key within its section
    pub index: usize,
}

impl KeyId {
    pub fn new(section: usize, index: usize) -> Self {
        Self { section, index }
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.section, self.index)
    }
}

/// A physical or virtual button.
///
/// The pressed and locked flags are driven by the keyboard state machine; a
/// renderer reads them to draw the key.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    name: String,
    keycode: u32,
    oref: u32,
    symbols: SymbolMatrix,
    pressed: bool,
    locked: bool,
}

impl Key {
    /// Creates a key with an empty symbol table.
    pub fn new(name: impl Into<String>, keycode: u32) -> Self {
        Self {
            name: name.into(),
            keycode,
            oref: 0,
            symbols: SymbolMatrix::default(),
            pressed: false,
            locked: false,
        }
    }

    /// Sets the symbol table.
    pub fn with_symbols(mut self, symbols: SymbolMatrix) -> Self {
        self.symbols = symbols;
        self
    }

    /// Sets the outline id used to draw the key.
    pub fn with_oref(mut self, oref: u32) -> Self {
        self.oref = oref;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hardware keycode forwarded in activations.
    pub fn keycode(&self) -> u32 {
        self.keycode
    }

    pub fn oref(&self) -> u32 {
        self.oref
    }

    pub fn symbols(&self) -> &SymbolMatrix {
        &self.symbols
    }

    /// Resolves the symbol for (group, level), falling back to (0, 0).
    pub fn symbol(&self, group: usize, level: usize) -> Option<&Symbol> {
        self.symbols.get_with_fallback(group, level, 0, 0)
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }
}
