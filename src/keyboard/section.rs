// SPDX-License-Identifier: GPL-3.0-only

//! Sections: named groups of keys with local modifier tracking.
//!
//! A section accumulates the modifiers raised by keys pressed inside it,
//! following the modifier behavior of its owning keyboard. The accumulator only
//! drives the section's level override: when any Num Lock bit is active the
//! section shows level 1, otherwise it follows the keyboard.

use crate::input::{ModifierBehavior, ModifierMask};
use crate::keyboard::key::Key;

/// Level shown by a section while Num Lock is active.
pub const NUM_LOCK_LEVEL: usize = 1;

/// A named cluster of keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    name: String,
    angle: i32,
    keys: Vec<Key>,
    modifiers: ModifierMask,
    level: Option<usize>,
}

impl Section {
    pub fn new(name: impl Into<String>, angle: i32) -> Self {
        Self {
            name: name.into(),
            angle,
            keys: Vec::new(),
            modifiers: ModifierMask::empty(),
            level: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rotation angle in degrees.
    pub fn angle(&self) -> i32 {
        self.angle
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn key(&self, index: usize) -> Option<&Key> {
        self.keys.get(index)
    }

    pub(crate) fn key_mut(&mut self, index: usize) -> Option<&mut Key> {
        self.keys.get_mut(index)
    }

    /// Appends a key and returns its index within the section.
    pub(crate) fn push_key(&mut self, key: Key) -> usize {
        self.keys.push(key);
        self.keys.len() - 1
    }

    /// Modifiers accumulated by keys of this section.
    pub fn modifiers(&self) -> ModifierMask {
        self.modifiers
    }

    /// Level override, `None` when the section follows the keyboard level.
    pub fn level(&self) -> Option<usize> {
        self.level
    }

    /// Updates local modifiers for a key press inside this section.
    pub(crate) fn key_pressed(
        &mut self,
        modifier: ModifierMask,
        behavior: ModifierBehavior,
        num_lock_mask: ModifierMask,
    ) {
        if behavior == ModifierBehavior::None {
            self.modifiers |= modifier;
            self.update_level(num_lock_mask);
        }
    }

    /// Updates local modifiers for a key release inside this section.
    pub(crate) fn key_released(
        &mut self,
        modifier: ModifierMask,
        behavior: ModifierBehavior,
        num_lock_mask: ModifierMask,
    ) {
        self.modifiers = match behavior {
            ModifierBehavior::None => self.modifiers & !modifier,
            ModifierBehavior::Lock => self.modifiers ^ modifier,
            ModifierBehavior::Latch => (self.modifiers ^ modifier) & modifier,
        };
        self.update_level(num_lock_mask);
    }

    /// Drops all local modifiers.
    pub(crate) fn reset(&mut self) {
        self.modifiers = ModifierMask::empty();
        self.level = None;
    }

    fn update_level(&mut self, num_lock_mask: ModifierMask) {
        self.level = if self.modifiers.intersects(num_lock_mask) {
            Some(NUM_LOCK_LEVEL)
        } else {
            None
        };
    }
}

// ============================================================================
// Tests
// ============================================================================
