// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard state machine.
//!
//! The [`Keyboard`] is the root aggregate: it owns the sections and their keys,
//! the global modifier set, the displayed level, the pressed keys and the
//! locked (sticky) modifier keys. [`Keyboard::press_key`] and
//! [`Keyboard::release_key`] are the only entry points driven by input.
//!
//! # Levels
//!
//! The keyboard shows one of four levels. Letters/numbers is one axis (bit 1),
//! shift is the other (bit 0):
//!
//! | Level | Bits |
//! |---|---|
//! | `LettersLower` | `0b00` |
//! | `LettersUpper` | `0b01` |
//! | `Numbers` | `0b10` |
//! | `Symbols` | `0b11` |
//!
//! The dedicated toggle key (named [`LEVEL_TOGGLE_KEY`]) flips the
//! letters/numbers axis. Direct jumps between `LettersUpper` and `Symbols` are
//! redirected to `Numbers` and `LettersLower` respectively, and the shift bit
//! is cleared so the modifiers agree with the level shown.
//!
//! # Modifier behavior
//!
//! Under `None` a modifier is applied on press and removed on release. Under
//! `Lock` and `Latch` nothing happens on press; the release toggles the
//! modifier and records the key in the locked-keys list. The behavior is
//! re-derived from the level after every transition: `Lock` on the numbers
//! and symbols levels, `Latch` on the letter levels.
//!
//! # Example
//!
//! ```rust,ignore
//! use softkey::keyboard::{Key, Keyboard, Symbol, SymbolMatrix};
//! use softkey::input::ModifierMask;
//!
//! let mut keyboard = Keyboard::new();
//! let main = keyboard.create_section("main", 0);
//! let shift = keyboard
//!     .create_key(main, Key::new("LFSH", 50).with_symbols(SymbolMatrix::single(
//!         Symbol::new("Shift_L").with_modifier_mask(ModifierMask::SHIFT),
//!     )))
//!     .unwrap();
//!
//! keyboard.press_key(shift, 100);
//! keyboard.release_key(shift, 120);
//! for event in keyboard.sink_mut().take_events() {
//!     println!("{:?}", event);
//! }
//! ```

pub mod geometry;
pub mod key;
pub mod pointer;
pub mod section;
pub mod symbol;

pub use geometry::{Bounds, Outline, Point};
pub use key::{Key, KeyId};
pub use pointer::PointerTracker;
pub use section::Section;
pub use symbol::{Symbol, SymbolCategory, SymbolMatrix};

use crate::app_settings::LEVEL_TOGGLE_KEY;
use crate::input::{Activation, EventQueue, KeyState, KeyboardSink, ModifierBehavior, ModifierMask};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Levels
// ============================================================================

/// Symbol layer currently displayed by the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    LettersLower,
    LettersUpper,
    Numbers,
    Symbols,
}

impl Level {
    const SHIFT_BIT: u8 = 0b01;
    const NUMBERS_BIT: u8 = 0b10;

    /// Level index into key symbol tables.
    pub fn index(self) -> usize {
        self.bits() as usize
    }

    fn bits(self) -> u8 {
        match self {
            Level::LettersLower => 0,
            Level::LettersUpper => 1,
            Level::Numbers => 2,
            Level::Symbols => 3,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Level::LettersLower,
            1 => Level::LettersUpper,
            2 => Level::Numbers,
            _ => Level::Symbols,
        }
    }

    /// Level for a table index, `None` outside 0..=3.
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index)
            .ok()
            .filter(|bits| *bits <= 3)
            .map(Self::from_bits)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::LettersLower => "letters-lower",
            Level::LettersUpper => "letters-upper",
            Level::Numbers => "numbers",
            Level::Symbols => "symbols",
        };
        f.write_str(name)
    }
}

/// A locked modifier key: the bits it enabled and the key that enabled them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierKey {
    pub modifiers: ModifierMask,
    pub key: KeyId,
}

// ============================================================================
// Keyboard
// ============================================================================

/// Root aggregate of the keyboard state machine.
///
/// State changes are reported synchronously to the sink `S`. The default sink
/// queues events until the host drains them with
/// [`EventQueue::take_events`].
#[derive(Debug)]
pub struct Keyboard<S = EventQueue> {
    sections: Vec<Section>,
    names: HashMap<String, KeyId>,
    outlines: Vec<Outline>,

    modifier_behavior: ModifierBehavior,
    modifiers: ModifierMask,
    /// Last level applied; the starting point of the next transition.
    level: Level,
    group: usize,

    /// Most recent first
    pressed_keys: Vec<KeyId>,
    /// Most recent first
    locked_keys: Vec<ModifierKey>,

    num_lock_mask: ModifierMask,
    alt_gr_mask: ModifierMask,

    sink: S,
}

impl Keyboard<EventQueue> {
    /// Creates an empty keyboard reporting into an [`EventQueue`].
    pub fn new() -> Self {
        Self::with_sink(EventQueue::new())
    }
}

impl Default for Keyboard<EventQueue> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: KeyboardSink> Keyboard<S> {
    /// Creates an empty keyboard reporting into `sink`.
    pub fn with_sink(sink: S) -> Self {
        Self {
            sections: Vec::new(),
            names: HashMap::new(),
            outlines: Vec::new(),
            modifier_behavior: ModifierBehavior::default(),
            modifiers: ModifierMask::empty(),
            level: Level::LettersLower,
            group: 0,
            pressed_keys: Vec::new(),
            locked_keys: Vec::new(),
            num_lock_mask: ModifierMask::empty(),
            alt_gr_mask: ModifierMask::empty(),
            sink,
        }
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Appends a section and returns its index.
    pub fn create_section(&mut self, name: impl Into<String>, angle: i32) -> usize {
        self.sections.push(Section::new(name, angle));
        self.sections.len() - 1
    }

    /// Appends a key to a section and indexes it by name.
    ///
    /// Returns `None` if the section does not exist. A later key with the same
    /// name shadows the earlier one in [`Keyboard::find_key_by_name`].
    pub fn create_key(&mut self, section: usize, key: Key) -> Option<KeyId> {
        let name = key.name().to_string();
        let index = self.sections.get_mut(section)?.push_key(key);
        let id = KeyId::new(section, index);
        if let Some(previous) = self.names.insert(name.clone(), id) {
            tracing::debug!("Key name {:?} at {} shadows {}", name, id, previous);
        }
        Some(id)
    }

    /// Registers an outline and returns its id.
    pub fn add_outline(&mut self, outline: Outline) -> u32 {
        self.outlines.push(outline);
        (self.outlines.len() - 1) as u32
    }

    /// Looks up an outline; `None` for unknown ids.
    pub fn outline(&self, oref: u32) -> Option<&Outline> {
        self.outlines.get(oref as usize)
    }

    pub fn n_outlines(&self) -> usize {
        self.outlines.len()
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn key(&self, id: KeyId) -> Option<&Key> {
        self.sections.get(id.section)?.key(id.index)
    }

    fn key_mut(&mut self, id: KeyId) -> Option<&mut Key> {
        self.sections.get_mut(id.section)?.key_mut(id.index)
    }

    /// Finds a key by name.
    pub fn find_key_by_name(&self, name: &str) -> Option<KeyId> {
        self.names.get(name).copied()
    }

    pub fn modifiers(&self) -> ModifierMask {
        self.modifiers
    }

    pub fn modifier_behavior(&self) -> ModifierBehavior {
        self.modifier_behavior
    }

    /// Currently displayed level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Currently displayed group.
    pub fn group(&self) -> usize {
        self.group
    }

    /// Pressed keys, most recent first.
    pub fn pressed_keys(&self) -> &[KeyId] {
        &self.pressed_keys
    }

    /// Locked modifier keys, most recent first.
    pub fn locked_keys(&self) -> &[ModifierKey] {
        &self.locked_keys
    }

    pub fn num_lock_mask(&self) -> ModifierMask {
        self.num_lock_mask
    }

    pub fn alt_gr_mask(&self) -> ModifierMask {
        self.alt_gr_mask
    }

    /// Symbol a key resolves to at the current group and level.
    ///
    /// A section's level override takes precedence over the keyboard level.
    pub fn resolve_symbol(&self, id: KeyId) -> Option<&Symbol> {
        let section = self.sections.get(id.section)?;
        let level = section.level().unwrap_or(self.level.index());
        section.key(id.index)?.symbol(self.group, level)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    pub fn set_modifier_behavior(&mut self, behavior: ModifierBehavior) {
        self.modifier_behavior = behavior;
    }

    pub fn set_num_lock_mask(&mut self, mask: ModifierMask) {
        self.num_lock_mask = mask;
    }

    pub fn set_alt_gr_mask(&mut self, mask: ModifierMask) {
        self.alt_gr_mask = mask;
    }

    /// Overrides the modifiers and recomputes the level with no key context.
    ///
    /// Locked keys whose bits are dropped are unlocked.
    pub fn set_modifiers(&mut self, modifiers: ModifierMask) {
        let disabled = self.modifiers & !modifiers;
        self.unlock_keys(disabled);
        self.modifiers = modifiers;
        self.recompute_level(None);
    }

    /// Shows `level` directly; the next transition starts from it.
    pub fn set_level(&mut self, level: Level) {
        self.apply_level(level);
    }

    /// Switches the displayed group.
    pub fn set_group(&mut self, group: usize) {
        if self.group != group {
            self.group = group;
            tracing::debug!("Group changed to {}", group);
            self.sink.on_symbol_index_changed(self.group, self.level);
        }
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Handles a key press.
    ///
    /// Keys without a symbol are recorded as pressed but change no modifiers
    /// and emit nothing.
    pub fn press_key(&mut self, id: KeyId, timestamp: u32) {
        let Some(key) = self.key_mut(id) else {
            tracing::warn!("Ignoring press of unknown key {}", id);
            return;
        };
        key.set_pressed(true);

        if let Some(pos) = self.pressed_keys.iter().position(|k| *k == id) {
            tracing::warn!("Key {} pressed again without release", id);
            self.pressed_keys.remove(pos);
        }
        self.pressed_keys.insert(0, id);

        let Some(symbol) = self.resolve_symbol(id).cloned() else {
            tracing::debug!("Pressed non-emitting key {}", id);
            return;
        };
        let modifier = symbol.modifier_mask;
        let behavior = self.modifier_behavior;
        tracing::debug!(
            "Press {} ({}) behavior={} modifiers={:?}",
            id,
            symbol.name,
            behavior,
            self.modifiers
        );

        self.sections[id.section].key_pressed(modifier, behavior, self.num_lock_mask);

        if behavior == ModifierBehavior::None {
            self.set_modifiers_with_key(Some(id), self.modifiers | modifier);
            self.recompute_level(Some(id));
        }

        self.emit_activation(id, symbol, KeyState::Pressed, timestamp);
    }

    /// Handles a key release.
    ///
    /// Releasing a key that is not pressed changes nothing.
    pub fn release_key(&mut self, id: KeyId, timestamp: u32) {
        let Some(pos) = self.pressed_keys.iter().position(|k| *k == id) else {
            tracing::debug!("Ignoring release of key {} which is not pressed", id);
            return;
        };
        self.pressed_keys.remove(pos);
        if let Some(key) = self.key_mut(id) {
            key.set_pressed(false);
        }

        let Some(symbol) = self.resolve_symbol(id).cloned() else {
            tracing::debug!("Released non-emitting key {}", id);
            return;
        };
        let modifier = symbol.modifier_mask;
        let behavior = self.modifier_behavior;
        tracing::debug!(
            "Release {} ({}) behavior={} modifiers={:?}",
            id,
            symbol.name,
            behavior,
            self.modifiers
        );

        self.sections[id.section].key_released(modifier, behavior, self.num_lock_mask);

        let modifiers = match behavior {
            ModifierBehavior::None => self.modifiers & !modifier,
            ModifierBehavior::Lock => self.modifiers ^ modifier,
            ModifierBehavior::Latch if !modifier.is_empty() => self.modifiers ^ modifier,
            ModifierBehavior::Latch => (self.modifiers ^ modifier) & modifier,
        };
        self.set_modifiers_with_key(Some(id), modifiers);
        self.recompute_level(Some(id));

        self.emit_activation(id, symbol, KeyState::Released, timestamp);
    }

    /// Releases every pressed key, most recent first, emitting each release.
    pub fn release_all(&mut self, timestamp: u32) {
        let pressed = self.pressed_keys.clone();
        for id in pressed {
            self.release_key(id, timestamp);
        }
    }

    /// Drops all modifiers and locks and returns to the lower-case letters.
    ///
    /// Pressed keys are left alone; call [`Keyboard::release_all`] first on
    /// teardown.
    pub fn reset(&mut self) {
        self.clear_modifiers(self.modifiers);
        for section in &mut self.sections {
            section.reset();
        }
        self.modifier_behavior = ModifierBehavior::default();
        self.apply_level(Level::LettersLower);
    }

    // ------------------------------------------------------------------------
    // State machine internals
    // ------------------------------------------------------------------------

    /// Replaces the modifiers, locking the key for newly enabled bits and
    /// unlocking keys whose bits were disabled.
    ///
    /// New locks are only recorded when the behavior is not `None`.
    fn set_modifiers_with_key(&mut self, key: Option<KeyId>, modifiers: ModifierMask) {
        let changed = self.modifiers ^ modifiers;
        let enabled = changed & modifiers;
        let disabled = changed & self.modifiers;

        if !enabled.is_empty() && self.modifier_behavior != ModifierBehavior::None {
            if let Some(id) = key {
                self.lock_key(id, enabled);
            }
        }
        self.unlock_keys(disabled);

        self.modifiers = modifiers;
    }

    fn lock_key(&mut self, id: KeyId, modifiers: ModifierMask) {
        if let Some(entry) = self.locked_keys.iter_mut().find(|entry| entry.key == id) {
            entry.modifiers |= modifiers;
            return;
        }

        self.locked_keys.insert(0, ModifierKey { modifiers, key: id });
        if let Some(key) = self.key_mut(id) {
            key.set_locked(true);
        }
        tracing::debug!("Locked key {} for {:?}", id, modifiers);
        self.sink.on_key_locked(id);
    }

    fn unlock_keys(&mut self, disabled: ModifierMask) {
        if disabled.is_empty() {
            return;
        }

        let (unlocked, kept): (Vec<_>, Vec<_>) = self
            .locked_keys
            .drain(..)
            .partition(|entry| entry.modifiers.intersects(disabled));
        self.locked_keys = kept;

        for entry in unlocked {
            if let Some(key) = self.key_mut(entry.key) {
                key.set_locked(false);
            }
            tracing::debug!("Unlocked key {} for {:?}", entry.key, entry.modifiers);
            self.sink.on_key_unlocked(entry.key);
        }
    }

    fn clear_modifiers(&mut self, mask: ModifierMask) {
        self.unlock_keys(self.modifiers & mask);
        self.modifiers &= !mask;
    }

    /// Derives the level from the previous level, the key that triggered the
    /// change and the shift modifier, then re-derives the modifier behavior.
    fn recompute_level(&mut self, key: Option<KeyId>) {
        let previous = self.level;
        let mut bits = previous.bits() & Level::NUMBERS_BIT;

        let is_toggle = key
            .and_then(|id| self.key(id))
            .is_some_and(|k| k.name() == LEVEL_TOGGLE_KEY);
        if is_toggle {
            bits ^= Level::NUMBERS_BIT;
        }

        if self.modifiers.contains(ModifierMask::SHIFT) {
            bits |= Level::SHIFT_BIT;
        }

        let mut level = Level::from_bits(bits);
        match (previous, level) {
            (Level::LettersUpper, Level::Symbols) => {
                level = Level::Numbers;
                self.clear_modifiers(ModifierMask::SHIFT);
            }
            (Level::Symbols, Level::LettersUpper) => {
                level = Level::LettersLower;
                self.clear_modifiers(ModifierMask::SHIFT);
            }
            _ => {}
        }

        self.modifier_behavior = match level {
            Level::Numbers | Level::Symbols => ModifierBehavior::Lock,
            Level::LettersLower | Level::LettersUpper => ModifierBehavior::Latch,
        };

        self.apply_level(level);
    }

    fn apply_level(&mut self, level: Level) {
        if self.level != level {
            tracing::debug!("Level changed {} -> {}", self.level, level);
            self.level = level;
            self.sink.on_symbol_index_changed(self.group, level);
        }
    }

    fn emit_activation(&mut self, id: KeyId, symbol: Symbol, state: KeyState, timestamp: u32) {
        let Some(keycode) = self.key(id).map(Key::keycode) else {
            return;
        };
        let activation = Activation {
            keycode,
            symbol,
            modifiers: self.modifiers,
            state,
            timestamp,
        };
        self.sink.on_key_activated(&activation);
    }
}

// ============================================================================
// Tests
// ============================================================================
