// SPDX-License-Identifier: GPL-3.0-only

//! Pointer and touch routing.
//!
//! Translates button and touch events, already hit-tested to a key (or to no
//! key), into press and release calls on a [`Keyboard`]. Only one touch
//! sequence is followed at a time: a new sequence releases everything held by
//! the previous one, and events from older sequences are dropped.

use super::{KeyId, Keyboard};
use crate::input::KeyboardSink;

/// Tracks which pointer or touch sequence currently drives the keyboard.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    button_held: bool,
    sequence: Option<u64>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Touch sequence currently followed.
    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    pub fn is_button_held(&self) -> bool {
        self.button_held
    }

    pub fn button_press<S: KeyboardSink>(
        &mut self,
        keyboard: &mut Keyboard<S>,
        key: Option<KeyId>,
        timestamp: u32,
    ) {
        self.button_held = true;
        if let Some(id) = key {
            keyboard.press_key(id, timestamp);
        }
    }

    /// Pointer moved; only acts while the button is held.
    pub fn motion<S: KeyboardSink>(
        &mut self,
        keyboard: &mut Keyboard<S>,
        key: Option<KeyId>,
        timestamp: u32,
    ) {
        if self.button_held {
            drag(keyboard, key, timestamp);
        }
    }

    pub fn button_release<S: KeyboardSink>(&mut self, keyboard: &mut Keyboard<S>, timestamp: u32) {
        self.button_held = false;
        keyboard.release_all(timestamp);
    }

    /// Starts following `sequence`, dropping whatever the previous one held.
    pub fn touch_begin<S: KeyboardSink>(
        &mut self,
        keyboard: &mut Keyboard<S>,
        sequence: u64,
        key: Option<KeyId>,
        timestamp: u32,
    ) {
        keyboard.release_all(timestamp);
        self.sequence = Some(sequence);
        if let Some(id) = key {
            keyboard.press_key(id, timestamp);
        }
    }

    pub fn touch_update<S: KeyboardSink>(
        &mut self,
        keyboard: &mut Keyboard<S>,
        sequence: u64,
        key: Option<KeyId>,
        timestamp: u32,
    ) {
        if self.sequence != Some(sequence) {
            tracing::trace!("Ignoring update from stale touch sequence {}", sequence);
            return;
        }
        drag(keyboard, key, timestamp);
    }

    pub fn touch_end<S: KeyboardSink>(
        &mut self,
        keyboard: &mut Keyboard<S>,
        sequence: u64,
        timestamp: u32,
    ) {
        if self.sequence != Some(sequence) {
            return;
        }
        self.sequence = None;
        keyboard.release_all(timestamp);
    }

    pub fn touch_cancel<S: KeyboardSink>(
        &mut self,
        keyboard: &mut Keyboard<S>,
        sequence: u64,
        timestamp: u32,
    ) {
        self.touch_end(keyboard, sequence, timestamp);
    }
}

/// Moves the active press onto `key`.
///
/// Staying on an already pressed key does nothing. Moving off every key
/// releases everything.
fn drag<S: KeyboardSink>(keyboard: &mut Keyboard<S>, key: Option<KeyId>, timestamp: u32) {
    match key {
        Some(id) if keyboard.pressed_keys().contains(&id) => {}
        Some(id) => {
            keyboard.release_all(timestamp);
            keyboard.press_key(id, timestamp);
        }
        None => keyboard.release_all(timestamp),
    }
}
