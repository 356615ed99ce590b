// SPDX-License-Identifier: GPL-3.0-only

//! Modifier masks and modifier behavior policies.
//!
//! This module provides the bit-flag type used for every modifier set in the
//! engine, and the policy enum that decides how releasing a modifier-producing
//! key affects the active modifiers:
//!
//! - **None**: The modifier is active only while the key is held down
//! - **Lock**: Each full press+release toggles the modifier
//! - **Latch**: Release toggles the modifier; the next non-modifier release
//!   consumes it
//!
//! # Example
//!
//! ```rust,ignore
//! use softkey::input::{ModifierBehavior, ModifierMask};
//!
//! let mut modifiers = ModifierMask::empty();
//! modifiers |= ModifierMask::SHIFT;
//! assert!(modifiers.contains(ModifierMask::SHIFT));
//!
//! assert_eq!(ModifierBehavior::default(), ModifierBehavior::None);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

bitflags::bitflags! {
    /// Set of active keyboard modifiers.
    ///
    /// Bit positions follow the X11 core modifier layout so masks can be
    /// forwarded to the system input pipeline unchanged. Combine with bitwise
    /// OR: `ModifierMask::SHIFT | ModifierMask::CONTROL`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ModifierMask: u32 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1 = 1 << 3;
        const MOD2 = 1 << 4;
        const MOD3 = 1 << 5;
        const MOD4 = 1 << 6;
        const MOD5 = 1 << 7;
        const SUPER = 1 << 26;
        const HYPER = 1 << 27;
        const META = 1 << 28;
    }
}

impl ModifierMask {
    /// Alt is conventionally bound to `Mod1`.
    pub const ALT: Self = Self::MOD1;

    /// Num Lock is conventionally bound to `Mod2`.
    pub const NUM_LOCK: Self = Self::MOD2;

    /// AltGr (ISO Level 3 shift) is conventionally bound to `Mod5`.
    pub const ALT_GR: Self = Self::MOD5;

    /// Caps Lock shares the core `Lock` bit.
    pub const CAPS_LOCK: Self = Self::LOCK;
}

/// How releasing a modifier-producing key affects the active modifiers.
///
/// `None` is level-triggered on press: the modifier is held for as long as the
/// key is. `Lock` and `Latch` are edge-triggered on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierBehavior {
    /// Modifier lifetime is tied to the physical press
    #[default]
    None,
    /// Each full press+release toggles the modifier
    Lock,
    /// Release toggles the modifier, the next plain key release clears it
    Latch,
}

impl fmt::Display for ModifierBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModifierBehavior::None => "none",
            ModifierBehavior::Lock => "lock",
            ModifierBehavior::Latch => "latch",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
