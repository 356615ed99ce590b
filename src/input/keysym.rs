// SPDX-License-Identifier: GPL-3.0-only

//! Keysym resolution for layout symbols.
//!
//! This module turns keysym strings from layout definitions into [`Symbol`]s,
//! assigning labels, categories and, for modifier keysyms, the modifier mask
//! the symbol raises.
//!
//! # Supported Formats
//!
//! 1. **XKB keysym names**: `"Shift_L"`, `"BackSpace"`, `"a"`, `"exclam"`
//! 2. **Single characters**: `"!"`, `"é"` (mapped through their Unicode keysym)
//! 3. **Unicode codepoints**: `"U+2022"`, `"U+03C0"`
//!
//! # Format Detection
//!
//! 1. Check if string starts with `"U+"` for Unicode codepoint format
//! 2. Otherwise, look the string up as an XKB keysym name
//! 3. Failing that, a single character maps to its Unicode keysym

use crate::input::ModifierMask;
use crate::keyboard::{Symbol, SymbolCategory};
use xkbcommon::xkb::keysyms;
use xkbcommon::xkb::Keysym;

/// Keysyms at or above this value encode a Unicode codepoint directly.
const UNICODE_KEYSYM_OFFSET: u32 = 0x0100_0000;

/// Function keysyms (`BackSpace`, `Return`, modifiers, ...) live in this page.
const FUNCTION_KEYSYM_PAGE: u32 = 0xff00;

/// Resolves a keysym string to its X keysym value.
///
/// Returns `None` for empty strings, malformed codepoints and unknown names.
pub fn parse_keysym(name: &str) -> Option<u32> {
    if name.is_empty() {
        return None;
    }

    if let Some(hex) = name.strip_prefix("U+").or_else(|| name.strip_prefix("u+")) {
        return parse_unicode_codepoint(hex).map(|cp| UNICODE_KEYSYM_OFFSET | cp);
    }

    let no_symbol: Keysym = keysyms::KEY_NoSymbol.into();

    let keysym = xkbcommon::xkb::keysym_from_name(name, xkbcommon::xkb::KEYSYM_NO_FLAGS);
    if keysym != no_symbol {
        return Some(keysym.raw());
    }

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        let keysym = xkbcommon::xkb::utf32_to_keysym(c as u32);
        if keysym != no_symbol {
            return Some(keysym.raw());
        }
    }

    let keysym =
        xkbcommon::xkb::keysym_from_name(name, xkbcommon::xkb::KEYSYM_CASE_INSENSITIVE);
    if keysym != no_symbol {
        return Some(keysym.raw());
    }

    None
}

/// Parses a Unicode codepoint from a hex string.
///
/// Rejects empty strings, invalid hex digits, surrogates and values above
/// `0x10FFFF`.
fn parse_unicode_codepoint(hex_str: &str) -> Option<u32> {
    if hex_str.is_empty() {
        return None;
    }
    let codepoint = u32::from_str_radix(hex_str, 16).ok()?;
    char::from_u32(codepoint).map(|c| c as u32)
}

/// Modifier mask raised by a keysym; empty for non-modifier keysyms.
pub fn modifier_mask_for_keysym(keysym: u32) -> ModifierMask {
    match keysym {
        keysyms::KEY_Shift_L | keysyms::KEY_Shift_R => ModifierMask::SHIFT,
        keysyms::KEY_Caps_Lock | keysyms::KEY_Shift_Lock => ModifierMask::CAPS_LOCK,
        keysyms::KEY_Control_L | keysyms::KEY_Control_R => ModifierMask::CONTROL,
        keysyms::KEY_Alt_L | keysyms::KEY_Alt_R => ModifierMask::ALT,
        keysyms::KEY_Num_Lock => ModifierMask::NUM_LOCK,
        keysyms::KEY_ISO_Level3_Shift | keysyms::KEY_Mode_switch => ModifierMask::ALT_GR,
        keysyms::KEY_Super_L | keysyms::KEY_Super_R => ModifierMask::SUPER,
        keysyms::KEY_Hyper_L | keysyms::KEY_Hyper_R => ModifierMask::HYPER,
        keysyms::KEY_Meta_L | keysyms::KEY_Meta_R => ModifierMask::META,
        _ => ModifierMask::empty(),
    }
}

/// Printable character produced by a keysym, if any.
fn keysym_char(keysym: u32) -> Option<char> {
    let ucs = xkbcommon::xkb::keysym_to_utf32(keysym.into());
    char::from_u32(ucs).filter(|c| *c != '\0' && !c.is_control())
}

/// Builds a symbol from a keysym string.
///
/// The symbol is labelled with the character the keysym produces, or with the
/// keysym name for function keysyms. Returns `None` when the string does not
/// resolve to a keysym.
pub fn symbol_from_keysym_name(name: &str) -> Option<Symbol> {
    let keysym = parse_keysym(name)?;
    let modifier_mask = modifier_mask_for_keysym(keysym);

    let (label, category) = match keysym_char(keysym) {
        Some(c) if c.is_alphabetic() => (c.to_string(), SymbolCategory::Letter),
        Some(c) => (c.to_string(), SymbolCategory::KeyName),
        None if keysym & 0xffff_ff00 == FUNCTION_KEYSYM_PAGE => {
            (name.to_string(), SymbolCategory::Function)
        }
        None => (name.to_string(), SymbolCategory::KeyName),
    };

    Some(
        Symbol::new(name)
            .with_label(label)
            .with_category(category)
            .with_modifier_mask(modifier_mask)
            .with_keysym(keysym),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Test keysym names resolve to their X values
    #[test]
    fn test_parse_keysym_names() {
        assert_eq!(parse_keysym("a"), Some(0x61));
        assert_eq!(parse_keysym("Shift_L"), Some(keysyms::KEY_Shift_L));
        assert_eq!(parse_keysym("BackSpace"), Some(keysyms::KEY_BackSpace));
        assert_eq!(parse_keysym("exclam"), Some(0x21));
    }

    /// Test Unicode codepoint strings map into the Unicode keysym range
    #[test]
    fn test_parse_unicode_codepoints() {
        assert_eq!(parse_keysym("U+03C0"), Some(0x0100_03C0));
        assert_eq!(parse_keysym("u+00e9"), Some(0x0100_00E9));
    }

    /// Test graceful failure for malformed input
    #[test]
    fn test_parse_keysym_failures() {
        assert_eq!(parse_keysym(""), None, "Empty keysym should return None");
        assert_eq!(parse_keysym("U+"), None, "Missing hex digits should return None");
        assert_eq!(parse_keysym("U+ZZZZ"), None, "Invalid hex should return None");
        assert_eq!(parse_keysym("U+FFFFFF"), None, "Out of range should return None");
        assert_eq!(parse_keysym("U+D800"), None, "Surrogates should return None");
        assert_eq!(parse_keysym("NotAKeysymAtAll"), None);
    }

    /// Test the modifier keysym table
    #[test]
    fn test_modifier_masks() {
        assert_eq!(modifier_mask_for_keysym(keysyms::KEY_Shift_R), ModifierMask::SHIFT);
        assert_eq!(modifier_mask_for_keysym(keysyms::KEY_Caps_Lock), ModifierMask::LOCK);
        assert_eq!(modifier_mask_for_keysym(keysyms::KEY_Control_L), ModifierMask::CONTROL);
        assert_eq!(modifier_mask_for_keysym(keysyms::KEY_Alt_L), ModifierMask::MOD1);
        assert_eq!(modifier_mask_for_keysym(keysyms::KEY_Num_Lock), ModifierMask::MOD2);
        assert_eq!(
            modifier_mask_for_keysym(keysyms::KEY_ISO_Level3_Shift),
            ModifierMask::MOD5
        );
        assert!(modifier_mask_for_keysym(0x61).is_empty(), "Letters are not modifiers");
    }

    /// Test symbols built from keysyms carry label, category and mask
    #[test]
    fn test_symbol_from_keysym_name() {
        let a = symbol_from_keysym_name("a").unwrap();
        assert_eq!(a.label.as_deref(), Some("a"));
        assert_eq!(a.category, SymbolCategory::Letter);
        assert!(!a.is_modifier());

        let bang = symbol_from_keysym_name("exclam").unwrap();
        assert_eq!(bang.label.as_deref(), Some("!"));
        assert_eq!(bang.category, SymbolCategory::KeyName);

        let shift = symbol_from_keysym_name("Shift_L").unwrap();
        assert_eq!(shift.modifier_mask, ModifierMask::SHIFT);
        assert_eq!(shift.category, SymbolCategory::Function);
        assert_eq!(shift.keysym, Some(keysyms::KEY_Shift_L));

        let pi = symbol_from_keysym_name("U+03C0").unwrap();
        assert_eq!(pi.label.as_deref(), Some("π"));

        assert!(symbol_from_keysym_name("").is_none());
    }
}
