// SPDX-License-Identifier: GPL-3.0-only

//! Input-side types shared by the keyboard state machine.
//!
//! # Features
//!
//! - **Modifier masks**: X11-style modifier bits and the three modifier behaviors
//! - **Keysym resolution**: Build symbols from keysym names and codepoints
//! - **Sinks**: Outbound callbacks the keyboard reports state changes through
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use softkey::input::{symbol_from_keysym_name, ModifierMask};
//!
//! let shift = symbol_from_keysym_name("Shift_L").unwrap();
//! assert_eq!(shift.modifier_mask, ModifierMask::SHIFT);
//! ```

// Sub-modules
pub mod keysym;
pub mod modifier;
pub mod sink;

// Re-export public API
pub use keysym::{modifier_mask_for_keysym, parse_keysym, symbol_from_keysym_name};
pub use modifier::{ModifierBehavior, ModifierMask};
pub use sink::{
    Activation, ChannelSink, EventQueue, KeyState, KeyboardEvent, KeyboardSink, NullSink,
};

// ============================================================================
// Module Tests
// ============================================================================
