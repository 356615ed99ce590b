// SPDX-License-Identifier: GPL-3.0-only

//! Softkey - modifier and level state engine for on-screen keyboards
//!
//! This crate holds the state machine behind an on-screen keyboard: which
//! keys are pressed, which modifiers are active and which are latched or
//! locked, and which symbol level the keyboard shows. Rendering, windowing and
//! the system input pipeline are left to the host, which observes the engine
//! through a [`KeyboardSink`](input::KeyboardSink).
//!
//! # Architecture
//!
//! 1. **Layout** (`layout`, `resources`): A JSON description is parsed,
//!    validated and built into a [`Keyboard`](keyboard::Keyboard).
//!
//! 2. **Engine** (`keyboard`): `press_key` / `release_key` update modifiers,
//!    locked keys and the displayed level, and emit activations.
//!
//! 3. **Host** (`input::sink`, `keyboard::pointer`, `replay`): Feeds pointer,
//!    touch or scripted input in, forwards activations out.
//!
//! # Modules
//!
//! - `app_settings`: Centralized application constants
//! - `config`: User configuration loaded from JSON
//! - `input`: Modifier masks, keysym resolution and sinks
//! - `keyboard`: The keyboard aggregate and its state machine
//! - `layout`: JSON layout parsing, validation and keyboard construction
//! - `replay`: Script-driven input for the command line tool
//! - `resources`: Built-in layouts embedded in the binary

pub mod app_settings;
pub mod config;
pub mod input;
pub mod keyboard;
pub mod layout;
pub mod replay;
pub mod resources;

// ============================================================================
// Integration Tests
// ============================================================================
