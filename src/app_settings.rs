// SPDX-License-Identifier: GPL-3.0-only

//! Centralized application settings and constants.

/// Application ID in RDNN (reverse domain name notation) format.
pub const APP_ID: &str = "io.github.softkey.Softkey";

/// Application version for config versioning.
pub const APP_VERSION: u64 = 1;

/// Name of the key that flips between the letter and number levels.
pub const LEVEL_TOGGLE_KEY: &str = "ABC123";

/// Built-in layout used when neither the command line nor config names one.
pub const DEFAULT_LAYOUT: &str = "us";

/// Config file name inside the user config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";
