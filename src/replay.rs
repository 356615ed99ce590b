// SPDX-License-Identifier: GPL-3.0-only

//! Scripted input for driving a keyboard without a display.
//!
//! A script has one command per line. Blank lines and `#` comments are
//! skipped. Timestamps are optional; when omitted the previous timestamp plus
//! one is used.
//!
//! ```text
//! # latch shift, type a capital A
//! behavior latch
//! tap LFSH
//! press AC01 100
//! release AC01 140
//! modifiers SHIFT | MOD5
//! level numbers
//! group 0
//! release-all
//! reset
//! ```

use crate::input::{KeyboardSink, ModifierBehavior, ModifierMask};
use crate::keyboard::{Keyboard, Level};
use std::fmt;

/// One script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Press { key: String, timestamp: Option<u32> },
    Release { key: String, timestamp: Option<u32> },
    /// Press then release at the same timestamp
    Tap { key: String, timestamp: Option<u32> },
    ReleaseAll { timestamp: Option<u32> },
    Behavior(ModifierBehavior),
    Modifiers(ModifierMask),
    Level(Level),
    Group(usize),
    Reset,
}

/// A command with the script line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub line: usize,
    pub command: Command,
}

/// Error type for script parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    UnknownCommand { line: usize, command: String },
    MissingArgument { line: usize, command: String },
    InvalidArgument { line: usize, argument: String, expected: &'static str },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::UnknownCommand { line, command } => {
                write!(f, "line {}: unknown command '{}'", line, command)
            }
            ReplayError::MissingArgument { line, command } => {
                write!(f, "line {}: '{}' needs an argument", line, command)
            }
            ReplayError::InvalidArgument {
                line,
                argument,
                expected,
            } => write!(f, "line {}: invalid argument '{}', expected {}", line, argument, expected),
        }
    }
}

impl std::error::Error for ReplayError {}

/// Parses a modifier behavior name (`none`, `lock`, `latch`).
pub fn parse_behavior(s: &str) -> Option<ModifierBehavior> {
    match s.to_ascii_lowercase().as_str() {
        "none" => Some(ModifierBehavior::None),
        "lock" => Some(ModifierBehavior::Lock),
        "latch" => Some(ModifierBehavior::Latch),
        _ => None,
    }
}

/// Parses a level by name or index.
pub fn parse_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "lower" | "letters-lower" => Some(Level::LettersLower),
        "upper" | "letters-upper" => Some(Level::LettersUpper),
        "numbers" => Some(Level::Numbers),
        "symbols" => Some(Level::Symbols),
        other => other.parse().ok().and_then(Level::from_index),
    }
}

/// Parses a whole script.
pub fn parse_script(text: &str) -> Result<Vec<Step>, ReplayError> {
    let mut steps = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        steps.push(Step {
            line,
            command: parse_command(line, content)?,
        });
    }
    Ok(steps)
}

fn parse_command(line: usize, content: &str) -> Result<Command, ReplayError> {
    let (word, rest) = match content.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (content, ""),
    };

    let missing = || ReplayError::MissingArgument {
        line,
        command: word.to_string(),
    };
    let invalid = |argument: &str, expected: &'static str| ReplayError::InvalidArgument {
        line,
        argument: argument.to_string(),
        expected,
    };
    let timestamp = |arg: Option<&str>| -> Result<Option<u32>, ReplayError> {
        arg.map(|a| a.parse().map_err(|_| invalid(a, "a timestamp")))
            .transpose()
    };

    let mut args = rest.split_whitespace();
    let command = match word {
        "press" | "release" | "tap" => {
            let key = args.next().ok_or_else(missing)?.to_string();
            let timestamp = timestamp(args.next())?;
            match word {
                "press" => Command::Press { key, timestamp },
                "release" => Command::Release { key, timestamp },
                _ => Command::Tap { key, timestamp },
            }
        }
        "release-all" => Command::ReleaseAll {
            timestamp: timestamp(args.next())?,
        },
        "behavior" => {
            let arg = args.next().ok_or_else(missing)?;
            let behavior =
                parse_behavior(arg).ok_or_else(|| invalid(arg, "none, lock or latch"))?;
            Command::Behavior(behavior)
        }
        "modifiers" => {
            let mask = bitflags::parser::from_str::<ModifierMask>(rest)
                .map_err(|_| invalid(rest, "a modifier mask like 'SHIFT | MOD5'"))?;
            Command::Modifiers(mask)
        }
        "level" => {
            let arg = args.next().ok_or_else(missing)?;
            Command::Level(parse_level(arg).ok_or_else(|| invalid(arg, "a level name or 0-3"))?)
        }
        "group" => {
            let arg = args.next().ok_or_else(missing)?;
            Command::Group(arg.parse().map_err(|_| invalid(arg, "a group index"))?)
        }
        "reset" => Command::Reset,
        other => {
            return Err(ReplayError::UnknownCommand {
                line,
                command: other.to_string(),
            });
        }
    };
    Ok(command)
}

/// Counts of what a replay did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub executed: usize,
    /// Steps naming a key the layout does not have
    pub skipped: usize,
}

/// Drives a keyboard through parsed steps.
#[derive(Debug, Clone, Default)]
pub struct Replayer {
    clock: u32,
}

impl Replayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&mut self, timestamp: Option<u32>) -> u32 {
        self.clock = timestamp.unwrap_or_else(|| self.clock.wrapping_add(1));
        self.clock
    }

    /// Runs every step. Steps naming unknown keys are skipped with a warning.
    pub fn run<S: KeyboardSink>(
        &mut self,
        keyboard: &mut Keyboard<S>,
        steps: &[Step],
    ) -> ReplaySummary {
        let mut summary = ReplaySummary::default();
        for step in steps {
            if self.execute(keyboard, step) {
                summary.executed += 1;
            } else {
                summary.skipped += 1;
            }
        }
        summary
    }

    fn execute<S: KeyboardSink>(&mut self, keyboard: &mut Keyboard<S>, step: &Step) -> bool {
        tracing::trace!("line {}: {:?}", step.line, step.command);
        match &step.command {
            Command::Press { key, timestamp }
            | Command::Release { key, timestamp }
            | Command::Tap { key, timestamp } => {
                let Some(id) = keyboard.find_key_by_name(key) else {
                    tracing::warn!("line {}: no key named '{}', skipping", step.line, key);
                    return false;
                };
                let ts = self.tick(*timestamp);
                match &step.command {
                    Command::Press { .. } => keyboard.press_key(id, ts),
                    Command::Release { .. } => keyboard.release_key(id, ts),
                    _ => {
                        keyboard.press_key(id, ts);
                        keyboard.release_key(id, ts);
                    }
                }
            }
            Command::ReleaseAll { timestamp } => {
                let ts = self.tick(*timestamp);
                keyboard.release_all(ts);
            }
            Command::Behavior(behavior) => keyboard.set_modifier_behavior(*behavior),
            Command::Modifiers(mask) => keyboard.set_modifiers(*mask),
            Command::Level(level) => keyboard.set_level(*level),
            Command::Group(group) => keyboard.set_group(*group),
            Command::Reset => keyboard.reset(),
        }
        true
    }
}
