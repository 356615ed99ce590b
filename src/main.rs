// SPDX-License-Identifier: GPL-3.0-only

//! Softkey replay tool
//!
//! Loads a layout, drives the keyboard state machine from a script and prints
//! every resulting event as one JSON object per line.

use clap::Parser;
use softkey::config::Config;
use softkey::input::{EventQueue, KeyboardEvent, ModifierBehavior};
use softkey::layout::{self, LayoutDef, LayoutLoader, ParseResult};
use softkey::replay::{self, Replayer};
use softkey::resources::BuiltinLoader;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "softkey",
    version,
    about = "Replay input scripts against an on-screen keyboard layout"
)]
struct Cli {
    /// Script to replay, `-` for stdin
    script: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Layout name, looked up in the layout directory then the built-in set
    #[arg(short, long)]
    layout: Option<String>,

    /// Layout description file, cannot be combined with --layout
    #[arg(long, conflicts_with = "layout")]
    layout_file: Option<PathBuf>,

    /// Initial modifier behavior: none, lock or latch
    #[arg(short, long, value_parser = parse_behavior_arg)]
    behavior: Option<ModifierBehavior>,

    /// List available layouts and exit
    #[arg(long)]
    list_layouts: bool,
}

fn parse_behavior_arg(s: &str) -> Result<ModifierBehavior, String> {
    replay::parse_behavior(s)
        .ok_or_else(|| format!("unknown behavior '{}', expected none, lock or latch", s))
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("softkey=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("softkey: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => match Config::config_file_path() {
            Ok(path) => Config::load_or_default(&path)?,
            Err(e) => {
                tracing::warn!("{}, using default config", e);
                Config::default()
            }
        },
    };

    if cli.list_layouts {
        let mut names = BuiltinLoader.available();
        if let Some(dir) = &config.layout_dir {
            names.extend(layout::DirectoryLoader::new(dir).available());
        }
        names.sort();
        names.dedup();
        for name in names {
            println!("{}", name);
        }
        return Ok(());
    }

    let result = load_layout(&cli, &config)?;
    for warning in &result.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::info!("Loaded layout '{}'", result.layout.name);

    let mut keyboard = layout::build_keyboard(&result.layout, EventQueue::new());
    config.apply(&mut keyboard);
    if let Some(behavior) = cli.behavior {
        keyboard.set_modifier_behavior(behavior);
    }

    let script = read_script(cli.script.as_ref())?;
    let steps = replay::parse_script(&script)?;
    let summary = Replayer::new().run(&mut keyboard, &steps);
    tracing::info!(
        "Replayed {} steps ({} skipped)",
        summary.executed,
        summary.skipped
    );

    print_events(keyboard.sink_mut().take_events())?;
    Ok(())
}

fn load_layout(cli: &Cli, config: &Config) -> Result<ParseResult<LayoutDef>, layout::ParseError> {
    if let Some(path) = &cli.layout_file {
        match layout::parse_layout_file(path) {
            Ok(result) => return Ok(result),
            Err(e) => tracing::warn!("{}, falling back to '{}'", e, config.layout),
        }
    }

    let name = cli.layout.as_deref().unwrap_or(&config.layout);
    layout::load_with_fallback(name, config.layout_dir.as_deref())
}

fn read_script(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path),
        _ => {
            let mut script = String::new();
            io::stdin().read_to_string(&mut script)?;
            Ok(script)
        }
    }
}

fn print_events(events: Vec<KeyboardEvent>) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for event in events {
        let line = serde_json::to_string(&event).map_err(io::Error::other)?;
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
