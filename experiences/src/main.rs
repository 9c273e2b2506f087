use clap::Parser;
use std::path::PathBuf;

use playground::prelude::*;

mod experiences;
use experiences::{customization, drawing, garden, particles, sound};

/// Five small interactive canvases in one window
#[derive(Debug, Parser)]
#[command(name = "experiences", version)]
struct Args {
    /// Tab to open instead of the last one used
    /// (drawing, sound, particles, garden, custom)
    #[arg(long, value_parser = parse_tab)]
    tab: Option<Tab>,

    /// Where settings and canvases are persisted
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Where saved drawings are written
    #[arg(long)]
    images_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 960)]
    width: u32,

    #[arg(long, default_value_t = 500)]
    height: u32,

    /// Start with sound muted
    #[arg(long)]
    mute: bool,
}

fn parse_tab(key: &str) -> Result<Tab, String> {
    Tab::from_key(key).ok_or_else(|| {
        let keys: Vec<&str> = Tab::ALL.iter().map(|t| t.key()).collect();
        format!("unknown tab `{}` (expected one of {})", key, keys.join(", "))
    })
}

fn main() {
    init_logger();
    let args = Args::parse();

    let registry = playground::register_experiences![
        drawing,
        sound,
        particles,
        garden,
        customization,
    ]
    .unwrap_or_else(|err| {
        eprintln!("experience registry failed: {}", err);
        std::process::exit(1);
    });

    let defaults = RunOptions::default();
    let options = RunOptions {
        initial_tab: args.tab,
        storage_dir: args.storage_dir.unwrap_or(defaults.storage_dir),
        images_dir: args.images_dir.unwrap_or(defaults.images_dir),
        width: args.width,
        height: args.height,
        muted: args.mute,
    };

    if let Err(err) = run(registry, options) {
        eprintln!("playground failed: {}", err);
        std::process::exit(1);
    }
}
