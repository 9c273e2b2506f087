use chrono::Local;
use env_logger::{Builder, Env};
use log::{Level, LevelFilter, Record};
use std::io::{self, Write};
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

pub use log::{debug, error, info, trace, warn};

/// Used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "playground=info,experiences=info";

/// Graphics crates that flood `info` with per-frame chatter
const QUIET_MODULES: &[&str] = &["naga", "wgpu", "wgpu_core", "wgpu_hal"];

const CRATE_PREFIXES: &[&str] = &["playground::", "experiences::"];

pub fn init_logger() {
    let mut builder =
        Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));

    for module in QUIET_MODULES {
        builder.filter_module(module, LevelFilter::Warn);
    }

    builder.format(|_buf, record| {
        let writer = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = writer.buffer();
        write_record(&mut buffer, record)?;
        writer.print(&buffer)
    });

    let _ = builder.try_init();
}

/// `12:04:05.120 WARN  runtime::tabs  message`
fn write_record(out: &mut impl WriteColor, record: &Record) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_dimmed(true))?;
    write!(out, "{} ", Local::now().format("%H:%M:%S%.3f"))?;

    out.set_color(
        ColorSpec::new()
            .set_fg(Some(level_color(record.level())))
            .set_bold(record.level() <= Level::Warn),
    )?;
    write!(out, "{:<5}", record.level())?;

    out.set_color(ColorSpec::new().set_dimmed(true))?;
    let target = record.module_path().unwrap_or(record.target());
    write!(out, " {}", short_target(target))?;

    out.reset()?;
    writeln!(out, "  {}", record.args())
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Blue,
        Level::Trace => Color::Magenta,
    }
}

/// Drops the workspace crate name so lines stay short; foreign crates keep
/// their full path.
fn short_target(target: &str) -> &str {
    CRATE_PREFIXES
        .iter()
        .find_map(|prefix| target.strip_prefix(prefix))
        .unwrap_or(target)
}
