/// Structured logging to a file.
///
/// The terminal is in raw mode while the game runs, so log lines go to the
/// file named in `config.toml` instead of stderr. `RUST_LOG` overrides the
/// configured level.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub fn init(log_file: &Path, level: &str) -> std::io::Result<()> {
    let file = File::create(log_file)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    // A second init (tests, repeated calls) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .try_init();
    Ok(())
}
