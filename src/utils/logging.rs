use std::str::FromStr;

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the process-wide tracing subscriber.
///
/// `RUST_LOG` takes precedence when set. Otherwise everything at
/// `default_level` and above is logged. Library code never calls this.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(parse_level(default_level)).into())
    });

    // try_init: a subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Level names as accepted by `tracing` (case-insensitive, `1`..`5` too).
/// Anything else is `info`.
pub fn parse_level(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or(Level::INFO)
}
