//! tracing subscriber setup.
//!
//! - `PTS_LOG` holds the filter directives (default `warn`).
//! - `PTS_LOG_FORMAT=json` switches to JSON lines.
//!
//! Output goes to stderr so it never lands in the drill screen or in the JSON
//! printed by `report`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PTS_LOG";
pub const LOG_FORMAT_ENV: &str = "PTS_LOG_FORMAT";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    // try_init: a second call (tests, embedding) keeps the first subscriber.
    let _ = match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => builder.json().try_init(),
        _ => builder.try_init(),
    };
}
