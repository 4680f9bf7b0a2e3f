pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;

use tracing::Level;

/// Install the stderr log subscriber. Each `-v` raises the level one step above `warn`.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
