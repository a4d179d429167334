/**
 * file: log.rs
 * desc: Application logging. Progress, warnings and run summaries all go through tracing.
 */
use tracing::Level;
use tracing_subscriber;

/**
 * Sets up tracing and logging at the given level. All logging goes to stderr, stdout is left
 * alone for the external tools.
 */
pub fn setup_logging(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_ansi(true)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .try_init();
}
