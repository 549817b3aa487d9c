// File: ./src/logging.rs
//! Logger setup for the binary. The library itself only uses the `log` macros.
use crate::context::AppContext;
use anyhow::Result;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::OpenOptions;

/// Terminal output at `Warn` (`Debug` when `verbose`), plus a debug log file in the
/// cache directory when it can be opened.
pub fn init_logging(ctx: &dyn AppContext, verbose: bool) -> Result<()> {
    let config = ConfigBuilder::new()
        .add_filter_allow_str("dayplan")
        .build();
    let term_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        term_level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = ctx.get_log_path() {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, config, file)),
            Err(e) => eprintln!("Cannot open log file {}: {}", path.display(), e),
        }
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}
