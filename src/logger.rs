use simplelog::{Config, LevelFilter, SimpleLogger};

/// Quiet by default; `-v` surfaces info lines, `-vv` full debug output.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = SimpleLogger::init(level, Config::default());
}
