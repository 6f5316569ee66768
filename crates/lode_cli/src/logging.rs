//! Logger setup for the `lode` binary.
//!
//! `RUST_LOG` wins when set. Otherwise `--quiet` keeps errors only,
//! `--verbose` enables debug output with module paths, and the default is
//! warnings so that cache misses and fallbacks stay out of normal output.

use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Installs the global logger. Call once, before any command runs.
pub fn init_logging(verbose: bool, quiet: bool) {
    let mut builder = Builder::new();
    if std::env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if verbose {
            writeln!(
                buf,
                "{style}{level:<5}{style:#} [{}] {}",
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{style}{level:<5}{style:#} {}", record.args())
        }
    });

    // A logger may already be installed when embedded in tests.
    let _ = builder.try_init();
}

fn determine_level(verbose: bool, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(determine_level(true, true), LevelFilter::Error);
    }

    #[test]
    fn verbose_is_debug() {
        assert_eq!(determine_level(true, false), LevelFilter::Debug);
        assert_eq!(determine_level(false, false), LevelFilter::Warn);
    }
}
