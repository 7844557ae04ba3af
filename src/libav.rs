//! FFmpeg log-level control.
//!
//! FFmpeg has its own internal logging system, separate from the Rust
//! [`log`](https://crates.io/crates/log) crate. By default it prints
//! warnings and errors to stderr, which drowns out pipeline output when
//! processing a whole collection. This module wraps FFmpeg's log-level API
//! so callers can tune libav chatter without importing `ffmpeg-next`
//! directly.
//!
//! This controls **FFmpeg's own console output**, not the Rust-side
//! diagnostics emitted via the `log` crate — configure those with a
//! standard `log` subscriber.

use std::str::FromStr;

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log verbosity level.
///
/// Maps directly to FFmpeg's `AV_LOG_*` constants. Setting a level causes
/// FFmpeg to suppress all messages below that severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibavLogLevel {
    /// Print no output at all.
    Quiet,
    /// Only unrecoverable conditions that will abort the process.
    Panic,
    /// Only unrecoverable errors (the context becomes invalid).
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default level).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Extremely verbose tracing output.
    Trace,
}

impl LibavLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            LibavLogLevel::Quiet => Level::Quiet,
            LibavLogLevel::Panic => Level::Panic,
            LibavLogLevel::Fatal => Level::Fatal,
            LibavLogLevel::Error => Level::Error,
            LibavLogLevel::Warning => Level::Warning,
            LibavLogLevel::Info => Level::Info,
            LibavLogLevel::Verbose => Level::Verbose,
            LibavLogLevel::Debug => Level::Debug,
            LibavLogLevel::Trace => Level::Trace,
        }
    }
}

impl FromStr for LibavLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Ok(LibavLogLevel::Quiet),
            "panic" => Ok(LibavLogLevel::Panic),
            "fatal" => Ok(LibavLogLevel::Fatal),
            "error" => Ok(LibavLogLevel::Error),
            "warning" | "warn" => Ok(LibavLogLevel::Warning),
            "info" => Ok(LibavLogLevel::Info),
            "verbose" => Ok(LibavLogLevel::Verbose),
            "debug" => Ok(LibavLogLevel::Debug),
            "trace" => Ok(LibavLogLevel::Trace),
            other => Err(format!("unknown FFmpeg log level: {other}")),
        }
    }
}

/// Set the FFmpeg internal log verbosity level.
///
/// # Example
///
/// ```no_run
/// use shotscribe::LibavLogLevel;
///
/// // Only show errors and above.
/// shotscribe::set_libav_log_level(LibavLogLevel::Error);
/// ```
pub fn set_libav_log_level(level: LibavLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!("warn".parse::<LibavLogLevel>(), Ok(LibavLogLevel::Warning));
        assert_eq!("QUIET".parse::<LibavLogLevel>(), Ok(LibavLogLevel::Quiet));
        assert!("noisy".parse::<LibavLogLevel>().is_err());
    }
}
