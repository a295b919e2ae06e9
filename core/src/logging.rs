use std::sync::Once;

use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt::time::uptime};

/// Longest message, in bytes, written for a single GL diagnostic.
pub const MAX_DEBUG_MESSAGE_LEN: usize = 2048;

const DEFAULT_FILTER: &str = "info";

static INIT: Once = Once::new();

/// Installs the global `tracing` subscriber. Later calls are ignored.
///
/// The filter is taken from `filter` when given, then `RUST_LOG`, and falls
/// back to `info`.
pub fn init_logging(filter: Option<&str>) {
    INIT.call_once(|| {
        let env_filter = match filter {
            Some(directives) => EnvFilter::try_new(directives).ok(),
            None => EnvFilter::try_from_default_env().ok(),
        }
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

        let installed = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(uptime())
            .with_target(true)
            .try_init()
            .is_ok();

        if installed {
            debug!("Logging initialized");
        }
    });
}

/// Cuts `message` to at most [`MAX_DEBUG_MESSAGE_LEN`] bytes on a char
/// boundary.
pub fn truncate_message(message: &str) -> &str {
    truncate_to(message, MAX_DEBUG_MESSAGE_LEN)
}

pub fn truncate_to(message: &str, capacity: usize) -> &str {
    if message.len() <= capacity {
        return message;
    }
    let mut end = capacity;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("short", 10, "short")]
    #[case("exactly10!", 10, "exactly10!")]
    #[case("abcdefghijkl", 4, "abcd")]
    #[case("héllo", 2, "h")]
    #[case("", 0, "")]
    fn truncate_respects_capacity_and_char_boundaries(
        #[case] message: &str,
        #[case] capacity: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(truncate_to(message, capacity), expected);
    }

    #[test]
    fn long_diagnostics_are_capped() {
        let log = "x".repeat(MAX_DEBUG_MESSAGE_LEN * 2);
        assert_eq!(truncate_message(&log).len(), MAX_DEBUG_MESSAGE_LEN);
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(Some("debug"));
        init_logging(None);
    }
}
