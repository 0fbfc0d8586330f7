//! Logging setup for Duocode binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Log output is enabled for the server library crate, this shared crate and
/// the binary itself. `RUST_LOG` overrides the default filter entirely.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "duocode_server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use duocode_shared::logger::setup_logger;
///
/// setup_logger("duocode_server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    tracing::debug!("Logger initialized for '{}'", binary_name);
}

fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "duocode_server={level},{shared}={level},{bin}={level},tower_http={level}",
        level = default_log_level,
        shared = env!("CARGO_PKG_NAME").replace('-', "_"),
        bin = binary_name.replace('-', "_"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_all_crates() {
        // テスト項目: デフォルトのフィルタにライブラリ・共有クレート・バイナリが含まれる
        // given (前提条件):
        let bin = "duocode-server";

        // when (操作):
        let filter = default_filter(bin, "debug");

        // then (期待する結果):
        assert!(filter.contains("duocode_server=debug"));
        assert!(filter.contains("duocode_shared=debug"));
        assert!(filter.contains("tower_http=debug"));
    }
}
