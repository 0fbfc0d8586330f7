//! Server configuration.
//!
//! Every option can be given on the command line or through the environment.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

#[derive(Parser, Debug, Clone)]
#[command(name = "duocode-server")]
#[command(about = "Real-time room hub for two-person pair programming", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "DUOCODE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Maximum number of rooms kept in the registry
    #[arg(long, env = "DUOCODE_MAX_ROOMS", default_value_t = 100)]
    pub max_rooms: usize,

    /// Minimum age in seconds before an empty room may be evicted
    #[arg(long, env = "DUOCODE_STALE_ROOM_SECS", default_value_t = 24 * 60 * 60)]
    pub stale_room_secs: u64,

    /// Interval in seconds between background eviction sweeps
    #[arg(long, env = "DUOCODE_SWEEP_INTERVAL_SECS", default_value_t = 600)]
    pub sweep_interval_secs: u64,

    /// Interval in seconds between liveness probes
    #[arg(long, env = "DUOCODE_PING_INTERVAL_SECS", default_value_t = 30)]
    pub ping_interval_secs: u64,

    /// Seconds without any inbound frame before a connection is considered dead
    #[arg(long, env = "DUOCODE_READ_TIMEOUT_SECS", default_value_t = 60)]
    pub read_timeout_secs: u64,

    /// Per-frame write deadline in seconds
    #[arg(long, env = "DUOCODE_WRITE_TIMEOUT_SECS", default_value_t = 10)]
    pub write_timeout_secs: u64,

    /// Capacity of each client's outbound queue
    #[arg(long, env = "DUOCODE_CLIENT_QUEUE_CAPACITY", default_value_t = 256)]
    pub client_queue_capacity: usize,

    /// Capacity of each room's command queue
    #[arg(long, env = "DUOCODE_ROOM_QUEUE_CAPACITY", default_value_t = 100)]
    pub room_queue_capacity: usize,

    /// Code-execution engine endpoint
    #[arg(
        long,
        env = "CODE_RUNNER_ENGINE_API",
        default_value = "http://localhost:3001"
    )]
    pub execution_engine_url: String,

    /// Deadline in seconds for a single code execution
    #[arg(long, env = "DUOCODE_EXECUTION_TIMEOUT_SECS", default_value_t = 3)]
    pub execution_timeout_secs: u64,

    /// GraphQL endpoint of the question service
    #[arg(
        long,
        env = "DUOCODE_QUESTION_API_URL",
        default_value = "https://leetcode.com/graphql"
    )]
    pub question_api_url: String,

    /// Deadline in seconds for a question lookup
    #[arg(long, env = "DUOCODE_QUESTION_TIMEOUT_SECS", default_value_t = 5)]
    pub question_timeout_secs: u64,
}

/// Inconsistent combination of options
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("ping interval ({ping}s) must be shorter than the read timeout ({read}s)")]
    PingNotBeforeReadTimeout { ping: u64, read: u64 },
}

impl ServerConfig {
    /// Intervals, timeouts and queue capacities are clamped to at least 1.
    ///
    /// The ping interval must stay below the read timeout, otherwise a
    /// quiet but healthy client would be dropped before it is ever pinged.
    pub fn hub(&self) -> Result<HubConfig, ConfigError> {
        let ping = self.ping_interval_secs.max(1);
        let read = self.read_timeout_secs.max(1);
        if ping >= read {
            return Err(ConfigError::PingNotBeforeReadTimeout { ping, read });
        }

        Ok(HubConfig {
            max_rooms: self.max_rooms,
            stale_after: Duration::from_secs(self.stale_room_secs),
            sweep_interval: Duration::from_secs(self.sweep_interval_secs.max(1)),
            ping_interval: Duration::from_secs(ping),
            read_timeout: Duration::from_secs(read),
            write_timeout: Duration::from_secs(self.write_timeout_secs.max(1)),
            client_queue_capacity: self.client_queue_capacity.max(1),
            room_queue_capacity: self.room_queue_capacity.max(1),
        })
    }
}

/// Timing and sizing knobs of the room hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub max_rooms: usize,
    pub stale_after: Duration,
    pub sweep_interval: Duration,
    pub ping_interval: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub client_queue_capacity: usize,
    pub room_queue_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_rooms: 100,
            stale_after: Duration::from_secs(24 * 60 * 60),
            sweep_interval: Duration::from_secs(600),
            ping_interval: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            write_timeout: Duration::from_secs(10),
            client_queue_capacity: 256,
            room_queue_capacity: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_hub_defaults() {
        // テスト項目: 引数なしの設定はハブのデフォルト値と一致する
        // given (前提条件):
        let args = ["duocode-server"];

        // when (操作):
        let config = ServerConfig::try_parse_from(args).unwrap();
        let hub = config.hub().unwrap();
        let default = HubConfig::default();

        // then (期待する結果):
        assert_eq!(hub.max_rooms, default.max_rooms);
        assert_eq!(hub.stale_after, default.stale_after);
        assert_eq!(hub.ping_interval, default.ping_interval);
        assert_eq!(hub.read_timeout, default.read_timeout);
        assert_eq!(hub.write_timeout, default.write_timeout);
        assert!(hub.ping_interval < hub.read_timeout);
    }

    #[test]
    fn test_arguments_override_defaults() {
        // テスト項目: コマンドライン引数で値を上書きできる
        // given (前提条件):
        let args = [
            "duocode-server",
            "--port",
            "8080",
            "--max-rooms",
            "5",
            "--client-queue-capacity",
            "0",
        ];

        // when (操作):
        let config = ServerConfig::try_parse_from(args).unwrap();

        // then (期待する結果):
        assert_eq!(config.port, 8080);
        let hub = config.hub().unwrap();
        assert_eq!(hub.max_rooms, 5);
        assert_eq!(hub.client_queue_capacity, 1);
    }

    #[test]
    fn test_zero_timeouts_are_clamped() {
        // テスト項目: 0 秒の書き込み期限は 1 秒に切り上げられる
        // given (前提条件):
        let args = [
            "duocode-server",
            "--write-timeout-secs",
            "0",
            "--sweep-interval-secs",
            "0",
        ];

        // when (操作):
        let hub = ServerConfig::try_parse_from(args).unwrap().hub().unwrap();

        // then (期待する結果):
        assert_eq!(hub.write_timeout, Duration::from_secs(1));
        assert_eq!(hub.sweep_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_ping_interval_must_be_shorter_than_read_timeout() {
        // テスト項目: ping 間隔が読み取り期限以上の設定は拒否される
        // given (前提条件):
        let cases = [
            (["duocode-server", "--ping-interval-secs", "60", "--read-timeout-secs", "60"], 60, 60),
            (["duocode-server", "--ping-interval-secs", "0", "--read-timeout-secs", "0"], 1, 1),
        ];

        for (args, ping, read) in cases {
            // when (操作):
            let result = ServerConfig::try_parse_from(args).unwrap().hub();

            // then (期待する結果):
            assert_eq!(
                result.unwrap_err(),
                ConfigError::PingNotBeforeReadTimeout { ping, read }
            );
        }
    }
}
