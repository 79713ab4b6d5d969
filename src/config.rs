//! Command line and environment configuration
//!
//! Every option can also be set through its environment variable:
//!
//! - `RELAY_WS_ADDR`           (default: "127.0.0.1:5000")
//! - `RELAY_HTTP_ADDR`         (default: "127.0.0.1:5001")
//! - `RELAY_TYPING_TIMEOUT_MS` (default: "3000")
//! - `RELAY_COMMAND_BUFFER`    (default: "256")

use std::time::Duration;

use clap::Parser;

/// Server configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "room_relay")]
#[command(about = "Multi-room WebSocket chat relay", long_about = None)]
pub struct Config {
    /// Address the WebSocket listener binds to
    #[arg(long, env = "RELAY_WS_ADDR", default_value = "127.0.0.1:5000")]
    pub ws_addr: String,

    /// Address the HTTP health/room listing endpoints bind to
    #[arg(long, env = "RELAY_HTTP_ADDR", default_value = "127.0.0.1:5001")]
    pub http_addr: String,

    /// Milliseconds before an unrefreshed typing indicator is cleared
    #[arg(long, env = "RELAY_TYPING_TIMEOUT_MS", default_value_t = 3000)]
    pub typing_timeout_ms: u64,

    /// Capacity of the command channel into the ChatServer
    #[arg(long, env = "RELAY_COMMAND_BUFFER", default_value_t = 256)]
    pub command_buffer: usize,
}

impl Config {
    pub fn typing_timeout(&self) -> Duration {
        Duration::from_millis(self.typing_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["room_relay"]).unwrap();
        assert_eq!(config.ws_addr, "127.0.0.1:5000");
        assert_eq!(config.http_addr, "127.0.0.1:5001");
        assert_eq!(config.typing_timeout(), Duration::from_secs(3));
        assert_eq!(config.command_buffer, 256);
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "room_relay",
            "--ws-addr",
            "0.0.0.0:9000",
            "--typing-timeout-ms",
            "500",
        ])
        .unwrap();
        assert_eq!(config.ws_addr, "0.0.0.0:9000");
        assert_eq!(config.typing_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_rejects_bad_number() {
        assert!(Config::try_parse_from(["room_relay", "--command-buffer", "lots"]).is_err());
    }
}
