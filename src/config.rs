use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, ValueEnum};

/// Longest message the `messages.content` CHECK constraint accepts.
pub const MAX_STORED_MESSAGE_CHARS: u64 = 1000;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Database connection URL
    #[arg(long, env = "FLAMR_DATABASE_URL")]
    pub database_url: String,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub auth: AuthConfig,

    #[command(flatten)]
    pub chat: ChatConfig,

    #[command(flatten)]
    pub swipes: SwipeConfig,

    #[command(flatten)]
    pub websocket: WsConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,

    #[command(flatten)]
    pub health: HealthConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "FLAMR_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "FLAMR_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the management (health probe) listener
    #[arg(long, env = "FLAMR_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// How long to wait for in-flight sessions to wind down on shutdown
    #[arg(long, env = "FLAMR_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Maximum number of pooled connections
    #[arg(long = "db-max-connections", env = "FLAMR_DB_MAX_CONNECTIONS", default_value_t = 20)]
    pub max_connections: u32,

    /// Minimum number of idle connections kept open
    #[arg(long = "db-min-connections", env = "FLAMR_DB_MIN_CONNECTIONS", default_value_t = 1)]
    pub min_connections: u32,

    /// Seconds to wait for a free connection before failing
    #[arg(long = "db-acquire-timeout-secs", env = "FLAMR_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct AuthConfig {
    /// Secret used to verify HS256 access tokens issued by the identity service
    #[arg(long, env = "FLAMR_JWT_SECRET")]
    pub jwt_secret: String,
}

#[derive(Clone, Debug, Args)]
pub struct ChatConfig {
    /// Maximum message length in characters, measured after trimming; at most 1000
    #[arg(
        long,
        env = "FLAMR_MAX_MESSAGE_CHARS",
        default_value_t = 1000,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_STORED_MESSAGE_CHARS)
    )]
    pub max_message_chars: usize,

    /// Page size used when a message listing does not specify one
    #[arg(
        id = "chat_default_page_size",
        long = "chat-default-page-size",
        env = "FLAMR_CHAT_DEFAULT_PAGE_SIZE",
        default_value_t = 30
    )]
    pub default_page_size: u32,

    /// Upper bound on the page size a client may request
    #[arg(
        id = "chat_max_page_size",
        long = "chat-max-page-size",
        env = "FLAMR_CHAT_MAX_PAGE_SIZE",
        default_value_t = 100
    )]
    pub max_page_size: u32,

    /// Number of characters of a message shown in out-of-room notifications
    #[arg(long, env = "FLAMR_NOTIFICATION_PREVIEW_CHARS", default_value_t = 50)]
    pub notification_preview_chars: usize,
}

#[derive(Clone, Debug, Args)]
pub struct SwipeConfig {
    /// Page size used when the swipe history does not specify one
    #[arg(
        id = "swipes_default_page_size",
        long = "swipes-default-page-size",
        env = "FLAMR_SWIPES_DEFAULT_PAGE_SIZE",
        default_value_t = 20
    )]
    pub default_page_size: u32,

    /// Upper bound on the swipe history page size
    #[arg(
        id = "swipes_max_page_size",
        long = "swipes-max-page-size",
        env = "FLAMR_SWIPES_MAX_PAGE_SIZE",
        default_value_t = 100
    )]
    pub max_page_size: u32,
}

#[derive(Clone, Debug, Args)]
pub struct WsConfig {
    /// Size of the per-connection outbound event buffer
    #[arg(long, env = "FLAMR_WS_OUTBOUND_BUFFER_SIZE", default_value_t = 64)]
    pub outbound_buffer_size: usize,

    /// How often the server pings connected clients
    #[arg(long, env = "FLAMR_WS_PING_INTERVAL_SECS", default_value_t = 25)]
    pub ping_interval_secs: u64,

    /// A connection with no inbound traffic for this long is considered dead
    #[arg(long, env = "FLAMR_WS_IDLE_TIMEOUT_SECS", default_value_t = 60)]
    pub idle_timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// OTLP collector endpoint; traces and metrics are only exported when set
    #[arg(long, env = "FLAMR_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Log output format
    #[arg(long, env = "FLAMR_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// How often metrics are pushed to the collector
    #[arg(long, env = "FLAMR_METRICS_EXPORT_INTERVAL_SECS", default_value_t = 60)]
    pub metrics_export_interval_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Timeout for the readiness database probe
    #[arg(long, env = "FLAMR_HEALTH_DB_TIMEOUT_MS", default_value_t = 2000)]
    pub db_timeout_ms: u64,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_args() {
        let config = Config::try_parse_from([
            "flamr-server",
            "--database-url",
            "postgres://localhost/flamr",
            "--jwt-secret",
            "secret",
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.chat.max_message_chars, 1000);
        assert_eq!(config.chat.default_page_size, 30);
        assert_eq!(config.chat.notification_preview_chars, 50);
        assert_eq!(config.swipes.default_page_size, 20);
        assert_eq!(config.telemetry.log_format, LogFormat::Text);
        assert!(config.telemetry.otlp_endpoint.is_none());
    }

    #[test]
    fn test_chat_and_swipe_page_sizes_are_independent() {
        let config = Config::try_parse_from([
            "flamr-server",
            "--database-url",
            "postgres://localhost/flamr",
            "--jwt-secret",
            "secret",
            "--chat-default-page-size",
            "15",
            "--chat-max-page-size",
            "40",
            "--swipes-default-page-size",
            "7",
            "--swipes-max-page-size",
            "60",
        ])
        .unwrap();

        assert_eq!(config.chat.default_page_size, 15);
        assert_eq!(config.chat.max_page_size, 40);
        assert_eq!(config.swipes.default_page_size, 7);
        assert_eq!(config.swipes.max_page_size, 60);
    }

    #[test]
    fn test_max_message_chars_is_bounded_by_schema() {
        let parse = |value: &str| {
            Config::try_parse_from([
                "flamr-server",
                "--database-url",
                "postgres://localhost/flamr",
                "--jwt-secret",
                "secret",
                "--max-message-chars",
                value,
            ])
        };

        assert_eq!(parse("500").unwrap().chat.max_message_chars, 500);
        assert_eq!(parse("1000").unwrap().chat.max_message_chars, 1000);
        assert!(parse("1001").is_err());
        assert!(parse("2000").is_err());
        assert!(parse("0").is_err());
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let result = Config::try_parse_from(["flamr-server", "--database-url", "postgres://localhost/flamr"]);
        assert!(result.is_err());
    }
}
