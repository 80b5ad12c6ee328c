use crate::classifier::Locale;
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "receipt-scan-server")]
#[command(about = "Receipt scanning server: preprocessing, recognition and item-line filtering")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "SCAN_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "SCAN_PORT", default_value = "9393")]
    pub port: u16,

    /// Recognition engine to load at startup ("ocrs" or "leptess")
    #[arg(long, env = "SCAN_ENGINE", default_value = "ocrs")]
    pub engine: String,

    /// Recognition language for engines that take one (e.g., "spa", "eng")
    #[arg(long, env = "SCAN_LANGUAGE", default_value = "spa")]
    pub language: String,

    /// Boilerplate vocabulary used to drop receipt noise lines
    #[arg(long, env = "SCAN_VOCABULARY", value_enum, default_value = "es")]
    pub vocabulary: Locale,

    /// Maximum upload size in bytes (default: 50MB)
    #[arg(long, env = "SCAN_MAX_FILE_SIZE", default_value = "52428800")]
    pub max_file_size: usize,

    /// Seconds to wait for the recognition engine before giving up
    #[arg(long, env = "SCAN_RECOGNITION_TIMEOUT", default_value = "120")]
    pub recognition_timeout_secs: u64,

    /// Path to tessdata directory (uses TESSDATA_PREFIX env var if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub engine: String,
    pub language: String,
    pub vocabulary: Locale,
    pub max_file_size: usize,
    pub recognition_timeout: Duration,
    pub tessdata_path: Option<String>,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            engine: args.engine,
            language: args.language,
            vocabulary: args.vocabulary,
            max_file_size: args.max_file_size,
            recognition_timeout: Duration::from_secs(args.recognition_timeout_secs),
            tessdata_path: args.tessdata_path,
        }
    }
}
