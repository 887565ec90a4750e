use clap::Parser;
use std::path::PathBuf;

// Build version with transport info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Transport: reqwest (blocking, multipart)\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Pixel-art conversion client
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Image to load on startup (PNG, JPEG, BMP, TIFF, TGA, WebP) - optional, can also drag-and-drop
    #[arg(value_name = "FILE")]
    pub file_path: Option<PathBuf>,

    /// Processing server base URL
    #[arg(
        short = 's',
        long = "server",
        value_name = "URL",
        default_value = "http://localhost:8080"
    )]
    pub server: String,

    /// Coalesce rapid control changes into one request after MS quiet time (0 = submit every change)
    #[arg(long = "debounce-ms", value_name = "MS", default_value_t = 0)]
    pub debounce_ms: u64,

    /// Enable debug logging to file (default: repix.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}
