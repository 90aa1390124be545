//! Runtime settings, from command-line flags or `APP__*` environment variables

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_MAX_BODY_BYTES: usize = 72 * 1024 * 1024;

#[derive(Debug, Clone, Parser)]
#[command(name = "artifice-server")]
#[command(about = "Artifice Toolkit - hashing, password and QR code service")]
#[command(version)]
pub struct Settings {
    /// Address to listen on
    #[arg(long, env = "APP__RUN__HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "APP__RUN__PORT", default_value_t = 8000)]
    pub port: u16,

    /// Reported by the root endpoint
    #[arg(long, env = "APP__DEBUG", default_value_t = false)]
    pub debug: bool,

    /// Where embedded images are staged while rendering
    #[arg(long, env = "APP__SCRATCH_DIR", default_value = "temp/qr/generate")]
    pub scratch_dir: PathBuf,

    /// Request body limit
    #[arg(long, env = "APP__MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// tracing filter directive
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            debug: false,
            scratch_dir: PathBuf::from("temp/qr/generate"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let settings = Settings::parse_from([
            "artifice-server",
            "--port",
            "9000",
            "--debug",
            "--scratch-dir",
            "/tmp/x",
        ]);
        assert_eq!(settings.port, 9000);
        assert!(settings.debug);
        assert_eq!(settings.scratch_dir, PathBuf::from("/tmp/x"));
        assert_eq!(settings.bind_addr().unwrap().port(), 9000);
    }

    #[test]
    fn test_default_bind_addr() {
        let addr = Settings::default().bind_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn test_body_limit_fits_max_file() {
        let inflated = crate::hashing::MAX_FILE_BYTES / 3 * 4;
        assert!(DEFAULT_MAX_BODY_BYTES > inflated);
    }
}
