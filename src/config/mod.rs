use std::env;
use std::path::PathBuf;

/// Runtime configuration for the document portal
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database connection string (default: sqlite file next to the binary)
    pub database_url: String,

    /// Directory holding uploaded blobs (default: ./uploads)
    pub upload_dir: PathBuf,

    /// Maximum accepted upload size in bytes (default: 10 MiB)
    pub max_file_size: usize,

    /// Port the HTTP server binds to (default: 5000)
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://documents.db?mode=rwc".to_string(),
            upload_dir: PathBuf::from("./uploads"),
            max_file_size: 10 * 1024 * 1024, // 10 MiB
            port: 5000,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),
        }
    }
}
