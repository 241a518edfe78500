//! Configuration module
//!
//! All knobs for the ingestion pipeline live in [`IngestConfig`], built once
//! at process start from the environment and passed into constructors. No
//! component reads the environment at call time.

use std::env;
use std::path::PathBuf;

// Documented defaults
const DEFAULT_MAX_FILE_SIZE_MIB: u64 = 70;
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_BATCH_WORKERS: usize = 4;
const DEFAULT_EXTRACTION_WORKERS: usize = 3;
const DEFAULT_EXTRACTION_QUEUE_CAPACITY: usize = 100;
const DEFAULT_SNAPSHOT_EVERY: u64 = 10;
const DEFAULT_STATUS_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_SERVER_PORT: u16 = 3000;

/// Configuration for the document ingestion pipeline.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Maximum accepted file size in bytes. `MAX_FILE_SIZE_MB` (MiB) in the
    /// environment; unset or unparseable falls back to 70 MiB.
    pub max_file_size_bytes: u64,
    /// Directory uploaded files are written to; created if absent.
    pub upload_dir: PathBuf,
    /// Allowed file extensions, compared case-insensitively.
    pub allowed_extensions: Vec<String>,
    /// Worker pool size for each batch ingestion run.
    pub batch_workers: usize,
    /// Worker count for the async extraction processor. Non-positive values
    /// fall back to the default of 3.
    pub extraction_workers: usize,
    /// Bounded capacity of the extraction job queue.
    pub extraction_queue_capacity: usize,
    /// Flush a progress snapshot every Nth processed file.
    pub snapshot_every: u64,
    /// TTL in seconds for batch status snapshots.
    pub status_ttl_secs: u64,
    /// Base URL of the remote extraction service.
    pub extraction_base_url: String,
    /// API key sent with every extraction request.
    pub extraction_api_key: Option<String>,
}

/// Server-level configuration for the API binary.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub ingest: IngestConfig,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MIB * 1024 * 1024,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            allowed_extensions: ["pdf", "docx", "txt", "doc"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            batch_workers: DEFAULT_BATCH_WORKERS,
            extraction_workers: DEFAULT_EXTRACTION_WORKERS,
            extraction_queue_capacity: DEFAULT_EXTRACTION_QUEUE_CAPACITY,
            snapshot_every: DEFAULT_SNAPSHOT_EVERY,
            status_ttl_secs: DEFAULT_STATUS_TTL_SECS,
            extraction_base_url: "http://localhost:8500".to_string(),
            extraction_api_key: None,
        }
    }
}

impl IngestConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_file_size_mib: u64 =
            env_parse("MAX_FILE_SIZE_MB", DEFAULT_MAX_FILE_SIZE_MIB).max(1);

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);

        let batch_workers = env_parse("BATCH_WORKERS", DEFAULT_BATCH_WORKERS).max(1);

        // The processor itself also guards against non-positive values; this
        // keeps the config honest for anyone reading it.
        let extraction_workers: i64 = env_parse("EXTRACTION_WORKERS", 0);
        let extraction_workers = if extraction_workers > 0 {
            extraction_workers as usize
        } else {
            DEFAULT_EXTRACTION_WORKERS
        };

        Self {
            max_file_size_bytes: max_file_size_mib * 1024 * 1024,
            upload_dir,
            allowed_extensions: defaults.allowed_extensions,
            batch_workers,
            extraction_workers,
            extraction_queue_capacity: env_parse(
                "EXTRACTION_QUEUE_CAPACITY",
                DEFAULT_EXTRACTION_QUEUE_CAPACITY,
            )
            .max(1),
            snapshot_every: env_parse("SNAPSHOT_EVERY", DEFAULT_SNAPSHOT_EVERY).max(1),
            status_ttl_secs: env_parse("STATUS_TTL_SECS", DEFAULT_STATUS_TTL_SECS),
            extraction_base_url: env::var("EXTRACTION_BASE_URL")
                .unwrap_or(defaults.extraction_base_url),
            extraction_api_key: env::var("EXTRACTION_API_KEY").ok(),
        }
    }

    /// True when `extension` (without dot) is on the allow-list.
    pub fn extension_allowed(&self, extension: &str) -> bool {
        let ext = extension.to_lowercase();
        self.allowed_extensions.iter().any(|a| a == &ext)
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        // .env is optional; real environments set variables directly
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        Ok(Self {
            port: env_parse("PORT", DEFAULT_SERVER_PORT),
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 20),
            ingest: IngestConfig::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = IngestConfig::default();
        assert_eq!(config.max_file_size_bytes, 70 * 1024 * 1024);
        assert_eq!(config.extraction_workers, 3);
        assert_eq!(config.extraction_queue_capacity, 100);
        assert_eq!(config.snapshot_every, 10);
        assert_eq!(config.status_ttl_secs, 86_400);
        assert_eq!(config.batch_workers, 4);
    }

    #[test]
    fn extension_allow_list_is_case_insensitive() {
        let config = IngestConfig::default();
        assert!(config.extension_allowed("pdf"));
        assert!(config.extension_allowed("PDF"));
        assert!(config.extension_allowed("Docx"));
        assert!(config.extension_allowed("txt"));
        assert!(config.extension_allowed("doc"));
        assert!(!config.extension_allowed("exe"));
        assert!(!config.extension_allowed("pdf "));
        assert!(!config.extension_allowed(""));
    }
}
