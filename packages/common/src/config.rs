use std::path::PathBuf;

use serde::Deserialize;

/// Which blob store backend to open.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Filesystem,
    S3,
}

/// App-level blob storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageAppConfig {
    /// Backend selection. Default: filesystem.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Prefix of every public blob URL. Default: "http://127.0.0.1:3000/media".
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Root directory of the filesystem backend. Default: "./data/media".
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Maximum accepted upload size in bytes, for every bucket. Default: 10 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
    /// Minimum age before an unreferenced blob may be swept. Default: 24 hours.
    #[serde(default = "default_sweep_grace_secs")]
    pub sweep_grace_secs: u64,
    /// Required when `backend = "s3"`.
    #[serde(default)]
    pub s3: Option<S3Config>,
}

/// Connection settings for an S3-compatible object store.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    pub endpoint: String,
    #[serde(default = "default_s3_region")]
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Prepended to each logical bucket name. Default: "".
    #[serde(default)]
    pub bucket_prefix: String,
    /// Use path-style addressing (MinIO and most self-hosted stores).
    #[serde(default = "default_path_style")]
    pub path_style: bool,
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:3000/media".into()
}
fn default_root() -> PathBuf {
    PathBuf::from("./data/media")
}
fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024
}
fn default_sweep_grace_secs() -> u64 {
    24 * 60 * 60
}
fn default_s3_region() -> String {
    "us-east-1".into()
}
fn default_path_style() -> bool {
    true
}

impl Default for StorageAppConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            public_base_url: default_public_base_url(),
            root: default_root(),
            max_upload_size: default_max_upload_size(),
            sweep_grace_secs: default_sweep_grace_secs(),
            s3: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_uses_defaults() {
        let config: StorageAppConfig = toml::from_str("").unwrap();
        assert_eq!(config.backend, StorageBackend::Filesystem);
        assert_eq!(config.max_upload_size, 10 * 1024 * 1024);
        assert_eq!(config.sweep_grace_secs, 86_400);
        assert!(config.s3.is_none());
    }

    #[test]
    fn parses_s3_section() {
        let config: StorageAppConfig = toml::from_str(
            r#"
            backend = "s3"
            public_base_url = "https://cdn.example.com"

            [s3]
            endpoint = "http://minio:9000"
            access_key = "key"
            secret_key = "secret"
            bucket_prefix = "showroom-"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, StorageBackend::S3);
        let s3 = config.s3.unwrap();
        assert_eq!(s3.region, "us-east-1");
        assert_eq!(s3.bucket_prefix, "showroom-");
        assert!(s3.path_style);
    }
}
