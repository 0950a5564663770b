use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::capabilities::PickerConfig;

pub const MIB: u64 = 1024 * 1024;
pub const DEFAULT_MAX_BATCH_BYTES: u64 = 5 * MIB;
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "/upload";
pub const MAX_ENDPOINT_LENGTH: usize = 2048;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid upload endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("batch quota must be greater than zero")]
    ZeroBatchQuota,
}

/// Screen configuration. Shells replace it through `Event::Configure`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumConfig {
    /// Absolute `http(s)` URL, or a path resolved by the shell's HTTP client.
    pub upload_endpoint: String,
    pub max_batch_bytes: u64,
    pub picker: PickerConfig,
}

impl Default for AlbumConfig {
    fn default() -> Self {
        Self {
            upload_endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
            picker: PickerConfig::default(),
        }
    }
}

impl AlbumConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.upload_endpoint = endpoint.into();
        self
    }

    pub fn with_max_batch_bytes(mut self, max_batch_bytes: u64) -> Self {
        self.max_batch_bytes = max_batch_bytes;
        self
    }

    pub fn with_picker(mut self, picker: PickerConfig) -> Self {
        self.picker = picker;
        self
    }

    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.upload_endpoint = self.upload_endpoint.trim().to_string();
        validate_endpoint(&self.upload_endpoint)?;
        if self.max_batch_bytes == 0 {
            return Err(ConfigError::ZeroBatchQuota);
        }
        self.picker = self.picker.validated();
        Ok(self)
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEndpoint {
        endpoint: endpoint.chars().take(100).collect(),
        reason: reason.to_string(),
    };

    if endpoint.is_empty() {
        return Err(invalid("endpoint cannot be empty"));
    }
    if endpoint.len() > MAX_ENDPOINT_LENGTH {
        return Err(invalid("endpoint is too long"));
    }
    if endpoint.starts_with('/') {
        if endpoint.starts_with("//") {
            return Err(invalid("scheme-relative endpoints are not allowed"));
        }
        return Ok(());
    }

    let parsed = Url::parse(endpoint).map_err(|e| invalid(&e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(&format!("unsupported scheme '{other}'"))),
    }
    if parsed.host_str().is_none() {
        return Err(invalid("endpoint must have a host"));
    }
    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(invalid("credentials in URL are not allowed"));
    }
    Ok(())
}
