use std::path::PathBuf;

use figment::{
    providers::{Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{errors::PeducError, headers::DEFAULT_APPLICATION_NAME};

#[derive(Serialize, Deserialize, Clone, Default, Debug)]
pub struct AppConfig {
    pub rocket: rocket::Config,
    pub sled: SledConfig,
    pub peduc: PeducConfig,
}

impl AppConfig {
    pub fn load(file: PathBuf) -> Result<Self, PeducError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Self::default())).merge(Yaml::file(file)),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, PeducError> {
        let config: Self = figment.extract()?;
        config.peduc.validate()?;
        Ok(config)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PeducConfig {
    /// Prefix of the alert headers, `X-<application_name>-alert`
    pub application_name: String,
    /// Mount point of the peer routes
    pub base_path: String,
    pub reindex_on_startup: bool,
    pub indexer_report_secs: u64,
}

impl Default for PeducConfig {
    fn default() -> Self {
        Self {
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
            base_path: "/api".to_string(),
            reindex_on_startup: false,
            indexer_report_secs: 120,
        }
    }
}

impl PeducConfig {
    pub fn validate(&self) -> Result<(), PeducError> {
        let base = &self.base_path;
        if !base.starts_with('/') || (base.len() > 1 && base.ends_with('/')) {
            return Err(PeducError::InvalidBasePath(base.clone()));
        }
        Ok(())
    }

    /// Base used to build `Location` headers; the root mount contributes nothing.
    pub fn location_base(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SledConfig {
    pub cache_capacity: u64,
    pub flush_every_ms: Option<u64>,
    pub path: PathBuf,
    pub mode: String,
    pub use_compression: bool,
    pub compression_factor: i32,
    pub temporary: bool,
}

impl Default for SledConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 256 * 1024 * 1024,
            flush_every_ms: Some(500),
            path: PathBuf::from("data/"),
            mode: "HighThroughput".to_string(),
            use_compression: false,
            compression_factor: 5,
            temporary: false,
        }
    }
}

impl From<SledConfig> for sled::Config {
    fn from(value: SledConfig) -> Self {
        sled::Config::new()
            .cache_capacity(value.cache_capacity)
            .flush_every_ms(value.flush_every_ms)
            .path(value.path)
            .mode(match value.mode.as_str() {
                "HighThroughput" => sled::Mode::HighThroughput,
                "LowSpace" => sled::Mode::LowSpace,
                _ => sled::Mode::HighThroughput,
            })
            .use_compression(value.use_compression)
            .compression_factor(value.compression_factor)
            .temporary(value.temporary)
    }
}
