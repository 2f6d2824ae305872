use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use listkit_core::DEFAULT_QUIET_PERIOD;
use listkit_engine::{ListEndpoint, ListMethod};
use listkit_logging::listkit_info;
use log::LevelFilter;
use serde::Deserialize;

use super::logging::LogDestination;
use super::records::RecordKind;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One list endpoint of the backend and how its rows look.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    pub resource: String,
    pub kind: RecordKind,
    pub path: String,
    #[serde(default)]
    pub method: ListMethod,
    pub page_size: String,
    /// Path template for deleting a row; `{id}` is replaced by the row id.
    #[serde(default)]
    pub delete_path: Option<String>,
}

impl ResourceConfig {
    pub fn endpoint(&self) -> ListEndpoint {
        ListEndpoint {
            resource: self.resource.clone(),
            path: self.path.clone(),
            method: self.method,
            page_size: self.page_size.clone(),
        }
    }

    /// The row id always fills exactly one path segment.
    pub fn delete_path_for(&self, id: &str) -> Option<String> {
        self.delete_path
            .as_ref()
            .map(|template| template.replace("{id}", &urlencoding::encode(id)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub base_url: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_destination: LogDestination,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    pub resources: Vec<ResourceConfig>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_QUIET_PERIOD.as_millis() as u64
}

impl AppConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn level(&self) -> Result<LevelFilter, ConfigError> {
        listkit_logging::parse_level(&self.log_level)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown log level {:?}", self.log_level)))
    }

    pub fn resource(&self, name: &str) -> Result<&ResourceConfig, ConfigError> {
        self.resources
            .iter()
            .find(|resource| resource.resource == name)
            .ok_or_else(|| ConfigError::Invalid(format!("resource {name:?} is not configured")))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.resources.is_empty() {
            return Err(ConfigError::Invalid("no resources configured".to_string()));
        }
        let mut names = BTreeSet::new();
        for resource in &self.resources {
            if !names.insert(resource.resource.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "resource {:?} is configured twice",
                    resource.resource
                )));
            }
            match resource.page_size.parse::<u32>() {
                Ok(size) if size > 0 => {}
                _ => {
                    return Err(ConfigError::Invalid(format!(
                        "page size {:?} of {:?} is not a positive number",
                        resource.page_size, resource.resource
                    )))
                }
            }
        }
        self.level()?;
        Ok(())
    }
}

pub fn parse_config(text: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = ron::from_str(text)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&text)?;
    listkit_info!(
        "Loaded {} resource(s) from {:?}",
        config.resources.len(),
        path
    );
    Ok(config)
}
