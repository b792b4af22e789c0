//! Registry configuration, fixed for the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RegistryError, RegistryResult};
use crate::ids::{ChannelId, RoleId};

pub const CONFIG_FILENAME: &str = "padron.json";
pub const CONFIG_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub version: String,
    /// Role ids whose holders pass Admin checks.
    pub admin_role_ids: Vec<RoleId>,
    /// Role ids whose holders pass Police checks. Admins pass these too.
    pub police_role_ids: Vec<RoleId>,
    /// Channels that receive the announcement when an identity is created.
    pub announce_channel_ids: Vec<ChannelId>,
    pub disclosure: DisclosurePreferences,
    pub viewer: ViewerPreferences,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisclosurePreferences {
    /// How long a consent prompt stays answerable before it expires.
    pub prompt_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerPreferences {
    /// Idle window after which a page cursor stops responding.
    pub idle_timeout_seconds: u64,
}

impl RegistryConfig {
    pub fn default_new() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            admin_role_ids: Vec::new(),
            police_role_ids: Vec::new(),
            announce_channel_ids: Vec::new(),
            disclosure: DisclosurePreferences {
                prompt_timeout_seconds: 300,
            },
            viewer: ViewerPreferences {
                idle_timeout_seconds: 180,
            },
        }
    }
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILENAME)
}

/// Load the configuration from `data_dir`, materializing a default file on
/// first start so operators have something to edit.
pub fn load_or_create_config(data_dir: &Path) -> RegistryResult<RegistryConfig> {
    if !data_dir.exists() {
        std::fs::create_dir_all(data_dir).map_err(|error| {
            RegistryError::Internal(format!(
                "failed to create data directory {}: {error}",
                data_dir.display()
            ))
        })?;
    }

    let path = config_path(data_dir);
    if path.exists() {
        let bytes = std::fs::read(&path).map_err(|error| {
            RegistryError::Internal(format!(
                "failed to read config {}: {error}",
                path.display()
            ))
        })?;
        let config: RegistryConfig = serde_json::from_slice(&bytes).map_err(|error| {
            RegistryError::Internal(format!(
                "config {} is not valid JSON: {error}",
                path.display()
            ))
        })?;
        return Ok(config);
    }

    let config = RegistryConfig::default_new();
    let serialized = serde_json::to_vec_pretty(&config)
        .map_err(|error| RegistryError::Internal(format!("failed to serialize config: {error}")))?;
    std::fs::write(&path, serialized).map_err(|error| {
        RegistryError::Internal(format!(
            "failed to write config {}: {error}",
            path.display()
        ))
    })?;
    tracing::info!("created default config at {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn first_load_materializes_defaults() {
        let dir = tempdir().expect("tempdir");
        let config = load_or_create_config(dir.path()).expect("load");
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.admin_role_ids.is_empty());
        assert!(config_path(dir.path()).exists());
    }

    #[test]
    fn existing_config_is_read_back() {
        let dir = tempdir().expect("tempdir");
        let mut config = RegistryConfig::default_new();
        config.admin_role_ids.push(RoleId(42));
        config.announce_channel_ids.push(ChannelId(7));
        let serialized = serde_json::to_vec_pretty(&config).expect("serialize");
        std::fs::write(config_path(dir.path()), serialized).expect("write");

        let loaded = load_or_create_config(dir.path()).expect("load");
        assert_eq!(loaded.admin_role_ids, vec![RoleId(42)]);
        assert_eq!(loaded.announce_channel_ids, vec![ChannelId(7)]);
    }
}
