//! Configuration Management
//!
//! Persistent configuration for atlasctl. Credentials resolve with the
//! precedence flags > environment > config file, once, in the binary; the
//! resolved key pair is passed into the transport constructor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::api::auth::{ApiKey, PRIVATE_KEY_ENV, PUBLIC_KEY_ENV};
use crate::error::{Error, Result};

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
    /// Display name of the default organization, informational only.
    #[serde(default)]
    pub organization: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("atlasctl").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("cannot create {}: {e}", parent.display())))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .map_err(|e| Error::Config(format!("cannot write {}: {e}", path.display())))?;

        Ok(())
    }

    /// Resolve the key pair: CLI flags > environment > config file.
    pub fn resolve_keys(
        &self,
        flag_public: Option<String>,
        flag_private: Option<String>,
    ) -> Result<ApiKey> {
        self.resolve_keys_from(
            flag_public,
            flag_private,
            std::env::var(PUBLIC_KEY_ENV).ok(),
            std::env::var(PRIVATE_KEY_ENV).ok(),
        )
    }

    fn resolve_keys_from(
        &self,
        flag_public: Option<String>,
        flag_private: Option<String>,
        env_public: Option<String>,
        env_private: Option<String>,
    ) -> Result<ApiKey> {
        let public = flag_public
            .or(env_public)
            .or_else(|| self.public_key.clone());
        let private = flag_private
            .or(env_private)
            .or_else(|| self.private_key.clone());

        match (public, private) {
            (Some(public), Some(private)) => Ok(ApiKey::new(public, private)),
            _ => Err(Error::Config(format!(
                "no API key pair configured: pass --public-key/--private-key, \
                 set {PUBLIC_KEY_ENV}/{PRIVATE_KEY_ENV}, or add the keys to the config file"
            ))),
        }
    }

    /// Store a key pair and save
    pub fn set_keys(&mut self, public_key: &str, private_key: &str) -> Result<()> {
        self.public_key = Some(public_key.to_string());
        self.private_key = Some(private_key.to_string());
        self.save()
    }
}
