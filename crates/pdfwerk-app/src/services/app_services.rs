// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer. Owns the data directory and the persisted settings,
// and builds the toolkit each command runs against.

use std::path::{Path, PathBuf};

use pdfwerk_core::AppConfig;
use pdfwerk_core::error::{PdfwerkError, Result};
use pdfwerk_document::Toolkit;
use serde_json::Value;
use tracing::{info, warn};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";

/// Settings and storage shared by every command.
#[derive(Debug, Clone)]
pub struct AppServices {
    data_dir: PathBuf,
    config: AppConfig,
}

impl AppServices {
    /// Initialise services from the platform data directory.
    ///
    /// A missing config file yields the defaults; an unreadable one is
    /// reported and replaced by the defaults for this run.
    pub fn init() -> Self {
        let dir = data_dir::data_dir();
        info!(path = %dir.display(), "initialising app services");
        Self::with_data_dir(dir)
    }

    pub fn with_data_dir(dir: PathBuf) -> Self {
        let config = match load_config(&dir) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "config unreadable, using defaults");
                AppConfig::default()
            }
        };
        Self {
            data_dir: dir,
            config,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// A toolkit over the current settings.
    pub fn toolkit(&self) -> Toolkit {
        Toolkit::new(self.config.clone())
    }

    /// Validate, store and persist new settings.
    pub fn save_config(&mut self, config: AppConfig) -> Result<()> {
        config.validate()?;
        persist_config(&self.data_dir, &config)?;
        self.config = config;
        Ok(())
    }

    /// Set one setting by its JSON field name, e.g. `("quality", "60")`.
    pub fn set_config_value(&mut self, key: &str, raw: &str) -> Result<()> {
        let mut value = serde_json::to_value(&self.config)?;
        let fields = value
            .as_object_mut()
            .ok_or_else(|| PdfwerkError::InvalidRequest("settings are not an object".into()))?;
        if !fields.contains_key(key) {
            return Err(PdfwerkError::InvalidRequest(format!(
                "unknown setting `{key}`"
            )));
        }
        let parsed = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.into()));
        fields.insert(key.to_string(), parsed);

        let config: AppConfig = serde_json::from_value(value).map_err(|e| {
            PdfwerkError::InvalidRequest(format!("`{raw}` is not a valid value for {key}: {e}"))
        })?;
        self.save_config(config)?;
        info!(key, value = raw, "setting updated");
        Ok(())
    }

    /// Restore and persist the default settings.
    pub fn reset_config(&mut self) -> Result<()> {
        self.save_config(AppConfig::default())
    }
}

fn load_config(data_dir: &Path) -> Result<AppConfig> {
    AppConfig::load(&data_dir.join(CONFIG_FILE))
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    config.save(&data_dir.join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_directory_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let services = AppServices::with_data_dir(dir.path().to_path_buf());
        assert_eq!(services.config(), &AppConfig::default());
        assert!(!services.config_path().exists());
    }

    #[test]
    fn corrupt_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        let services = AppServices::with_data_dir(dir.path().to_path_buf());
        assert_eq!(services.config(), &AppConfig::default());
    }

    #[test]
    fn set_value_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mut services = AppServices::with_data_dir(dir.path().to_path_buf());
        services.set_config_value("quality", "60").unwrap();
        services.set_config_value("export_ceiling", "40").unwrap();

        let reloaded = AppServices::with_data_dir(dir.path().to_path_buf());
        assert_eq!(reloaded.config().quality, 60);
        assert_eq!(reloaded.config().export_ceiling, 40);
    }

    #[test]
    fn unknown_or_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut services = AppServices::with_data_dir(dir.path().to_path_buf());

        let err = services.set_config_value("colour", "blue").unwrap_err();
        assert!(matches!(err, PdfwerkError::InvalidRequest(_)));

        let err = services.set_config_value("dpi", "many").unwrap_err();
        assert!(matches!(err, PdfwerkError::InvalidRequest(_)));

        let err = services.set_config_value("dpi", "1200").unwrap_err();
        assert!(matches!(err, PdfwerkError::InvalidRequest(_)));

        let err = services.set_config_value("max_pages_for_lossy", "0").unwrap_err();
        assert!(matches!(err, PdfwerkError::InvalidRequest(_)));

        assert_eq!(services.config(), &AppConfig::default());
        assert!(!services.config_path().exists());
    }

    #[test]
    fn reset_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut services = AppServices::with_data_dir(dir.path().to_path_buf());
        services.set_config_value("embed_quality", "50").unwrap();
        services.reset_config().unwrap();
        assert_eq!(
            AppConfig::load(&services.config_path()).unwrap(),
            AppConfig::default()
        );
    }
}
