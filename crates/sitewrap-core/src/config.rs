//! Persisted shell configuration
//!
//! The on-disk document is versioned. Loading an older document fills in
//! every field the current version knows about, keeps the stored values,
//! and writes the upgraded document back.

use crate::error::{SiteWrapError, SiteWrapResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Current on-disk config version
pub const CONFIG_VERSION: u32 = 3;

/// File name of the config document inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable overriding the config path
pub const CONFIG_PATH_ENV: &str = "SITEWRAP_CONFIG";

/// Default text shown when a destination is refused
pub const DEFAULT_BLOCK_MESSAGE: &str = "This address is not allowed to be opened.";

/// Shell configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Document version, drives migration
    pub version: u32,

    /// Site to wrap; empty shows the local version page
    pub url: String,

    /// Start the main window fullscreen
    pub full_screen: bool,

    /// Keep the main window above others
    pub always_on_top: bool,

    /// Register as a login item (handled outside the shell)
    pub start_on_login: bool,

    /// Update behaviour (handled outside the shell)
    pub update: UpdateConfig,

    /// New-window and allow-list policy
    pub new_window: NewWindowConfig,

    #[serde(skip)]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateConfig {
    pub auto_check: bool,
    pub auto_download: bool,
    pub auto_install: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewWindowConfig {
    /// Whether pages may open secondary windows at all
    pub can_open_new_window: bool,

    /// Message shown in the denial dialog
    pub message: String,

    /// Domain patterns; empty allows everything
    #[serde(rename = "whiteList")]
    pub allow_list: Vec<String>,

    /// Open approved windows as in-app virtual windows instead of native windows
    pub in_process: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            url: String::new(),
            full_screen: false,
            always_on_top: false,
            start_on_login: true,
            update: UpdateConfig::default(),
            new_window: NewWindowConfig::default(),
            path: None,
        }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            auto_check: true,
            auto_download: true,
            auto_install: false,
        }
    }
}

impl Default for NewWindowConfig {
    fn default() -> Self {
        Self {
            can_open_new_window: true,
            message: DEFAULT_BLOCK_MESSAGE.to_string(),
            allow_list: Vec::new(),
            in_process: true,
        }
    }
}

impl AppConfig {
    /// Load a config document, returning `None` if it is unreadable or corrupt
    pub fn load(path: &Path) -> Option<Self> {
        match Self::try_load(path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config from {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Load a config document, upgrading and re-saving it if it is older than
    /// [`CONFIG_VERSION`]
    pub fn try_load(path: &Path) -> SiteWrapResult<Self> {
        let raw = fs::read_to_string(path)?;
        let stored: Value = serde_json::from_str(&raw)?;
        if !stored.is_object() {
            return Err(SiteWrapError::config_load("config root is not an object"));
        }

        let stored_version = stored.get("version").and_then(Value::as_u64).unwrap_or(0);
        let mut config: Self = if stored_version < u64::from(CONFIG_VERSION) {
            log::info!(
                "Upgrading config {} from version {} to {}",
                path.display(),
                stored_version,
                CONFIG_VERSION
            );
            let upgraded = migrate(stored, serde_json::to_value(Self::default())?);
            // a document that does not deserialize stays on disk as it was
            let upgraded_config = serde_json::from_value(upgraded.clone())?;
            if let Err(e) = write_document(path, &upgraded) {
                log::warn!("Failed to persist upgraded config: {}", e);
            }
            upgraded_config
        } else {
            serde_json::from_value(stored)?
        };

        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load the config at `path`, falling back to in-memory defaults.
    ///
    /// A missing file is seeded with the defaults; a corrupt one is left
    /// untouched.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No config at {}, writing defaults", path.display());
            let mut config = Self::default();
            if let Err(e) = config.save(path) {
                log::warn!("Failed to write default config: {}", e);
            }
            return config;
        }

        Self::load(path).unwrap_or_else(|| {
            log::warn!("Using default configuration");
            Self::default()
        })
    }

    /// Write the config to `path` and remember it
    pub fn save(&mut self, path: &Path) -> SiteWrapResult<()> {
        write_document(path, &serde_json::to_value(&*self)?)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Where this config was loaded from or last saved to
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The site to wrap, if one is configured
    pub fn start_url(&self) -> Option<&str> {
        let url = self.url.trim();
        if url.is_empty() {
            None
        } else {
            Some(url)
        }
    }

    /// The site to wrap as a parsed URL. A configured value without a host
    /// is rejected.
    pub fn start_location(&self) -> SiteWrapResult<Option<Url>> {
        let Some(raw) = self.start_url() else {
            return Ok(None);
        };
        let url = Url::parse(raw)
            .map_err(|e| SiteWrapError::malformed_url(format!("{}: {}", raw, e)))?;
        if url.host_str().is_none() {
            return Err(SiteWrapError::malformed_url(format!("{}: no host", raw)));
        }
        Ok(Some(url))
    }
}

/// Upgrade a stored document to the current version.
///
/// Stored values win over `defaults`; nested objects are merged key by key so
/// fields added in later versions are filled in. The result always carries
/// [`CONFIG_VERSION`].
pub fn migrate(stored: Value, defaults: Value) -> Value {
    let mut merged = defaults;
    merge_into(&mut merged, stored);
    if let Some(map) = merged.as_object_mut() {
        map.insert("version".to_string(), Value::from(CONFIG_VERSION));
    }
    merged
}

fn merge_into(target: &mut Value, source: Value) {
    let source_map = match source {
        Value::Object(map) => map,
        other => {
            *target = other;
            return;
        }
    };
    let Some(target_map) = target.as_object_mut() else {
        *target = Value::Object(source_map);
        return;
    };

    for (key, value) in source_map {
        match target_map.get_mut(&key) {
            Some(existing) if existing.is_object() && value.is_object() => {
                merge_into(existing, value)
            }
            _ => {
                target_map.insert(key, value);
            }
        }
    }
}

fn write_document(path: &Path, document: &Value) -> SiteWrapResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(document)?)?;
    Ok(())
}

/// Resolve the config path: `$SITEWRAP_CONFIG`, else the per-user config dir
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sitewrap")
        .join(CONFIG_FILE_NAME)
}
