use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use advisor_gateway::GatewayConfig;
use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

pub const DEFAULT_BACKEND_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONFIRMATION_DISPLAY_SECS: u64 = 3;
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const SETTINGS_DIRECTORY_NAME: &str = "client-advisor";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const ENV_PREFIX: &str = "ADVISOR_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorSettings {
    #[serde(default = "default_backend_base_url")]
    pub backend_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_confirmation_display_secs")]
    pub confirmation_display_secs: u64,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            backend_base_url: default_backend_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            confirmation_display_secs: default_confirmation_display_secs(),
            log_filter: default_log_filter(),
        }
    }
}

impl AdvisorSettings {
    pub fn normalized(mut self) -> Self {
        self.backend_base_url = if self.backend_base_url.trim().is_empty() {
            default_backend_base_url()
        } else {
            self.backend_base_url.trim().to_string()
        };
        self.log_filter = if self.log_filter.trim().is_empty() {
            default_log_filter()
        } else {
            self.log_filter.trim().to_string()
        };
        // A zero duration would hide the indicator before it is ever drawn.
        if self.confirmation_display_secs == 0 {
            self.confirmation_display_secs = default_confirmation_display_secs();
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_request_timeout_secs();
        }
        self
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new(self.backend_base_url.clone())
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
    }

    pub fn confirmation_duration(&self) -> Duration {
        Duration::from_secs(self.confirmation_display_secs)
    }
}

/// Settings loaded once per session and swappable on reload.
pub struct SettingsStore {
    settings: Arc<ArcSwap<AdvisorSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".client-advisor"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from_disk(&config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<AdvisorSettings> {
        self.settings.load_full()
    }

    /// Re-reads file and environment; on error the current settings stay.
    pub fn reload(&self) -> Result<Arc<AdvisorSettings>, SettingsError> {
        let settings = Self::extract(&self.config_path)?;
        self.settings.store(Arc::new(settings));
        tracing::info!("reloaded settings from {:?}", self.config_path);
        Ok(self.settings())
    }

    fn load_from_disk(path: &Path) -> AdvisorSettings {
        if !path.exists() {
            tracing::info!("settings file not found at {:?}, using defaults", path);
        }

        match Self::extract(path) {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!("{error}. using defaults");
                AdvisorSettings::default()
            }
        }
    }

    fn extract(path: &Path) -> Result<AdvisorSettings, SettingsError> {
        Figment::from(Serialized::defaults(AdvisorSettings::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract::<AdvisorSettings>()
            .map(AdvisorSettings::normalized)
            .context(ExtractSnafu {
                stage: "extract-settings",
                path: path.to_path_buf(),
            })
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to parse settings from {path:?} on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        path: PathBuf,
        #[snafu(source(from(figment::Error, Box::new)))]
        source: Box<figment::Error>,
    },
}

fn default_backend_base_url() -> String {
    DEFAULT_BACKEND_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_confirmation_display_secs() -> u64 {
    DEFAULT_CONFIRMATION_DISPLAY_SECS
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
