use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chatbot_llm::{
    DEFAULT_SIMULATED_DELAY_MS, DEFAULT_SIMULATED_MAX_CHARS, GeneratorConfig,
    SIMULATED_PROVIDER_ID,
};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

use crate::app::FabTrack;
use crate::chat::session::{DEFAULT_RESPONSE_TIMEOUT_MS, SessionConfig};
use crate::chat::speech::DEFAULT_LOCALE;
use crate::chat::ticker::DEFAULT_TICKER_INTERVAL_MS;
use crate::settings::overlay::OverlaySettings;

pub const SETTINGS_DIRECTORY_NAME: &str = "chatbot";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const SETTINGS_ENV_PREFIX: &str = "CHATBOT_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    #[serde(default = "default_provider_id")]
    pub provider_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub preamble: String,
    #[serde(default = "default_simulated_delay_ms")]
    pub simulated_delay_ms: u64,
    #[serde(default = "default_simulated_max_chars")]
    pub simulated_max_chars: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            provider_id: default_provider_id(),
            api_key: String::new(),
            endpoint: String::new(),
            model_name: String::new(),
            preamble: String::new(),
            simulated_delay_ms: default_simulated_delay_ms(),
            simulated_max_chars: default_simulated_max_chars(),
        }
    }
}

impl GeneratorSettings {
    pub fn to_generator_config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::new(&self.provider_id, &self.api_key, &self.endpoint)
            .with_simulation(self.simulated_delay_ms, self.simulated_max_chars)
            .with_preamble(self.preamble.trim());
        let model_name = self.model_name.trim();
        if !model_name.is_empty() {
            config = config.with_model(model_name);
        }
        config
    }

    fn normalized(mut self) -> Self {
        self.provider_id = if self.provider_id.trim().is_empty() {
            default_provider_id()
        } else {
            self.provider_id.trim().to_ascii_lowercase()
        };
        self.api_key = self.api_key.trim().to_string();
        self.endpoint = self.endpoint.trim().to_string();
        self.model_name = self.model_name.trim().to_string();
        self.simulated_max_chars = self.simulated_max_chars.max(1);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSettings {
    #[serde(default = "default_open_on_launch")]
    pub open_on_launch: bool,
    #[serde(default)]
    pub fab_track: FabTrack,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            open_on_launch: default_open_on_launch(),
            fab_track: FabTrack::default(),
        }
    }
}

/// Everything the overlay reads at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default)]
    pub overlay: OverlaySettings,
    #[serde(default)]
    pub generator: GeneratorSettings,
    #[serde(default = "default_ticker_interval_ms")]
    pub ticker_interval_ms: u64,
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub host: HostSettings,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            overlay: OverlaySettings::default(),
            generator: GeneratorSettings::default(),
            ticker_interval_ms: default_ticker_interval_ms(),
            response_timeout_ms: default_response_timeout_ms(),
            locale: default_locale(),
            host: HostSettings::default(),
        }
    }
}

impl ChatSettings {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            overlay: self.overlay.resolve(),
            ticker_interval: Duration::from_millis(self.ticker_interval_ms),
            response_timeout: Duration::from_millis(self.response_timeout_ms),
            locale: self.locale.clone(),
        }
    }

    pub fn normalized(mut self) -> Self {
        self.generator = self.generator.normalized();
        // A zero period would make the tick interval panic.
        if self.ticker_interval_ms == 0 {
            self.ticker_interval_ms = default_ticker_interval_ms();
        }
        if self.response_timeout_ms == 0 {
            self.response_timeout_ms = default_response_timeout_ms();
        }
        self.locale = if self.locale.trim().is_empty() {
            default_locale()
        } else {
            self.locale.trim().to_string()
        };
        self.host.fab_track = self.host.fab_track.normalized();
        self
    }
}

pub struct SettingsStore {
    settings: Arc<ArcSwap<ChatSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".chatbot"))
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

    pub fn settings(&self) -> Arc<ChatSettings> {
        self.settings.load_full()
    }

    pub fn update(&self, settings: ChatSettings) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.persist(&normalized_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    fn load_from_disk(path: &Path) -> ChatSettings {
        if !path.exists() {
            tracing::info!(path = ?path, "settings file not found, using defaults");
        }

        let figment = Figment::from(Serialized::defaults(ChatSettings::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(SETTINGS_ENV_PREFIX).split("__"));

        match figment.extract::<ChatSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    path = ?path,
                    error = %error,
                    "failed to parse settings, using defaults"
                );
                ChatSettings::default()
            }
        }
    }

    fn persist(&self, settings: &ChatSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!(path = ?self.config_path, "saved settings");
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace settings file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

fn default_provider_id() -> String {
    SIMULATED_PROVIDER_ID.to_string()
}

fn default_simulated_delay_ms() -> u64 {
    DEFAULT_SIMULATED_DELAY_MS
}

fn default_simulated_max_chars() -> usize {
    DEFAULT_SIMULATED_MAX_CHARS
}

fn default_ticker_interval_ms() -> u64 {
    DEFAULT_TICKER_INTERVAL_MS
}

fn default_response_timeout_ms() -> u64 {
    DEFAULT_RESPONSE_TIMEOUT_MS
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_open_on_launch() -> bool {
    true
}
