use crate::error::{FieldOpsError, Result};
use dialoguer::{Input, Select};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub farm: FarmConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub openweathermap: Option<OpenWeatherMapConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FarmConfig {
    pub name: String,
    /// Field used when a command is run without `--field`
    pub default_field_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub provider: WeatherProviderKind,
    /// JSON forecast records used by the fixture provider instead of the bundled set
    pub fixture_path: Option<PathBuf>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            provider: WeatherProviderKind::Fixture,
            fixture_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherProviderKind {
    #[default]
    Fixture,
    OpenWeatherMap,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Seed the field table from the bundled fixtures when it is empty
    #[serde(default = "default_enabled")]
    pub seed_fields: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            seed_fields: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct OpenWeatherMapConfig {
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl std::fmt::Debug for OpenWeatherMapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapConfig")
            .field("api_key", &"[REDACTED]")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(FieldOpsError::Config(format!(
                "Config file not found at {:?}. Run `fieldops init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| FieldOpsError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&config_str)
    }

    /// Parse YAML after substituting `${VAR}` references from the environment.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);

        serde_yaml::from_str(&content)
            .map_err(|e| FieldOpsError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load the config if one exists, otherwise fall back to defaults.
    pub fn load_or_default(config_override: Option<PathBuf>) -> Result<Self> {
        if Self::exists(config_override.as_ref()) {
            Self::load(config_override)
        } else {
            tracing::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("fieldops").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/fieldops/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FieldOpsError::Config("Cannot determine config directory".into()))?
            .join("fieldops");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up FieldOps!");
        println!();

        println!("Farm");
        let farm_name: String = Input::new()
            .with_prompt("  Farm name")
            .default("Home Farm".into())
            .interact_text()
            .map_err(|e| FieldOpsError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Weather");
        let providers = ["Bundled sample forecast", "OpenWeatherMap"];
        let choice = Select::new()
            .with_prompt("  Forecast source")
            .items(&providers)
            .default(0)
            .interact()
            .map_err(|e| FieldOpsError::Config(format!("Input error: {}", e)))?;

        let openweathermap = if choice == 1 {
            let api_key: String = Input::new()
                .with_prompt("  API key (or ${OWM_API_KEY})")
                .default("${OWM_API_KEY}".into())
                .interact_text()
                .map_err(|e| FieldOpsError::Config(format!("Input error: {}", e)))?;

            let latitude: f64 = Input::new()
                .with_prompt("  Latitude")
                .default(41.59)
                .interact_text()
                .map_err(|e| FieldOpsError::Config(format!("Input error: {}", e)))?;

            let longitude: f64 = Input::new()
                .with_prompt("  Longitude")
                .default(-93.62)
                .interact_text()
                .map_err(|e| FieldOpsError::Config(format!("Input error: {}", e)))?;

            Some(OpenWeatherMapConfig {
                api_key,
                latitude,
                longitude,
                enabled: true,
            })
        } else {
            None
        };

        println!();

        let config = Config {
            farm: FarmConfig {
                name: farm_name,
                default_field_id: Some(1),
            },
            weather: WeatherConfig {
                provider: if openweathermap.is_some() {
                    WeatherProviderKind::OpenWeatherMap
                } else {
                    WeatherProviderKind::Fixture
                },
                fixture_path: None,
            },
            storage: StorageConfig::default(),
            openweathermap,
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| FieldOpsError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# FieldOps Configuration\n# Generated by `fieldops init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return result,
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("FIELDOPS_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| FieldOpsError::Config("Cannot determine data directory".into()))?
            .join("fieldops");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("fieldops.db"))
    }

    /// OpenWeatherMap settings when that provider is selected and usable
    pub fn active_openweathermap(&self) -> Option<&OpenWeatherMapConfig> {
        if self.weather.provider != WeatherProviderKind::OpenWeatherMap {
            return None;
        }
        self.openweathermap
            .as_ref()
            .filter(|c| c.enabled && !c.api_key.is_empty() && !c.api_key.starts_with("${"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            farm: FarmConfig {
                name: "Home Farm".into(),
                default_field_id: Some(1),
            },
            weather: WeatherConfig::default(),
            storage: StorageConfig::default(),
            openweathermap: None,
        }
    }
}
