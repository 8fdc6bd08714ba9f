//! Configuration management for the CLI.
//!
//! Lives at `~/.docqa/config.toml` unless `--config` points elsewhere. Each
//! profile names a database and the pipeline and inference settings used
//! against it.

use crate::error::{CliError, Result};
use docqa_llm::InferenceSettings;
use docqa_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Email of the account that owns everything the CLI ingests.
pub const DEFAULT_LOCAL_EMAIL: &str = "local@docqa.localhost";

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name
    #[serde(default = "default_profile")]
    pub active_profile: String,

    /// Available profiles
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// File this configuration was loaded from
    #[serde(skip)]
    source: Option<PathBuf>,
}

/// A database plus the settings used to work with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Local account owning ingested documents
    #[serde(default = "default_local_email")]
    pub user_email: String,

    /// Chunking and context budget
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Inference endpoint settings
    #[serde(default)]
    pub inference: InferenceSettings,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Chat history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load configuration from the default path or create a default.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`, or a default bound to that path if
    /// the file does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str::<Config>(&contents)?
        } else {
            Self::default()
        };
        config.source = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the file it was loaded from.
    pub fn save(&self) -> Result<()> {
        let path = match &self.source {
            Some(path) => path.clone(),
            None => Self::path()?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Check every profile's pipeline and inference settings.
    pub fn validate(&self) -> Result<()> {
        for (name, profile) in &self.profiles {
            profile
                .pipeline
                .validate()
                .map_err(|e| CliError::Config(format!("profile '{}': {}", name, e)))?;
            profile
                .inference
                .validate()
                .map_err(|e| CliError::Config(format!("profile '{}': {}", name, e)))?;
        }
        Ok(())
    }

    /// Get the active profile.
    pub fn get_active_profile(&self) -> Result<&Profile> {
        self.profiles
            .get(&self.active_profile)
            .ok_or_else(|| CliError::Config(format!("Profile '{}' not found", self.active_profile)))
    }

    /// Add or update a profile.
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Switch to a different profile.
    pub fn switch_profile(&mut self, name: String) -> Result<()> {
        if !self.profiles.contains_key(&name) {
            return Err(CliError::Config(format!("Profile '{}' does not exist", name)));
        }
        self.active_profile = name;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert("default".to_string(), Profile::default());

        Self {
            active_profile: default_profile(),
            profiles,
            settings: Settings::default(),
            source: None,
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        let database_path = data_dir()
            .map(|dir| dir.join("document_qa.db"))
            .unwrap_or_else(|_| PathBuf::from("document_qa.db"));

        Self {
            database_path,
            user_email: default_local_email(),
            pipeline: PipelineConfig::default(),
            inference: InferenceSettings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            history_size: default_history_size(),
        }
    }
}

/// `~/.docqa`, where configuration, chat history and the default database live.
pub fn data_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".docqa"))
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_local_email() -> String {
    DEFAULT_LOCAL_EMAIL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_history_size() -> usize {
    1000
}
