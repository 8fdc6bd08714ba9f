//! Configuration for the document pipeline

use docqa_domain::ContextBudget;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Default chunk width (characters)
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between consecutive chunks (characters)
pub const DEFAULT_OVERLAP: usize = 200;

/// Chunking parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Tentative chunk width, in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl ChunkingConfig {
    /// Create a validated chunking configuration
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, PipelineError> {
        let config = Self {
            chunk_size,
            overlap,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// The cursor advances by `chunk_size - overlap` in the worst case, so the
    /// overlap must be strictly smaller than the chunk size.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.chunk_size == 0 {
            return Err(PipelineError::Configuration(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(PipelineError::Configuration(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_overlap() -> usize {
    DEFAULT_OVERLAP
}

/// Configuration for ingestion and context assembly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// How documents are split at ingestion time
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// How much chunk text goes into one prompt
    #[serde(default)]
    pub budget: ContextBudget,
}

impl PipelineConfig {
    /// Validate both sections
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.chunking.validate()?;
        self.budget
            .validate()
            .map_err(PipelineError::Configuration)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, PipelineError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| PipelineError::Configuration(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Configuration(format!("Failed to serialize to TOML: {}", e)))
    }
}
