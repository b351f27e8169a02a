use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:11411";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
pub const DEFAULT_GENERATION_BASE_URL: &str = "https://api.together.xyz/v1";
pub const DEFAULT_GENERATION_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free";

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Machine-parseable JSON format
    Json,
    /// Documentation-friendly Markdown format
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("studyrag").join("config.toml"))
    }

    pub fn load() -> Result<Self, crate::error::ConfigError> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            return Ok(config);
        }
        Ok(Self::default())
    }

    pub fn save(&self) -> Result<(), crate::error::ConfigError> {
        let path = Self::config_path().ok_or_else(|| {
            crate::error::ConfigError::PathError("could not determine config directory".to_string())
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_url")]
    pub url: String,

    /// Model identifier reported by the server; stored with every built index
    /// so stale artifacts are rejected on load.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

fn default_embedding_url() -> String {
    DEFAULT_EMBEDDING_URL.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_batch_size() -> u32 {
    8
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            timeout_secs: default_timeout(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Environment variable holding the provider API key. The key itself is
    /// never written to the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_generation_base_url() -> String {
    DEFAULT_GENERATION_BASE_URL.to_string()
}

fn default_generation_model() -> String {
    DEFAULT_GENERATION_MODEL.to_string()
}

fn default_api_key_env() -> String {
    "TOGETHER_API".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Directory holding the per-unit index artifacts. Defaults to the
    /// platform data dir when unset.
    #[serde(default)]
    pub index_dir: Option<PathBuf>,

    #[serde(default = "default_chunk_max_tokens")]
    pub chunk_max_tokens: u32,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: u32,
}

fn default_chunk_max_tokens() -> u32 {
    500
}

fn default_chunk_overlap() -> u32 {
    50
}

impl IndexingConfig {
    pub fn resolved_index_dir(&self) -> Result<PathBuf, crate::error::ConfigError> {
        if let Some(ref dir) = self.index_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|p| p.join("studyrag").join("indexes"))
            .ok_or_else(|| {
                crate::error::ConfigError::PathError(
                    "could not determine data directory".to_string(),
                )
            })
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            index_dir: None,
            chunk_max_tokens: default_chunk_max_tokens(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_notes_top_k")]
    pub notes_top_k: u32,

    #[serde(default = "default_mcq_top_k")]
    pub mcq_top_k: u32,

    #[serde(default = "default_explain_top_k")]
    pub explain_top_k: u32,

    /// Upper bound on the characters of concatenated context handed to the
    /// generation provider for MCQs.
    #[serde(default = "default_context_char_budget")]
    pub context_char_budget: u32,

    #[serde(default)]
    pub default_format: OutputFormat,
}

fn default_notes_top_k() -> u32 {
    5
}

fn default_mcq_top_k() -> u32 {
    10
}

fn default_explain_top_k() -> u32 {
    5
}

fn default_context_char_budget() -> u32 {
    6000
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            notes_top_k: default_notes_top_k(),
            mcq_top_k: default_mcq_top_k(),
            explain_top_k: default_explain_top_k(),
            context_char_budget: default_context_char_budget(),
            default_format: OutputFormat::Text,
        }
    }
}
