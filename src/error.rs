//! Error types for the study aid pipeline.

use thiserror::Error;

/// Errors related to text chunking.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("invalid chunking configuration: {0}")]
    InvalidConfiguration(String),
}

/// Errors related to embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to connect to embedding server: {0}")]
    ConnectionError(String),

    #[error("embedding server error: {0}")]
    ServerError(String),

    #[error("embedding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding timeout")]
    Timeout,
}

/// Errors related to the per-unit vector index store.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("no chunks to index")]
    EmptyInput,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no index found for unit '{0}'")]
    IndexNotFound(String),

    #[error(
        "index for unit '{unit}' was built with embedding model '{found}', expected '{expected}'"
    )]
    StaleModel {
        unit: String,
        expected: String,
        found: String,
    },

    #[error("index artifacts for unit '{0}' are inconsistent")]
    Corrupt(String),

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),
}

/// Errors related to the text-generation provider.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation API key not set: {0}")]
    MissingCredential(String),

    #[error("failed to connect to generation provider: {0}")]
    ConnectionError(String),

    #[error("generation request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("generation provider error: {0}")]
    ServerError(String),

    #[error("invalid generation response: {0}")]
    InvalidResponse(String),

    #[error("generation timeout")]
    Timeout,
}

/// Errors surfaced by the retrieval-generation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no context available for unit '{0}'")]
    ContextUnavailable(String),

    #[error("index error: {0}")]
    IndexError(#[from] IndexError),

    #[error("generation error: {0}")]
    GenerationError(#[from] GenerationError),
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("path error: {0}")]
    PathError(String),
}

/// Application-level errors that wrap domain errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("chunking error: {0}")]
    Chunk(#[from] ChunkError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("{0}")]
    Other(String),
}
