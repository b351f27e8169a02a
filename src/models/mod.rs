mod config;
mod mcq;
mod retrieval;

pub use config::{
    Config, DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_URL, DEFAULT_GENERATION_BASE_URL,
    DEFAULT_GENERATION_MODEL, EmbeddingConfig, GenerationConfig, IndexingConfig, OutputFormat,
    RetrievalConfig,
};
pub use mcq::{AnswerLetter, Mcq, McqPublic};
pub use retrieval::{RetrievedChunk, UnitMap};
