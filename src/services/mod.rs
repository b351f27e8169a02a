mod chunker;
mod embedding;
mod generation;
mod index_store;
pub mod mcq_parser;
mod pipeline;
mod splitter;

pub use chunker::WordChunker;
pub use embedding::{EmbeddingProvider, HealthResponse, HttpEmbeddingClient};
pub use generation::{ChatCompletionsClient, GenerationProvider};
pub use index_store::{IndexStore, UnitSummary};
pub use mcq_parser::{McqParseError, ParsedMcq, parse_mcq_response};
pub use pipeline::StudyPipeline;
pub use splitter::split_into_units;
