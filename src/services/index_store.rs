//! Per-unit flat vector index: build, persist, load, and search.
//!
//! Every ingested unit owns exactly one index. An index is two JSON artifacts
//! on disk, `<key>.index` holding the embedding matrix and `<key>_id2chunk.json`
//! holding the chunk texts, where `key` is the sanitized unit name and a
//! chunk's id is its position in the build order. Loaded units are cached in
//! memory by the store; the store is `&mut self` throughout, so concurrent
//! builds of the same unit must be serialized by the caller.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::IndexError;
use crate::models::RetrievedChunk;
use crate::services::EmbeddingProvider;
use crate::utils::sanitize_unit_key;

const ARTIFACT_SCHEMA_VERSION: u32 = 1;

/// Serialized form of the flat index: all chunk embeddings in id order.
#[derive(Debug, Serialize, Deserialize)]
struct IndexArtifact {
    version: u32,
    /// Embedding model that produced the vectors. A mismatch with the
    /// configured provider rejects the load instead of serving stale
    /// neighbors.
    model: String,
    dimension: usize,
    created_at: String,
    vectors: Vec<Vec<f32>>,
}

/// Serialized chunk-id -> text mapping. Position is identity.
#[derive(Debug, Serialize, Deserialize)]
struct ChunkMapArtifact {
    version: u32,
    unit: String,
    /// SHA-256 over the concatenated chunk texts, for artifact pairing checks.
    checksum: String,
    chunks: Vec<String>,
}

#[derive(Debug, Clone)]
struct LoadedUnit {
    vectors: Vec<Vec<f32>>,
    chunks: Vec<String>,
}

/// Summary of one persisted unit, as listed by [`IndexStore::persisted_units`].
#[derive(Debug, Clone, Serialize)]
pub struct UnitSummary {
    pub unit: String,
    pub chunk_count: usize,
}

/// Owns the per-unit indexes: an embedding provider, the artifact directory,
/// and the in-memory cache of loaded units.
pub struct IndexStore {
    embedder: Arc<dyn EmbeddingProvider>,
    index_dir: PathBuf,
    cache: HashMap<String, LoadedUnit>,
}

impl IndexStore {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index_dir: impl Into<PathBuf>,
    ) -> Result<Self, IndexError> {
        let index_dir = index_dir.into();
        fs::create_dir_all(&index_dir)?;
        Ok(Self {
            embedder,
            index_dir,
            cache: HashMap::new(),
        })
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    fn index_path(&self, key: &str) -> PathBuf {
        self.index_dir.join(format!("{}.index", key))
    }

    fn chunk_map_path(&self, key: &str) -> PathBuf {
        self.index_dir.join(format!("{}_id2chunk.json", key))
    }

    /// Embed `chunks` and persist a fresh index for `unit`, replacing any
    /// previous one. Returns the number of indexed chunks.
    pub async fn build(&mut self, unit: &str, chunks: Vec<String>) -> Result<usize, IndexError> {
        if chunks.is_empty() {
            return Err(IndexError::EmptyInput);
        }

        let vectors = self.embedder.embed(&chunks).await?;
        if vectors.len() != chunks.len() {
            return Err(IndexError::DimensionMismatch {
                expected: chunks.len(),
                got: vectors.len(),
            });
        }
        let dimension = vectors[0].len();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: dimension,
                got: bad.len(),
            });
        }

        let index = IndexArtifact {
            version: ARTIFACT_SCHEMA_VERSION,
            model: self.embedder.model_id().to_string(),
            dimension,
            created_at: chrono::Utc::now().to_rfc3339(),
            vectors,
        };
        let chunk_map = ChunkMapArtifact {
            version: ARTIFACT_SCHEMA_VERSION,
            unit: unit.to_string(),
            checksum: chunk_checksum(&chunks),
            chunks,
        };

        let key = sanitize_unit_key(unit);
        // Temp-then-rename for both artifacts; the mapping lands first and
        // the index last, so a torn pair is a mapping without an index,
        // which `load` treats as not ingested.
        write_atomic(&self.chunk_map_path(&key), &chunk_map)?;
        write_atomic(&self.index_path(&key), &index)?;

        let count = chunk_map.chunks.len();
        self.cache.insert(
            unit.to_string(),
            LoadedUnit {
                vectors: index.vectors,
                chunks: chunk_map.chunks,
            },
        );
        Ok(count)
    }

    /// Load the persisted index for `unit` into the cache.
    pub fn load(&mut self, unit: &str) -> Result<(), IndexError> {
        let key = sanitize_unit_key(unit);
        let index_path = self.index_path(&key);
        let chunk_map_path = self.chunk_map_path(&key);
        if !index_path.exists() || !chunk_map_path.exists() {
            return Err(IndexError::IndexNotFound(unit.to_string()));
        }

        let index: IndexArtifact = serde_json::from_str(&fs::read_to_string(&index_path)?)?;
        let chunk_map: ChunkMapArtifact =
            serde_json::from_str(&fs::read_to_string(&chunk_map_path)?)?;

        if index.model != self.embedder.model_id() {
            return Err(IndexError::StaleModel {
                unit: unit.to_string(),
                expected: self.embedder.model_id().to_string(),
                found: index.model,
            });
        }
        if index.vectors.len() != chunk_map.chunks.len() {
            return Err(IndexError::Corrupt(unit.to_string()));
        }

        self.cache.insert(
            unit.to_string(),
            LoadedUnit {
                vectors: index.vectors,
                chunks: chunk_map.chunks,
            },
        );
        Ok(())
    }

    /// Exact k-nearest-neighbor search over `unit`'s chunks by Euclidean
    /// distance, ascending. Loads the unit on a cache miss. `top_k` is
    /// clamped to the number of stored chunks.
    ///
    /// Distances are true L2 (the square root), not the squared form some
    /// flat indexes report; the ordering is identical.
    pub async fn search(
        &mut self,
        unit: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, IndexError> {
        if top_k == 0 {
            return Err(IndexError::InvalidArgument(
                "top_k must be at least 1".to_string(),
            ));
        }
        if !self.cache.contains_key(unit) {
            self.load(unit)?;
        }

        let query_batch = [query.to_string()];
        let mut query_vectors = self.embedder.embed(&query_batch).await?;
        let query_vector = if query_vectors.len() == 1 {
            query_vectors.remove(0)
        } else {
            return Err(IndexError::DimensionMismatch {
                expected: 1,
                got: query_vectors.len(),
            });
        };

        let loaded = self
            .cache
            .get(unit)
            .ok_or_else(|| IndexError::IndexNotFound(unit.to_string()))?;

        let mut scored: Vec<(usize, f32)> = loaded
            .vectors
            .iter()
            .enumerate()
            .map(|(id, v)| (id, l2_distance(&query_vector, v)))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k.min(loaded.chunks.len()));

        Ok(scored
            .into_iter()
            .map(|(id, distance)| RetrievedChunk {
                text: loaded.chunks[id].clone(),
                distance,
            })
            .collect())
    }

    /// Whether `unit` is currently loaded in memory.
    pub fn is_cached(&self, unit: &str) -> bool {
        self.cache.contains_key(unit)
    }

    /// Drop all loaded units. Persisted artifacts are untouched.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// List every unit with persisted artifacts in the index directory.
    pub fn persisted_units(&self) -> Result<Vec<UnitSummary>, IndexError> {
        let mut units = Vec::new();
        for entry in fs::read_dir(&self.index_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(key) = name.strip_suffix("_id2chunk.json") else {
                continue;
            };
            if !self.index_path(key).exists() {
                // Torn pair from an interrupted build; not servable.
                continue;
            }
            let chunk_map: ChunkMapArtifact =
                serde_json::from_str(&fs::read_to_string(entry.path())?)?;
            units.push(UnitSummary {
                unit: chunk_map.unit,
                chunk_count: chunk_map.chunks.len(),
            });
        }
        units.sort_by(|a, b| a.unit.cmp(&b.unit));
        Ok(units)
    }
}

fn chunk_checksum(chunks: &[String]) -> String {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), IndexError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, serde_json::to_vec(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::error::EmbeddingError;

    /// Deterministic word-bucket embedder: each word hashes into one of 16
    /// buckets, counts normalized by word total. Shared words pull texts
    /// closer in L2, which is all the tests rely on.
    struct FakeEmbedder {
        model: String,
    }

    impl FakeEmbedder {
        fn new() -> Self {
            Self {
                model: "fake-embedder-v1".to_string(),
            }
        }

        fn with_model(model: &str) -> Self {
            Self {
                model: model.to_string(),
            }
        }

        fn embed_one(text: &str) -> Vec<f32> {
            let mut v = vec![0.0f32; 16];
            let words: Vec<&str> = text.split_whitespace().collect();
            for word in &words {
                let mut h: u32 = 2166136261;
                for b in word.to_lowercase().bytes() {
                    h ^= b as u32;
                    h = h.wrapping_mul(16777619);
                }
                v[(h % 16) as usize] += 1.0;
            }
            let n = words.len().max(1) as f32;
            v.iter_mut().for_each(|x| *x /= n);
            v
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|t| Self::embed_one(t)).collect())
        }

        fn model_id(&self) -> &str {
            &self.model
        }
    }

    fn store_in(dir: &Path) -> IndexStore {
        IndexStore::new(Arc::new(FakeEmbedder::new()), dir).unwrap()
    }

    fn animal_chunks() -> Vec<String> {
        vec![
            "Cats are mammals. Cats purr.".to_string(),
            "Dogs are mammals. Dogs bark.".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_build_then_search_orders_by_distance() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.build("UNIT 1", animal_chunks()).await.unwrap();

        let results = store.search("UNIT 1", "mammals", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].distance <= results[1].distance);
    }

    #[tokio::test]
    async fn test_top_k_clamped_to_chunk_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.build("UNIT 1", animal_chunks()).await.unwrap();

        let results = store.search("UNIT 1", "mammals", 50).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_top_k_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.build("UNIT 1", animal_chunks()).await.unwrap();

        assert!(matches!(
            store.search("UNIT 1", "mammals", 0).await,
            Err(IndexError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_chunks_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        assert!(matches!(
            store.build("UNIT 1", Vec::new()).await,
            Err(IndexError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_search_unknown_unit_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        match store.search("UNIT 9", "anything", 3).await {
            Err(IndexError::IndexNotFound(unit)) => assert_eq!(unit, "UNIT 9"),
            other => panic!("expected IndexNotFound, got {:?}", other.map(|r| r.len())),
        }
    }

    #[tokio::test]
    async fn test_round_trip_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.build("UNIT 1", animal_chunks()).await.unwrap();
        let before = store.search("UNIT 1", "purring cats", 2).await.unwrap();

        // Fresh store over the same directory simulates a process restart.
        let mut store = store_in(dir.path());
        assert!(!store.is_cached("UNIT 1"));
        let after = store.search("UNIT 1", "purring cats", 2).await.unwrap();

        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(b.text, a.text);
            assert!((b.distance - a.distance).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_clear_cache_triggers_lazy_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.build("UNIT 1", animal_chunks()).await.unwrap();
        assert!(store.is_cached("UNIT 1"));

        store.clear_cache();
        assert!(!store.is_cached("UNIT 1"));

        let results = store.search("UNIT 1", "dogs", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(store.is_cached("UNIT 1"));
    }

    #[tokio::test]
    async fn test_stale_model_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.build("UNIT 1", animal_chunks()).await.unwrap();

        let mut upgraded = IndexStore::new(
            Arc::new(FakeEmbedder::with_model("fake-embedder-v2")),
            dir.path(),
        )
        .unwrap();
        match upgraded.load("UNIT 1") {
            Err(IndexError::StaleModel {
                expected, found, ..
            }) => {
                assert_eq!(expected, "fake-embedder-v2");
                assert_eq!(found, "fake-embedder-v1");
            }
            other => panic!("expected StaleModel, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rebuild_replaces_unit() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.build("UNIT 1", animal_chunks()).await.unwrap();
        store
            .build("UNIT 1", vec!["Birds are not mammals.".to_string()])
            .await
            .unwrap();

        let results = store.search("UNIT 1", "birds", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "Birds are not mammals.");
    }

    #[tokio::test]
    async fn test_persisted_units_lists_original_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.build("UNIT 1", animal_chunks()).await.unwrap();
        store
            .build("Full Book", vec!["Everything at once.".to_string()])
            .await
            .unwrap();

        let units = store.persisted_units().unwrap();
        let names: Vec<&str> = units.iter().map(|u| u.unit.as_str()).collect();
        assert_eq!(names, vec!["Full Book", "UNIT 1"]);
        assert_eq!(units[1].chunk_count, 2);
    }

    #[test]
    fn test_l2_distance() {
        assert_eq!(l2_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(l2_distance(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
    }
}
