use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("index build failed: {0}")]
    Build(String),

    #[error("index persist failed: {0}")]
    Persist(String),

    #[error("index load failed: {0}")]
    Load(String),

    #[error("index search failed: {0}")]
    Search(String),
}

/// One nearest-neighbor hit. `key` is the corpus position of the matched
/// document; lower `distance` means more similar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub key: usize,
    pub distance: f32,
}

/// On-disk representation. The format is owned entirely by this engine;
/// callers only rely on build -> persist -> load -> search round-tripping.
#[derive(Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    dimension: u64,
    count: u64,
    data: Vec<f32>,
}

#[derive(Debug)]
struct IndexData {
    dimension: usize,
    count: usize,
    /// Row-major, `count * dimension` values; key `i` owns row `i`.
    data: Vec<f32>,
}

/// Exact cosine-distance nearest-neighbor index over a dense, zero-based
/// key space. Built once; mutation after build is not supported.
///
/// The handle owns its storage outright, so dropping it releases the index
/// on every exit path. [`VectorIndex::release`] additionally allows an
/// explicit, idempotent teardown; a released handle fails every search.
#[derive(Debug)]
pub struct VectorIndex {
    inner: Option<IndexData>,
}

impl VectorIndex {
    /// Builds an index assigning key `i` to `vectors[i]`. The dimension is
    /// taken from the first vector and every other vector must match it.
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self, IndexError> {
        let Some(first) = vectors.first() else {
            return Err(IndexError::Build(
                "cannot build an index from an empty vector set".to_string(),
            ));
        };
        let dimension = first.len();
        if dimension == 0 {
            return Err(IndexError::Build(
                "vector dimension must be nonzero".to_string(),
            ));
        }

        // Reserve the full capacity up front; inserts must not reallocate.
        let mut data = Vec::with_capacity(vectors.len() * dimension);
        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dimension {
                return Err(IndexError::Build(format!(
                    "vector at position {position} has dimension {} but the index expects {dimension}",
                    vector.len()
                )));
            }
            data.extend_from_slice(vector);
        }

        Ok(Self {
            inner: Some(IndexData {
                dimension,
                count: vectors.len(),
                data,
            }),
        })
    }

    /// Serializes the index to `path`. The bytes are written to a sibling
    /// temp file and renamed into place, so a partially written index is
    /// never observable at `path`.
    pub async fn persist(&self, path: &Path) -> Result<(), IndexError> {
        let Some(inner) = &self.inner else {
            return Err(IndexError::Persist(
                "index handle has been released".to_string(),
            ));
        };

        let file = IndexFile {
            version: FORMAT_VERSION,
            dimension: inner.dimension as u64,
            count: inner.count as u64,
            data: inner.data.clone(),
        };
        let bytes = bincode::serialize(&file)
            .map_err(|e| IndexError::Persist(format!("encoding index: {e}")))?;

        let tmp_path = temp_sibling(path);
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| IndexError::Persist(format!("writing {}: {e}", tmp_path.display())))?;
        if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(IndexError::Persist(format!(
                "renaming {} to {}: {e}",
                tmp_path.display(),
                path.display()
            )));
        }
        Ok(())
    }

    /// Loads an index previously written by [`VectorIndex::persist`].
    /// `dimension` is the caller's expectation (typically the dimension of
    /// the query embedding) and must match the stored one exactly.
    pub async fn load(path: &Path, dimension: usize) -> Result<Self, IndexError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| IndexError::Load(format!("reading {}: {e}", path.display())))?;
        let file: IndexFile = bincode::deserialize(&bytes)
            .map_err(|e| IndexError::Load(format!("decoding {}: {e}", path.display())))?;

        if file.version != FORMAT_VERSION {
            return Err(IndexError::Load(format!(
                "unsupported index format version {}",
                file.version
            )));
        }
        let stored_dimension = file.dimension as usize;
        let count = file.count as usize;
        if stored_dimension == 0 || count == 0 {
            return Err(IndexError::Load("stored index is empty".to_string()));
        }
        // The header comes from an untrusted file; the multiply must not
        // be allowed to overflow before the consistency check.
        let expected_len = stored_dimension.checked_mul(count).ok_or_else(|| {
            IndexError::Load(format!(
                "stored index header is implausible: {count} vectors of dimension {stored_dimension}"
            ))
        })?;
        if file.data.len() != expected_len {
            return Err(IndexError::Load(format!(
                "stored index is inconsistent: {} values for {count} vectors of dimension {stored_dimension}",
                file.data.len()
            )));
        }
        if stored_dimension != dimension {
            return Err(IndexError::Load(format!(
                "stored dimension {stored_dimension} does not match expected dimension {dimension}"
            )));
        }

        Ok(Self {
            inner: Some(IndexData {
                dimension: stored_dimension,
                count,
                data: file.data,
            }),
        })
    }

    /// Returns up to `k` nearest neighbors, ascending by cosine distance.
    /// The query dimension must equal the index dimension; mismatches fail
    /// rather than truncating or padding.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        let Some(inner) = &self.inner else {
            return Err(IndexError::Search(
                "index handle has been released".to_string(),
            ));
        };
        if k == 0 {
            return Err(IndexError::Search("k must be at least 1".to_string()));
        }
        if query.len() != inner.dimension {
            return Err(IndexError::Search(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                inner.dimension
            )));
        }

        let mut neighbors: Vec<Neighbor> = inner
            .data
            .chunks_exact(inner.dimension)
            .enumerate()
            .map(|(key, vector)| Neighbor {
                key,
                distance: cosine_distance(query, vector),
            })
            .collect();
        neighbors.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        neighbors.truncate(k);
        Ok(neighbors)
    }

    /// Drops the index storage. Idempotent: releasing an already-released
    /// handle is a no-op.
    pub fn release(&mut self) {
        if let Some(inner) = self.inner.take() {
            tracing::debug!(
                dimension = inner.dimension,
                vectors = inner.count,
                "vector index released"
            );
        }
    }

    pub fn is_released(&self) -> bool {
        self.inner.is_none()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.inner.as_ref().map(|inner| inner.dimension)
    }

    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.count)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}
