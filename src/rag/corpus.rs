use std::path::{Path, PathBuf};

/// Ordered, read-only snapshot of the document corpus. A document's identity
/// is its zero-based line position in the corpus file; no other IDs exist.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("failed to read corpus file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corpus file {path} contains no documents")]
    Empty { path: PathBuf },
}

impl Corpus {
    /// Reads a newline-delimited corpus file, one document per line.
    pub async fn load(path: &Path) -> Result<Self, CorpusError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CorpusError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let documents: Vec<String> = contents.lines().map(str::to_string).collect();
        if documents.is_empty() {
            return Err(CorpusError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(Self { documents })
    }

    pub fn from_lines(documents: Vec<String>) -> Self {
        Self { documents }
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.documents.get(position).map(String::as_str)
    }

    pub fn texts(&self) -> &[String] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_assigns_positions_by_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docs.txt");
        tokio::fs::write(&path, "first\nsecond\nthird\n")
            .await
            .unwrap();

        let corpus = Corpus::load(&path).await.unwrap();

        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.get(0), Some("first"));
        assert_eq!(corpus.get(2), Some("third"));
        assert_eq!(corpus.get(3), None);
    }

    #[tokio::test]
    async fn load_rejects_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docs.txt");
        tokio::fs::write(&path, "").await.unwrap();

        let err = Corpus::load(&path).await.unwrap_err();
        assert!(matches!(err, CorpusError::Empty { .. }));
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("does-not-exist.txt");

        let err = Corpus::load(&path).await.unwrap_err();
        assert!(matches!(err, CorpusError::Io { .. }));
    }
}
