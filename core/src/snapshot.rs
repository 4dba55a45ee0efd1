use crate::index::SimilarityIndex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SNAPSHOT_FORMAT: &str = "subsearch-snapshot";
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("no snapshot at {0}; build one with `subsearch-indexer build`")]
    NotFound(PathBuf),
    #[error("snapshot at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("snapshot at {path} has version {found}, this build reads version {expected}; rebuild it")]
    UnsupportedVersion { path: PathBuf, found: u32, expected: u32 },
    #[error("snapshot i/o error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] bincode::Error),
}

/// Build facts stored next to the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub created_at: String,
    pub corpus_size: usize,
    pub sample_fraction: f64,
    pub seed: Option<u64>,
    pub num_docs: usize,
    pub num_terms: usize,
}

impl SnapshotMeta {
    pub fn for_index(index: &SimilarityIndex, corpus_size: usize, sample_fraction: f64, seed: Option<u64>) -> Self {
        Self {
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default(),
            corpus_size,
            sample_fraction,
            seed,
            num_docs: index.len(),
            num_terms: index.term_model().num_terms(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    format: String,
    version: u32,
    meta: SnapshotMeta,
    payload: Vec<u8>,
}

/// The single on-disk snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    pub path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_err(&self, source: io::Error) -> SnapshotError {
        SnapshotError::Io { path: self.path.clone(), source }
    }

    fn corrupt(&self, reason: impl ToString) -> SnapshotError {
        SnapshotError::Corrupt { path: self.path.clone(), reason: reason.to_string() }
    }

    /// Write to a temp file, then rename over the old snapshot.
    pub fn save(&self, index: &SimilarityIndex, meta: &SnapshotMeta) -> Result<(), SnapshotError> {
        let envelope = Envelope {
            format: SNAPSHOT_FORMAT.to_string(),
            version: SNAPSHOT_VERSION,
            meta: meta.clone(),
            payload: bincode::serialize(index)?,
        };
        let bytes = bincode::serialize(&envelope)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;
        }
        let tmp = self.tmp_path();
        {
            let mut f = File::create(&tmp).map_err(|e| self.io_err(e))?;
            f.write_all(&bytes).map_err(|e| self.io_err(e))?;
            f.sync_all().map_err(|e| self.io_err(e))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        tracing::info!(path = %self.path.display(), bytes = bytes.len(), num_docs = meta.num_docs, "snapshot saved");
        Ok(())
    }

    pub fn load(&self) -> Result<(SimilarityIndex, SnapshotMeta), SnapshotError> {
        let mut f = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(SnapshotError::NotFound(self.path.clone())),
            Err(e) => return Err(self.io_err(e)),
        };
        let mut buf = Vec::new();
        f.read_to_end(&mut buf).map_err(|e| self.io_err(e))?;
        let envelope: Envelope = bincode::deserialize(&buf).map_err(|e| self.corrupt(e))?;
        if envelope.format != SNAPSHOT_FORMAT {
            return Err(self.corrupt(format!("unexpected format tag '{}'", envelope.format)));
        }
        if envelope.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                path: self.path.clone(),
                found: envelope.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let index: SimilarityIndex = bincode::deserialize(&envelope.payload).map_err(|e| self.corrupt(e))?;
        index.check().map_err(|e| self.corrupt(e))?;
        tracing::info!(path = %self.path.display(), num_docs = index.len(), "snapshot loaded");
        Ok((index, envelope.meta))
    }

    pub fn exists(&self) -> bool { self.path.is_file() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::corpus::CleanedDocument;
    use tempfile::tempdir;

    fn tiny_index() -> SimilarityIndex {
        let docs = vec![CleanedDocument { id: 1, name: "one".into(), text: "rust is great".into() }];
        SimilarityIndex::build(docs, &BuildConfig::default())
    }

    fn write_envelope(path: &Path, format: &str, version: u32, payload: Vec<u8>) {
        let idx = tiny_index();
        let meta = SnapshotMeta::for_index(&idx, 1, 1.0, Some(1));
        let env = Envelope { format: format.into(), version, meta, payload };
        fs::write(path, bincode::serialize(&env).unwrap()).unwrap();
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = SnapshotStore::new(dir.path().join("none.snap")).load().unwrap_err();
        assert!(matches!(err, SnapshotError::NotFound(_)));
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.snap");
        fs::write(&path, b"definitely not a snapshot").unwrap();
        let err = SnapshotStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SnapshotError::Corrupt { .. }));
    }

    #[test]
    fn wrong_tag_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tag.snap");
        write_envelope(&path, "something-else", SNAPSHOT_VERSION, bincode::serialize(&tiny_index()).unwrap());
        assert!(matches!(SnapshotStore::new(&path).load(), Err(SnapshotError::Corrupt { .. })));
    }

    #[test]
    fn newer_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("v2.snap");
        write_envelope(&path, SNAPSHOT_FORMAT, SNAPSHOT_VERSION + 1, vec![1, 2, 3]);
        match SnapshotStore::new(&path).load() {
            Err(SnapshotError::UnsupportedVersion { found, expected, .. }) => {
                assert_eq!(found, SNAPSHOT_VERSION + 1);
                assert_eq!(expected, SNAPSHOT_VERSION);
            }
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[test]
    fn bad_payload_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payload.snap");
        write_envelope(&path, SNAPSHOT_FORMAT, SNAPSHOT_VERSION, vec![0xff; 3]);
        assert!(matches!(SnapshotStore::new(&path).load(), Err(SnapshotError::Corrupt { .. })));
    }

    #[test]
    fn save_replaces_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested/index.snap"));
        let idx = tiny_index();
        let meta = SnapshotMeta::for_index(&idx, 5, 0.2, None);
        store.save(&idx, &meta).unwrap();
        store.save(&idx, &meta).unwrap();
        assert!(store.exists());
        assert!(!store.tmp_path().exists());
        let (_, loaded_meta) = store.load().unwrap();
        assert_eq!(loaded_meta, meta);
    }
}
