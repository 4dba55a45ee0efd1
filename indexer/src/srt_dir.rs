use std::fs;
use std::path::{Path, PathBuf};
use subsearch_core::{CorpusError, CorpusSource, SubtitleRecord};
use walkdir::WalkDir;

/// Every `.srt` file below a directory. Files are numbered from 1 in path order.
pub struct SrtDirCorpus {
    root: PathBuf,
}

impl SrtDirCorpus {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
}

impl CorpusSource for SrtDirCorpus {
    fn records(&self) -> Result<Vec<SubtitleRecord>, CorpusError> {
        if !self.root.is_dir() {
            return Err(CorpusError::Unavailable(format!("{} is not a directory", self.root.display())));
        }
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("srt")))
            .collect();
        files.sort();

        let mut records = Vec::with_capacity(files.len());
        for (i, path) in files.into_iter().enumerate() {
            let raw_content = fs::read(&path).map_err(|e| CorpusError::Query(format!("{}: {e}", path.display())))?;
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            records.push(SubtitleRecord { id: i as i64 + 1, name, raw_content });
        }
        tracing::info!(root = %self.root.display(), files = records.len(), "loaded subtitle files");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn picks_up_nested_srt_files_only() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("season1")).unwrap();
        fs::write(dir.path().join("season1/e02.srt"), "two").unwrap();
        fs::write(dir.path().join("season1/e01.SRT"), "one").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip me").unwrap();
        let records = SrtDirCorpus::new(dir.path()).records().unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["e01.SRT", "e02.srt"]);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[1].raw_content, b"two");
    }
}
