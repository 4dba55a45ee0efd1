use regex::Regex;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use subsearch_core::{CorpusError, CorpusSource, SubtitleRecord};

/// Table and column names of the subtitle dump.
#[derive(Debug, Clone)]
pub struct SqliteLayout {
    pub table: String,
    pub id_column: String,
    pub name_column: String,
    pub content_column: String,
}

impl Default for SqliteLayout {
    fn default() -> Self {
        Self { table: "zipfiles".into(), id_column: "num".into(), name_column: "name".into(), content_column: "content".into() }
    }
}

impl SqliteLayout {
    fn query(&self) -> Result<String, CorpusError> {
        let ident = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex");
        for name in [&self.table, &self.id_column, &self.name_column, &self.content_column] {
            if !ident.is_match(name) {
                return Err(CorpusError::Query(format!("'{name}' is not a plain SQL identifier")));
            }
        }
        Ok(format!(
            "SELECT {}, {}, {} FROM {} ORDER BY {}",
            self.id_column, self.name_column, self.content_column, self.table, self.id_column
        ))
    }
}

/// Read-only view of a SQLite subtitle database.
pub struct SqliteCorpus {
    path: PathBuf,
    layout: SqliteLayout,
}

impl SqliteCorpus {
    pub fn new<P: AsRef<Path>>(path: P, layout: SqliteLayout) -> Self {
        Self { path: path.as_ref().to_path_buf(), layout }
    }
}

impl CorpusSource for SqliteCorpus {
    fn records(&self) -> Result<Vec<SubtitleRecord>, CorpusError> {
        let sql = self.layout.query()?;
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| CorpusError::Unavailable(format!("{}: {e}", self.path.display())))?;
        let mut stmt = conn.prepare(&sql).map_err(|e| CorpusError::Query(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SubtitleRecord { id: row.get(0)?, name: row.get::<_, Option<String>>(1)?.unwrap_or_default(), raw_content: row.get::<_, Option<Vec<u8>>>(2)?.unwrap_or_default() })
            })
            .map_err(|e| CorpusError::Query(e.to_string()))?;
        let records = rows.collect::<Result<Vec<_>, _>>().map_err(|e| CorpusError::Query(e.to_string()))?;
        tracing::info!(path = %self.path.display(), rows = records.len(), "loaded subtitle rows");
        Ok(records)
    }
}
