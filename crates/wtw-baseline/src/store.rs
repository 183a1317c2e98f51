use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, params};
use tracing::{debug, info};
use wtw_core::LineMask;
use wtw_diff::LineChangeSet;

use crate::error::BaselineError;
use crate::schema::{self, Schema};
use crate::{Result, STAGING_TABLE};

/// Contexts a set of changed lines resolved to, and the prefix that mapped
/// diff paths onto baseline paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub prefix: String,
    pub contexts: Vec<String>,
}

/// An open coverage baseline.
///
/// The connection is owned exclusively for the lifetime of the store. Staging
/// writes the `diff_lines` table into the baseline itself, so the file must be
/// writable.
pub struct BaselineStore {
    conn: Connection,
    path: PathBuf,
    schema: Schema,
}

impl BaselineStore {
    /// Opens an existing baseline and validates its schema.
    ///
    /// # Errors
    ///
    /// Returns [`BaselineError::Connection`] if the file does not exist or is
    /// not a SQLite database, and [`BaselineError::Schema`] if required tables
    /// are missing.
    pub fn open(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;

        let connection_error = |source| BaselineError::Connection {
            path: path.to_path_buf(),
            source,
        };

        let conn = Connection::open_with_flags(path, flags).map_err(connection_error)?;
        // SQLite opens lazily; the first read is what rejects a non-database file.
        let tables = schema::read_tables(&conn).map_err(connection_error)?;

        let schema = Schema::detect(&tables).map_err(|missing| BaselineError::Schema {
            path: path.to_path_buf(),
            missing,
        })?;

        crate::functions::register(&conn).map_err(connection_error)?;

        debug!(
            path = %path.display(),
            layouts = ?schema.layouts(),
            "opened baseline"
        );

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            schema,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Replaces the staging table with one linemask row per changed file.
    ///
    /// Returns the number of rows staged.
    ///
    /// # Errors
    ///
    /// Returns an error if a line set cannot be encoded or the staging
    /// transaction fails. A failed transaction is rolled back.
    pub fn stage(&mut self, changes: &LineChangeSet) -> Result<usize> {
        let mut rows = Vec::with_capacity(changes.len());
        for (path, lines) in changes.iter() {
            if lines.is_empty() {
                continue;
            }
            let mask = LineMask::encode(lines.iter().copied()).map_err(|source| {
                BaselineError::Encoding {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            rows.push((path.to_string_lossy().into_owned(), mask));
        }

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {STAGING_TABLE};
             CREATE TABLE {STAGING_TABLE}(
                 path TEXT NOT NULL,
                 linemask BLOB NOT NULL
             );"
        ))?;
        {
            let mut insert =
                tx.prepare(&format!("INSERT INTO {STAGING_TABLE} (path, linemask) VALUES (?1, ?2)"))?;
            for (path, mask) in &rows {
                insert.execute(params![path, mask.as_bytes()])?;
            }
        }
        tx.commit()?;

        debug!(rows = rows.len(), "staged changed lines");
        Ok(rows.len())
    }

    /// Nearest directory shared by every file recorded in the baseline.
    ///
    /// # Errors
    ///
    /// Returns an error if the `file` table cannot be read.
    pub fn common_prefix(&self) -> Result<String> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT path FROM file")
            .map_err(|source| BaselineError::from_query(&self.path, source))?;
        let paths = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(Iterator::collect::<rusqlite::Result<Vec<String>>>)
            .map_err(|source| BaselineError::from_query(&self.path, source))?;

        Ok(wtw_core::common_prefix(&paths))
    }

    /// Distinct non-empty contexts that executed a staged line, in sorted
    /// order. Staged paths are mapped onto baseline paths by prepending
    /// `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`BaselineError::SchemaMismatch`] if the baseline's tables lack
    /// expected columns, or [`BaselineError::Query`] for other failures.
    pub fn matching_contexts(&mut self, prefix: &str) -> Result<Vec<String>> {
        let sql = self.schema.matching_contexts_sql();
        let path = self.path.clone();
        let query_error = |source| BaselineError::from_query(&path, source);

        let tx = self.conn.transaction().map_err(query_error)?;
        let contexts = {
            let mut stmt = tx.prepare(&sql).map_err(query_error)?;
            stmt.query_map([prefix], |row| row.get::<_, String>(0))
                .and_then(Iterator::collect::<rusqlite::Result<Vec<String>>>)
                .map_err(query_error)?
        };
        tx.commit().map_err(query_error)?;

        Ok(contexts)
    }

    /// Stages `changes` and resolves them to contexts.
    ///
    /// With `prefix_override` the baseline's own paths are not scanned.
    ///
    /// # Errors
    ///
    /// Propagates any error from staging or querying.
    pub fn resolve(
        &mut self,
        changes: &LineChangeSet,
        prefix_override: Option<&str>,
    ) -> Result<Resolution> {
        self.stage(changes)?;

        let prefix = match prefix_override {
            Some(prefix) => prefix.to_string(),
            None => self.common_prefix()?,
        };
        let contexts = self.matching_contexts(&prefix)?;

        info!(
            prefix = %prefix,
            files = changes.len(),
            contexts = contexts.len(),
            "resolved changed lines against baseline"
        );

        Ok(Resolution { prefix, contexts })
    }
}

impl std::fmt::Debug for BaselineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaselineStore")
            .field("path", &self.path)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::limits::Limit;
    use tempfile::TempDir;
    use wtw_diff::{DEFAULT_PADDING, parse_patch};

    use super::*;
    use crate::{BaselineBuilder, LineLayout};

    const PATCH_A: &str = "\
--- a/a.py
+++ b/a.py
@@ -10,3 +10,3 @@
 x = 1
-y = 2
+y = 3
 z = 4
";

    fn changes(patch: &str) -> anyhow::Result<LineChangeSet> {
        Ok(LineChangeSet::from_patch(&parse_patch(patch)?, DEFAULT_PADDING))
    }

    fn baseline(dir: &TempDir) -> anyhow::Result<PathBuf> {
        let path = dir.path().join(".coverage");
        BaselineBuilder::create(&path)?
            .record_lines("/proj/a.py", "tests/test_a.py::test_x|call", &[9, 10, 11, 12, 13])?
            .record_lines("/proj/a.py", "tests/test_a.py::test_far|call", &[40, 41])?
            .record_lines("/proj/a.py", "", &[1, 10])?
            .record_lines("/proj/b.py", "tests/test_b.py::test_y|call", &[10])?;
        Ok(path)
    }

    #[test]
    fn missing_file_is_a_connection_error() {
        let dir = TempDir::new().expect("tempdir");

        let err = BaselineStore::open(&dir.path().join("absent.db")).expect_err("no file");

        assert!(matches!(err, BaselineError::Connection { .. }));
    }

    #[test]
    fn non_database_file_is_a_connection_error() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "this is plainly not a sqlite database, just some text\n".repeat(20))?;

        let err = BaselineStore::open(&path).expect_err("not a database");

        assert!(matches!(err, BaselineError::Connection { .. }));
        Ok(())
    }

    #[test]
    fn missing_tables_are_a_schema_error() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("empty.db");
        Connection::open(&path)?.execute_batch("CREATE TABLE file (id INTEGER, path TEXT);")?;

        let err = BaselineStore::open(&path).expect_err("schema incomplete");

        let BaselineError::Schema { missing, .. } = err else {
            panic!("expected schema error, got {err:?}");
        };
        assert!(missing.contains(&"context".to_string()));
        Ok(())
    }

    #[test]
    fn resolves_contexts_overlapping_changed_lines() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let mut store = BaselineStore::open(&baseline(&dir)?)?;

        let resolution = store.resolve(&changes(PATCH_A)?, None)?;

        assert_eq!(resolution.prefix, "/proj/");
        assert_eq!(resolution.contexts, vec!["tests/test_a.py::test_x|call"]);
        Ok(())
    }

    #[test]
    fn empty_context_is_never_returned() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let mut store = BaselineStore::open(&baseline(&dir)?)?;

        let resolution = store.resolve(&changes(PATCH_A)?, None)?;

        assert!(resolution.contexts.iter().all(|context| !context.is_empty()));
        Ok(())
    }

    #[test]
    fn staging_is_idempotent() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let mut store = BaselineStore::open(&baseline(&dir)?)?;
        let changes = changes(PATCH_A)?;

        assert_eq!(store.stage(&changes)?, 1);
        assert_eq!(store.stage(&changes)?, 1);

        let staged: i64 =
            store
                .conn
                .query_row("SELECT COUNT(*) FROM diff_lines", [], |row| row.get(0))?;
        assert_eq!(staged, 1);
        Ok(())
    }

    fn staged_paths(store: &BaselineStore) -> anyhow::Result<Vec<String>> {
        let mut stmt = store.conn.prepare("SELECT path FROM diff_lines ORDER BY path")?;
        let paths = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(paths)
    }

    fn staging_table_exists(store: &BaselineStore) -> anyhow::Result<bool> {
        let count: i64 = store.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'diff_lines'",
            [],
            |row| row.get(0),
        )?;
        Ok(count == 1)
    }

    #[test]
    fn failed_insert_rolls_back_the_whole_stage() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let mut store = BaselineStore::open(&baseline(&dir)?)?;
        // b.py stages a one-byte mask; a.py near line 9000 needs over 1 KiB
        let oversized = changes(
            "--- a/b.py\n+++ b/b.py\n@@ -2 +2 @@\n-x\n+y\n\
             --- a/a.py\n+++ b/a.py\n@@ -9000 +9000 @@\n-x\n+y\n",
        )?;
        let _previous = store.conn.set_limit(Limit::SQLITE_LIMIT_LENGTH, 512);

        store
            .stage(&oversized)
            .expect_err("second row exceeds the length limit");
        assert!(!staging_table_exists(&store)?);

        store.stage(&changes(PATCH_A)?)?;
        store
            .stage(&oversized)
            .expect_err("second row exceeds the length limit");
        assert_eq!(staged_paths(&store)?, vec!["a.py".to_string()]);
        Ok(())
    }

    #[test]
    fn staging_survives_reopening() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = baseline(&dir)?;
        let changes = changes(PATCH_A)?;

        let first = BaselineStore::open(&path)?.resolve(&changes, None)?;
        let second = BaselineStore::open(&path)?.resolve(&changes, None)?;

        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn prefix_override_skips_reconciliation() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let mut store = BaselineStore::open(&baseline(&dir)?)?;

        let wrong = store.resolve(&changes(PATCH_A)?, Some("/elsewhere/"))?;
        let right = store.resolve(&changes(PATCH_A)?, Some("/proj/"))?;

        assert!(wrong.contexts.is_empty());
        assert_eq!(right.contexts, vec!["tests/test_a.py::test_x|call"]);
        Ok(())
    }

    #[test]
    fn legacy_line_table_resolves() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("legacy.db");
        BaselineBuilder::with_layouts(&path, &[LineLayout::Lines])?
            .record_lines("/proj/a.py", "tests/test_a.py::test_x|call", &[12])?
            .record_lines("/proj/a.py", "tests/test_a.py::test_y|call", &[30])?;
        let mut store = BaselineStore::open(&path)?;

        let resolution = store.resolve(&changes(PATCH_A)?, None)?;

        assert_eq!(resolution.contexts, vec!["tests/test_a.py::test_x|call"]);
        Ok(())
    }

    #[test]
    fn arcs_match_on_either_end() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("arcs.db");
        BaselineBuilder::with_layouts(&path, &[LineLayout::Arcs])?
            .record_arcs("/proj/a.py", "tests/test_a.py::test_from|call", &[(11, 20)])?
            .record_arcs("/proj/a.py", "tests/test_a.py::test_to|call", &[(-1, 12)])?
            .record_arcs("/proj/a.py", "tests/test_a.py::test_none|call", &[(30, 31)])?;
        let mut store = BaselineStore::open(&path)?;

        let resolution = store.resolve(&changes(PATCH_A)?, None)?;

        assert_eq!(
            resolution.contexts,
            vec![
                "tests/test_a.py::test_from|call",
                "tests/test_a.py::test_to|call"
            ]
        );
        Ok(())
    }

    #[test]
    fn bits_and_arcs_are_combined() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = baseline(&dir)?;
        BaselineBuilder::reopen(&path)?.record_arcs(
            "/proj/a.py",
            "tests/test_a.py::test_branch|call",
            &[(10, 14)],
        )?;
        let mut store = BaselineStore::open(&path)?;

        let resolution = store.resolve(&changes(PATCH_A)?, None)?;

        assert_eq!(
            resolution.contexts,
            vec![
                "tests/test_a.py::test_branch|call",
                "tests/test_a.py::test_x|call"
            ]
        );
        Ok(())
    }

    #[test]
    fn dropped_layout_table_is_a_schema_mismatch() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = baseline(&dir)?;
        let mut store = BaselineStore::open(&path)?;
        store.conn.execute_batch("DROP TABLE line_bits;")?;

        let err = store
            .resolve(&changes(PATCH_A)?, None)
            .expect_err("table vanished");

        assert!(matches!(err, BaselineError::SchemaMismatch { .. }));
        Ok(())
    }

    #[test]
    fn unchanged_diff_matches_nothing() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let mut store = BaselineStore::open(&baseline(&dir)?)?;

        let resolution = store.resolve(&LineChangeSet::default(), None)?;

        assert!(resolution.contexts.is_empty());
        Ok(())
    }
}
