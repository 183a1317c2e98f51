use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use wtw_core::LineMask;

use crate::error::BaselineError;
use crate::schema::LineLayout;
use crate::Result;

/// Writes small coverage baselines for tests.
///
/// [`BaselineBuilder::create`] lays out the tables a coverage run with
/// dynamic contexts produces (`line_bits` plus `arc`);
/// [`BaselineBuilder::with_layouts`] picks the line tables explicitly.
pub struct BaselineBuilder {
    conn: Connection,
    layouts: Vec<LineLayout>,
}

impl BaselineBuilder {
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        Self::with_layouts(path, &[LineLayout::Bits, LineLayout::Arcs])
    }

    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn with_layouts(path: &Path, layouts: &[LineLayout]) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| BaselineError::Connection {
            path: path.to_path_buf(),
            source,
        })?;

        conn.execute_batch(
            "CREATE TABLE meta (key TEXT, value TEXT, UNIQUE (key));
             CREATE TABLE file (id INTEGER PRIMARY KEY, path TEXT, UNIQUE (path));
             CREATE TABLE context (id INTEGER PRIMARY KEY, context TEXT, UNIQUE (context));",
        )?;

        for layout in layouts {
            conn.execute_batch(match layout {
                LineLayout::Bits => {
                    "CREATE TABLE line_bits (
                         file_id INTEGER, context_id INTEGER, numbits BLOB,
                         UNIQUE (file_id, context_id)
                     );"
                }
                LineLayout::Lines => {
                    "CREATE TABLE line (
                         file_id INTEGER, context_id INTEGER, lineno INTEGER,
                         UNIQUE (file_id, context_id, lineno)
                     );"
                }
                LineLayout::Arcs => {
                    "CREATE TABLE arc (
                         file_id INTEGER, context_id INTEGER, fromno INTEGER, tono INTEGER,
                         UNIQUE (file_id, context_id, fromno, tono)
                     );"
                }
            })?;
        }

        Ok(Self {
            conn,
            layouts: layouts.to_vec(),
        })
    }

    /// Opens a baseline written earlier to record more coverage into it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or read.
    pub fn reopen(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| BaselineError::Connection {
            path: path.to_path_buf(),
            source,
        })?;
        let tables = crate::schema::read_tables(&conn)?;
        let layouts = LineLayout::ALL
            .into_iter()
            .filter(|layout| tables.contains(layout.table()))
            .collect();

        Ok(Self { conn, layouts })
    }

    /// Records that `context` executed `lines` of `file`.
    ///
    /// Goes to `line_bits` (merged with any earlier mask) when present,
    /// otherwise to `line`.
    ///
    /// # Errors
    ///
    /// Returns an error if `lines` is empty or the insert fails.
    pub fn record_lines(&mut self, file: &str, context: &str, lines: &[u32]) -> Result<&mut Self> {
        let file_id = self.file_id(file)?;
        let context_id = self.context_id(context)?;

        if self.layouts.contains(&LineLayout::Bits) {
            let existing: Option<Vec<u8>> = self
                .conn
                .query_row(
                    "SELECT numbits FROM line_bits WHERE file_id = ?1 AND context_id = ?2",
                    params![file_id, context_id],
                    |row| row.get(0),
                )
                .optional()?;

            let mut all: BTreeSet<u32> = lines.iter().copied().collect();
            if let Some(bytes) = existing {
                all.extend(LineMask::from_bytes(bytes).lines());
            }
            let mask = LineMask::encode(all).map_err(|source| BaselineError::Encoding {
                path: file.into(),
                source,
            })?;

            self.conn.execute(
                "INSERT OR REPLACE INTO line_bits (file_id, context_id, numbits) VALUES (?1, ?2, ?3)",
                params![file_id, context_id, mask.as_bytes()],
            )?;
        } else if self.layouts.contains(&LineLayout::Lines) {
            for line in lines {
                self.conn.execute(
                    "INSERT OR IGNORE INTO line (file_id, context_id, lineno) VALUES (?1, ?2, ?3)",
                    params![file_id, context_id, line],
                )?;
            }
        }

        Ok(self)
    }

    /// Records branch arcs `(from, to)` that `context` took in `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the baseline has no `arc` table or the insert fails.
    pub fn record_arcs(&mut self, file: &str, context: &str, arcs: &[(i64, i64)]) -> Result<&mut Self> {
        let file_id = self.file_id(file)?;
        let context_id = self.context_id(context)?;

        for (from, to) in arcs {
            self.conn.execute(
                "INSERT OR IGNORE INTO arc (file_id, context_id, fromno, tono) VALUES (?1, ?2, ?3, ?4)",
                params![file_id, context_id, from, to],
            )?;
        }

        Ok(self)
    }

    fn file_id(&self, path: &str) -> Result<i64> {
        self.conn
            .execute("INSERT OR IGNORE INTO file (path) VALUES (?1)", [path])?;
        Ok(self
            .conn
            .query_row("SELECT id FROM file WHERE path = ?1", [path], |row| row.get(0))?)
    }

    fn context_id(&self, context: &str) -> Result<i64> {
        self.conn
            .execute("INSERT OR IGNORE INTO context (context) VALUES (?1)", [context])?;
        Ok(self.conn.query_row(
            "SELECT id FROM context WHERE context = ?1",
            [context],
            |row| row.get(0),
        )?)
    }
}
