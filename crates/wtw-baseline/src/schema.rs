use std::collections::BTreeSet;

use rusqlite::Connection;

const REQUIRED_TABLES: [&str; 2] = ["file", "context"];

/// How a baseline records which lines ran under which context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LineLayout {
    /// `line_bits(file_id, context_id, numbits)`: one linemask per file and context.
    Bits,
    /// `line(file_id, context_id, lineno)`: one row per executed line.
    Lines,
    /// `arc(file_id, context_id, fromno, tono)`: branch coverage arcs.
    Arcs,
}

impl LineLayout {
    pub const ALL: [Self; 3] = [Self::Bits, Self::Lines, Self::Arcs];

    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::Bits => "line_bits",
            Self::Lines => "line",
            Self::Arcs => "arc",
        }
    }

    /// Joins staged masks to the layout's rows and on to `context c`.
    fn join_clause(self) -> &'static str {
        match self {
            Self::Bits => {
                "JOIN line_bits lb ON lb.file_id = f.id \
                     AND any_intersection(dl.linemask, lb.numbits) \
                 JOIN context c ON c.id = lb.context_id"
            }
            Self::Lines => {
                "JOIN line l ON l.file_id = f.id \
                     AND linemask_contains(dl.linemask, l.lineno) \
                 JOIN context c ON c.id = l.context_id"
            }
            Self::Arcs => {
                "JOIN arc a ON a.file_id = f.id \
                     AND (linemask_contains(dl.linemask, a.fromno) \
                          OR linemask_contains(dl.linemask, a.tono)) \
                 JOIN context c ON c.id = a.context_id"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    layouts: Vec<LineLayout>,
}

impl Schema {
    /// Checks the table names of a baseline.
    ///
    /// # Errors
    ///
    /// Returns the names of the missing tables if `file` or `context` is
    /// absent, or if no line layout table exists.
    pub fn detect(tables: &BTreeSet<String>) -> Result<Self, Vec<String>> {
        let mut missing: Vec<String> = REQUIRED_TABLES
            .iter()
            .filter(|name| !tables.contains(**name))
            .map(|name| (*name).to_string())
            .collect();

        let layouts: Vec<LineLayout> = LineLayout::ALL
            .into_iter()
            .filter(|layout| tables.contains(layout.table()))
            .collect();

        if layouts.is_empty() {
            missing.push("line_bits (or line, arc)".to_string());
        }

        if missing.is_empty() {
            Ok(Self { layouts })
        } else {
            Err(missing)
        }
    }

    #[must_use]
    pub fn layouts(&self) -> &[LineLayout] {
        &self.layouts
    }

    /// Distinct non-empty contexts whose recorded lines intersect a staged
    /// mask. `?1` is the prefix that turns a staged path into a baseline path.
    pub(crate) fn matching_contexts_sql(&self) -> String {
        let selects: Vec<String> = self
            .layouts
            .iter()
            .map(|layout| {
                format!(
                    "SELECT c.context AS context \
                     FROM {staging} dl \
                     JOIN file f ON ?1 || dl.path = f.path \
                     {join} \
                     WHERE c.context <> ''",
                    staging = crate::STAGING_TABLE,
                    join = layout.join_clause(),
                )
            })
            .collect();

        format!(
            "SELECT DISTINCT context FROM ({}) ORDER BY context",
            selects.join(" UNION ")
        )
    }
}

pub(crate) fn read_tables(conn: &Connection) -> rusqlite::Result<BTreeSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
    let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
    names.collect()
}
