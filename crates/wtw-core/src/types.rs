use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Separates the file part of a test node id from the rest of the id.
pub const NODE_SEPARATOR: &str = "::";

/// Separates the node id from the phase inside a recorded context.
pub const PHASE_SEPARATOR: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Call,
    Teardown,
}

impl Phase {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "setup" => Some(Self::Setup),
            "call" => Some(Self::Call),
            "teardown" => Some(Self::Teardown),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Call => "call",
            Self::Teardown => "teardown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A context recorded in the baseline: `<node-id>|<phase>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextLabel {
    pub node_id: String,
    pub phase: Option<Phase>,
}

impl ContextLabel {
    #[must_use]
    pub fn new(node_id: impl Into<String>, phase: Phase) -> Self {
        Self {
            node_id: node_id.into(),
            phase: Some(phase),
        }
    }

    /// Splits a raw context on its last `|`.
    ///
    /// A label without a separator is taken as a bare node id. Returns `None`
    /// for the empty context and for labels whose node id is empty.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (node_id, phase) = match raw.rsplit_once(PHASE_SEPARATOR) {
            Some((node_id, phase)) => (node_id, Phase::parse(phase)),
            None => (raw, None),
        };

        if node_id.is_empty() {
            return None;
        }

        Some(Self {
            node_id: node_id.to_owned(),
            phase,
        })
    }

    #[must_use]
    pub fn file_part(&self) -> &str {
        node_file_part(&self.node_id)
    }
}

impl fmt::Display for ContextLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            Some(phase) => write!(f, "{}{PHASE_SEPARATOR}{phase}", self.node_id),
            None => f.write_str(&self.node_id),
        }
    }
}

/// The file a node id belongs to: everything before the first `::`.
///
/// Parametrized ids may repeat `::` inside their brackets, so the first
/// occurrence is the only one guaranteed to end the file path.
#[must_use]
pub fn node_file_part(node_id: &str) -> &str {
    node_id
        .split_once(NODE_SEPARATOR)
        .map_or(node_id, |(file, _)| file)
}

/// Anything the host runner can hand over for selection.
pub trait TestItem {
    fn node_id(&self) -> &str;
}

impl TestItem for String {
    fn node_id(&self) -> &str {
        self
    }
}

impl TestItem for &str {
    fn node_id(&self) -> &str {
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImpactResult {
    pub files_changed: BTreeSet<PathBuf>,
    pub context_files: BTreeSet<PathBuf>,
    pub contexts: BTreeSet<String>,
}

impl ImpactResult {
    #[must_use]
    pub fn touches_file(&self, path: &Path) -> bool {
        self.files_changed.contains(path) || self.context_files.contains(path)
    }

    #[must_use]
    pub fn covers(&self, node_id: &str) -> bool {
        self.contexts.contains(node_id)
    }
}
