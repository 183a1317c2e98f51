use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wtw_diff::{DiffError, LineChangeSet, PatchSet, parse_patch};

use crate::Result;
use crate::traits::{BaselineSource, DiffSource};

pub struct MockDiffSource {
    patch: Option<PatchSet>,
    loads: Arc<AtomicUsize>,
}

impl MockDiffSource {
    /// # Panics
    ///
    /// Panics if `diff` is not a valid unified diff.
    #[must_use]
    pub fn from_diff(diff: &str) -> Self {
        Self {
            patch: Some(parse_patch(diff).expect("valid diff")),
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            patch: None,
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn load_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.loads)
    }
}

impl DiffSource for MockDiffSource {
    fn load_patch(&self) -> Result<PatchSet> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match &self.patch {
            Some(patch) => Ok(patch.clone()),
            None => Err(DiffError::HunkOutsideFile { line: 1 }.into()),
        }
    }
}

pub struct MockBaseline {
    contexts: Vec<String>,
    queries: Arc<AtomicUsize>,
    staged: Arc<Mutex<Option<LineChangeSet>>>,
}

impl MockBaseline {
    #[must_use]
    pub fn new(contexts: &[&str]) -> Self {
        Self {
            contexts: contexts.iter().map(|context| (*context).to_string()).collect(),
            queries: Arc::new(AtomicUsize::new(0)),
            staged: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn query_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.queries)
    }

    #[must_use]
    pub fn staged(&self) -> Arc<Mutex<Option<LineChangeSet>>> {
        Arc::clone(&self.staged)
    }
}

impl BaselineSource for MockBaseline {
    fn resolve_contexts(&mut self, changes: &LineChangeSet) -> Result<Vec<String>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        *self.staged.lock().expect("lock poisoned") = Some(changes.clone());
        Ok(self.contexts.clone())
    }
}
