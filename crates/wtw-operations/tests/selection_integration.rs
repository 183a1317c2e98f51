use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use wtw_baseline::BaselineBuilder;
use wtw_operations::operations::{ImpactResolver, SelectionFilter};
use wtw_operations::providers::{FileDiffSource, SqliteBaseline};

const DIFF: &str = "\
diff --git a/a.py b/a.py
index 3b18e51..a2c4d3f 100644
--- a/a.py
+++ b/a.py
@@ -10,3 +10,3 @@ def compute():
     x = 1
-    y = 2
+    y = 3
     z = 4
";

struct Project {
    dir: TempDir,
    baseline: PathBuf,
}

impl Project {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(dir.path().join("tests")).expect("create tests dir");
        for file in ["a.py", "b.py", "tests/test_a.py", "tests/test_b.py"] {
            fs::write(dir.path().join(file), "").expect("write source file");
        }
        fs::write(dir.path().join("change.diff"), DIFF).expect("write diff");
        let baseline = write_baseline(dir.path());
        Self { dir, baseline }
    }

    fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    fn filter(&self) -> SelectionFilter<FileDiffSource, SqliteBaseline> {
        let baseline = SqliteBaseline::open(&self.baseline, None).expect("open baseline");
        SelectionFilter::active(ImpactResolver::new(
            self.root(),
            FileDiffSource::new(self.root().join("change.diff")),
            baseline,
        ))
    }
}

fn write_baseline(root: &Path) -> PathBuf {
    let path = root.join(".coverage");
    BaselineBuilder::create(&path)
        .expect("create baseline")
        .record_lines(
            "/home/ci/proj/a.py",
            "tests/test_a.py::test_x|call",
            &[9, 10, 11, 12, 13],
        )
        .expect("record test_x")
        .record_lines("/home/ci/proj/b.py", "tests/test_b.py::test_y|call", &[1, 2])
        .expect("record test_y")
        .record_lines("/home/ci/proj/a.py", "", &[11])
        .expect("record empty context");
    path
}

#[test]
fn selects_tests_covering_changed_lines() {
    let project = Project::new();
    let mut filter = project.filter();

    assert!(!filter.should_skip(Path::new("tests/test_a.py")).expect("resolve"));
    assert!(filter.should_skip(Path::new("tests/test_b.py")).expect("resolve"));
    assert!(filter.should_skip(Path::new("b.py")).expect("resolve"));

    let selection = filter
        .select(vec![
            "tests/test_a.py::test_x",
            "tests/test_a.py::test_other",
        ])
        .expect("select");

    assert_eq!(selection.selected, vec!["tests/test_a.py::test_x"]);
    assert_eq!(selection.deselected, vec!["tests/test_a.py::test_other"]);
    assert_eq!(
        filter.status(),
        Some("1 test cover the changed lines (1 deselected) (skipped 2 files)")
    );
}

#[test]
fn impact_lists_changed_and_covering_files() {
    let project = Project::new();
    let mut filter = project.filter();

    let impact = filter.impact().expect("resolve").expect("active filter");

    assert_eq!(
        impact.files_changed.iter().cloned().collect::<Vec<_>>(),
        vec![project.root().join("a.py")]
    );
    assert_eq!(
        impact.context_files.iter().cloned().collect::<Vec<_>>(),
        vec![project.root().join("tests/test_a.py")]
    );
    assert_eq!(
        impact.contexts.iter().cloned().collect::<Vec<_>>(),
        vec!["tests/test_a.py::test_x".to_string()]
    );
}

#[test]
fn repeated_runs_agree() {
    let project = Project::new();

    let first = project
        .filter()
        .impact()
        .expect("resolve")
        .cloned()
        .expect("active filter");
    let second = project
        .filter()
        .impact()
        .expect("resolve")
        .cloned()
        .expect("active filter");

    assert_eq!(first, second);
}
