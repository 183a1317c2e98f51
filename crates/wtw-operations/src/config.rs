use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use wtw_diff::{DEFAULT_PADDING, Repository};

use crate::Result;
use crate::error::OperationError;

pub const CONFIG_FILE: &str = "wtw.toml";

/// Settings read from `wtw.toml` in the project root.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub padding: Option<i64>,
    pub baseline_prefix: Option<String>,
}

impl FileConfig {
    /// Loads `wtw.toml` from `root`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| {
            OperationError::ConfigRead {
                path: path.clone(),
                source,
            }
        })?;
        let config = toml::from_str(&content).map_err(|source| OperationError::ConfigParse {
            path: path.clone(),
            source: Box::new(source),
        })?;

        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffInput {
    File(PathBuf),
    Git { base: String, head: Option<String> },
}

/// Values given on the command line or through the environment. They take
/// precedence over `wtw.toml`.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub diff: Option<PathBuf>,
    pub git_base: Option<String>,
    pub git_head: Option<String>,
    pub baseline: Option<PathBuf>,
    pub padding: Option<u32>,
    pub baseline_prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WtwConfig {
    root: PathBuf,
    diff: Option<DiffInput>,
    baseline: Option<PathBuf>,
    padding: u32,
    baseline_prefix: Option<String>,
}

impl WtwConfig {
    /// Merges `overrides` over the project's `wtw.toml`.
    ///
    /// A diff file wins over a git base when both are given.
    ///
    /// # Errors
    ///
    /// Returns an error if `wtw.toml` cannot be read or parsed, or holds a
    /// negative padding.
    pub fn resolve(root: PathBuf, overrides: ConfigOverrides) -> Result<Self> {
        let file = FileConfig::load(&root)?;

        let padding = match (overrides.padding, file.padding) {
            (Some(padding), _) => padding,
            (None, Some(value)) => {
                u32::try_from(value).map_err(|_| OperationError::InvalidPadding { value })?
            }
            (None, None) => DEFAULT_PADDING,
        };

        let diff = match (overrides.diff, overrides.git_base) {
            (Some(path), _) => Some(DiffInput::File(path)),
            (None, Some(base)) => Some(DiffInput::Git {
                base,
                head: overrides.git_head,
            }),
            (None, None) => None,
        };

        Ok(Self {
            root,
            diff,
            baseline: overrides.baseline,
            padding,
            baseline_prefix: overrides.baseline_prefix.or(file.baseline_prefix),
        })
    }

    /// Selection runs only when both a diff and a baseline were supplied.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.diff.is_some() && self.baseline.is_some()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn diff(&self) -> Option<&DiffInput> {
        self.diff.as_ref()
    }

    #[must_use]
    pub fn baseline(&self) -> Option<&Path> {
        self.baseline.as_deref()
    }

    #[must_use]
    pub fn padding(&self) -> u32 {
        self.padding
    }

    #[must_use]
    pub fn baseline_prefix(&self) -> Option<&str> {
        self.baseline_prefix.as_deref()
    }
}

/// The git work tree containing `start`, or `start` itself outside a
/// repository.
#[must_use]
pub fn discover_root(start: &Path) -> PathBuf {
    match Repository::open(start) {
        Ok(repo) => repo.root().to_path_buf(),
        Err(_) => start.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn overrides() -> ConfigOverrides {
        ConfigOverrides {
            diff: Some(PathBuf::from("change.diff")),
            baseline: Some(PathBuf::from(".coverage")),
            ..ConfigOverrides::default()
        }
    }

    #[test]
    fn defaults_without_config_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;

        let config = WtwConfig::resolve(dir.path().to_path_buf(), overrides())?;

        assert!(config.is_active());
        assert_eq!(config.padding(), DEFAULT_PADDING);
        assert_eq!(config.baseline_prefix(), None);
        assert_eq!(
            config.diff(),
            Some(&DiffInput::File(PathBuf::from("change.diff")))
        );
        Ok(())
    }

    #[test]
    fn reads_config_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join(CONFIG_FILE),
            "padding = 3\nbaseline-prefix = \"/ci/checkout/\"\n",
        )?;

        let config = WtwConfig::resolve(dir.path().to_path_buf(), overrides())?;

        assert_eq!(config.padding(), 3);
        assert_eq!(config.baseline_prefix(), Some("/ci/checkout/"));
        Ok(())
    }

    #[test]
    fn overrides_win_over_config_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join(CONFIG_FILE),
            "padding = 3\nbaseline-prefix = \"/ci/checkout/\"\n",
        )?;

        let config = WtwConfig::resolve(
            dir.path().to_path_buf(),
            ConfigOverrides {
                padding: Some(0),
                baseline_prefix: Some("/home/dev/".to_string()),
                ..overrides()
            },
        )?;

        assert_eq!(config.padding(), 0);
        assert_eq!(config.baseline_prefix(), Some("/home/dev/"));
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join(CONFIG_FILE), "padding = 1\nbasline-prefix = \"/x/\"\n")?;

        let err = WtwConfig::resolve(dir.path().to_path_buf(), overrides())
            .expect_err("typo in key");

        assert!(matches!(err, OperationError::ConfigParse { .. }));
        Ok(())
    }

    #[test]
    fn negative_padding_is_invalid() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join(CONFIG_FILE), "padding = -2\n")?;

        let err = WtwConfig::resolve(dir.path().to_path_buf(), overrides())
            .expect_err("negative padding");

        assert!(matches!(err, OperationError::InvalidPadding { value: -2 }));
        Ok(())
    }

    #[test]
    fn inactive_without_baseline_or_diff() -> anyhow::Result<()> {
        let dir = TempDir::new()?;

        let no_baseline = WtwConfig::resolve(
            dir.path().to_path_buf(),
            ConfigOverrides {
                baseline: None,
                ..overrides()
            },
        )?;
        let no_diff = WtwConfig::resolve(
            dir.path().to_path_buf(),
            ConfigOverrides {
                diff: None,
                ..overrides()
            },
        )?;

        assert!(!no_baseline.is_active());
        assert!(!no_diff.is_active());
        Ok(())
    }

    #[test]
    fn git_base_is_a_diff_input() -> anyhow::Result<()> {
        let dir = TempDir::new()?;

        let config = WtwConfig::resolve(
            dir.path().to_path_buf(),
            ConfigOverrides {
                diff: None,
                git_base: Some("main".to_string()),
                ..overrides()
            },
        )?;

        assert!(config.is_active());
        assert_eq!(
            config.diff(),
            Some(&DiffInput::Git {
                base: "main".to_string(),
                head: None
            })
        );
        Ok(())
    }

    #[test]
    fn root_outside_a_repository_is_the_start_dir() -> anyhow::Result<()> {
        let dir = TempDir::new()?;

        assert_eq!(discover_root(dir.path()), dir.path());
        Ok(())
    }
}
