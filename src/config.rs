// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};

use crate::util::read_to_string;

/// Project file looked up in the working directory when `--config` is not given.
pub const DEFAULT_PROJECT_FILE: &str = "gorun.yaml";

/// Per-project defaults loaded from `gorun.yaml`.
///
/// Every field is optional. Values here lose to environment variables and
/// CLI flags, and win over the built-in defaults.
///
/// Example:
///
/// apollo_ip: apollo.internal:8080
/// cluster: dev
/// key: my-access-key
/// env:
///   GOFLAGS: -mod=vendor
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    pub apollo_ip: Option<String>,
    pub cluster: Option<String>,
    pub app_id: Option<String>,
    pub key: Option<String>,
    pub registry: Option<String>,

    /// Program to launch instead of `go`
    pub toolchain: Option<String>,

    /// Extra environment variables for the child process
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ProjectFile {
    /// Load and parse a project file from disk.
    ///
    /// An empty file is treated as a file with no settings.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = read_to_string(path)?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse project file {:?}", path))
    }

    /// Find the project file for this invocation.
    ///
    /// An explicit path must exist. The default `gorun.yaml` (resolved
    /// against `cwd`) is optional.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(&cwd.join(path)),
            None => {
                let path = cwd.join(DEFAULT_PROJECT_FILE);
                if path.is_file() {
                    tracing::debug!(path = %path.display(), "loading project file");
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_default_file_yields_empty_settings() {
        let dir = tempfile::tempdir().unwrap();
        let project = ProjectFile::discover(None, dir.path()).unwrap();
        assert_eq!(project, ProjectFile::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProjectFile::discover(Some(Path::new("nope.yaml")), dir.path()).unwrap_err();
        assert!(err.to_string().contains("nope.yaml"), "{err}");
    }

    #[test]
    fn loads_default_file_from_cwd() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_PROJECT_FILE),
            "cluster: dev\nkey: abc\nenv:\n  GOFLAGS: -mod=vendor\n",
        )
        .unwrap();

        let project = ProjectFile::discover(None, dir.path()).unwrap();
        assert_eq!(project.cluster.as_deref(), Some("dev"));
        assert_eq!(project.key.as_deref(), Some("abc"));
        assert_eq!(project.apollo_ip, None);
        assert_eq!(project.env.get("GOFLAGS").map(String::as_str), Some("-mod=vendor"));
    }

    #[test]
    fn empty_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yaml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(ProjectFile::load(&path).unwrap(), ProjectFile::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "clustr: dev\n").unwrap();

        let err = ProjectFile::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("clustr"), "{err:#}");
    }
}
