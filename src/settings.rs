// src/settings.rs

//! Resolved settings for one invocation.
//!
//! Each value is picked from, in order of precedence:
//! - CLI flag (clap already folds the matching environment variable into
//!   the flag value when the flag is absent)
//! - `gorun.yaml`
//! - the built-in default
//!
//! Settings are built once and never mutated afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::Cli;
use crate::config::ProjectFile;
use crate::error::ValidationError;
use crate::util::dir_base_name;

pub const DEFAULT_APOLLO_IP: &str = "apollo.api.test.thingyouwe.com";
pub const DEFAULT_CLUSTER: &str = "wb_local";
pub const DEFAULT_REGISTRY: &str = "etcd";
pub const DEFAULT_ACCESS_KEY: &str = "apollo-access-key";
pub const DEFAULT_TOOLCHAIN: &str = "go";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub apollo_ip: String,
    pub cluster: String,
    pub app_id: String,
    pub key: String,
    pub registry: String,

    pub test: bool,
    pub print: bool,
    pub strict: bool,

    /// Source file (run) or test name pattern (test)
    pub subject: Option<String>,
    pub extra_args: Vec<String>,

    pub toolchain: String,
    pub extra_env: BTreeMap<String, String>,
}

impl Settings {
    /// Merge CLI values, the project file and defaults.
    ///
    /// `cwd` supplies the app id when neither the CLI nor the project file does.
    pub fn resolve(cli: Cli, project: ProjectFile, cwd: &Path) -> Self {
        let app_id = cli
            .app_id
            .or(project.app_id)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| dir_base_name(cwd));

        Self {
            apollo_ip: pick(cli.apollo_ip, project.apollo_ip, DEFAULT_APOLLO_IP),
            cluster: pick(cli.cluster, project.cluster, DEFAULT_CLUSTER),
            app_id,
            key: pick(cli.key, project.key, DEFAULT_ACCESS_KEY),
            registry: pick(cli.registry, project.registry, DEFAULT_REGISTRY),
            test: cli.test,
            print: cli.print,
            strict: cli.strict,
            subject: cli.subject,
            extra_args: cli.args,
            toolchain: pick(cli.toolchain, project.toolchain, DEFAULT_TOOLCHAIN),
            extra_env: project.env,
        }
    }

    /// True when there is nothing to launch and nothing to print.
    pub fn wants_usage(&self) -> bool {
        self.subject.is_none() && !self.print
    }

    /// Check every value the child environment depends on.
    ///
    /// The app id is exempt: it always has the directory name to fall back on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_usable(&self.key) {
            return Err(ValidationError::AccessKey(self.key.clone()));
        }
        if !is_usable(&self.apollo_ip) {
            return Err(ValidationError::ApolloIp(self.apollo_ip.clone()));
        }
        if !is_usable(&self.cluster) {
            return Err(ValidationError::Cluster(self.cluster.clone()));
        }
        if !is_usable(&self.registry) {
            return Err(ValidationError::Registry(self.registry.clone()));
        }
        Ok(())
    }
}

fn pick(flag: Option<String>, file: Option<String>, default: &str) -> String {
    flag.or(file).unwrap_or_else(|| default.to_string())
}

/// A value is unusable when empty or when it is really an unconsumed flag
/// (e.g. `-k -r etcd` leaves the key set to `-r`).
fn is_usable(value: &str) -> bool {
    !value.is_empty() && !value.starts_with('-')
}
