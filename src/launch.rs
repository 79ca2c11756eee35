// src/launch.rs

//! Child command selection and construction.
//!
//! Exactly one child is ever built per invocation: `go test` in test mode,
//! `go run` otherwise. Print mode builds nothing.

use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::env::EnvSet;
use crate::error::RunError;
use crate::settings::Settings;

/// What this invocation launches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// `go test -v -run <pattern>`
    Test { pattern: String },
    /// `go run <file>`
    Run { file: String },
    /// Print the resolved settings only.
    DryRun,
}

impl Invocation {
    /// Test mode wins over print mode; print mode wins over run.
    ///
    /// Without a subject there is nothing to launch, so that case is a dry run.
    pub fn from_settings(settings: &Settings) -> Self {
        match (&settings.subject, settings.test, settings.print) {
            (Some(pattern), true, _) => Invocation::Test {
                pattern: pattern.clone(),
            },
            (Some(file), false, false) => Invocation::Run { file: file.clone() },
            _ => Invocation::DryRun,
        }
    }

    /// Toolchain arguments, with `extra` appended. `None` for a dry run.
    pub fn argv(&self, extra: &[String]) -> Option<Vec<String>> {
        let mut argv = match self {
            Invocation::Test { pattern } => vec![
                "test".to_string(),
                "-v".to_string(),
                "-run".to_string(),
                pattern.clone(),
            ],
            Invocation::Run { file } => vec!["run".to_string(), file.clone()],
            Invocation::DryRun => return None,
        };
        argv.extend(extra.iter().cloned());
        Some(argv)
    }

    /// Human readable command line for the banner.
    pub fn command_line(&self, toolchain: &str, extra: &[String]) -> Option<String> {
        self.argv(extra)
            .map(|argv| format!("{} {}", toolchain, argv.join(" ")))
    }
}

/// Build the child command.
///
/// The environment is replaced wholesale by `env`, not merged into the
/// child's default environment. Output is piped so it can be relayed.
pub fn build_command(program: &str, argv: &[String], env: EnvSet) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(argv)
        .env_clear()
        .envs(env)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

/// Start the child. Failing to start is a launch error, never retried.
pub fn spawn(cmd: &mut Command, program: &str) -> Result<Child, RunError> {
    let child = cmd.spawn().map_err(|source| RunError::Launch {
        program: program.to_string(),
        source,
    })?;

    tracing::info!(program, pid = child.id(), "child started");
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::config::ProjectFile;
    use std::ffi::OsStr;
    use std::path::Path;

    fn settings(cli: Cli) -> Settings {
        Settings::resolve(cli, ProjectFile::default(), Path::new("/tmp/app"))
    }

    #[test]
    fn test_mode_filters_by_subject() {
        let s = settings(Cli {
            test: true,
            subject: Some("Foo".to_string()),
            ..Cli::default()
        });
        let invocation = Invocation::from_settings(&s);

        assert_eq!(
            invocation,
            Invocation::Test {
                pattern: "Foo".to_string()
            }
        );
        assert_eq!(
            invocation.argv(&[]).unwrap(),
            vec!["test", "-v", "-run", "Foo"]
        );
    }

    #[test]
    fn run_mode_runs_the_subject_file() {
        let s = settings(Cli {
            subject: Some("cmd/main.go".to_string()),
            args: vec!["--port".to_string(), "8080".to_string()],
            ..Cli::default()
        });
        let invocation = Invocation::from_settings(&s);

        assert_eq!(
            invocation,
            Invocation::Run {
                file: "cmd/main.go".to_string()
            }
        );
        assert_eq!(
            invocation.command_line(&s.toolchain, &s.extra_args).unwrap(),
            "go run cmd/main.go --port 8080"
        );
    }

    #[test]
    fn print_mode_launches_nothing() {
        let s = settings(Cli {
            print: true,
            subject: Some("main.go".to_string()),
            ..Cli::default()
        });
        let invocation = Invocation::from_settings(&s);

        assert_eq!(invocation, Invocation::DryRun);
        assert_eq!(invocation.argv(&[]), None);
        assert_eq!(invocation.command_line("go", &[]), None);
    }

    #[test]
    fn test_mode_wins_over_print_mode() {
        let s = settings(Cli {
            test: true,
            print: true,
            subject: Some("Foo".to_string()),
            ..Cli::default()
        });
        assert!(matches!(
            Invocation::from_settings(&s),
            Invocation::Test { .. }
        ));
    }

    #[test]
    fn command_uses_exactly_the_assembled_env() {
        let env = vec![("APOLLO_IP".into(), "10.0.0.1".into())];
        let cmd = build_command("go", &["run".to_string(), "main.go".to_string()], env);
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), OsStr::new("go"));
        let args: Vec<&OsStr> = std_cmd.get_args().collect();
        assert_eq!(args, vec![OsStr::new("run"), OsStr::new("main.go")]);

        let envs: Vec<(&OsStr, Option<&OsStr>)> = std_cmd.get_envs().collect();
        assert_eq!(envs, vec![(OsStr::new("APOLLO_IP"), Some(OsStr::new("10.0.0.1")))]);
    }

    #[tokio::test]
    async fn missing_program_is_a_launch_error() {
        let program = "gorun-no-such-toolchain";
        let mut cmd = build_command(program, &[], Vec::new());

        match spawn(&mut cmd, program) {
            Err(RunError::Launch { program: p, source }) => {
                assert_eq!(p, program);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected launch error, got {other:?}"),
        }
    }
}
