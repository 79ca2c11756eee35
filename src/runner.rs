// src/runner.rs

use crate::cli::Cli;
use crate::config::ProjectFile;
use crate::env::assemble_env;
use crate::error::{RunError, StreamKind, ValidationError};
use crate::launch::{build_command, spawn, Invocation};
use crate::relay;
use crate::settings::Settings;
use crate::util::{paint, should_use_color, RED};

use anyhow::{Context, Result};
use clap::CommandFactory;
use std::io::Write;
use std::process::{ExitCode, ExitStatus};
use tokio::process::Command;

/// How an invocation ended, before it is turned into an exit code.
#[derive(Debug)]
pub enum Outcome {
    /// No subject given; usage was printed.
    Usage,
    /// Print mode; settings were shown and nothing was launched.
    DryRun,
    /// A setting failed validation; nothing was launched.
    Invalid(ValidationError),
    /// The child ran to completion and both streams were relayed.
    Finished(ExitStatus),
}

impl Outcome {
    /// Interactive runs report bad settings and exit 0. Strict runs exit 2.
    /// A finished child passes its own exit code through (1 when it has none,
    /// e.g. killed by a signal).
    pub fn exit_code(&self, strict: bool) -> u8 {
        match self {
            Outcome::Usage | Outcome::DryRun => 0,
            Outcome::Invalid(_) => {
                if strict {
                    2
                } else {
                    0
                }
            }
            Outcome::Finished(status) => status
                .code()
                .map(|code| u8::try_from(code).unwrap_or(1))
                .unwrap_or(1),
        }
    }
}

/// Entry point from `main.rs`.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let strict = cli.strict;
    let outcome = execute(cli).await?;

    if let Outcome::Invalid(e) = &outcome {
        eprintln!("{}", paint(&e.to_string(), RED, should_use_color()));
    }

    Ok(ExitCode::from(outcome.exit_code(strict)))
}

async fn execute(cli: Cli) -> Result<Outcome> {
    let cwd = std::env::current_dir().context("Unable to resolve the current directory")?;
    let project = ProjectFile::discover(cli.config.as_deref(), &cwd)?;
    let settings = Settings::resolve(cli, project, &cwd);

    tracing::debug!(
        apollo_ip = %settings.apollo_ip,
        cluster = %settings.cluster,
        app_id = %settings.app_id,
        registry = %settings.registry,
        test = settings.test,
        print = settings.print,
        "resolved settings"
    );

    if settings.wants_usage() {
        Cli::command()
            .print_long_help()
            .context("Failed to print usage")?;
        return Ok(Outcome::Usage);
    }

    if let Err(e) = settings.validate() {
        return Ok(Outcome::Invalid(e));
    }

    let invocation = Invocation::from_settings(&settings);
    print!("{}", banner(&settings, &invocation));
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let Some(argv) = invocation.argv(&settings.extra_args) else {
        return Ok(Outcome::DryRun);
    };

    let env = assemble_env(std::env::vars_os(), &settings);
    let cmd = build_command(&settings.toolchain, &argv, env);
    let status = launch_and_relay(cmd, &settings.toolchain).await?;

    if !status.success() {
        tracing::info!(%status, "child exited unsuccessfully");
        if settings.strict {
            return Err(RunError::ChildFailed { status }.into());
        }
        eprintln!(
            "{}",
            paint(&format!("gorun failed with {}", status), RED, should_use_color())
        );
    }

    Ok(Outcome::Finished(status))
}

/// Spawn the child, relay both streams while it runs, then wait for the
/// child and for both relays.
///
/// The relays are always joined before their results are looked at.
pub async fn launch_and_relay(mut cmd: Command, program: &str) -> Result<ExitStatus, RunError> {
    let mut child = spawn(&mut cmd, program)?;

    let stdout_task = child.stdout.take().map(relay::spawn_stdout);
    let stderr_task = child.stderr.take().map(relay::spawn_stderr);

    let status = child.wait().await.map_err(|source| RunError::Wait {
        program: program.to_string(),
        source,
    })?;
    tracing::debug!(%status, "child exited");

    let (stdout, stderr) = tokio::join!(
        relay::join(stdout_task, StreamKind::Stdout),
        relay::join(stderr_task, StreamKind::Stderr),
    );

    let failures: Vec<_> = [stdout, stderr]
        .into_iter()
        .filter_map(Result::err)
        .collect();

    if !failures.is_empty() {
        for failure in &failures {
            tracing::warn!(stream = %failure.stream(), error = %failure, "relay failed");
        }
        return Err(RunError::Capture { failures });
    }

    Ok(status)
}

/// Settings summary printed before anything is launched.
///
/// ```text
/// ------------ gorun -------------
/// APOLLO_IP: apollo.api.test.thingyouwe.com
/// APOLLO_ENV: wb_local
/// APOLLO_APPID: order-service
/// registry=etcd
/// --------------------------------
/// go run main.go
/// ```
pub fn banner(settings: &Settings, invocation: &Invocation) -> String {
    let mut out = String::new();
    out.push_str("------------ gorun -------------\n");
    out.push_str(&format!("APOLLO_IP: {}\n", settings.apollo_ip));
    out.push_str(&format!("APOLLO_ENV: {}\n", settings.cluster));
    out.push_str(&format!("APOLLO_APPID: {}\n", settings.app_id));
    if !matches!(invocation, Invocation::Test { .. }) {
        out.push_str(&format!("registry={}\n", settings.registry));
    }
    out.push_str("--------------------------------\n");

    if let Some(line) = invocation.command_line(&settings.toolchain, &settings.extra_args) {
        out.push_str(&line);
        out.push_str("\n\n");
    }

    out
}
