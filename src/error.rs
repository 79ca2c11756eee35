// src/error.rs

use std::fmt;
use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// Which child stream a relay is copying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// A setting that failed the non-empty / non-flag-like check.
///
/// The offending value is kept so the message can show what was parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("APOLLO access key is missing or looks like a flag ({0:?}); pass it with -k/--key")]
    AccessKey(String),
    #[error("APOLLO API server URL is missing or looks like a flag ({0:?}); pass it with -ip/--apollo_ip")]
    ApolloIp(String),
    #[error("APOLLO cluster name is missing or looks like a flag ({0:?}); pass it with -c/--cluster")]
    Cluster(String),
    #[error("service registry is missing or looks like a flag ({0:?}); pass it with -r/--registry")]
    Registry(String),
}

/// Failure of one stream relay. Carries everything captured before the failure.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("reading child {stream} failed: {source}")]
    Read {
        stream: StreamKind,
        source: io::Error,
        captured: Vec<u8>,
    },
    #[error("writing {stream} failed: {source}")]
    Write {
        stream: StreamKind,
        source: io::Error,
        captured: Vec<u8>,
    },
    #[error("{stream} relay task aborted: {reason}")]
    Aborted { stream: StreamKind, reason: String },
}

impl RelayError {
    pub fn stream(&self) -> StreamKind {
        match self {
            RelayError::Read { stream, .. }
            | RelayError::Write { stream, .. }
            | RelayError::Aborted { stream, .. } => *stream,
        }
    }
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to launch {program}: {source}")]
    Launch { program: String, source: io::Error },
    #[error("failed while waiting for {program}: {source}")]
    Wait { program: String, source: io::Error },
    #[error("gorun failed with {status}")]
    ChildFailed { status: ExitStatus },
    #[error("failed to capture stdout or stderr ({})", join_failures(.failures))]
    Capture { failures: Vec<RelayError> },
}

fn join_failures(failures: &[RelayError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
