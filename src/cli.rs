// src/cli.rs

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Long flag names that may also be written Go-style with a single dash
/// (`-ip`, `-id`, `-apollo_ip`, ...).
const LONG_FLAGS: &[&str] = &[
    "ip",
    "apollo_ip",
    "cluster",
    "id",
    "app_id",
    "key",
    "registry",
    "test",
    "print",
    "strict",
    "config",
    "toolchain",
    "help",
    "version",
];

/// Run a Go program (or its tests) against an Apollo config service.
///
/// Flags override environment variables, environment variables override
/// `gorun.yaml`, and `gorun.yaml` overrides the built-in defaults.
#[derive(Parser, Debug, Default)]
#[command(
    name = "gorun",
    version,
    override_usage = "gorun [options] <subject> [args...]",
    after_help = "Example: gorun -id gorun main.go"
)]
pub struct Cli {
    /// APOLLO API server URL
    #[arg(
        long = "apollo_ip",
        visible_alias = "ip",
        env = "APOLLO_IP",
        value_name = "URL",
        allow_hyphen_values = true
    )]
    pub apollo_ip: Option<String>,

    /// APOLLO cluster name
    #[arg(
        short = 'c',
        long,
        env = "APOLLO_ENV",
        value_name = "CLUSTER NAME",
        allow_hyphen_values = true
    )]
    pub cluster: Option<String>,

    /// APOLLO app id
    ///
    /// Defaults to the name of the current directory.
    #[arg(
        long = "app_id",
        visible_alias = "id",
        value_name = "APP ID",
        allow_hyphen_values = true
    )]
    pub app_id: Option<String>,

    /// APOLLO access key
    #[arg(short = 'k', long, value_name = "ACCESS KEY", allow_hyphen_values = true)]
    pub key: Option<String>,

    /// Micro service registry
    #[arg(
        short = 'r',
        long,
        env = "MICRO_REGISTRY",
        value_name = "SERVICE REGISTRY",
        allow_hyphen_values = true
    )]
    pub registry: Option<String>,

    /// Run `go test` filtered by <subject> instead of `go run <subject>`
    #[arg(short = 't', long)]
    pub test: bool,

    /// Print the resolved settings and exit without launching anything
    #[arg(long)]
    pub print: bool,

    /// Exit non-zero on invalid settings or a failed child process
    #[arg(long)]
    pub strict: bool,

    /// Project file with default settings and extra environment variables
    ///
    /// Defaults to ./gorun.yaml (ignored when missing).
    #[arg(long, env = "GORUN_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Program to launch instead of `go`
    #[arg(long, env = "GORUN_TOOLCHAIN", value_name = "PROGRAM")]
    pub toolchain: Option<String>,

    /// Go source file to run, or test name pattern with --test
    pub subject: Option<String>,

    /// Arguments forwarded to the child after the subject
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Rewrite Go-style single-dash long flags (`-ip`, `-id=foo`) into the
/// double-dash form clap understands. Everything after `--` is left alone,
/// as are tokens that are not known flag names.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;

    for (idx, arg) in args.into_iter().enumerate() {
        if idx == 0 || passthrough {
            out.push(arg);
            continue;
        }
        if arg == "--" {
            passthrough = true;
            out.push(arg);
            continue;
        }

        let rewritten = arg
            .to_str()
            .filter(|s| is_single_dash_long(s))
            .map(|s| OsString::from(format!("-{s}")));

        out.push(rewritten.unwrap_or(arg));
    }

    out
}

fn is_single_dash_long(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    if rest.starts_with('-') {
        return false;
    }

    let name = rest.split('=').next().unwrap_or(rest);
    name.len() > 1 && LONG_FLAGS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rewrites_go_style_flags() {
        let got = normalize_args(os(&["gorun", "-ip", "10.0.0.1", "-id=svc", "-c", "x", "main.go"]));
        assert_eq!(
            got,
            os(&["gorun", "--ip", "10.0.0.1", "--id=svc", "-c", "x", "main.go"])
        );
    }

    #[test]
    fn leaves_unknown_tokens_and_passthrough_alone() {
        let got = normalize_args(os(&["gorun", "-secret", "main.go", "--", "-ip"]));
        assert_eq!(got, os(&["gorun", "-secret", "main.go", "--", "-ip"]));
    }

    #[test]
    fn parses_short_and_long_aliases() {
        let cli = Cli::try_parse_from(normalize_args(os(&[
            "gorun", "-ip", "10.0.0.1", "-id", "svc", "-k", "secret", "-r", "consul", "-t",
            "TestFoo",
        ])))
        .unwrap();

        assert_eq!(cli.apollo_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(cli.app_id.as_deref(), Some("svc"));
        assert_eq!(cli.key.as_deref(), Some("secret"));
        assert_eq!(cli.registry.as_deref(), Some("consul"));
        assert!(cli.test);
        assert_eq!(cli.subject.as_deref(), Some("TestFoo"));
    }

    #[test]
    fn flag_value_may_look_like_a_flag() {
        let cli = Cli::try_parse_from(os(&["gorun", "-k", "-r", "main.go"])).unwrap();
        assert_eq!(cli.key.as_deref(), Some("-r"));
        assert_eq!(cli.subject.as_deref(), Some("main.go"));
    }

    #[test]
    fn forwards_arguments_after_the_subject() {
        let cli = Cli::try_parse_from(os(&["gorun", "main.go", "--", "--port", "8080"])).unwrap();
        assert_eq!(cli.subject.as_deref(), Some("main.go"));
        assert_eq!(cli.args, vec!["--port".to_string(), "8080".to_string()]);
    }
}
