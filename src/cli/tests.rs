use super::*;
use crate::logging::{LogFormat, LogLevel};

fn expect_cli_ok<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    match Cli::parse_from(args.into_iter()) {
        Ok(cli) => cli,
        Err(err) => panic!("expected CLI parse to succeed, found error: {err}"),
    }
}

fn expect_cli_err<I, T>(args: I) -> CliError
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    match Cli::parse_from(args.into_iter()) {
        Ok(cli) => panic!("expected CLI parse to fail, found {:?}", cli.command),
        Err(err) => err,
    }
}

#[test]
fn check_collects_inputs_and_flags() {
    let cli = expect_cli_ok([
        "check",
        "a.yaml",
        "b.json",
        "--marker",
        "Acme.ImplementsAttribute`2",
        "--jobs=3",
        "--fatal",
        "--error-format",
        "json",
        "--color",
        "always",
        "--log-level",
        "debug",
        "--log-format=json",
    ]);
    assert_eq!(
        cli.command,
        Command::Check {
            inputs: vec![PathBuf::from("a.yaml"), PathBuf::from("b.json")],
            marker: Some("Acme.ImplementsAttribute`2".into()),
            jobs: Some(3),
            fatal: true,
        }
    );
    assert_eq!(cli.error_format, Some(ErrorFormat::Json));
    assert_eq!(cli.color, Some(ColorMode::Always));
    assert_eq!(cli.log_options.level, LogLevel::Debug);
    assert_eq!(cli.log_options.format, LogFormat::Json);
}

#[test]
fn check_defaults_leave_options_unset() {
    let cli = expect_cli_ok(["check", "program.yaml"]);
    assert_eq!(
        cli.command,
        Command::Check {
            inputs: vec![PathBuf::from("program.yaml")],
            marker: None,
            jobs: None,
            fatal: false,
        }
    );
    assert_eq!(cli.error_format, None);
    assert_eq!(cli.color, None);
}

#[test]
fn check_requires_inputs() {
    let err = expect_cli_err(["check"]);
    assert!(err.to_string().starts_with("check requires at least one <graph> argument"));
    let err = expect_cli_err(["check", "--fatal"]);
    assert!(err.to_string().contains("check requires"));
}

#[test]
fn check_rejects_bad_values() {
    for (args, needle) in [
        (vec!["check", "a.yaml", "--jobs", "0"], "invalid --jobs '0'"),
        (vec!["check", "a.yaml", "--jobs", "many"], "invalid --jobs 'many'"),
        (vec!["check", "a.yaml", "--error-format", "xml"], "invalid --error-format 'xml'"),
        (vec!["check", "a.yaml", "--color", "sometimes"], "invalid --color 'sometimes'"),
        (vec!["check", "a.yaml", "--log-level", "loud"], "invalid --log-level 'loud'"),
        (vec!["check", "a.yaml", "--marker"], "expected value after --marker"),
        (vec!["check", "a.yaml", "--marker", " "], "--marker must not be empty"),
        (vec!["check", "a.yaml", "--fatal=yes"], "--fatal does not take a value"),
        (vec!["check", "a.yaml", "--sarif"], "unsupported option '--sarif' for check"),
        (vec!["check", "a.yaml", "--fatal", "b.yaml"], "inputs must precede options"),
    ] {
        let err = expect_cli_err(args);
        assert!(err.to_string().contains(needle), "{err}");
    }
}

#[test]
fn help_variants_resolve_topics() {
    for args in [vec!["help"], vec!["--help"], vec!["-h"]] {
        assert_eq!(expect_cli_ok(args).command, Command::Help { topic: None });
    }
    assert_eq!(
        expect_cli_ok(["help", "CHECK"]).command,
        Command::Help {
            topic: Some("check".into())
        }
    );
    assert_eq!(
        expect_cli_ok(["check", "--help"]).command,
        Command::Help {
            topic: Some("check".into())
        }
    );
    assert_eq!(
        expect_cli_ok(["check", "a.yaml", "-h"]).command,
        Command::Help {
            topic: Some("check".into())
        }
    );
    assert_eq!(
        expect_cli_ok(["rules", "--help"]).command,
        Command::Help {
            topic: Some("rules".into())
        }
    );
}

#[test]
fn version_and_rules_take_no_arguments() {
    assert_eq!(expect_cli_ok(["--version"]).command, Command::Version);
    assert_eq!(expect_cli_ok(["version"]).command, Command::Version);
    assert_eq!(expect_cli_ok(["rules"]).command, Command::Rules);
    assert!(expect_cli_err(["version", "extra"]).to_string().contains("unsupported option"));
    assert!(expect_cli_err(["rules", "--all"]).to_string().contains("unsupported option"));
}

#[test]
fn unknown_and_missing_commands_include_usage() {
    let err = expect_cli_err(["lint"]);
    let message = err.to_string();
    assert!(message.starts_with("unknown command 'lint'"));
    assert!(message.contains("USAGE:"));
    assert!(expect_cli_err(std::iter::empty::<String>())
        .to_string()
        .starts_with("missing command"));
}

#[test]
fn help_for_unknown_topic_lists_commands() {
    let err = Cli::help_for("frobnicate").expect_err("unknown topic");
    assert!(err.to_string().starts_with(
        "unknown help topic 'frobnicate'; available commands: check, help, rules, version"
    ));
    let text = Cli::help_for("check").expect("check help");
    assert!(text.contains("--marker <name>"));
    assert!(text.contains("EXAMPLES:"));
}
