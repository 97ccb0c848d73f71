//! CLI front-end: argument parsing and dispatch helpers used by the `implcheck` binary.

mod help;
mod options;

pub mod dispatch;

use std::env;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use crate::diagnostics::{ColorMode, ErrorFormat};
use crate::logging::LogOptions;
use options::{CheckFlags, is_help_flag, partition_inputs_and_flags};

/// Parsed command line.
#[derive(Debug, Clone)]
pub struct Cli {
    pub command: Command,
    pub log_options: LogOptions,
    pub error_format: Option<ErrorFormat>,
    pub color: Option<ColorMode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check one or more symbol-graph documents.
    Check {
        inputs: Vec<PathBuf>,
        /// Marker attribute metadata name overriding the default.
        marker: Option<String>,
        jobs: Option<usize>,
        /// Exit with failure when any diagnostic is reported.
        fatal: bool,
    },
    /// List the rules this checker implements.
    Rules,
    Help {
        topic: Option<String>,
    },
    Version,
}

impl Command {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Command::Check { .. } => "check",
            Command::Rules => "rules",
            Command::Help { .. } => "help",
            Command::Version => "version",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    message: String,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn with_usage(message: impl Into<String>) -> Self {
        let mut owned = message.into();
        owned.push_str("\n\n");
        owned.push_str(&Cli::usage());
        Self::new(owned)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for CliError {}

impl Cli {
    /// Parse arguments from the environment.
    ///
    /// # Errors
    /// Returns a [`CliError`] when the arguments cannot be interpreted as a supported command.
    pub fn parse() -> Result<Self, CliError> {
        Self::parse_from(env::args().skip(1))
    }

    /// Parse arguments from an iterator (useful for testing).
    ///
    /// # Errors
    /// Returns a [`CliError`] when the provided iterator does not describe a valid invocation.
    pub fn parse_from<I, T>(args: I) -> Result<Self, CliError>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut iter = args.map(Into::into);
        let Some(raw_command) = iter.next() else {
            return Err(CliError::with_usage("missing command"));
        };
        let remaining: Vec<String> = iter.collect();

        match raw_command.as_str() {
            "--help" | "-h" | "help" => {
                let topic = remaining
                    .first()
                    .filter(|value| !is_help_flag(value))
                    .map(|value| value.to_ascii_lowercase());
                Ok(Self::simple(Command::Help { topic }))
            }
            "--version" | "-V" | "version" => {
                if remaining.iter().any(|value| is_help_flag(value)) {
                    return Ok(Self::help_topic("version"));
                }
                if let Some(extra) = remaining.first() {
                    return Err(CliError::with_usage(format!(
                        "unsupported option '{extra}' for version"
                    )));
                }
                Ok(Self::simple(Command::Version))
            }
            "rules" => {
                if remaining.iter().any(|value| is_help_flag(value)) {
                    return Ok(Self::help_topic("rules"));
                }
                if let Some(extra) = remaining.first() {
                    return Err(CliError::with_usage(format!(
                        "unsupported option '{extra}' for rules"
                    )));
                }
                Ok(Self::simple(Command::Rules))
            }
            "check" => parse_check(remaining),
            other => Err(CliError::with_usage(format!("unknown command '{other}'"))),
        }
    }

    /// Return formatted general help text.
    #[must_use]
    pub fn usage() -> String {
        help::render_general_help()
    }

    /// Return help text for a specific command.
    ///
    /// # Errors
    /// Returns a [`CliError`] when the requested topic is unknown.
    pub fn help_for(topic: &str) -> Result<String, CliError> {
        help::render_command_help(topic)
            .ok_or_else(|| CliError::with_usage(help::format_unknown_topic(topic)))
    }

    fn simple(command: Command) -> Self {
        Self {
            command,
            log_options: LogOptions::from_env(),
            error_format: None,
            color: None,
        }
    }

    fn help_topic(topic: &str) -> Self {
        Self::simple(Command::Help {
            topic: Some(topic.into()),
        })
    }
}

fn parse_check(args: Vec<String>) -> Result<Cli, CliError> {
    if args.first().is_some_and(|value| is_help_flag(value)) {
        return Ok(Cli::help_topic("check"));
    }
    let (inputs, rest) =
        partition_inputs_and_flags(args, "check requires at least one <graph> argument")?;
    if rest.iter().any(|value| is_help_flag(value)) {
        return Ok(Cli::help_topic("check"));
    }
    let flags = CheckFlags::parse(rest)?;
    Ok(Cli {
        command: Command::Check {
            inputs,
            marker: flags.marker,
            jobs: flags.jobs,
            fatal: flags.fatal,
        },
        log_options: flags.log_settings.merged_with_env(),
        error_format: flags.error_format,
        color: flags.color,
    })
}

#[cfg(test)]
mod tests;
