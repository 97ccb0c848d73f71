use std::path::PathBuf;

use crate::diagnostics::{ColorMode, ErrorFormat};
use crate::logging::{LogFormat, LogLevel, LogSettings};

use super::CliError;

pub(crate) fn is_help_flag(value: &str) -> bool {
    matches!(value, "-h" | "--help")
}

/// Split leading positional inputs from the trailing flags.
pub(crate) fn partition_inputs_and_flags(
    args: Vec<String>,
    missing_message: &str,
) -> Result<(Vec<PathBuf>, Vec<String>), CliError> {
    let mut inputs = Vec::new();
    let mut index = 0;
    while index < args.len() {
        let value = &args[index];
        if value.starts_with('-') {
            break;
        }
        if value.trim().is_empty() {
            return Err(CliError::with_usage("input path must not be empty"));
        }
        inputs.push(PathBuf::from(value));
        index += 1;
    }

    if inputs.is_empty() {
        return Err(CliError::with_usage(missing_message));
    }

    let rest = args.into_iter().skip(index).collect();
    Ok((inputs, rest))
}

/// Flags accepted by `check`.
#[derive(Debug, Default)]
pub(crate) struct CheckFlags {
    pub marker: Option<String>,
    pub jobs: Option<usize>,
    pub fatal: bool,
    pub error_format: Option<ErrorFormat>,
    pub color: Option<ColorMode>,
    pub log_settings: LogSettings,
}

impl CheckFlags {
    pub(crate) fn parse(args: Vec<String>) -> Result<Self, CliError> {
        let mut flags = Self::default();
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg, None),
            };
            let mut value = |name: &str| {
                inline
                    .clone()
                    .or_else(|| iter.next())
                    .ok_or_else(|| CliError::with_usage(format!("expected value after {name}")))
            };
            match flag.as_str() {
                "--marker" => {
                    let marker = value("--marker")?;
                    if marker.trim().is_empty() {
                        return Err(CliError::with_usage("--marker must not be empty"));
                    }
                    flags.marker = Some(marker);
                }
                "-j" | "--jobs" => flags.jobs = Some(parse_jobs(&value("--jobs")?)?),
                "--fatal" => {
                    if inline.is_some() {
                        return Err(CliError::with_usage("--fatal does not take a value"));
                    }
                    flags.fatal = true;
                }
                "--error-format" => {
                    flags.error_format = Some(parse_error_format(&value("--error-format")?)?);
                }
                "--color" => flags.color = Some(parse_color(&value("--color")?)?),
                "--log-format" => {
                    let raw = value("--log-format")?;
                    flags.log_settings.format = Some(LogFormat::parse(&raw).ok_or_else(|| {
                        CliError::with_usage(format!(
                            "invalid --log-format '{raw}'; supported values: auto, text, json"
                        ))
                    })?);
                }
                "--log-level" => {
                    let raw = value("--log-level")?;
                    flags.log_settings.level = Some(LogLevel::parse(&raw).ok_or_else(|| {
                        CliError::with_usage(format!(
                            "invalid --log-level '{raw}'; supported values: off, error, warn, info, debug, trace"
                        ))
                    })?);
                }
                other if other.starts_with('-') => {
                    return Err(CliError::with_usage(format!(
                        "unsupported option '{other}' for check"
                    )));
                }
                other => {
                    return Err(CliError::with_usage(format!(
                        "unexpected argument '{other}'; inputs must precede options"
                    )));
                }
            }
        }
        Ok(flags)
    }
}

pub(crate) fn parse_error_format(spec: &str) -> Result<ErrorFormat, CliError> {
    ErrorFormat::parse(spec.trim()).ok_or_else(|| {
        CliError::with_usage(format!(
            "invalid --error-format '{spec}'; supported values: human, short, json"
        ))
    })
}

pub(crate) fn parse_color(spec: &str) -> Result<ColorMode, CliError> {
    ColorMode::parse(spec.trim()).ok_or_else(|| {
        CliError::with_usage(format!(
            "invalid --color '{spec}'; supported values: auto, always, never"
        ))
    })
}

fn parse_jobs(spec: &str) -> Result<usize, CliError> {
    match spec.trim().parse::<usize>() {
        Ok(jobs) if jobs > 0 => Ok(jobs),
        _ => Err(CliError::with_usage(format!(
            "invalid --jobs '{spec}'; expected a positive integer"
        ))),
    }
}
