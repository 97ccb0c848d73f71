use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Instant;

use crate::cli::options::parse_error_format;
use crate::cli::{Cli, CliError, Command};
use crate::diagnostics::{ColorMode, ErrorFormat, FormatOptions};
use crate::error::{Error, Result};
use crate::lint::{LintOptions, check_program, descriptors};
use crate::logging;
use crate::symbols::{MetadataName, load_program};

mod reporting;

pub const ERROR_FORMAT_ENV: &str = "IMPLCHECK_ERROR_FORMAT";
pub const DIAGNOSTICS_FATAL_ENV: &str = "IMPLCHECK_DIAGNOSTICS_FATAL";

/// Execute a parsed CLI command. Logging and diagnostic formatting are
/// configured here so the binary entrypoint can stay thin.
///
/// # Errors
/// Returns an error when an input cannot be loaded, output cannot be
/// written, or diagnostics are reported while running in fatal mode.
pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_options);
    let stdout = io::stdout();
    let format_options = resolve_format_options(&cli, stdout.is_terminal());
    let mut out = stdout.lock();
    run_to(cli.command, format_options, &mut out)
}

pub fn report_error(err: &Error) {
    reporting::report_error(err);
}

pub(crate) fn run_to(
    command: Command,
    format_options: FormatOptions,
    out: &mut dyn Write,
) -> Result<()> {
    let start = Instant::now();
    let name = command.name();
    tracing::info!(target: "cli", stage = "cli.run.start", command = name);
    let result = match command {
        Command::Check {
            inputs,
            marker,
            jobs,
            fatal,
        } => run_check(&inputs, marker.as_deref(), jobs, fatal, format_options, out),
        Command::Rules => run_rules(out),
        Command::Help { topic } => run_help(topic.as_deref(), out),
        Command::Version => {
            writeln!(out, "implcheck {}", env!("CARGO_PKG_VERSION")).map_err(Error::from)
        }
    };
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(()) => tracing::info!(
            target: "cli",
            stage = "cli.run.complete",
            command = name,
            status = "ok",
            elapsed_ms
        ),
        Err(err) => tracing::info!(
            target: "cli",
            stage = "cli.run.complete",
            command = name,
            status = "error",
            error = %err,
            elapsed_ms
        ),
    }
    result
}

fn resolve_format_options(cli: &Cli, is_terminal: bool) -> FormatOptions {
    let env_format = std::env::var(ERROR_FORMAT_ENV)
        .ok()
        .and_then(|value| parse_error_format(&value).ok());
    let default_format = env_format.unwrap_or(if is_terminal {
        ErrorFormat::Human
    } else {
        ErrorFormat::Short
    });
    let default_color = if std::env::var_os("NO_COLOR").is_some() {
        ColorMode::Never
    } else {
        ColorMode::Auto
    };
    FormatOptions {
        format: cli.error_format.unwrap_or(default_format),
        color: cli.color.unwrap_or(default_color),
        is_terminal,
    }
}

fn run_check(
    inputs: &[PathBuf],
    marker: Option<&str>,
    jobs: Option<usize>,
    fatal: bool,
    format_options: FormatOptions,
    out: &mut dyn Write,
) -> Result<()> {
    let mut options = LintOptions::default();
    if let Some(marker) = marker {
        options = options.with_marker(MetadataName::parse(marker));
    }
    if let Some(jobs) = jobs {
        options = options.with_parallelism(jobs);
    }

    let mut diagnostics = 0;
    let mut types = 0;
    for input in inputs {
        let program = load_program(input)?;
        let report = check_program(&program.graph, &options);
        diagnostics += report.diagnostics.len();
        types += report.types_checked;
        reporting::write_diagnostics(&report.diagnostics, &program.files, format_options, out)?;
    }

    if !matches!(format_options.format, ErrorFormat::Json) {
        if diagnostics == 0 {
            writeln!(
                out,
                "check passed for {} ({types} {} checked)",
                format_input_list(inputs),
                plural(types, "type", "types")
            )?;
        } else {
            writeln!(
                out,
                "check completed with {diagnostics} {}",
                plural(diagnostics, "diagnostic", "diagnostics")
            )?;
        }
    }
    if diagnostics > 0 && (fatal || diagnostics_are_fatal()) {
        return Err(Error::Cli(CliError::new("diagnostics reported; see above")));
    }
    Ok(())
}

fn run_rules(out: &mut dyn Write) -> Result<()> {
    for descriptor in descriptors() {
        writeln!(
            out,
            "{:8} {:20} {:7} {:7} {}",
            descriptor.code,
            descriptor.name,
            descriptor.category.as_str(),
            descriptor.severity.as_str(),
            descriptor.title
        )?;
    }
    Ok(())
}

fn run_help(topic: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let text = match topic {
        Some(topic) => Cli::help_for(topic)?,
        None => Cli::usage(),
    };
    write!(out, "{text}")?;
    Ok(())
}

fn diagnostics_are_fatal() -> bool {
    std::env::var(DIAGNOSTICS_FATAL_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn format_input_list(inputs: &[PathBuf]) -> String {
    inputs
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
