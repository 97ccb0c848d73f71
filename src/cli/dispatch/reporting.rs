use std::io::{self, Write};

use crate::diagnostics::{Diagnostic, FileCache, FormatOptions, format_diagnostics};
use crate::error::Error;

pub(super) fn report_error(err: &Error) {
    let mut out = io::stderr();
    if let Err(io_err) = report_error_to(err, &mut out) {
        let _ = writeln!(io::stderr(), "failed to report error: {io_err}");
    }
}

pub(super) fn report_error_to(err: &Error, out: &mut dyn Write) -> io::Result<()> {
    match err {
        Error::Cli(cli_err) => writeln!(out, "{cli_err}")?,
        _ => writeln!(out, "error: {err}")?,
    }
    Ok(())
}

pub(super) fn write_diagnostics(
    diagnostics: &[Diagnostic],
    files: &FileCache,
    options: FormatOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    let rendered = format_diagnostics(diagnostics, files, options);
    writeln!(out, "{rendered}")?;
    Ok(())
}
