use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use super::{Diagnostic, DiagnosticCode, FileCache, Label, LineCol, Severity, SourceFile, Span};

pub const JSON_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorFormat {
    Human,
    Short,
    Json,
}

impl ErrorFormat {
    #[must_use]
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.to_ascii_lowercase().as_str() {
            "human" | "pretty" => Some(Self::Human),
            "short" => Some(Self::Short),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    #[must_use]
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "always" => Some(Self::Always),
            "never" => Some(Self::Never),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    pub format: ErrorFormat,
    pub color: ColorMode,
    pub is_terminal: bool,
}

impl FormatOptions {
    #[must_use]
    pub fn use_color(self) -> bool {
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => self.is_terminal,
        }
    }
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            format: ErrorFormat::Human,
            color: ColorMode::Never,
            is_terminal: false,
        }
    }
}

/// Render diagnostics into one string, one entry per diagnostic.
///
/// JSON output is one object per line so it can be streamed.
#[must_use]
pub fn format_diagnostics(
    diagnostics: &[Diagnostic],
    files: &FileCache,
    options: FormatOptions,
) -> String {
    let use_color = options.use_color();
    let separator = match options.format {
        ErrorFormat::Human => "\n\n",
        ErrorFormat::Short | ErrorFormat::Json => "\n",
    };
    diagnostics
        .iter()
        .map(|diagnostic| match options.format {
            ErrorFormat::Human => render_human(diagnostic, files, use_color),
            ErrorFormat::Short => render_short(diagnostic, files),
            ErrorFormat::Json => render_json(diagnostic, files),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

fn render_human(diagnostic: &Diagnostic, files: &FileCache, color: bool) -> String {
    let mut out = format_header(diagnostic, color);
    out.push('\n');
    let (path, location) = locate_primary(diagnostic, files);
    out.push_str(&format_location_arrow(&path, location.as_ref()));
    let labels = diagnostic
        .primary_label
        .iter()
        .chain(diagnostic.secondary_labels.iter());
    for label in labels {
        out.push_str(&render_snippet(label, diagnostic.severity, files, color));
    }
    for note in &diagnostic.notes {
        out.push_str(&format!("\n   = note: {note}"));
    }
    out
}

fn render_short(diagnostic: &Diagnostic, files: &FileCache) -> String {
    let (path, location) = locate_primary(diagnostic, files);
    let (line, column) = location.map_or_else(
        || ("?".to_string(), "?".to_string()),
        |loc| (loc.line.to_string(), loc.column.to_string()),
    );
    format!(
        "{path}:{line}:{column}: {}[{}]: {}",
        diagnostic.severity.as_str(),
        diagnostic.code_str(),
        diagnostic.message
    )
}

fn render_json(diagnostic: &Diagnostic, files: &FileCache) -> String {
    let labels = diagnostic
        .primary_label
        .iter()
        .chain(diagnostic.secondary_labels.iter())
        .map(|label| JsonLabel::from_label(label, files))
        .collect();
    let payload = JsonDiagnostic {
        version: JSON_SCHEMA_VERSION,
        severity: diagnostic.severity.as_str(),
        code: diagnostic.code.as_ref(),
        message: &diagnostic.message,
        primary_span: diagnostic
            .primary_label
            .as_ref()
            .and_then(|label| JsonSpan::from_span(label.span, files)),
        labels,
        notes: &diagnostic.notes,
    };
    serde_json::to_string(&payload).unwrap_or_else(|_| "{}".into())
}

fn format_header(diagnostic: &Diagnostic, color: bool) -> String {
    let severity = diagnostic.severity.as_str();
    let prefix = if color {
        colorize(severity, severity_color(diagnostic.severity))
    } else {
        severity.to_string()
    };
    format!("{prefix}[{}]: {}", diagnostic.code_str(), diagnostic.message)
}

fn format_location_arrow(path: &str, loc: Option<&LineCol>) -> String {
    match loc {
        Some(loc) => format!("  --> {path}:{}:{}\n     |", loc.line, loc.column),
        None => format!("  --> {path}:?:?\n     |"),
    }
}

fn render_snippet(label: &Label, severity: Severity, files: &FileCache, color: bool) -> String {
    let span = label.span;
    let Some(file) = files.get(span.file_id) else {
        return String::new();
    };
    let Some(loc) = file.line_col(span.start) else {
        return String::new();
    };
    let (Some(line), Some((line_start, line_end))) =
        (file.line(loc.line), file.line_bounds(loc.line))
    else {
        return String::new();
    };
    let display_line = line.trim_end_matches(['\n', '\r']);
    let rel_start = (span.start - line_start).min(display_line.len());
    let rel_end = span
        .end
        .min(line_end)
        .saturating_sub(line_start)
        .min(display_line.len());
    let column = grapheme_column(display_line, rel_start);
    let caret_count = grapheme_span_len(display_line, rel_start, rel_end).max(1);
    let marker = if label.is_primary { "^" } else { "-" };
    let carets = marker.repeat(caret_count);
    let carets = if color {
        colorize(&carets, severity_color(severity))
    } else {
        carets
    };
    let caret_line = format!(
        "     | {}{carets} {}",
        " ".repeat(column.saturating_sub(1)),
        label.message
    );
    format!(
        "\n{:>4} | {display_line}\n{}",
        loc.line,
        caret_line.trim_end()
    )
}

fn locate_primary(diagnostic: &Diagnostic, files: &FileCache) -> (String, Option<LineCol>) {
    let Some(span) = diagnostic.span() else {
        return ("<unknown>".into(), None);
    };
    let Some(file) = files.get(span.file_id) else {
        return ("<unknown>".into(), None);
    };
    (file.path.display().to_string(), display_line_col(file, span.start))
}

/// Line and grapheme column of `offset`, as every format reports it.
fn display_line_col(file: &SourceFile, offset: usize) -> Option<LineCol> {
    let loc = file.line_col(offset)?;
    let (line_start, _) = file.line_bounds(loc.line)?;
    let line = file.line(loc.line)?.trim_end_matches(['\n', '\r']);
    let rel_start = (offset - line_start).min(line.len());
    Some(LineCol {
        line: loc.line,
        column: grapheme_column(line, rel_start),
    })
}

/// 1-based column of `byte_offset`, counted in grapheme clusters.
fn grapheme_column(line: &str, byte_offset: usize) -> usize {
    line.grapheme_indices(true)
        .take_while(|(idx, _)| *idx < byte_offset)
        .count()
        + 1
}

fn grapheme_span_len(line: &str, start: usize, end: usize) -> usize {
    line.grapheme_indices(true)
        .filter(|(idx, _)| *idx >= start && *idx < end)
        .count()
}

fn colorize(value: &str, code: &str) -> String {
    format!("\u{1b}[{code}m{value}\u{1b}[0m")
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "1;31",
    }
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    version: &'static str,
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a DiagnosticCode>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_span: Option<JsonSpan>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notes: &'a Vec<String>,
}

#[derive(Serialize)]
struct JsonSpan {
    file: String,
    start: usize,
    end: usize,
    line_start: usize,
    column_start: usize,
}

impl JsonSpan {
    fn from_span(span: Span, files: &FileCache) -> Option<Self> {
        let file = files.get(span.file_id)?;
        let line_col = display_line_col(file, span.start)?;
        Some(Self {
            file: file.path.display().to_string(),
            start: span.start,
            end: span.end,
            line_start: line_col.line,
            column_start: line_col.column,
        })
    }
}

#[derive(Serialize)]
struct JsonLabel {
    message: String,
    span: JsonSpan,
    is_primary: bool,
}

impl JsonLabel {
    fn from_label(label: &Label, files: &FileCache) -> Self {
        Self {
            message: label.message.clone(),
            span: JsonSpan::from_span(label.span, files).unwrap_or(JsonSpan {
                file: "<unknown>".into(),
                start: label.span.start,
                end: label.span.end,
                line_start: 0,
                column_start: 0,
            }),
            is_primary: label.is_primary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use serde_json::Value;

    const SOURCE: &str = "class Program : IDisposable\n{\n    public void Dispose() { }\n}\n";

    fn sample() -> (FileCache, Diagnostic) {
        let mut files = FileCache::default();
        let file_id = files.add_file("Program.cs", SOURCE);
        let start = SOURCE.find("Dispose()").expect("sample declares Dispose");
        let span = Span::in_file(file_id, start, start + "Dispose".len());
        let diagnostic = Diagnostic::error(
            "Program.Dispose missing explicit [Impl<IDisposable>] decorator",
            Some(span),
        )
        .with_primary_label("implements `IDisposable`")
        .with_code(DiagnosticCode::new("EN0000", Some("usage".into())));
        (files, diagnostic)
    }

    fn options(format: ErrorFormat) -> FormatOptions {
        FormatOptions {
            format,
            ..FormatOptions::default()
        }
    }

    #[test]
    fn human_format_renders_snippet_with_carets() {
        let (files, diagnostic) = sample();
        let rendered = format_diagnostics(&[diagnostic], &files, options(ErrorFormat::Human));
        expect![[r#"
            error[EN0000]: Program.Dispose missing explicit [Impl<IDisposable>] decorator
              --> Program.cs:3:17
                 |
               3 |     public void Dispose() { }
                 |                 ^^^^^^^ implements `IDisposable`"#]]
        .assert_eq(&rendered);
    }

    #[test]
    fn short_format_is_single_line() {
        let (files, diagnostic) = sample();
        let rendered = format_diagnostics(&[diagnostic], &files, options(ErrorFormat::Short));
        assert_eq!(
            rendered,
            "Program.cs:3:17: error[EN0000]: Program.Dispose missing explicit [Impl<IDisposable>] decorator"
        );
    }

    #[test]
    fn short_format_without_location_uses_placeholders() {
        let diagnostic = Diagnostic::error("T.X missing explicit [Impl<IA>] decorator", None);
        let rendered = format_diagnostics(
            &[diagnostic],
            &FileCache::default(),
            options(ErrorFormat::Short),
        );
        assert_eq!(
            rendered,
            "<unknown>:?:?: error[UNKNOWN]: T.X missing explicit [Impl<IA>] decorator"
        );
    }

    #[test]
    fn json_format_emits_schema_versioned_payload() {
        let (files, diagnostic) = sample();
        let rendered = format_diagnostics(&[diagnostic], &files, options(ErrorFormat::Json));
        let value: Value = serde_json::from_str(&rendered).expect("valid json diagnostic");
        assert_eq!(value["version"], JSON_SCHEMA_VERSION);
        assert_eq!(value["severity"], "error");
        assert_eq!(value["code"]["code"], "EN0000");
        assert_eq!(value["code"]["category"], "usage");
        assert_eq!(value["primary_span"]["file"], "Program.cs");
        assert_eq!(value["primary_span"]["line_start"], 3);
        assert_eq!(value["labels"].as_array().map(Vec::len), Some(1));
        assert!(value.get("notes").is_none(), "empty notes are skipped");
    }

    #[test]
    fn json_format_writes_one_object_per_line() {
        let (files, diagnostic) = sample();
        let rendered = format_diagnostics(
            &[diagnostic.clone(), diagnostic],
            &files,
            options(ErrorFormat::Json),
        );
        assert_eq!(rendered.lines().count(), 2);
        for line in rendered.lines() {
            serde_json::from_str::<Value>(line).expect("each line is a json object");
        }
    }

    #[test]
    fn every_format_reports_the_same_grapheme_column() {
        let source = "class \u{00E9}t\u{00E9} : IA\n{\n    /* \u{1F1FA}\u{1F1F3} */ public void Run() { }\n}\n";
        let mut files = FileCache::default();
        let file_id = files.add_file("Flag.cs", source);
        let start = source.find("Run()").expect("sample declares Run");
        let diagnostic = Diagnostic::error(
            "T.Run missing explicit [Impl<IA>] decorator",
            Some(Span::in_file(file_id, start, start + 3)),
        )
        .with_primary_label("implements `IA`");

        let short = format_diagnostics(&[diagnostic.clone()], &files, options(ErrorFormat::Short));
        assert!(short.starts_with("Flag.cs:3:25: "), "{short}");

        let human = format_diagnostics(&[diagnostic.clone()], &files, options(ErrorFormat::Human));
        assert!(human.contains("  --> Flag.cs:3:25"), "{human}");

        let json = format_diagnostics(&[diagnostic], &files, options(ErrorFormat::Json));
        let value: Value = serde_json::from_str(&json).expect("valid json diagnostic");
        assert_eq!(value["primary_span"]["line_start"], 3);
        assert_eq!(value["primary_span"]["column_start"], 25);
        assert_eq!(value["labels"][0]["span"]["column_start"], 25);
    }

    #[test]
    fn grapheme_columns_count_clusters_not_bytes() {
        let line = "let flag = \u{1F1FA}\u{1F1F3}; x";
        let flag_start = line.find('\u{1F1FA}').expect("flag present");
        let after = flag_start + "\u{1F1FA}\u{1F1F3}".len();
        assert_eq!(grapheme_column(line, flag_start), 12);
        assert_eq!(grapheme_span_len(line, flag_start, after), 1);
        assert_eq!(grapheme_column(line, after), 13);
    }

    #[test]
    fn color_wraps_severity_and_carets() {
        let (files, diagnostic) = sample();
        let rendered = format_diagnostics(
            &[diagnostic],
            &files,
            FormatOptions {
                format: ErrorFormat::Human,
                color: ColorMode::Always,
                is_terminal: false,
            },
        );
        assert!(rendered.starts_with("\u{1b}[1;31merror\u{1b}[0m[EN0000]"));
        assert!(rendered.contains("\u{1b}[1;31m^^^^^^^\u{1b}[0m"));
    }

    #[test]
    fn parse_helpers_accept_known_spellings() {
        assert_eq!(ErrorFormat::parse("JSON"), Some(ErrorFormat::Json));
        assert_eq!(ErrorFormat::parse("pretty"), Some(ErrorFormat::Human));
        assert_eq!(ErrorFormat::parse("toon"), None);
        assert_eq!(ColorMode::parse("never"), Some(ColorMode::Never));
        assert_eq!(ColorMode::parse("sometimes"), None);
    }
}
