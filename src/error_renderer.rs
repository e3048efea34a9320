//! Error rendering using ariadne
//!
//! Compilation and execution errors are printed with the source snippet
//! they refer to, their code and any related locations.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

/// Render an error to stderr.
///
/// # Example
/// ```no_run
/// use ridge::{Engine, render_error};
/// use bumpalo::Bump;
///
/// let arena = Bump::new();
/// let engine = Engine::default();
///
/// if let Err(e) = engine.compile(&arena, "1 + true == 2") {
///     render_error(&e);
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer.
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String (useful for logs and UIs).
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests).
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match (error.diagnostic(), error.source_text()) {
        (Some(diagnostic), Some(source)) => {
            render_diagnostic(source, &diagnostic, writer, use_color)
        }
        _ => writeln!(writer, "{}", error),
    }
}

fn render_diagnostic(
    source: &str,
    diag: &Diagnostic,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    };

    // Runtime errors raised outside any expression have an empty span.
    let span = diag.span.0.start.min(source.len())..diag.span.0.end.min(source.len());

    let mut report = Report::build(kind, ("<script>", span.clone()))
        .with_message(&diag.message)
        .with_config(ariadne::Config::default().with_color(use_color));

    if let Some(code) = &diag.code {
        report = report.with_code(code);
    }

    let color = colors.next();
    report = report.with_label(
        Label::new(("<script>", span))
            .with_message(&diag.message)
            .with_color(color),
    );

    for related in &diag.related {
        let color = colors.next();
        report = report.with_label(
            Label::new(("<script>", related.span.0.clone()))
                .with_message(&related.message)
                .with_color(color),
        );
    }

    if let Some(help) = &diag.help {
        report = report.with_help(help);
    }

    report
        .finish()
        .write(("<script>", Source::from(source)), &mut *writer)
}
