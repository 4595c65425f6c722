//! Rendering diagnostics and errors on stderr.

use miette::{LabeledSpan, NamedSource, Severity, SourceCode};
use rill_diagnostics::Diagnostic;
use std::fmt;
use std::io::IsTerminal;

const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// A diagnostic paired with the text of the submission it points into.
#[derive(Debug)]
struct SourceDiagnostic {
    diagnostic: Diagnostic,
    source: NamedSource<String>,
}

impl fmt::Display for SourceDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.diagnostic.message_text)
    }
}

impl std::error::Error for SourceDiagnostic {}

impl miette::Diagnostic for SourceDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.diagnostic.code_text()))
    }

    fn severity(&self) -> Option<Severity> {
        Some(Severity::Error)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.source)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new_with_span(
            Some(self.diagnostic.message_text.clone()),
            self.diagnostic.span.to_range(),
        );
        Some(Box::new(std::iter::once(label)))
    }
}

/// Print `diagnostics` against `text`, in source order.
pub fn print_diagnostics(name: &str, text: &str, diagnostics: &[Diagnostic]) {
    let mut diagnostics = diagnostics.to_vec();
    diagnostics.sort_by_key(|diagnostic| (diagnostic.span.start, diagnostic.span.length));

    for diagnostic in diagnostics {
        let report = miette::Report::new(SourceDiagnostic {
            diagnostic,
            source: NamedSource::new(name, text.to_string()),
        });
        eprintln!("{:?}", report);
    }
}

/// Print diagnostics that may point into several files, each against the
/// text of the file it was attributed to. `sources` pairs file names with
/// their text; unattributed diagnostics fall back to the first source.
pub fn print_file_diagnostics(sources: &[(String, String)], diagnostics: &[Diagnostic]) {
    for (index, (name, text)) in sources.iter().enumerate() {
        let in_file: Vec<Diagnostic> = diagnostics
            .iter()
            .filter(|diagnostic| match &diagnostic.file {
                Some(file) => file == name,
                None => index == 0,
            })
            .cloned()
            .collect();
        if !in_file.is_empty() {
            print_diagnostics(name, text, &in_file);
        }
    }
}

pub fn print_error(message: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, message);
    } else {
        eprintln!("error: {}", message);
    }
}
