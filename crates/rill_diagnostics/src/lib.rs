//! rill_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Every syntactic or semantic problem found before evaluation is reported as
//! a [`Diagnostic`] into a [`DiagnosticBag`]. Diagnostics are values, never
//! panics: binding keeps going after a report so one submission surfaces as
//! many problems as possible.

use rill_core::text::TextSpan;
use std::fmt;

/// A diagnostic message template with a code.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code, rendered as `RL{code}`.
    pub code: u32,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file the span points into, when the submission came from one.
    pub file: Option<String>,
    pub span: TextSpan,
    pub message_text: String,
    pub code: u32,
}

impl Diagnostic {
    pub fn new(span: TextSpan, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span,
            message_text: format_message(message.message, args),
            code: message.code,
        }
    }

    /// The `RL####` code string shown to users.
    pub fn code_text(&self) -> String {
        format!("RL{:04}", self.code)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}: ", file)?;
        }
        write!(f, "{} error {}: {}", self.span, self.code_text(), self.message_text)
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// An append-only collection of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Realize `message` at `span` and append it.
    pub fn report(&mut self, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) {
        self.add(Diagnostic::new(span, message, args));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn extend_from_slice(&mut self, diagnostics: &[Diagnostic]) {
        self.diagnostics.extend_from_slice(diagnostics);
    }

    /// Attribute every diagnostic reported from index `start` on to `file`.
    pub fn attribute_to(&mut self, start: usize, file: Option<&str>) {
        let Some(file) = file else {
            return;
        };
        for diagnostic in self.diagnostics.iter_mut().skip(start) {
            diagnostic.file = Some(file.to_string());
        }
    }

    /// Sort diagnostics by position, keeping report order for equal starts.
    pub fn sort(&mut self) {
        self.diagnostics
            .sort_by_key(|d| (d.span.start, d.span.length));
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, $msg:expr) => {
            DiagnosticMessage { code: $code, message: $msg }
        };
    }

    // ========================================================================
    // Syntax errors (1000-1099)
    // ========================================================================
    pub const BAD_CHARACTER: DiagnosticMessage = diag!(1001, "Bad character input: '{0}'.");
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1002, "Unterminated string literal.");
    pub const INVALID_NUMBER: DiagnosticMessage = diag!(1003, "The number {0} isn't a valid {1}.");
    pub const UNEXPECTED_TOKEN: DiagnosticMessage = diag!(1004, "Unexpected token <{0}>, expected <{1}>.");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(1005, "Unterminated multi-line comment.");

    // ========================================================================
    // Operators and conversions (2000-2009)
    // ========================================================================
    pub const UNDEFINED_UNARY_OPERATOR: DiagnosticMessage = diag!(2001, "Unary operator '{0}' is not defined for type '{1}'.");
    pub const UNDEFINED_BINARY_OPERATOR: DiagnosticMessage = diag!(2002, "Binary operator '{0}' is not defined for types '{1}' and '{2}'.");
    pub const CANNOT_CONVERT: DiagnosticMessage = diag!(2007, "Cannot convert type '{0}' to '{1}'.");
    pub const CANNOT_CONVERT_IMPLICITLY: DiagnosticMessage = diag!(2008, "Cannot convert type '{0}' to '{1}'. An explicit conversion exists (are you missing a cast?)");

    // ========================================================================
    // Names and declarations (2003-2012)
    // ========================================================================
    pub const PARAMETER_ALREADY_DECLARED: DiagnosticMessage = diag!(2003, "A parameter with the name '{0}' already exists.");
    pub const UNDEFINED_VARIABLE: DiagnosticMessage = diag!(2004, "Variable '{0}' doesn't exist.");
    pub const NOT_A_VARIABLE: DiagnosticMessage = diag!(2005, "'{0}' is not a variable.");
    pub const UNDEFINED_TYPE: DiagnosticMessage = diag!(2006, "Type '{0}' doesn't exist.");
    pub const SYMBOL_ALREADY_DECLARED: DiagnosticMessage = diag!(2009, "'{0}' is already declared.");
    pub const CANNOT_ASSIGN: DiagnosticMessage = diag!(2010, "Variable '{0}' is read-only and cannot be assigned to.");
    pub const UNDEFINED_FUNCTION: DiagnosticMessage = diag!(2011, "Function '{0}' doesn't exist.");
    pub const NOT_A_FUNCTION: DiagnosticMessage = diag!(2012, "'{0}' is not a function.");

    // ========================================================================
    // Calls (2013-2015)
    // ========================================================================
    pub const WRONG_ARGUMENT_COUNT: DiagnosticMessage = diag!(2013, "Function '{0}' requires {1} arguments but was given {2}.");
    pub const WRONG_ARGUMENT_TYPE: DiagnosticMessage = diag!(2014, "Parameter '{0}' of function '{1}' requires a value of type '{2}' but was given a value of type '{3}'.");
    pub const EXPRESSION_MUST_HAVE_VALUE: DiagnosticMessage = diag!(2015, "Expression must have a value.");

    // ========================================================================
    // Control flow (2016-2020)
    // ========================================================================
    pub const INVALID_BREAK_OR_CONTINUE: DiagnosticMessage = diag!(2016, "The keyword '{0}' can only be used inside of loops.");
    pub const INVALID_RETURN: DiagnosticMessage = diag!(2017, "The 'return' keyword can only be used inside of functions.");
    pub const INVALID_RETURN_EXPRESSION: DiagnosticMessage = diag!(2018, "Since the function '{0}' does not return a value the 'return' keyword cannot be followed by an expression.");
    pub const MISSING_RETURN_EXPRESSION: DiagnosticMessage = diag!(2019, "An expression of type '{0}' is expected.");
    pub const ALL_PATHS_MUST_RETURN: DiagnosticMessage = diag!(2020, "Not all code paths return a value.");
}
