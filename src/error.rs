use crate::source::SourceText;
use crate::symbols::TypeSymbol;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;

/// A range of characters in the source, as a start position and a length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextSpan {
    pub start: usize,
    pub length: usize,
}

impl TextSpan {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    pub fn single(pos: usize) -> Self {
        Self::new(pos, 1)
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Semantic,
    Runtime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: TextSpan,
    pub message: String,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: TextSpan, message: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn runtime_error(span: TextSpan, message: String) -> Self {
        Self::new(DiagnosticKind::Runtime, span, message)
    }

    /// One-line rendering with a 1-based `line:column` prefix.
    pub fn render_plain(&self, source: &SourceText) -> String {
        let (line, column) = source.line_column(self.span.start);
        format!("({}, {}): {}", line + 1, column + 1, self.message)
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<repl>");

        let color = match self.kind {
            DiagnosticKind::Lexical => Color::Red,
            DiagnosticKind::Syntax => Color::Yellow,
            DiagnosticKind::Semantic => Color::Blue,
            DiagnosticKind::Runtime => Color::Magenta,
        };

        let kind_str = match self.kind {
            DiagnosticKind::Lexical => "Lexical Error",
            DiagnosticKind::Syntax => "Syntax Error",
            DiagnosticKind::Semantic => "Semantic Error",
            DiagnosticKind::Runtime => "Runtime Error",
        };

        // ariadne wants a non-empty label range even for synthesized tokens
        let end = self.span.end().max(self.span.start + 1);

        let mut report_builder = Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(format!("{}: {}", kind_str.fg(color), self.message))
            .with_label(
                Label::new((filename, self.span.start..end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        if let Err(error) = report_builder
            .finish()
            .eprint((filename, Source::from(source)))
        {
            tracing::warn!(%error, "failed to render diagnostic");
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

/// Ordered collection of diagnostics for one compilation.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Orders diagnostics by where they start. Ties keep the order they
    /// were reported in, so a lexer diagnostic stays ahead of a parser one
    /// at the same position.
    pub fn sort_by_position(&mut self) {
        self.diagnostics.sort_by_key(|diagnostic| diagnostic.span.start);
    }

    fn report(&mut self, kind: DiagnosticKind, span: TextSpan, message: String) {
        self.diagnostics.push(Diagnostic::new(kind, span, message));
    }

    fn report_with_help(&mut self, kind: DiagnosticKind, span: TextSpan, message: String, help: &str) {
        self.diagnostics
            .push(Diagnostic::new(kind, span, message).with_help(help));
    }

    // Lexical

    pub fn report_invalid_number(&mut self, span: TextSpan, text: &str) {
        self.report_with_help(
            DiagnosticKind::Lexical,
            span,
            format!("Invalid number: {}", text),
            "Numbers must fit in a signed 64-bit integer.",
        );
    }

    pub fn report_invalid_character(&mut self, position: usize, character: char) {
        self.report(
            DiagnosticKind::Lexical,
            TextSpan::single(position),
            format!("Invalid character: '{}'", character),
        );
    }

    pub fn report_unterminated_string(&mut self, span: TextSpan) {
        self.report_with_help(
            DiagnosticKind::Lexical,
            span,
            "Unterminated string literal".to_string(),
            "Close the string with '\"'. Write '\"\"' for a quote inside a string.",
        );
    }

    // Syntax

    pub fn report_unexpected_token(&mut self, span: TextSpan, actual: &str, expected: &str) {
        self.report(
            DiagnosticKind::Syntax,
            span,
            format!("Unexpected token <{}>, expected <{}>", actual, expected),
        );
    }

    // Semantic

    pub fn report_undefined_unary_operator(&mut self, span: TextSpan, operator: &str, operand: TypeSymbol) {
        self.report(
            DiagnosticKind::Semantic,
            span,
            format!(
                "Unary operator '{}' is not defined for type '{}'",
                operator, operand
            ),
        );
    }

    pub fn report_undefined_binary_operator(
        &mut self,
        span: TextSpan,
        operator: &str,
        left: TypeSymbol,
        right: TypeSymbol,
    ) {
        self.report(
            DiagnosticKind::Semantic,
            span,
            format!(
                "Binary operator '{}' is not defined for types '{}' and '{}'",
                operator, left, right
            ),
        );
    }

    pub fn report_undefined_variable(&mut self, span: TextSpan, name: &str) {
        self.report(
            DiagnosticKind::Semantic,
            span,
            format!("Undefined variable '{}'", name),
        );
    }

    pub fn report_variable_already_declared(&mut self, span: TextSpan, name: &str) {
        self.report(
            DiagnosticKind::Semantic,
            span,
            format!("Variable '{}' is already declared in this scope", name),
        );
    }

    pub fn report_cannot_assign(&mut self, span: TextSpan, name: &str) {
        self.report_with_help(
            DiagnosticKind::Semantic,
            span,
            format!("Variable '{}' is read-only and cannot be assigned to", name),
            "Declare the variable with 'var' instead of 'let' to allow assignment.",
        );
    }

    pub fn report_cannot_convert(&mut self, span: TextSpan, from: TypeSymbol, to: TypeSymbol) {
        self.report(
            DiagnosticKind::Semantic,
            span,
            format!("Cannot convert type '{}' to '{}'", from, to),
        );
    }

    pub fn report_cannot_convert_implicitly(&mut self, span: TextSpan, from: TypeSymbol, to: TypeSymbol) {
        self.report_with_help(
            DiagnosticKind::Semantic,
            span,
            format!("Cannot convert type '{}' to '{}' implicitly", from, to),
            &format!("An explicit conversion exists: write {}(...).", to),
        );
    }

    pub fn report_undefined_type(&mut self, span: TextSpan, name: &str) {
        self.report(
            DiagnosticKind::Semantic,
            span,
            format!("Type '{}' doesn't exist", name),
        );
    }

    pub fn report_undefined_function(&mut self, span: TextSpan, name: &str) {
        self.report_with_help(
            DiagnosticKind::Semantic,
            span,
            format!("Function '{}' doesn't exist", name),
            "The available functions are print(text), read() and parseInt(text).",
        );
    }

    pub fn report_wrong_argument_count(&mut self, span: TextSpan, name: &str, expected: usize, actual: usize) {
        self.report(
            DiagnosticKind::Semantic,
            span,
            format!(
                "Function '{}' requires {} argument(s) but was given {}",
                name, expected, actual
            ),
        );
    }

    pub fn report_wrong_argument_type(
        &mut self,
        span: TextSpan,
        parameter: &str,
        expected: TypeSymbol,
        actual: TypeSymbol,
    ) {
        self.report(
            DiagnosticKind::Semantic,
            span,
            format!(
                "Parameter '{}' requires a value of type '{}' but was given a value of type '{}'",
                parameter, expected, actual
            ),
        );
    }

    pub fn report_expression_must_have_value(&mut self, span: TextSpan) {
        self.report(
            DiagnosticKind::Semantic,
            span,
            "Expression must have a value".to_string(),
        );
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiagnosticBag {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
