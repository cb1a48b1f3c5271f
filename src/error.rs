use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use std::io::{self, Write};
use std::ops::Range;

/// Half-open character range into the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {} is past its end {}", start, end);
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Range covering `self` through `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span::new(self.start, other.end.max(self.start))
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexError,
    ParseError,
    RuntimeError,
}

/// Builds the ordered list of message fragments an `NsError` carries.
#[macro_export]
macro_rules! fragments {
    ($($part:expr),* $(,)?) => {
        vec![$($part.to_string()),*]
    };
}

#[derive(Debug, Clone)]
pub struct NsError {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: Vec<String>,
    pub help: Option<String>,
}

impl NsError {
    pub fn new(kind: ErrorKind, span: Span, message: Vec<String>) -> Self {
        Self {
            kind,
            span,
            message,
            help: None,
        }
    }

    pub fn lex_error(span: Span, message: Vec<String>) -> Self {
        Self::new(ErrorKind::LexError, span, message)
    }

    pub fn parse_error(span: Span, message: Vec<String>) -> Self {
        Self::new(ErrorKind::ParseError, span, message)
    }

    pub fn runtime_error(span: Span, message: Vec<String>) -> Self {
        Self::new(ErrorKind::RuntimeError, span, message)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// The fragments joined for display.
    pub fn message(&self) -> String {
        self.message.concat()
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        if let Err(error) = self.write_report(source, filename, true, io::stderr()) {
            log::error!("unable to render diagnostic: {}", error);
            eprintln!("{}", self.message());
        }
    }

    /// Renders the diagnostic with the span underlined beneath the source.
    pub fn write_report<W: Write>(
        &self,
        source: &str,
        filename: Option<&str>,
        colored: bool,
        out: W,
    ) -> io::Result<()> {
        let filename = filename.unwrap_or("<repl>");
        let message = self.message();

        let color = match self.kind {
            ErrorKind::LexError => Color::Red,
            ErrorKind::ParseError => Color::Yellow,
            ErrorKind::RuntimeError => Color::Magenta,
        };

        let kind_str = match self.kind {
            ErrorKind::LexError => "Lexical Error",
            ErrorKind::ParseError => "Parse Error",
            ErrorKind::RuntimeError => "Runtime Error",
        };

        // errors at the end of input sit one column past the text; pad the
        // echoed line so that column exists and can be underlined
        let source_len = source.chars().count();
        let (text, range) = if self.span.start >= source_len {
            (format!("{} ", source), Span::single(source_len).range())
        } else if self.span.is_empty() {
            (source.to_string(), Span::single(self.span.start).range())
        } else {
            (source.to_string(), self.span.start..self.span.end.min(source_len))
        };

        let title = if colored {
            format!("{}: {}", kind_str.fg(color), message)
        } else {
            format!("{}: {}", kind_str, message)
        };

        let mut report_builder = Report::build(ReportKind::Error, filename, range.start)
            .with_config(Config::default().with_color(colored))
            .with_message(title)
            .with_label(
                Label::new((filename, range))
                    .with_message(&message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder = report_builder.with_note(format!("help: {}", help_text));
        }

        report_builder
            .finish()
            .write((filename, Source::from(text)), out)
    }
}

impl fmt::Display for NsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for NsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_length_and_cover() {
        let a = Span::new(2, 5);
        let b = Span::new(7, 9);
        assert_eq!(a.len(), 3);
        assert_eq!(a.to(&b), Span::new(2, 9));
        assert!(Span::new(4, 4).is_empty());
    }

    #[test]
    fn message_joins_fragments() {
        let error = NsError::runtime_error(Span::single(0), fragments!["unknown variable `", "x", "`"]);
        assert_eq!(error.message(), "unknown variable `x`");
        assert_eq!(error.to_string(), "unknown variable `x`");
    }

    fn rendered(error: &NsError, source: &str) -> String {
        let mut out = Vec::new();
        error.write_report(source, None, false, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn end_of_input_errors_still_echo_the_line() {
        let error = crate::Parser::new("1 +").parse().unwrap_err();
        assert_eq!(error.span, Span::single(3));

        let output = rendered(&error, "1 +");
        assert!(output.lines().any(|line| line.contains("1 +")), "{}", output);
        assert!(output.contains("unexpected token (found `<eof>`)"), "{}", output);
        assert!(output.contains('┬'), "{}", output);
    }

    #[test]
    fn errors_inside_the_line_underline_their_range() {
        let error = crate::Parser::new("foo(1,2").parse().unwrap_err();
        let output = rendered(&error, "foo(1,2");
        assert!(output.lines().any(|line| line.contains("foo(1,2")), "{}", output);
        assert!(output.contains("unclosed call parameters list"), "{}", output);
    }
}
