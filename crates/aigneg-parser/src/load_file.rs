//! Convenience functions etc. to load a binary AIGER file and report errors

// spell-checker:ignore termcolor

use std::fmt;
use std::path::Path;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term::termcolor::ColorChoice;
use codespan_reporting::term::termcolor::{StandardStream, WriteColor};
use codespan_reporting::term::{emit, Config};
use nom::error::{ContextError, ErrorKind, FromExternalError, ParseError};
use nom::Offset;

use crate::aiger::{self, Truncated, MAX_HEADER_LEN};
use crate::util::line_span;
use crate::{EdgeCount, Error, ParseOptions};

struct ParserReport<I>(Vec<(I, ParserError)>);

enum ParserError {
    Nom(ErrorKind),
    Char(char),
    Context(&'static str),
    Truncated(Truncated),
}

impl ParserError {
    fn message(&self) -> String {
        match self {
            ParserError::Nom(e) => format!("Expected {}", e.description()),
            ParserError::Char(c) => format!("Expected '{c}'"),
            ParserError::Context(msg) => msg.to_string(),
            ParserError::Truncated(t) => t.to_string(),
        }
    }
}

impl<I> ParseError<I> for ParserReport<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        ParserReport(vec![(input, ParserError::Nom(kind))])
    }

    fn append(input: I, kind: ErrorKind, mut other: Self) -> Self {
        other.0.push((input, ParserError::Nom(kind)));
        other
    }

    fn from_char(input: I, c: char) -> Self {
        ParserReport(vec![(input, ParserError::Char(c))])
    }
}

impl<I> ContextError<I> for ParserReport<I> {
    fn add_context(input: I, ctx: &'static str, mut other: Self) -> Self {
        match other.0[0].1 {
            ParserError::Context(_) | ParserError::Truncated(_) => {}
            // Assume that the context is a better description
            _ => other.0.clear(),
        }
        other.0.push((input, ParserError::Context(ctx)));
        other
    }
}

impl<I> FromExternalError<I, Truncated> for ParserReport<I> {
    fn from_external_error(input: I, _kind: ErrorKind, e: Truncated) -> Self {
        Self(vec![(input, ParserError::Truncated(e))])
    }
}

/// Parse `input`, emitting errors to `writer`
///
/// `file_id` is an identifier for the file used for error reporting. `config`
/// configures how diagnostics are rendered.
///
/// Spans within the header line are shown as labelled source snippets. The
/// binary part of the file cannot be displayed sensibly, so errors there are
/// reported with their byte offset.
///
/// If you simply want to parse a file with error reporting to stderr, you are
/// probably looking for [`load_file()`].
pub fn parse<S: AsRef<str> + Clone + fmt::Display>(
    input: &[u8],
    parse_options: &ParseOptions,
    file_id: S,
    writer: &mut dyn WriteColor,
    config: &Config,
) -> Result<EdgeCount, Error> {
    let errors = match aiger::parse::<ParserReport<_>>(parse_options)(input) {
        Ok((_, count)) => return Ok(count),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => e.0,
        Err(nom::Err::Incomplete(_)) => unreachable!("only using complete parsers"),
    };

    // Only the header line is text. It may be cut off at the length limit,
    // everything up to the line feed is shown then.
    let header_len = line_span(input, MAX_HEADER_LEN + 1).len();
    let source: String = input[..header_len]
        .iter()
        .map(|&b| match b {
            b' '..=b'~' | b'\t' => b as char,
            _ => '.',
        })
        .collect();

    let truncated = errors
        .iter()
        .any(|(_, e)| matches!(e, ParserError::Truncated(_)));

    let mut labels: Vec<Label<()>> = Vec::with_capacity(errors.len());
    let mut notes = Vec::new();
    let mut first_message = None;
    for (span, err) in errors {
        let msg = err.message();
        let offset = input.offset(span);
        let end = offset + span.len();
        if end <= header_len {
            // the first error located in the header line is the primary one
            let label = if labels.is_empty() {
                Label::primary((), offset..end)
            } else {
                Label::secondary((), offset..end)
            };
            labels.push(label.with_message(msg.clone()));
        } else if offset == input.len() {
            notes.push(format!("{msg} (at the end of the file, byte {offset})"));
        } else {
            notes.push(format!("{msg} (at byte {offset})"));
        }
        first_message.get_or_insert(msg);
    }
    if labels.is_empty() {
        // without labels, the file name would not be rendered at all
        notes.push(format!("in '{file_id}'"));
    }

    let diagnostic = Diagnostic::error()
        .with_message(if truncated {
            "unexpected end of file"
        } else {
            "parsing failed"
        })
        .with_labels(labels)
        .with_notes(notes);

    let file = SimpleFile::new(file_id, source);
    emit(writer, config, &file, &diagnostic).ok();

    let msg = first_message.unwrap_or_default();
    Err(if truncated {
        Error::TruncatedInput(msg)
    } else {
        Error::Format(msg)
    })
}

/// Load and parse the file at `path`, reporting errors to stderr
///
/// The file is read completely and closed again before parsing starts.
pub fn load_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<EdgeCount, Error> {
    let path = path.as_ref();

    let src = std::fs::read(path).map_err(|err| {
        eprintln!("error: could not read '{}' ({err})", path.display());
        err
    })?;

    let config = codespan_reporting::term::Config::default();
    let writer = StandardStream::stderr(ColorChoice::Auto);
    let mut write_lock = writer.lock();

    parse(
        &src,
        options,
        path.to_string_lossy(),
        &mut write_lock,
        &config,
    )
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use codespan_reporting::term::termcolor::NoColor;
    use codespan_reporting::term::Config;

    use crate::util::test::{OPTS_LENIENT, OPTS_STRICT};
    use crate::{EdgeCount, Error, ParseOptions};

    fn run(input: &[u8], options: &ParseOptions) -> (Result<EdgeCount, Error>, String) {
        let mut writer = NoColor::new(Vec::new());
        let res = super::parse(input, options, "test.aig", &mut writer, &Config::default());
        (res, String::from_utf8(writer.into_inner()).unwrap())
    }

    #[test]
    fn success_is_silent() {
        let (res, out) = run(b"aig 0 0 0 1 0\n\x03\x00\x00\x00", &OPTS_STRICT);
        assert_eq!(res.unwrap().total(), 1);
        assert!(out.is_empty());
    }

    #[test]
    fn header_errors_are_format_errors() {
        for input in [
            &b"aig 1 2 3\n"[..],
            b"aig 1 2 three 4 5\n",
            b"aag 0 0 0 0 0\n",
            b"\x7fELF\x02\x01",
            b"",
        ] {
            let (res, out) = run(input, &OPTS_STRICT);
            assert!(matches!(res, Err(Error::Format(_))), "{res:?}");
            assert!(out.contains("parsing failed"), "{out}");
            assert!(out.contains("test.aig"), "{out}");
        }
    }

    #[test]
    fn ascii_aiger_is_rejected_explicitly() {
        let (res, out) = run(b"aag 1 1 0 1 0\n2\n2\n", &OPTS_STRICT);
        let Err(Error::Format(msg)) = res else {
            panic!("expected a format error");
        };
        assert!(msg.contains("ASCII AIGER"), "{msg}");
        assert!(out.contains("header line must have format"), "{out}");
    }

    #[test]
    fn truncation_is_classified() {
        let aig = b"aig 10 0 0 0 5\n\x02\x03\x01\x02\x02\x02";
        let (res, out) = run(aig, &OPTS_STRICT);
        let Err(Error::TruncatedInput(msg)) = res else {
            panic!("expected a truncation error");
        };
        assert_eq!(msg, "reached end of file after 2 of 5 AND gates");
        assert!(out.contains("unexpected end of file"), "{out}");
        assert!(out.contains("number of AND gates given here"), "{out}");

        let (res, out) = run(aig, &OPTS_LENIENT);
        let count = res.unwrap();
        assert!(count.truncated);
        assert_eq!(count.total(), 4);
        assert!(out.is_empty());
    }

    #[test]
    fn empty_file_names_the_file() {
        let (res, out) = run(b"", &OPTS_STRICT);
        assert!(matches!(res, Err(Error::Format(_))), "{res:?}");
        assert!(out.contains("test.aig"), "{out}");
        assert!(out.contains("expected 'aig' (binary AIGER)"), "{out}");
    }

    #[test]
    fn truncation_points_at_the_declared_count() {
        let aig = b"aig 10 0 0 0 5\n\x02\x03\x01";
        let (res, out) = run(aig, &OPTS_STRICT);
        assert!(matches!(res, Err(Error::TruncatedInput(_))), "{res:?}");
        // the header field "5" is the only label and therefore the primary one
        let marker_line = out
            .lines()
            .find(|l| l.contains("number of AND gates given here"))
            .unwrap_or_else(|| panic!("{out}"));
        assert!(marker_line.contains('^'), "{out}");
        assert!(!marker_line.contains('-'), "{out}");
    }

    #[test]
    fn binary_errors_name_the_file() {
        let aig = b"aig 1 0 0 0 1\n\x00\xff\xff\xff\xff\xff\xff\xff\xff\xff\x7f\x00";
        let (_, out) = run(aig, &OPTS_STRICT);
        assert!(out.contains("in 'test.aig'"), "{out}");
    }

    #[test]
    fn truncated_latches() {
        let (res, _) = run(b"aig 2 1 1 0 0\n\x02\x00\x00\x00\x04", &OPTS_STRICT);
        let Err(Error::TruncatedInput(msg)) = res else {
            panic!("expected a truncation error");
        };
        assert_eq!(msg, "reached end of file after 0 of 1 latch records");
    }

    #[test]
    fn binary_errors_report_offsets() {
        // 10 byte delta with excess bits at offset 15
        let aig = b"aig 1 0 0 0 1\n\x00\xff\xff\xff\xff\xff\xff\xff\xff\xff\x7f\x00";
        let (res, out) = run(aig, &OPTS_STRICT);
        assert!(matches!(res, Err(Error::Format(_))), "{res:?}");
        assert!(out.contains("at byte 14"), "{out}");
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let res = super::load_file(dir.path().join("missing.aig"), &OPTS_STRICT);
        assert!(matches!(res, Err(Error::Io(_))), "{res:?}");
    }

    #[test]
    fn load_file_twice() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"aig 2 0 0 1 2\n\x05\x00\x00\x00\x02\x03\x04\x02\x01\x01")
            .unwrap();
        file.flush().unwrap();

        let first = super::load_file(file.path(), &OPTS_STRICT).unwrap();
        let second = super::load_file(file.path(), &OPTS_STRICT).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total(), 3);
    }
}
