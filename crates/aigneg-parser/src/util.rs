//! Parsing helpers

use std::ops::RangeTo;

use memchr::memchr;
use nom::error::{ContextError, ErrorKind, ParseError};
use nom::{AsBytes, Err, IResult, Parser, Slice};

pub fn word<I, O, E, F>(mut parser: F) -> impl FnMut(I) -> IResult<I, O, E>
where
    I: Clone + Slice<RangeTo<usize>> + AsBytes,
    E: ParseError<I>,
    F: Parser<I, O, E>,
{
    move |i1| {
        let (i2, o) = parser.parse(i1.clone())?;
        match i2.as_bytes().first() {
            Some(c) if !c.is_ascii_alphanumeric() => Ok((i2, o)),
            None => Ok((i2, o)),
            _ => Err(Err::Error(E::from_error_kind(i1, ErrorKind::Fail))),
        }
    }
}

pub fn word_span<I: Slice<RangeTo<usize>> + AsBytes>(input: I) -> I {
    let bytes = input.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b' ' | b'\t' | b'\n' | b'\r' => return input.slice(..i),
            _ => {}
        }
    }
    input
}

/// The first line of `input` without the line feed, considering at most
/// `limit` bytes
///
/// Binary AIGER files only have a single text line before the binary data
/// starts, so looking further than the header length bound is pointless.
#[inline]
pub fn line_span(input: &[u8], limit: usize) -> &[u8] {
    let window = &input[..input.len().min(limit)];
    match memchr(b'\n', window) {
        Some(i) => &window[..i],
        None => window,
    }
}

pub fn context_loc<I, E, F, O>(
    span: impl Fn() -> I,
    msg: &'static str,
    mut f: F,
) -> impl FnMut(I) -> IResult<I, O, E>
where
    E: ContextError<I>,
    F: Parser<I, O, E>,
{
    move |input| match f.parse(input) {
        Ok(o) => Ok(o),
        Err(Err::Incomplete(i)) => Err(Err::Incomplete(i)),
        Err(Err::Error(e)) => Err(Err::Error(E::add_context(span(), msg, e))),
        Err(Err::Failure(e)) => Err(Err::Failure(E::add_context(span(), msg, e))),
    }
}

#[inline]
pub fn fail<I: Clone, O, E: ParseError<I> + ContextError<I>>(
    span: I,
    msg: &'static str,
) -> IResult<I, O, E> {
    Err(Err::Failure(E::add_context(
        span.clone(),
        msg,
        E::from_error_kind(span, ErrorKind::Fail),
    )))
}

pub fn fail_with_contexts<I, O, E, It>(ctxs: It) -> IResult<I, O, E>
where
    I: Clone,
    E: ParseError<I> + ContextError<I>,
    It: IntoIterator<Item = (I, &'static str)>,
{
    let mut iter = ctxs.into_iter();
    let (span, msg) = iter.next().expect("At least one context required");
    let mut err = E::add_context(span.clone(), msg, E::from_error_kind(span, ErrorKind::Fail));
    for (span, msg) in iter {
        err = E::add_context(span, msg, err);
    }
    Err(Err::Failure(err))
}

#[cfg(test)]
pub mod test {
    use crate::{ParseOptions, Truncation};

    pub const OPTS_STRICT: ParseOptions = ParseOptions {
        truncation: Truncation::Strict,
        check_header: false,
        check_literals: false,
    };

    pub const OPTS_LENIENT: ParseOptions = ParseOptions {
        truncation: Truncation::Lenient,
        check_header: false,
        check_literals: false,
    };

    pub const OPTS_CHECKED: ParseOptions = ParseOptions {
        truncation: Truncation::Strict,
        check_header: true,
        check_literals: true,
    };

    #[test]
    fn line_span_bounds() {
        assert_eq!(super::line_span(b"aig 0 0 0 0 0\n\x01", 128), b"aig 0 0 0 0 0");
        assert_eq!(super::line_span(b"aig 0 0 0 0 0\n", 5), b"aig 0");
        assert_eq!(super::line_span(b"", 128), b"");
    }

    #[test]
    fn word_span_stops_at_whitespace() {
        assert_eq!(super::word_span(&b"aig 1"[..]), b"aig");
        assert_eq!(super::word_span(&b"aiger"[..]), b"aiger");
    }
}
