//! Binary AIGER decoder based on
//! "[The AIGER And-Inverter Graph (AIG) Format Version 20071012][spec1]"
//!
//! Only the parts of a file relevant for counting complemented edges are
//! interpreted. The layout is:
//!
//! ```text
//! aig M I L O A\n      header line, at most 127 bytes of text
//! I × 4 bytes          input records (skipped)
//! L × 8 bytes          latch records (skipped)
//! O × 4 bytes          output literals (little endian)
//! A × 3 varints        AND gates, delta encoded
//! ```
//!
//! Anything following the last AND gate (symbol table, comments) is ignored.
//!
//! [spec1]: https://github.com/arminbiere/aiger/blob/master/FORMAT

use std::fmt;

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, u64};
use nom::combinator::{consumed, map, value};
use nom::error::{ContextError, ErrorKind, FromExternalError, ParseError};
use nom::sequence::preceded;
use nom::{Err, IResult};

use crate::util::{context_loc, fail, fail_with_contexts, line_span, word, word_span};
use crate::{is_complemented, EdgeCount, Header, Literal, ParseOptions, Truncation};

/// Maximal length of the header line in bytes, excluding the line feed
pub const MAX_HEADER_LEN: usize = 127;
/// Size of an input record in bytes
pub const INPUT_WIDTH: usize = 4;
/// Size of a latch record in bytes
pub const LATCH_WIDTH: usize = 8;
/// Size of an output literal in bytes
pub const OUTPUT_WIDTH: usize = 4;

const HEADER_MSG: &str = "header line must have format 'aig <#vars> <#inputs> <#latches> <#outputs> <#AND gates>'";
const LITERAL_MSG: &str = "variable too large. The literal divided by 2 must not be larger than the maximal variable number";
const MAX_VAR_MSG: &str = "note: maximal variable number given here";

/// Sections of a binary AIGER file that hold a declared number of records
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Section {
    /// Input records
    Inputs,
    /// Latch records
    Latches,
    /// Output literals
    Outputs,
    /// Delta encoded AND gates
    AndGates,
}

impl Section {
    fn note(self) -> &'static str {
        match self {
            Section::Inputs => "note: number of inputs given here",
            Section::Latches => "note: number of latches given here",
            Section::Outputs => "note: number of outputs given here",
            Section::AndGates => "note: number of AND gates given here",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Inputs => "input records",
            Section::Latches => "latch records",
            Section::Outputs => "output literals",
            Section::AndGates => "AND gates",
        })
    }
}

/// The file ended within `section`
///
/// The parser raises this via [`FromExternalError`] such that error types can
/// tell truncated files apart from malformed ones.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Truncated {
    /// The incomplete section
    pub section: Section,
    /// Number of complete records in `section`
    pub complete: u64,
    /// Number of records declared in the header
    pub declared: u64,
}

impl fmt::Display for Truncated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reached end of file after {} of {} {}",
            self.complete, self.declared, self.section
        )
    }
}

/// Error of [`read_delta()`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum VarintError {
    /// The input ended before a byte without continuation bit
    Eof,
    /// The value does not fit into a `u64`
    Overflow,
}

/// Decode an unsigned variable-length integer
///
/// Every byte contributes its low 7 bits, least significant group first. A
/// set high bit means that more bytes follow. Returns the remaining input and
/// the value.
pub fn read_delta(input: &[u8]) -> Result<(&[u8], u64), VarintError> {
    let mut input = input;
    let mut val = 0u64;
    let mut shift = 0u32;
    loop {
        let &[b, ref rem @ ..] = input else {
            return Err(VarintError::Eof);
        };
        if shift >= u64::BITS {
            return Err(VarintError::Overflow);
        }
        input = rem;

        let group = (b & ((1 << 7) - 1)) as u64;
        if (group << shift) >> shift != group {
            return Err(VarintError::Overflow);
        }
        val |= group << shift;
        if b & (1 << 7) == 0 {
            return Ok((input, val));
        }
        shift += 7;
    }
}

/// The three deltas of one AND gate record
fn and_record(input: &[u8]) -> Result<(&[u8], [u64; 3]), VarintError> {
    let (input, lhs) = read_delta(input)?;
    let (input, rhs0) = read_delta(input)?;
    let (input, rhs1) = read_delta(input)?;
    Ok((input, [lhs, rhs0, rhs1]))
}

/// AND gate `lhs = rhs0 ∧ rhs1`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct AndGate {
    /// Literal defined by the gate
    pub lhs: Literal,
    /// First input
    pub rhs0: Literal,
    /// Second input
    pub rhs1: Literal,
}

impl AndGate {
    /// Number of complemented inputs
    ///
    /// `lhs` is the gate definition itself and therefore not considered.
    #[inline]
    pub fn complemented_inputs(&self) -> u64 {
        is_complemented(self.rhs0) as u64 + is_complemented(self.rhs1) as u64
    }

    fn max_literal(&self) -> Literal {
        self.lhs.max(self.rhs0).max(self.rhs1)
    }
}

/// Reconstruction state of the AND gate section
///
/// Each field of a record is stored as difference to the same field of the
/// previous record. The first record is relative to all-zero literals.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Deltas {
    last: AndGate,
}

impl Deltas {
    /// Initial state before the first record
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the deltas `[lhs, rhs0, rhs1]` of the next record and return the
    /// reconstructed gate
    ///
    /// Returns `None` if a literal overflows, the state is unchanged then.
    pub fn apply(&mut self, [lhs, rhs0, rhs1]: [u64; 3]) -> Option<AndGate> {
        let gate = AndGate {
            lhs: self.last.lhs.checked_add(lhs)?,
            rhs0: self.last.rhs0.checked_add(rhs0)?,
            rhs1: self.last.rhs1.checked_add(rhs1)?,
        };
        self.last = gate;
        Some(gate)
    }
}

#[derive(Clone, Copy)]
struct HeaderLine<'a> {
    vars: (&'a [u8], u64),
    inputs: (&'a [u8], u64),
    latches: (&'a [u8], u64),
    out: (&'a [u8], u64),
    and: (&'a [u8], u64),
}

impl HeaderLine<'_> {
    fn header(&self) -> Header {
        Header {
            max_var: self.vars.1,
            inputs: self.inputs.1,
            latches: self.latches.1,
            outputs: self.out.1,
            and_gates: self.and.1,
        }
    }
}

fn format<'a, E>(input: &'a [u8]) -> IResult<&'a [u8], (), E>
where
    E: ParseError<&'a [u8]> + ContextError<&'a [u8]>,
{
    let (input, (span, binary)) = context_loc(
        || word_span(input),
        "expected 'aig' (binary AIGER)",
        consumed(word(alt((value(false, tag("aag")), value(true, tag("aig")))))),
    )(input)?;
    if !binary {
        return fail(
            span,
            "ASCII AIGER ('aag') is not supported, only binary AIGER ('aig')",
        );
    }
    Ok((input, ()))
}

fn header_fields<'a, E>(input: &'a [u8]) -> IResult<&'a [u8], HeaderLine<'a>, E>
where
    E: ParseError<&'a [u8]> + ContextError<&'a [u8]>,
{
    let (mut input, ()) = format(input)?;
    let mut numbers: [(&[u8], u64); 5] = [(&[], 0); 5]; // M I L O A
    for num in numbers.iter_mut() {
        (input, *num) = preceded(char(' '), consumed(u64))(input)?;
    }
    let (input, _) = char('\n')(input)?;
    let [vars, inputs, latches, out, and] = numbers;
    Ok((
        input,
        HeaderLine {
            vars,
            inputs,
            latches,
            out,
            and,
        },
    ))
}

fn header<'a, E>(input: &'a [u8]) -> IResult<&'a [u8], HeaderLine<'a>, E>
where
    E: ParseError<&'a [u8]> + ContextError<&'a [u8]>,
{
    let line = line_span(input, MAX_HEADER_LEN + 1);
    if line.len() > MAX_HEADER_LEN {
        return fail(line, "header line must not be longer than 127 bytes");
    }
    context_loc(|| line, HEADER_MSG, header_fields::<E>)(input)
}

/// Parse the header line `aig M I L O A` including the line feed
pub fn parse_header<'a, E>(input: &'a [u8]) -> IResult<&'a [u8], Header, E>
where
    E: ParseError<&'a [u8]> + ContextError<&'a [u8]>,
{
    map(header::<E>, |h| h.header())(input)
}

fn truncated<'a, O, E>(
    input: &'a [u8],
    count_span: &'a [u8],
    t: Truncated,
) -> IResult<&'a [u8], O, E>
where
    E: ContextError<&'a [u8]> + FromExternalError<&'a [u8], Truncated>,
{
    let eof = &input[input.len()..];
    let err = E::from_external_error(eof, ErrorKind::Eof, t);
    Err(Err::Failure(E::add_context(count_span, t.section.note(), err)))
}

/// Parse a binary AIGER file and count its complemented edges
///
/// Counted are complemented output literals and complemented AND gate
/// inputs. The remaining input after the last AND gate is returned as is.
pub fn parse<'a, E>(
    options: &ParseOptions,
) -> impl FnMut(&'a [u8]) -> IResult<&'a [u8], EdgeCount, E>
where
    E: ParseError<&'a [u8]> + ContextError<&'a [u8]> + FromExternalError<&'a [u8], Truncated>,
{
    let lenient = options.truncation == Truncation::Lenient;
    let check_header = options.check_header;
    let check_literals = options.check_literals;
    move |input| {
        let (mut input, h) = header(input)?;
        if check_header && !h.header().is_consistent() {
            return fail(
                h.vars.0,
                "#vars must be at least #inputs + #latches + #AND gates",
            );
        }
        let literal_ok = |lit: Literal| !check_literals || lit / 2 <= h.vars.1;
        let mut count = EdgeCount::new(h.header());

        // inputs and latches
        let input_bytes = h.inputs.1 as u128 * INPUT_WIDTH as u128;
        let latch_bytes = h.latches.1 as u128 * LATCH_WIDTH as u128;
        let available = input.len() as u128;
        if available < input_bytes + latch_bytes {
            if lenient {
                count.truncated = true;
                return Ok((input, count));
            }
            let (span, t) = if available < input_bytes {
                let t = Truncated {
                    section: Section::Inputs,
                    complete: (available / INPUT_WIDTH as u128) as u64,
                    declared: h.inputs.1,
                };
                (h.inputs.0, t)
            } else {
                let t = Truncated {
                    section: Section::Latches,
                    complete: ((available - input_bytes) / LATCH_WIDTH as u128) as u64,
                    declared: h.latches.1,
                };
                (h.latches.0, t)
            };
            return truncated(input, span, t);
        }
        input = &input[(input_bytes + latch_bytes) as usize..];

        // outputs
        for i in 0..h.out.1 {
            let &[b0, b1, b2, b3, ref rest @ ..] = input else {
                if lenient {
                    count.truncated = true;
                    return Ok((input, count));
                }
                return truncated(
                    input,
                    h.out.0,
                    Truncated {
                        section: Section::Outputs,
                        complete: i,
                        declared: h.out.1,
                    },
                );
            };
            let lit = u32::from_le_bytes([b0, b1, b2, b3]) as Literal;
            if !literal_ok(lit) {
                return fail_with_contexts([
                    (&input[..OUTPUT_WIDTH], LITERAL_MSG),
                    (h.vars.0, MAX_VAR_MSG),
                ]);
            }
            count.outputs += is_complemented(lit) as u64;
            input = rest;
        }

        // and gates
        let mut deltas = Deltas::new();
        for i in 0..h.and.1 {
            let (rest, d) = match and_record(input) {
                Ok(r) => r,
                Err(VarintError::Eof) if lenient => {
                    count.truncated = true;
                    return Ok((input, count));
                }
                Err(VarintError::Eof) => {
                    return truncated(
                        input,
                        h.and.0,
                        Truncated {
                            section: Section::AndGates,
                            complete: i,
                            declared: h.and.1,
                        },
                    )
                }
                Err(VarintError::Overflow) => {
                    return fail(input, "invalid binary: delta does not fit into 64 bits")
                }
            };
            let span = &input[..input.len() - rest.len()];
            let Some(gate) = deltas.apply(d) else {
                return fail(
                    span,
                    "invalid binary: AND gate literal does not fit into 64 bits",
                );
            };
            if !literal_ok(gate.max_literal()) {
                return fail_with_contexts([(span, LITERAL_MSG), (h.vars.0, MAX_VAR_MSG)]);
            }
            count.and_inputs += gate.complemented_inputs();
            input = rest;
        }

        Ok((input, count))
    }
}
