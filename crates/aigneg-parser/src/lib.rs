//! Complemented-edge statistics for binary AIGER files
//!
//! The parser walks a binary AIGER file front to back and counts the negated
//! edges of the circuit: complemented output literals as well as complemented
//! right-hand sides of AND gates. No graph is built in memory.
//!
//! ## Example
//!
//! ```no_run
//! # use aigneg_parser::load_file::load_file;
//! # use aigneg_parser::*;
//! let parse_options = ParseOptionsBuilder::default().build().unwrap();
//! let Ok(count) = load_file("foo.aig", &parse_options) else {
//!     return; // an error message has been printed to stderr
//! };
//! println!("{}", count.total());
//! ```
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::fmt;
use std::io;

use derive_builder::Builder;

pub mod aiger;
mod util;

#[cfg(feature = "load-file")]
pub mod load_file;

/// AIGER literal
///
/// The least significant bit is the complement flag, the remaining bits form
/// the variable index.
pub type Literal = u64;

/// Returns true iff `literal` refers to a complemented (negated) signal
#[inline(always)]
pub const fn is_complemented(literal: Literal) -> bool {
    literal & 1 != 0
}

/// Header line of a binary AIGER file: `aig M I L O A`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Header {
    /// Maximal variable index (`M`)
    pub max_var: u64,
    /// Number of inputs (`I`)
    pub inputs: u64,
    /// Number of latches (`L`)
    pub latches: u64,
    /// Number of outputs (`O`)
    pub outputs: u64,
    /// Number of AND gates (`A`)
    pub and_gates: u64,
}

impl Header {
    /// Whether `I + L + A <= M` holds
    ///
    /// The format expects this, but the parser only checks it if
    /// [`ParseOptions::check_header`] is set.
    pub fn is_consistent(&self) -> bool {
        let defined = self.inputs as u128 + self.latches as u128 + self.and_gates as u128;
        defined <= self.max_var as u128
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "aig {} {} {} {} {}",
            self.max_var, self.inputs, self.latches, self.outputs, self.and_gates
        )
    }
}

/// Complemented edges found while decoding a file
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EdgeCount {
    /// The header of the decoded file
    pub header: Header,
    /// Number of complemented output literals
    pub outputs: u64,
    /// Number of complemented AND gate inputs (`rhs0` and `rhs1`)
    ///
    /// The left-hand side literals of AND gates are gate definitions, not
    /// edges, and never contribute here.
    pub and_inputs: u64,
    /// Whether the file ended before all records declared in the header were
    /// read
    ///
    /// This can only be true with [`Truncation::Lenient`]. The counts then
    /// cover the complete records only.
    pub truncated: bool,
}

impl EdgeCount {
    /// Empty count for the given header
    pub fn new(header: Header) -> Self {
        Self {
            header,
            outputs: 0,
            and_inputs: 0,
            truncated: false,
        }
    }

    /// Total number of complemented edges
    #[inline]
    pub fn total(&self) -> u64 {
        self.outputs + self.and_inputs
    }
}

/// How to deal with files that end before all declared records are read
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub enum Truncation {
    /// Report an error ([`Error::TruncatedInput`])
    #[default]
    Strict,
    /// Stop decoding at the first incomplete record and return the counts
    /// gathered so far, with [`EdgeCount::truncated`] set
    Lenient,
}

/// Options for the parser
#[non_exhaustive]
#[derive(Clone, Builder, Debug)]
pub struct ParseOptions {
    /// Handling of files ending before the last declared record
    #[builder(default)]
    pub truncation: Truncation,

    /// Whether to require `I + L + A <= M` in the header
    ///
    /// Many tools write headers violating this, and the count does not depend
    /// on it, so this is off by default.
    #[builder(default = "false")]
    pub check_header: bool,

    /// Whether to require `literal / 2 <= M` for every output literal and
    /// every reconstructed AND gate literal
    #[builder(default = "false")]
    pub check_literals: bool,
}

/// Error returned when a file cannot be decoded
#[derive(Debug)]
pub enum Error {
    /// The file could not be opened or read
    Io(io::Error),
    /// The header line is malformed, or a record is invalid
    Format(String),
    /// The file ended before all records declared in the header were read
    TruncatedInput(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::Format(msg) => write!(f, "invalid binary AIGER file: {msg}"),
            Error::TruncatedInput(msg) => write!(f, "truncated binary AIGER file: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
