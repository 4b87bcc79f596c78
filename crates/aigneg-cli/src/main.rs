#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use aigneg_parser::load_file::load_file;
use aigneg_parser::{EdgeCount, ParseOptions, ParseOptionsBuilder, Truncation};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

mod util;
use util::HDuration;

// spell-checker:ignore aigneg

/// Count the complemented edges of a binary AIGER circuit
///
/// Complemented edges are negated output literals and negated AND gate inputs.
/// The count is printed to stdout as a single decimal number.
#[derive(Parser, Debug)]
#[command(name = "aigneg", author, version, about, long_about = None)]
struct Cli {
    /// Stop at the first incomplete record of a truncated file and print the
    /// count gathered so far instead of failing
    #[arg(long)]
    lenient: bool,

    /// Require `#inputs + #latches + #AND gates <= #vars` in the header
    #[arg(long)]
    check_header: bool,

    /// Require every literal to refer to a variable not larger than `#vars`
    #[arg(long)]
    check_literals: bool,

    /// Report the header, the counts per category, and the decoding time on
    /// stderr
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Binary AIGER input file
    file: PathBuf,
}

impl Cli {
    fn parse_options(&self) -> ParseOptions {
        ParseOptionsBuilder::default()
            .truncation(if self.lenient {
                Truncation::Lenient
            } else {
                Truncation::Strict
            })
            .check_header(self.check_header)
            .check_literals(self.check_literals)
            .build()
            .unwrap()
    }
}

fn report(count: &EdgeCount) {
    eprintln!("header: {}", count.header);
    eprintln!("complemented outputs: {}", count.outputs);
    eprintln!("complemented AND gate inputs: {}", count.and_inputs);
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print().ok();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            println!("{}", Cli::command().render_usage());
            return ExitCode::from(1);
        }
    };

    let start = Instant::now();
    let Ok(count) = load_file(&cli.file, &cli.parse_options()) else {
        // the error has been reported to stderr already
        return ExitCode::from(1);
    };

    if cli.verbose {
        report(&count);
        eprintln!("decoding took {}", HDuration(start.elapsed()));
    }
    if count.truncated {
        eprintln!(
            "warning: '{}' is truncated, the count only covers the complete records",
            cli.file.display()
        );
    }

    println!("{}", count.total());
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use aigneg_parser::Truncation;
    use clap::{CommandFactory, Parser};

    use super::Cli;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn exactly_one_file() {
        assert!(Cli::try_parse_from(["aigneg"]).is_err());
        assert!(Cli::try_parse_from(["aigneg", "a.aig", "b.aig"]).is_err());

        let cli = Cli::try_parse_from(["aigneg", "a.aig"]).unwrap();
        assert_eq!(cli.file.to_str(), Some("a.aig"));
        assert!(!cli.verbose);
    }

    #[test]
    fn flags_map_to_options() {
        let cli = Cli::try_parse_from(["aigneg", "a.aig"]).unwrap();
        let options = cli.parse_options();
        assert_eq!(options.truncation, Truncation::Strict);
        assert!(!options.check_header);
        assert!(!options.check_literals);

        let cli = Cli::try_parse_from([
            "aigneg",
            "--lenient",
            "--check-header",
            "--check-literals",
            "-v",
            "a.aig",
        ])
        .unwrap();
        let options = cli.parse_options();
        assert_eq!(options.truncation, Truncation::Lenient);
        assert!(options.check_header);
        assert!(options.check_literals);
        assert!(cli.verbose);
    }

    #[test]
    fn usage_names_the_file_argument() {
        let usage = Cli::command().render_usage().to_string();
        assert!(usage.contains("<FILE>"), "{usage}");
    }
}
