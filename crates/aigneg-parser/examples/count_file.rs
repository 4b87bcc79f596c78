use aigneg_parser::load_file::load_file;
use aigneg_parser::{ParseOptionsBuilder, Truncation};

fn main() {
    let parse_options = ParseOptionsBuilder::default()
        .truncation(Truncation::Lenient)
        .build()
        .unwrap();

    for arg in std::env::args().skip(1) {
        println!("\ncounting {arg} ...");
        if let Ok(count) = load_file(arg, &parse_options) {
            println!("{count:#?}")
        }
    }
}
