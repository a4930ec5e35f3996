// The mouse CLI entry point. Thin wrapper around `mouse::cli::run`, in the
// same style as the teacher's own `bin/acorn.rs`.

use clap::Parser;
use mouse::cli::{self, Args};

fn main() {
    let args = Args::parse();
    std::process::exit(cli::run(args));
}
