// The CLI driver: reads a proof file, parses it, checks it line by line,
// and discharges the file's stated obligations. Progress is reported with
// `println!`, matching the teacher's own CLI (acorn has no logging crate
// either — see DESIGN.md) rather than pulling in `log`/`tracing`.

use std::fs;

use clap::Parser;

use crate::checker;
use crate::context::{self, Context};
use crate::lexer;
use crate::parser::Parser as ProofParser;
use crate::preprocess;
use crate::prop::Prop;

#[derive(Parser)]
#[command(name = "mouse", about = "Checks a natural-deduction proof file")]
pub struct Args {
    /// Path to the proof file. Its first line is a comma-separated list of
    /// obligations; the rest is the proof itself.
    pub input_file: String,
}

/// Runs the full pipeline and returns the process exit code: 0 if every
/// line checked and every obligation was discharged, 1 otherwise.
pub fn run(args: Args) -> i32 {
    let contents = match fs::read_to_string(&args.input_file) {
        Ok(c) => c,
        Err(e) => {
            println!("error reading {}: {}", args.input_file, e);
            return 1;
        }
    };

    let mut raw_lines = contents.lines();
    let obligations_line = match raw_lines.next() {
        Some(l) => l,
        None => {
            println!("input file is empty, expected an obligations line");
            return 1;
        }
    };
    let body_lines: Vec<&str> = raw_lines.collect();

    let obligations = match parse_obligations(obligations_line) {
        Ok(o) => o,
        Err(e) => {
            println!("{}", e);
            return 1;
        }
    };

    let preprocessed = preprocess::preprocess(&body_lines);
    let body = preprocessed.join("\n");

    let mut ctx = Context::new();
    if let Err(e) = parse_and_register(&body, &mut ctx) {
        println!("{}", e);
        return 1;
    }

    let check_result = checker::check_context(&mut ctx, |line, ok| {
        let marker = if ok { "\u{2713}" } else { "\u{2717}" };
        println!("{} {}. {}", marker, line.num, line.typ);
    });
    if let Err(e) = check_result {
        println!("{}", e);
        return 1;
    }

    match context::discharge_obligations(&ctx, &obligations) {
        Ok(sequents) => {
            for sequent in sequents {
                let hyps = sequent
                    .hypotheses
                    .iter()
                    .map(|h| h.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{{{}}} |- {}", hyps, sequent.obligation);
            }
            0
        }
        Err(e) => {
            println!("{}", e);
            1
        }
    }
}

fn parse_obligations(line: &str) -> Result<Vec<Prop>, crate::error::CheckError> {
    let tokens = lexer::lex(line)?;
    let mut parser = ProofParser::new(&tokens);
    parser.parse_obligations()
}

fn parse_and_register(body: &str, ctx: &mut Context) -> Result<(), crate::error::CheckError> {
    let tokens = lexer::lex(body)?;
    let mut parser = ProofParser::new(&tokens);
    parser.parse_proof(ctx)?;
    Ok(())
}
