//! The Meow driver: dispatches between REPL and file-run modes and prints
//! errors to stdout. The core pipeline (lexer/parser/interpreter) knows
//! nothing about argv, stdin, or process exit codes — spec.md 1 calls this
//! out explicitly as a thin collaborator.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use log::{debug, error};

use meow::interpreter::Interpreter;
use meow::lexer::Lexer;
use meow::parser::Parser;

fn main() -> ExitCode {
    simple_logger::init_with_level(log::Level::Warn).expect("logger init is infallible at process start");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {
            run_prompt();
            ExitCode::SUCCESS
        }
        [path] => {
            if run_file(path) {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(70)
            }
        }
        _ => {
            println!("Usage: meow [script]");
            ExitCode::from(64)
        }
    }
}

fn run_file(path: &str) -> bool {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            println!("Error: could not read '{path}': {e}");
            return false;
        }
    };
    let mut interpreter = Interpreter::new();
    run(&mut interpreter, &source)
}

/// A single interpreter persists across the whole REPL session, so bindings
/// made on one line are visible on the next (spec.md 9 "A REPL driver may
/// keep a single evaluator across lines to preserve bindings").
fn run_prompt() {
    let stdin = io::stdin();
    let mut interpreter = Interpreter::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {
                if !line.trim().is_empty() {
                    run(&mut interpreter, &line);
                }
            }
            Err(e) => {
                error!("failed to read a line from stdin: {e}");
                break;
            }
        }
    }
}

/// Runs one complete program through lex -> parse -> interpret, printing
/// any error to stdout with the `Error: ` prefix (spec.md 6). Returns
/// whether the run completed without error.
fn run(interpreter: &mut Interpreter, source: &str) -> bool {
    let tokens = match Lexer::new(source).scan_tokens() {
        Ok(tokens) => tokens,
        Err(e) => {
            println!("Error: {e}");
            return false;
        }
    };
    debug!("scanned {} tokens", tokens.len());

    let (statements, parse_errors) = Parser::new(tokens).parse();
    if !parse_errors.is_empty() {
        // The parser synchronizes past a bad declaration and keeps going
        // (spec.md 4.2), so a single run can collect several syntax errors.
        for e in &parse_errors {
            println!("Error: {e}");
        }
        return false;
    }

    match interpreter.interpret(&statements) {
        Ok(()) => true,
        Err(e) => {
            println!("Error: {e}");
            false
        }
    }
}
