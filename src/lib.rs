//! Plox is a tree-walk interpreter for Lox, a small dynamically typed scripting
//! language with lexical scoping, first-class functions, and classes.
//!
//! ## Scanning
//! The first step is scanning: turning a string of source characters into a flat list of
//! [tokens](token::Token). The scanner is implemented in the [`scanner`](scanner) module and
//! reports syntax errors (an unterminated string, an unexpected character) as a
//! [`ScanError`](error::ScanError) as soon as they are found, without stopping the scan.
//!
//! ## Parsing
//! The second step is parsing: turning the token list into an abstract syntax tree. The parser
//! in [`parser`](parser) is a recursive descent parser that builds [`Expr`](expr::Expr) nodes
//! (pieces of code that produce an [`Object`](object::Object)) and [`Stmt`](stmt::Stmt) nodes
//! (pieces of code that perform a side effect, like a variable declaration or a loop). Parse
//! errors are reported as a [`ParseError`](error::ParseError); the parser synchronizes at
//! statement boundaries so it can report more than one syntax error per run.
//!
//! ## Resolving
//! The third step is resolving: a static pass over the same tree that binds every local
//! variable reference to a lexical scope depth, ahead of evaluation. The resolver in
//! [`resolver`](resolver) also rejects constructs that are syntactically valid but
//! semantically meaningless, such as a top-level `return` or `this` outside a class body,
//! reporting them as a [`ResolveError`](error::ResolveError).
//!
//! ## Interpreting
//! The final step is interpreting: walking the tree and evaluating each node, implemented in
//! [`interpreter`](interpreter). Errors caught here are semantic rather than syntactic — adding
//! a number to a string, calling something that isn't callable — and are reported as a
//! [`RuntimeError`](error::RuntimeError). Variable bindings live in [`environment`](environment),
//! a chain of scopes threaded through closures.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

const HISTORY_FILE: &str = ".plox_history";

/// The top-level driver: owns the interpreter instance and runs the
/// scan -> parse -> resolve -> interpret pipeline over a source string,
/// either once per file or repeatedly in a REPL.
pub struct Lox {
    interpreter: Interpreter,
}

impl Lox {
    pub fn new() -> Self {
        Lox { interpreter: Interpreter::new() }
    }

    pub fn with_writer<W: Write + 'static>(writer: W) -> Self {
        Lox { interpreter: Interpreter::with_writer(writer) }
    }

    /// Runs a file to completion. Callers should consult [`error::had_error`] and
    /// [`error::had_runtime_error`] afterwards to decide a process exit code; this
    /// function itself never terminates the process.
    pub fn run_file(&mut self, path: &str) -> io::Result<()> {
        let contents = fs::read_to_string(path)?;
        self.run(&contents);
        Ok(())
    }

    /// Runs an interactive prompt until end-of-input (`Ctrl+D`) or interrupt (`Ctrl+C`).
    /// Uses `rustyline` for line editing and history; a failure to load or save the
    /// history file is swallowed, since it is not essential to running the program.
    pub fn run_prompt(&mut self) {
        let mut editor = match rustyline::DefaultEditor::new() {
            Ok(editor) => editor,
            Err(_) => {
                self.run_prompt_plain();
                return;
            }
        };

        let history_path = history_path();
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    self.run(&line);
                    error::reset_error();
                }
                Err(rustyline::error::ReadlineError::Eof) => break,
                Err(rustyline::error::ReadlineError::Interrupted) => break,
                Err(_) => break,
            }
        }

        if let Some(path) = &history_path {
            let _ = editor.save_history(path);
        }
    }

    /// Fallback prompt used when the terminal can't be put in line-editing mode
    /// (e.g. stdin is not a tty). No history, no arrow-key editing.
    fn run_prompt_plain(&mut self) {
        let stdin = io::stdin();
        print!("> ");
        let _ = io::stdout().flush();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            self.run(&line);
            error::reset_error();
            print!("> ");
            let _ = io::stdout().flush();
        }
    }

    fn run(&mut self, source: &str) {
        let tokens = Scanner::new(source).scan_tokens();
        if error::had_error() {
            return;
        }

        let statements = Parser::new(tokens).parse();
        if error::had_error() {
            return;
        }

        Resolver::new(&mut self.interpreter).resolve(&statements);
        if error::had_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

fn history_path() -> Option<PathBuf> {
    home::home_dir().map(|mut home| {
        home.push(HISTORY_FILE);
        home
    })
}

/// Entry point used by `main.rs`: returns the process exit code, following the
/// pipeline's diagnostic flags rather than terminating the process directly.
pub fn run_file(path: &str) -> i32 {
    let mut lox = Lox::new();
    if let Err(err) = lox.run_file(path) {
        eprintln!("Could not read file '{path}': {err}");
        return 74;
    }

    if error::had_error() {
        65
    } else if error::had_runtime_error() {
        70
    } else {
        0
    }
}

pub fn run_prompt() {
    Lox::new().run_prompt();
}

pub const USAGE: &str = "Usage: plox [script]";

/// Prints the usage line and returns the CLI-misuse exit code; `main.rs` is
/// responsible for actually calling `process::exit` with it.
pub fn usage_error() -> i32 {
    println!("{USAGE}");
    64
}
