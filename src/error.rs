use std::sync::atomic::{AtomicBool, Ordering};

use crate::object::Object;
use crate::token::{Token, Type};

static HAD_ERROR: AtomicBool = AtomicBool::new(false);
static HAD_RUNTIME_ERROR: AtomicBool = AtomicBool::new(false);

/// Checks if a compile-time error (scanner, parser, or resolver) occurred.
pub fn had_error() -> bool {
    HAD_ERROR.load(Ordering::SeqCst)
}

/// Checks if a runtime error occurred while interpreting.
pub fn had_runtime_error() -> bool {
    HAD_RUNTIME_ERROR.load(Ordering::SeqCst)
}

/// Resets the compile-time error flag. Used by the REPL between prompts.
/// `had_runtime_error` is intentionally never reset here: the REPL process
/// continues regardless, but the flag reflects the session as a whole.
pub fn reset_error() {
    HAD_ERROR.store(false, Ordering::SeqCst);
}

/// Every diagnostic type implements this to report itself and flip the
/// matching sink flag.
pub trait Error {
    fn throw(&self);
}

fn location(token: &Token) -> String {
    if token.r#type == Type::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// An error raised while scanning source text into tokens.
#[derive(Debug)]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

impl Error for ScanError {
    fn throw(&self) {
        eprintln!("[line {}] Error: {}", self.line, self.message);
        HAD_ERROR.store(true, Ordering::SeqCst);
    }
}

/// An error raised while parsing a token sequence into statements.
#[derive(Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Error for ParseError {
    fn throw(&self) {
        eprintln!("[line {}] Error{}: {}", self.token.line, location(&self.token), self.message);
        HAD_ERROR.store(true, Ordering::SeqCst);
    }
}

/// A static (pre-evaluation) error raised by the resolver.
#[derive(Debug)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl Error for ResolveError {
    fn throw(&self) {
        eprintln!("[line {}] Error{}: {}", self.token.line, location(&self.token), self.message);
        HAD_ERROR.store(true, Ordering::SeqCst);
    }
}

/// An error raised while evaluating a resolved, syntactically valid program.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Error for RuntimeError {
    fn throw(&self) {
        eprintln!("{}\n[line {}]", self.message, self.token.line);
        HAD_RUNTIME_ERROR.store(true, Ordering::SeqCst);
    }
}

/// The single control-flow channel threaded through statement execution via
/// `?`. `Return` is not an error — the resolver guarantees it can only reach
/// the call frame that should catch it — but sharing one channel with
/// `RuntimeError` lets both unwind nested blocks and loops the same way.
/// Only `RuntimeError` is ever reported to the diagnostic sink.
#[derive(Debug, Clone)]
pub enum Unwind {
    Return(Object),
    RuntimeError(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::RuntimeError(error)
    }
}
