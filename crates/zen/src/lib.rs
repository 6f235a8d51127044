#![expect(clippy::cast_possible_truncation, reason = "numeric narrowing is checked at call sites")]
#![expect(clippy::cast_sign_loss, reason = "sign-changing casts are intentional in value coercion")]
#![expect(clippy::cast_possible_wrap, reason = "wrap behavior mirrors the bitwise operator spec")]
#![expect(clippy::too_many_lines, reason = "statement/expression dispatch tables read best as one match")]

mod config;
mod cursor;
mod environment;
mod error;
mod evaluator;
mod executor;
mod function;
mod host;
pub mod interpreter;
mod io;
mod lexer;
mod repl;
mod resource;
mod token;
mod value;

pub use crate::{
    config::RunConfig,
    environment::{ConstReassignment, Environment, Variable},
    error::{HostError, ReplError},
    function::Function,
    host::{Crypto, DefaultCrypto, Fs, Graphics, HostCapabilities, HttpServer, NullGraphics, StdFs, ThreadHttpServer},
    interpreter::Interpreter,
    io::{CollectOutput, NullOutput, OutputSink, StdOut},
    lexer::lex,
    repl::Repl,
    resource::{DEFAULT_MAX_RECURSION_DEPTH, RecursionGuard, ResourceError},
    token::{Token, TokenKind},
    value::{ModuleValue, NUMBER_EQ_TOLERANCE, Value, format_number},
};

/// Runs a complete script against a fresh [`Interpreter`], returning it so
/// callers can inspect bindings afterwards.
#[must_use]
pub fn run_script(source: &str, config: RunConfig) -> Interpreter {
    let mut interp = Interpreter::new(config);
    let tokens = lex(source);
    interp.exec_program(&tokens);
    interp
}
