// NScript Interpreter Library
//
// Core of the NScript console language: one line in, one value or one
// positioned error out. The line editor and the device services live
// outside the core and are reached through the `host` module.

// Public modules
pub mod ast;
pub mod builtins;
pub mod error;
pub mod evaluator;
pub mod host;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{Callee, Expr};
pub use error::{NsError, Span};
pub use evaluator::{Environment, Evaluator};
pub use host::{Host, StdHost};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::Parser;
pub use value::Value;

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;
