//! A small interactive command interpreter.
//!
//! Each input line is split into words, rewritten by alias, variable and
//! filesystem-pattern expansion, and then run either as a builtin inside this
//! process or as an external program. External programs run in the foreground,
//! or in the background when the line ends in `&`, in which case they are tracked
//! in a job table and reaped asynchronously as they exit.
//!
//! The main entry point is [`Interpreter`]. The public modules expose the pieces
//! it is built from, for embedding or for implementing your own commands.

pub mod alias;
mod builtin;
pub mod command;
pub mod config;
pub mod display;
pub mod env;
pub mod error;
pub mod expand;
mod external;
pub mod history;
mod interpreter;
pub mod jobs;
pub mod lexer;
pub mod signals;
pub mod state;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;

/// Prefix of every diagnostic the interpreter prints.
pub const SHELL_NAME: &str = "mysh";
