//! Interactive chat module
//!
//! Provides a readline-based interface over the session controller.

mod repl;

pub use repl::ChatRepl;
