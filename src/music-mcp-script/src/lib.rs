//! Bounded execution of automation scripts.
//!
//! Every call to the automation layer goes through [`ScriptRunner::run`]:
//! one child process per call, a hard timeout, separate stdout/stderr
//! capture, and a classified [`ExecutionResult`] instead of an error. The
//! runner never parses output; callers decide whether it is JSON or text.
//!
//! Arguments are handed to the interpreter as individual argv entries, never
//! through a shell, so a caller-supplied string cannot become script text.
//! When a value has to be embedded in inline source, use
//! [`applescript_string_literal`].

mod escape;
mod result;
mod runner;

pub use escape::applescript_string_literal;
pub use result::{ExecutionResult, ExitKind};
pub use runner::{DEFAULT_INLINE_FLAG, MAX_OUTPUT_SIZE, OsaScriptRunner, ScriptRef, ScriptRunner};
