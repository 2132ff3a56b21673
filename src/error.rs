//! Error types raised by the compiler proper.
//!
//! The emitted parser's own `SyntaxError` is a runtime concern of the
//! generated source (see `emit::runtime`), not a type in this crate —
//! this module only covers failures that can happen while compiling a
//! grammar into parser source text.

use thiserror::Error;

/// Failure from the template formatter (`template::format`): an
/// interpolation referenced a variable that wasn't supplied, or applied a
/// filter the formatter doesn't know about.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("undefined template variable `{0}`")]
    UndefinedVariable(String),

    #[error("unknown template filter `{0}`")]
    UnknownFilter(String),
}

/// Failure from `compile`.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A bug in the emitter's own templates — always fatal, never caused
    /// by the input grammar.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// `CompileOptions::start_rules` was non-empty but named no rule
    /// present in the grammar.
    #[error("no requested start rule exists in the grammar: {requested:?}")]
    NoStartRule { requested: Vec<String> },
}
