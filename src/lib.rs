//! # packrat
//!
//! A PEG grammar compiler core: two AST passes and a tree-walking emitter
//! that turns a grammar into the source text of a standalone, memoizing
//! (packrat) recursive-descent parser.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! compile   → pipeline entry point (proxy -> stack_depth -> emit)
//!   ↓
//! emit      → operator snippets, rule wrapper, grammar scaffold
//!   ↓
//! passes    → proxy-rule elimination, stack-depth annotation
//!   ↓
//! visitor   → the exhaustive-dispatch trait passes and emit both implement
//!   ↓
//! template  → named-variable string formatter used while emitting
//!   ↓
//! ast       → the grammar data model
//! ```

// ============================================================================
// MODULES (dependency order: ast → template → visitor → passes → emit → compile)
// ============================================================================

/// The grammar AST: expression nodes, rules, and the top-level grammar.
pub mod ast;

/// Error types raised while compiling (not the generated parser's own).
pub mod error;

/// The named-variable template formatter used throughout `emit`.
pub mod template;

/// The exhaustive-dispatch trait `passes` and `emit` both implement.
pub mod visitor;

/// AST-to-AST passes: proxy-rule elimination and stack-depth annotation.
pub mod passes;

/// AST-to-source emission: operator snippets, rule wrapper, grammar scaffold.
pub mod emit;

/// The pipeline entry point tying the passes and the emitter together.
pub mod compile;

pub use ast::{ClassPart, Expr, ExprKind, Grammar, Initializer, Rule};
pub use compile::{compile, CompileOptions};
pub use error::{CompileError, TemplateError};
