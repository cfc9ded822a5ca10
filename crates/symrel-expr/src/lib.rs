//! Sandboxed predicate expressions over token pairs.
//!
//! Relation bodies are opaque source strings in a small expression
//! language. A body references exactly two bindings, `tokenA` and
//! `tokenB`, and evaluates to an untyped [`Value`] (usually a boolean).
//! The language has no ambient capability access: no I/O, no host
//! handles, only the two bindings and a fixed set of string builtins.
//!
//! # Pipeline
//!
//! - [`lexer`] — tokenization with logos
//! - [`parser`] — Pratt parsing into the [`ast`]
//! - [`eval`] — tree-walking evaluation against a token pair
//!
//! Syntax is validated eagerly at definition time via
//! [`Predicate::compile`]; unknown identifiers, unknown functions, and
//! type errors surface only at invocation time.
//!
//! # Example
//!
//! ```
//! use symrel_expr::{Predicate, Value};
//!
//! let predicate = Predicate::compile("starts_with(tokenB, tokenA)").unwrap();
//! assert_eq!(predicate.eval("10", "101").unwrap(), Value::Bool(true));
//! ```

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, Expr};
pub use error::{EvalError, ExprError, ParseError};
pub use eval::Value;
pub use parser::parse;

/// A compiled relation predicate.
///
/// Compilation parses the source without evaluating it; the AST is then
/// evaluated per call against a concrete token pair.
#[derive(Debug, Clone)]
pub struct Predicate {
    ast: Expr,
}

impl Predicate {
    /// Parse `source` into a predicate. Fails on syntax errors only.
    pub fn compile(source: &str) -> Result<Self, ExprError> {
        let ast = parser::parse(source)?;
        Ok(Self { ast })
    }

    /// Evaluate against a token pair, binding `tokenA` and `tokenB`.
    ///
    /// The result is whatever value the expression produced; callers
    /// decide how to present non-boolean results.
    pub fn eval(&self, token_a: &str, token_b: &str) -> Result<Value, ExprError> {
        let value = eval::eval(&self.ast, token_a, token_b)?;
        Ok(value)
    }
}
