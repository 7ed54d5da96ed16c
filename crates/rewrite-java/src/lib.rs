//! # Rewrite Java
//!
//! Java support for the rewrite engine:
//! - Lossless semantic tree covering a practical subset of Java
//! - Parser with light type attribution across every unit parsed together
//! - Printer that reproduces unmodified sources byte for byte
//! - `JavaVisitor` dispatch with identity-preserving default walks
//! - Cleanup recipes built on cursor messages and delegated local edits

#![warn(clippy::all)]

pub mod parser;
pub mod printer;
pub mod recipes;
pub mod search;
pub mod tree;
pub mod visitor;

pub use parser::{parse_compilation_unit, JavaParseError, JavaParser};
pub use printer::ToSource;
pub use recipes::{
    CompareEnumsWithEqualityOperator, UnnecessaryParentheses, UnnecessaryParenthesesStyle, UnwrapParentheses,
};
pub use search::{MethodMatcher, UsesMethod};
pub use tree::{CompilationUnit, JKind, JavaType, J};
pub use visitor::JavaVisitor;
