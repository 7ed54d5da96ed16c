//! # Rewrite Properties
//!
//! `.properties` support for the rewrite engine: a lossless tree, a nom
//! parser, a printer, visitor dispatch, and recipes that rename keys and
//! change values.

#![warn(clippy::all)]

pub mod parser;
pub mod printer;
pub mod recipes;
pub mod tree;
pub mod visitor;

pub use parser::{parse_properties, PropertiesParseError, PropertiesParser};
pub use recipes::{ChangePropertyKey, ChangePropertyValue};
pub use tree::{Comment, Delimiter, Entry, File, Properties, PropertiesKind, Value};
pub use visitor::PropertiesVisitor;
