//! # Rewrite Core
//!
//! Core of the source-to-source transformation engine, including:
//! - Lossless Semantic Tree contracts (identity, formatting, markers)
//! - Traversal cursor with a scope-bounded message channel
//! - Visitor plumbing shared by every language
//! - Accumulating option validation (`Validated`)
//! - The recipe contract, execution context and multi-cycle scheduler
//!
//! Language crates (Java, properties, ...) plug their node sets, parsers and
//! printers into these contracts; recipes are written against them.

#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod cursor;
pub mod marker;
pub mod parser;
pub mod paths;
pub mod recipe;
pub mod registry;
pub mod remote;
pub mod scheduler;
pub mod source;
pub mod text;
pub mod tree;
pub mod validated;
pub mod visitor;

// Re-export commonly used types
pub use config::RewriteConfig;
pub use context::{Diagnostic, ExecutionContext, Severity};
pub use cursor::{Cursor, Traversal};
pub use marker::{Marker, Markers, ParseExceptionResult, RecipeFailure, SearchResult};
pub use parser::{Parser, ParserInput};
pub use recipe::{Applicability, ByPath, CompositeRecipe, Recipe, RecipeError, RecipeOption};
pub use registry::{RecipeRegistry, RegistryError};
pub use remote::Remote;
pub use scheduler::{FileResult, RecipeRun, RecipeScheduler, SchedulerError};
pub use source::{downcast, same_file, Corpus, FileAttributes, SourceFile};
pub use text::{PlainText, PlainTextParser};
pub use tree::{Meta, Tree, TreeId};
pub use validated::{Failure, Validated, ValidationError};
pub use visitor::{TreeVisitor, VisitError, VisitResult};

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for rewrite components
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rewrite_core=info"));
    // A subscriber may already be installed by an embedding application.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Error types for engine-level operations
#[derive(thiserror::Error, Debug)]
pub enum RewriteError {
    /// Filesystem error while reading sources or configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be decoded
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// A recipe failed outside of per-file isolation
    #[error(transparent)]
    Recipe(#[from] RecipeError),

    /// The scheduler refused to start a run
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Recipe lookup or construction failed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type for engine-level operations
pub type Result<T> = std::result::Result<T, RewriteError>;
