//! Run-scoped shared state.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Informational message (not an issue)
    Info,
    /// Something went wrong but the run produced a result
    Warning,
    /// A recipe failed on a file
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// One entry in the run's diagnostics sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub recipe: Option<String>,
    pub path: Option<PathBuf>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            recipe: None,
            path: None,
            message: message.into(),
        }
    }

    pub fn with_recipe(mut self, recipe: impl Into<String>) -> Self {
        self.recipe = Some(recipe.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.severity)?;
        if let Some(recipe) = &self.recipe {
            write!(f, " {recipe}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " {}", path.display())?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Shared state for one run: typed messages, a cancellation flag and the
/// diagnostics sink. Every method takes `&self`; workers share the context
/// by reference.
#[derive(Default)]
pub struct ExecutionContext {
    messages: DashMap<String, Arc<dyn Any + Send + Sync>>,
    cancelled: AtomicBool,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_message<V: Any + Send + Sync>(&self, key: impl Into<String>, value: V) {
        self.messages.insert(key.into(), Arc::new(value));
    }

    /// Message stored under `key`, if present and of type `V`
    pub fn get_message<V: Any + Send + Sync>(&self, key: &str) -> Option<Arc<V>> {
        let value = self.messages.get(key)?.value().clone();
        value.downcast::<V>().ok()
    }

    /// Read `key`, storing `init()` first if it is absent. Returns `None`
    /// only when an existing value has a different type.
    pub fn compute_message_if_absent<V: Any + Send + Sync>(
        &self,
        key: &str,
        init: impl FnOnce() -> V,
    ) -> Option<Arc<V>> {
        let entry = self
            .messages
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(init()) as Arc<dyn Any + Send + Sync>)
            .value()
            .clone();
        entry.downcast::<V>().ok()
    }

    pub fn remove_message(&self, key: &str) -> bool {
        self.messages.remove(key).is_some()
    }

    /// Request cooperative cancellation of the run
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn add_diagnostic(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("messages", &self.messages.len())
            .field("cancelled", &self.is_cancelled())
            .field("diagnostics", &self.diagnostics.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_typed_messages() {
        let ctx = ExecutionContext::new();
        ctx.put_message("releases", vec!["8.5".to_string()]);

        assert_eq!(ctx.get_message::<Vec<String>>("releases").map(|v| v.len()), Some(1));
        assert!(ctx.get_message::<u32>("releases").is_none());
        assert!(ctx.get_message::<u32>("missing").is_none());
    }

    #[test]
    fn test_compute_if_absent_runs_once() {
        let ctx = ExecutionContext::new();
        let first = ctx.compute_message_if_absent("cache", || 1u32);
        let second = ctx.compute_message_if_absent("cache", || 2u32);

        assert_eq!(first.as_deref(), Some(&1));
        assert_eq!(second.as_deref(), Some(&1));
    }

    #[test]
    fn test_concurrent_diagnostics() {
        let ctx = ExecutionContext::new();
        (0..64).into_par_iter().for_each(|i| {
            ctx.add_diagnostic(Diagnostic::new(Severity::Info, format!("file {i}")));
            ctx.compute_message_if_absent("shared", || i);
        });

        assert_eq!(ctx.diagnostics().len(), 64);
        assert!(ctx.get_message::<i32>("shared").is_some());
    }

    #[test]
    fn test_cancel_flag() {
        let ctx = ExecutionContext::new();
        assert!(!ctx.is_cancelled());
        ctx.cancel();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::new(Severity::Error, "boom")
            .with_recipe("UnnecessaryParentheses")
            .with_path("src/A.java");
        assert_eq!(diagnostic.to_string(), "[ERROR] UnnecessaryParentheses src/A.java: boom");
    }
}
