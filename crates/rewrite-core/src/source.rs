use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::marker::Markers;
use crate::tree::TreeId;

/// Root node of one file, independent of its language.
///
/// Concrete file formats implement this so a corpus can mix them. Every
/// `with_*` method returns a new instance that keeps the file's id.
pub trait SourceFile: Send + Sync + fmt::Debug + 'static {
    fn id(&self) -> TreeId;

    /// Path relative to the project root
    fn source_path(&self) -> &Path;

    fn charset(&self) -> &str;

    fn markers(&self) -> &Markers;

    fn file_attributes(&self) -> Option<&FileAttributes> {
        None
    }

    fn with_markers(&self, markers: Markers) -> Arc<dyn SourceFile>;

    fn with_source_path(&self, path: PathBuf) -> Arc<dyn SourceFile>;

    /// Reprint the file. Untouched subtrees reproduce their input bytes.
    fn print(&self) -> String;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Ordered list of source files under transformation in one run.
///
/// Shared behind an `Arc` so "nothing changed" can be reported by handing
/// back the same allocation.
pub type Corpus = Arc<Vec<Arc<dyn SourceFile>>>;

/// Reference identity between two source file handles
pub fn same_file(a: &Arc<dyn SourceFile>, b: &Arc<dyn SourceFile>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Recover the concrete type of a source file, keeping the same allocation
pub fn downcast<S: SourceFile>(source: &Arc<dyn SourceFile>) -> Option<Arc<S>> {
    source.clone().into_any().downcast::<S>().ok()
}

/// Filesystem attributes carried by generated or parsed files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttributes {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub readable: bool,
    pub writable: bool,
    pub executable: bool,
    pub size: u64,
}

impl FileAttributes {
    /// Attributes for a file synthesized during this run
    pub fn generated(executable: bool) -> Self {
        let now = Utc::now();
        Self {
            created: now,
            modified: now,
            readable: true,
            writable: true,
            executable,
            size: 1,
        }
    }
}
