use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::marker::Markers;
use crate::source::{FileAttributes, SourceFile};
use crate::tree::{Meta, TreeId};

/// A file whose content lives at a URI.
///
/// The engine never downloads anything; whoever writes results to disk is
/// responsible for fetching `uri`. Printing yields an empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct Remote {
    pub meta: Meta,
    pub source_path: PathBuf,
    pub uri: String,
    pub description: String,
    pub file_attributes: Option<FileAttributes>,
}

impl Remote {
    pub fn new(source_path: impl Into<PathBuf>, uri: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            meta: Meta::new(),
            source_path: source_path.into(),
            uri: uri.into(),
            description: description.into(),
            file_attributes: None,
        }
    }
}

impl SourceFile for Remote {
    fn id(&self) -> TreeId {
        self.meta.id
    }

    fn source_path(&self) -> &Path {
        &self.source_path
    }

    fn charset(&self) -> &str {
        "binary"
    }

    fn markers(&self) -> &Markers {
        &self.meta.markers
    }

    fn file_attributes(&self) -> Option<&FileAttributes> {
        self.file_attributes.as_ref()
    }

    fn with_markers(&self, markers: Markers) -> Arc<dyn SourceFile> {
        Arc::new(Self {
            meta: self.meta.with_markers(markers),
            ..self.clone()
        })
    }

    fn with_source_path(&self, path: PathBuf) -> Arc<dyn SourceFile> {
        Arc::new(Self {
            source_path: path,
            ..self.clone()
        })
    }

    fn print(&self) -> String {
        String::new()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
