//! Plain text files: the fallback format for anything without a dedicated
//! parser, and the vehicle for generated scripts.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::marker::Markers;
use crate::parser::{parse_failure, Parser, ParserInput};
use crate::source::{FileAttributes, SourceFile};
use crate::tree::{Meta, TreeId};

#[derive(Debug, Clone, PartialEq)]
pub struct PlainText {
    pub meta: Meta,
    pub source_path: PathBuf,
    pub charset: String,
    pub file_attributes: Option<FileAttributes>,
    pub text: String,
}

impl PlainText {
    pub fn new(source_path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            meta: Meta::new(),
            source_path: source_path.into(),
            charset: "UTF-8".to_string(),
            file_attributes: None,
            text: text.into(),
        }
    }

    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    pub fn with_file_attributes(mut self, attributes: FileAttributes) -> Self {
        self.file_attributes = Some(attributes);
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn with_markers_value(mut self, markers: Markers) -> Self {
        self.meta = self.meta.with_markers(markers);
        self
    }
}

impl SourceFile for PlainText {
    fn id(&self) -> TreeId {
        self.meta.id
    }

    fn source_path(&self) -> &Path {
        &self.source_path
    }

    fn charset(&self) -> &str {
        &self.charset
    }

    fn markers(&self) -> &Markers {
        &self.meta.markers
    }

    fn file_attributes(&self) -> Option<&FileAttributes> {
        self.file_attributes.as_ref()
    }

    fn with_markers(&self, markers: Markers) -> Arc<dyn SourceFile> {
        Arc::new(self.clone().with_markers_value(markers))
    }

    fn with_source_path(&self, path: PathBuf) -> Arc<dyn SourceFile> {
        Arc::new(Self {
            source_path: path,
            ..self.clone()
        })
    }

    fn print(&self) -> String {
        self.text.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Accepts any file and keeps its text verbatim
#[derive(Debug, Default, Clone)]
pub struct PlainTextParser;

impl PlainTextParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for PlainTextParser {
    fn name(&self) -> &'static str {
        "text"
    }

    fn accepts(&self, _path: &Path) -> bool {
        true
    }

    fn parse_inputs(&self, inputs: &[ParserInput], _ctx: &ExecutionContext) -> Vec<Arc<dyn SourceFile>> {
        inputs
            .iter()
            .map(|input| match input.text() {
                Ok(text) => Arc::new(PlainText::new(input.path.clone(), text)) as Arc<dyn SourceFile>,
                Err(e) => parse_failure(self.name(), input, format!("not valid UTF-8: {e}")),
            })
            .collect()
    }
}
