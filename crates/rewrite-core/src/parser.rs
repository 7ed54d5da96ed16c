//! Boundary between raw bytes and source files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::context::ExecutionContext;
use crate::marker::{Markers, ParseExceptionResult};
use crate::source::SourceFile;
use crate::text::PlainText;

/// Raw input handed to a parser
#[derive(Debug, Clone)]
pub struct ParserInput {
    pub path: PathBuf,
    pub source: Vec<u8>,
}

impl ParserInput {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Decode as UTF-8, the only charset parsers accept
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.source)
    }
}

/// Trait for all source parsers.
///
/// Parsing never fails past this boundary: inputs that cannot be parsed come
/// back as a source file carrying a [`ParseExceptionResult`] marker.
pub trait Parser: Send + Sync {
    /// Get parser name for diagnostics
    fn name(&self) -> &'static str;

    /// Whether this parser handles files at `path`
    fn accepts(&self, path: &Path) -> bool;

    /// Parse every input, in order. Inputs are parsed together so a parser
    /// can share information (e.g. type declarations) between them.
    fn parse_inputs(&self, inputs: &[ParserInput], ctx: &ExecutionContext) -> Vec<Arc<dyn SourceFile>>;
}

/// Error-marked stand-in for an input a parser rejected.
///
/// The original text is kept so the file still prints back unchanged.
pub fn parse_failure(parser: &str, input: &ParserInput, message: impl Into<String>) -> Arc<dyn SourceFile> {
    let message = message.into();
    warn!(parser, path = %input.path.display(), %message, "failed to parse source file");
    let text = String::from_utf8_lossy(&input.source).into_owned();
    let markers = Markers::empty().add(ParseExceptionResult::new(parser, message));
    Arc::new(PlainText::new(input.path.clone(), text).with_markers_value(markers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_keeps_text() {
        let input = ParserInput::new("Broken.java", "class {");
        let failed = parse_failure("java", &input, "expected identifier");

        assert_eq!(failed.print(), "class {");
        let marker = failed.markers().find_first::<ParseExceptionResult>();
        assert_eq!(marker.map(|m| m.message.as_str()), Some("expected identifier"));
    }
}
