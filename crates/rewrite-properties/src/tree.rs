//! Lossless tree for `.properties` files.
//!
//! Blank lines and indentation live in the `prefix` of the element that
//! follows them; whatever trails the last element is kept in `File::eof`.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rewrite_core::{FileAttributes, Markers, Meta, SourceFile, Tree, TreeId};

#[derive(Debug, Clone, PartialEq)]
pub enum Properties {
    File(Arc<File>),
    Entry(Arc<Entry>),
    Value(Arc<Value>),
    Comment(Arc<Comment>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertiesKind {
    File,
    Entry,
    Value,
    Comment,
}

impl PropertiesKind {
    pub fn name(self) -> &'static str {
        match self {
            PropertiesKind::File => "File",
            PropertiesKind::Entry => "Entry",
            PropertiesKind::Value => "Value",
            PropertiesKind::Comment => "Comment",
        }
    }
}

/// Separator between key and value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Equals,
    Colon,
    /// `key value`: whitespace alone separates them
    None,
}

impl Delimiter {
    pub fn symbol(self) -> &'static str {
        match self {
            Delimiter::Equals => "=",
            Delimiter::Colon => ":",
            Delimiter::None => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentDelimiter {
    Hash,
    Exclamation,
}

impl CommentDelimiter {
    pub fn symbol(self) -> &'static str {
        match self {
            CommentDelimiter::Hash => "#",
            CommentDelimiter::Exclamation => "!",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub meta: Meta,
    pub source_path: PathBuf,
    pub charset: String,
    pub file_attributes: Option<FileAttributes>,
    /// Entries and comments in file order
    pub content: Vec<Properties>,
    pub eof: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub meta: Meta,
    pub prefix: String,
    /// Key as written, escapes included
    pub key: String,
    pub before_equals: String,
    pub delimiter: Delimiter,
    /// Always a `Properties::Value`
    pub value: Properties,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub meta: Meta,
    pub prefix: String,
    /// Value as written, escapes and line continuations included
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub meta: Meta,
    pub prefix: String,
    pub delimiter: CommentDelimiter,
    pub message: String,
}

impl Properties {
    pub fn kind(&self) -> PropertiesKind {
        match self {
            Properties::File(_) => PropertiesKind::File,
            Properties::Entry(_) => PropertiesKind::Entry,
            Properties::Value(_) => PropertiesKind::Value,
            Properties::Comment(_) => PropertiesKind::Comment,
        }
    }

    fn meta(&self) -> &Meta {
        match self {
            Properties::File(node) => &node.meta,
            Properties::Entry(node) => &node.meta,
            Properties::Value(node) => &node.meta,
            Properties::Comment(node) => &node.meta,
        }
    }

    pub fn id(&self) -> TreeId {
        self.meta().id
    }

    pub fn markers(&self) -> &Markers {
        &self.meta().markers
    }

    pub fn is_same(&self, other: &Properties) -> bool {
        match (self, other) {
            (Properties::File(a), Properties::File(b)) => Arc::ptr_eq(a, b),
            (Properties::Entry(a), Properties::Entry(b)) => Arc::ptr_eq(a, b),
            (Properties::Value(a), Properties::Value(b)) => Arc::ptr_eq(a, b),
            (Properties::Comment(a), Properties::Comment(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn print(&self) -> String {
        let mut out = String::new();
        crate::printer::print_tree(&mut out, self);
        out
    }
}

impl Tree for Properties {
    type Kind = PropertiesKind;

    fn id(&self) -> TreeId {
        Properties::id(self)
    }

    fn kind(&self) -> PropertiesKind {
        Properties::kind(self)
    }

    fn markers(&self) -> &Markers {
        Properties::markers(self)
    }

    fn is_same(&self, other: &Self) -> bool {
        Properties::is_same(self, other)
    }
}

impl From<File> for Properties {
    fn from(node: File) -> Self {
        Properties::File(Arc::new(node))
    }
}

impl From<Entry> for Properties {
    fn from(node: Entry) -> Self {
        Properties::Entry(Arc::new(node))
    }
}

impl From<Value> for Properties {
    fn from(node: Value) -> Self {
        Properties::Value(Arc::new(node))
    }
}

impl From<Comment> for Properties {
    fn from(node: Comment) -> Self {
        Properties::Comment(Arc::new(node))
    }
}

impl Entry {
    /// Text of the value, empty when the value slot holds something else
    pub fn value_text(&self) -> &str {
        match &self.value {
            Properties::Value(value) => &value.text,
            _ => "",
        }
    }
}

impl File {
    pub fn print(&self) -> String {
        let mut out = String::new();
        crate::printer::print_file(&mut out, self);
        out
    }

    /// Entries in file order
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.content.iter().filter_map(|c| match c {
            Properties::Entry(entry) => Some(entry.as_ref()),
            _ => None,
        })
    }

    /// First entry with exactly this key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries().find(|e| e.key == key).map(Entry::value_text)
    }
}

impl SourceFile for File {
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
        Arc::new(File {
            meta: self.meta.with_markers(markers),
            ..self.clone()
        })
    }

    fn with_source_path(&self, path: PathBuf) -> Arc<dyn SourceFile> {
        Arc::new(File {
            source_path: path,
            ..self.clone()
        })
    }

    fn print(&self) -> String {
        File::print(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
