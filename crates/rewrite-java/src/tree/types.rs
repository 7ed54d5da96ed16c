//! Type information attached to nodes by the parser's attribution pass.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Void,
    String,
    Null,
}

impl Primitive {
    /// Type keyword, for the primitives that have one
    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Double => "double",
            Primitive::Float => "float",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Short => "short",
            Primitive::Void => "void",
            Primitive::String => "String",
            Primitive::Null => "null",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "char" => Primitive::Char,
            "double" => Primitive::Double,
            "float" => Primitive::Float,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "short" => Primitive::Short,
            "void" => Primitive::Void,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Enum,
    Interface,
    Annotation,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassType {
    pub fully_qualified_name: String,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum JavaType {
    #[default]
    Unknown,
    Primitive(Primitive),
    Class(Arc<ClassType>),
}

impl JavaType {
    pub fn class(fully_qualified_name: impl Into<String>, kind: TypeKind) -> Self {
        JavaType::Class(Arc::new(ClassType {
            fully_qualified_name: fully_qualified_name.into(),
            kind,
        }))
    }

    pub fn fully_qualified_name(&self) -> Option<&str> {
        match self {
            JavaType::Class(class) => Some(&class.fully_qualified_name),
            _ => None,
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, JavaType::Class(class) if class.kind == TypeKind::Enum)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, JavaType::Unknown)
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Unknown => write!(f, "<unknown>"),
            JavaType::Primitive(primitive) => write!(f, "{}", primitive.keyword()),
            JavaType::Class(class) => write!(f, "{}", class.fully_qualified_name),
        }
    }
}

/// Resolved target of a method invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodType {
    pub declaring_type: JavaType,
    pub name: String,
    pub parameter_types: Vec<JavaType>,
}
