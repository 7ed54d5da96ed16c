//! Lossless semantic tree for a subset of Java.
//!
//! `J` is a closed sum type. Each variant holds its payload behind an `Arc`,
//! so cloning a subtree is cheap and "nothing changed" is observable by
//! pointer identity (`J::is_same`).

pub mod nodes;
pub mod space;
pub mod types;

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rewrite_core::{Markers, Meta, SourceFile, Tree, TreeId};

pub use nodes::*;
pub use space::{Container, LeftPadded, RightPadded, Space};
pub use types::{ClassType, JavaType, MethodType, Primitive, TypeKind};

macro_rules! java_tree {
    ($($variant:ident),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum J {
            $($variant(Arc<$variant>),)*
        }

        /// Field-less discriminant of [`J`]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum JKind {
            $($variant,)*
        }

        impl J {
            pub fn kind(&self) -> JKind {
                match self {
                    $(J::$variant(_) => JKind::$variant,)*
                }
            }

            pub fn id(&self) -> TreeId {
                match self {
                    $(J::$variant(node) => node.meta.id,)*
                }
            }

            pub fn prefix(&self) -> &Space {
                match self {
                    $(J::$variant(node) => &node.prefix,)*
                }
            }

            /// Same node with a different prefix. Returns `self` unchanged
            /// when the prefix already matches.
            pub fn with_prefix(&self, prefix: Space) -> J {
                match self {
                    $(J::$variant(node) => {
                        if node.prefix == prefix {
                            return self.clone();
                        }
                        J::$variant(Arc::new($variant { prefix, ..(**node).clone() }))
                    })*
                }
            }

            pub fn markers(&self) -> &Markers {
                match self {
                    $(J::$variant(node) => &node.meta.markers,)*
                }
            }

            pub fn with_markers(&self, markers: Markers) -> J {
                match self {
                    $(J::$variant(node) => J::$variant(Arc::new($variant {
                        meta: node.meta.with_markers(markers),
                        ..(**node).clone()
                    })),)*
                }
            }

            pub fn is_same(&self, other: &J) -> bool {
                match (self, other) {
                    $((J::$variant(a), J::$variant(b)) => Arc::ptr_eq(a, b),)*
                    _ => false,
                }
            }
        }

        impl JKind {
            pub fn name(self) -> &'static str {
                match self {
                    $(JKind::$variant => stringify!($variant),)*
                }
            }
        }

        $(
            impl From<$variant> for J {
                fn from(node: $variant) -> J {
                    J::$variant(Arc::new(node))
                }
            }
        )*
    };
}

java_tree! {
    CompilationUnit,
    Package,
    Import,
    ClassDeclaration,
    EnumValueSet,
    EnumValue,
    MethodDeclaration,
    VariableDeclarations,
    NamedVariable,
    Block,
    If,
    Else,
    WhileLoop,
    DoWhileLoop,
    ForLoop,
    ForControl,
    ForEachLoop,
    ForEachControl,
    Return,
    Throw,
    Break,
    Continue,
    Assignment,
    AssignmentOperation,
    Binary,
    Unary,
    Ternary,
    Parentheses,
    ControlParentheses,
    MethodInvocation,
    FieldAccess,
    Identifier,
    Literal,
    NewClass,
    Lambda,
    MemberReference,
    ArrayAccess,
    InstanceOf,
    TypeCast,
    PrimitiveType,
    ArrayType,
    ParameterizedType,
    Empty,
}

impl J {
    /// May appear where a value is expected
    pub fn is_expression(&self) -> bool {
        matches!(
            self.kind(),
            JKind::Assignment
                | JKind::AssignmentOperation
                | JKind::Binary
                | JKind::Unary
                | JKind::Ternary
                | JKind::Parentheses
                | JKind::MethodInvocation
                | JKind::FieldAccess
                | JKind::Identifier
                | JKind::Literal
                | JKind::NewClass
                | JKind::Lambda
                | JKind::MemberReference
                | JKind::ArrayAccess
                | JKind::InstanceOf
                | JKind::TypeCast
        )
    }

    /// May appear as an element of a block
    pub fn is_statement(&self) -> bool {
        matches!(
            self.kind(),
            JKind::ClassDeclaration
                | JKind::EnumValueSet
                | JKind::MethodDeclaration
                | JKind::VariableDeclarations
                | JKind::Block
                | JKind::If
                | JKind::WhileLoop
                | JKind::DoWhileLoop
                | JKind::ForLoop
                | JKind::ForEachLoop
                | JKind::Return
                | JKind::Throw
                | JKind::Break
                | JKind::Continue
                | JKind::Empty
                | JKind::Assignment
                | JKind::AssignmentOperation
                | JKind::Unary
                | JKind::MethodInvocation
                | JKind::NewClass
        )
    }

    /// May appear where a type is expected
    pub fn is_type_tree(&self) -> bool {
        matches!(
            self.kind(),
            JKind::Identifier | JKind::FieldAccess | JKind::PrimitiveType | JKind::ArrayType | JKind::ParameterizedType
        )
    }

    /// Statements that end with `;` when they appear in a block
    pub fn needs_semicolon(&self) -> bool {
        match self {
            J::VariableDeclarations(_)
            | J::Return(_)
            | J::Throw(_)
            | J::Break(_)
            | J::Continue(_)
            | J::DoWhileLoop(_)
            | J::Empty(_)
            | J::Assignment(_)
            | J::AssignmentOperation(_)
            | J::Unary(_)
            | J::MethodInvocation(_)
            | J::NewClass(_) => true,
            J::MethodDeclaration(method) => method.body.is_none(),
            J::EnumValueSet(set) => set.terminated,
            _ => false,
        }
    }

    /// Resolved type of an expression, where attribution found one
    pub fn java_type(&self) -> JavaType {
        match self {
            J::Identifier(ident) => ident.ident_type.clone(),
            J::FieldAccess(access) => access.field_type.clone(),
            J::Literal(literal) => JavaType::Primitive(literal.primitive),
            J::Binary(binary) => binary.binary_type.clone(),
            J::Parentheses(parens) => parens.tree.element.java_type(),
            J::MethodInvocation(_) => JavaType::Unknown,
            J::PrimitiveType(primitive) => JavaType::Primitive(primitive.primitive),
            J::NamedVariable(variable) => variable.var_type.clone(),
            J::ClassDeclaration(class) => class.class_type.clone(),
            _ => JavaType::Unknown,
        }
    }

    /// Simple name of an identifier
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            J::Identifier(ident) => Some(&ident.simple_name),
            _ => None,
        }
    }
}

impl Tree for J {
    type Kind = JKind;

    fn id(&self) -> TreeId {
        J::id(self)
    }

    fn kind(&self) -> JKind {
        J::kind(self)
    }

    fn markers(&self) -> &Markers {
        J::markers(self)
    }

    fn is_same(&self, other: &Self) -> bool {
        J::is_same(self, other)
    }
}

impl Identifier {
    pub fn build(prefix: Space, simple_name: impl Into<String>, ident_type: JavaType) -> J {
        J::from(Identifier {
            meta: Meta::new(),
            prefix,
            simple_name: simple_name.into(),
            ident_type,
        })
    }
}

impl Empty {
    pub fn build(prefix: Space) -> J {
        J::from(Empty {
            meta: Meta::new(),
            prefix,
        })
    }
}

impl CompilationUnit {
    pub fn print(&self) -> String {
        crate::printer::print_compilation_unit(self)
    }

    /// Declared package name, dotted
    pub fn package_name(&self) -> Option<String> {
        let package = self.package.as_ref()?;
        match &package.element {
            J::Package(package) => Some(crate::printer::qualified_name(&package.name)),
            _ => None,
        }
    }
}

impl SourceFile for CompilationUnit {
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

    fn with_markers(&self, markers: Markers) -> Arc<dyn SourceFile> {
        Arc::new(CompilationUnit {
            meta: self.meta.with_markers(markers),
            ..self.clone()
        })
    }

    fn with_source_path(&self, path: PathBuf) -> Arc<dyn SourceFile> {
        Arc::new(CompilationUnit {
            source_path: path,
            ..self.clone()
        })
    }

    fn print(&self) -> String {
        CompilationUnit::print(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_prefix_keeps_identity() {
        let ident = Identifier::build(Space::EMPTY, "a", JavaType::Unknown);
        let same = ident.with_prefix(Space::EMPTY);
        let moved = ident.with_prefix(Space::single_space());

        assert!(same.is_same(&ident));
        assert!(!moved.is_same(&ident));
        assert_eq!(moved.id(), ident.id());
        assert_eq!(moved.prefix().as_str(), " ");
    }

    #[test]
    fn test_structural_equality_ignores_identity() {
        let a = Identifier::build(Space::EMPTY, "a", JavaType::Unknown);
        let b = Identifier::build(Space::EMPTY, "a", JavaType::Unknown);

        assert_eq!(a, b);
        assert!(!a.is_same(&b));
    }

    #[test]
    fn test_shapes() {
        let ident = Identifier::build(Space::EMPTY, "a", JavaType::Unknown);
        let empty = Empty::build(Space::EMPTY);

        assert!(ident.is_expression());
        assert!(ident.is_type_tree());
        assert!(!ident.is_statement());
        assert!(empty.is_statement());
        assert!(!empty.is_expression());
    }
}
