//! Node payloads. Every node carries its identity and markers in `meta`
//! and the formatting before its first token in `prefix`.

use std::path::PathBuf;

use rewrite_core::Meta;

use super::space::{Container, LeftPadded, RightPadded, Space};
use super::types::{JavaType, MethodType, Primitive};
use super::J;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    Or,
    And,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Addition => "+",
            BinaryOperator::Subtraction => "-",
            BinaryOperator::Multiplication => "*",
            BinaryOperator::Division => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
            BinaryOperator::UnsignedRightShift => ">>>",
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => BinaryOperator::Addition,
            "-" => BinaryOperator::Subtraction,
            "*" => BinaryOperator::Multiplication,
            "/" => BinaryOperator::Division,
            "%" => BinaryOperator::Modulo,
            "<" => BinaryOperator::LessThan,
            ">" => BinaryOperator::GreaterThan,
            "<=" => BinaryOperator::LessThanOrEqual,
            ">=" => BinaryOperator::GreaterThanOrEqual,
            "==" => BinaryOperator::Equal,
            "!=" => BinaryOperator::NotEqual,
            "&" => BinaryOperator::BitAnd,
            "|" => BinaryOperator::BitOr,
            "^" => BinaryOperator::BitXor,
            "<<" => BinaryOperator::LeftShift,
            ">>" => BinaryOperator::RightShift,
            ">>>" => BinaryOperator::UnsignedRightShift,
            "||" => BinaryOperator::Or,
            "&&" => BinaryOperator::And,
            _ => return None,
        })
    }

    /// Binding strength; higher binds tighter. `instanceof` shares the
    /// relational level.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::BitOr => 3,
            BinaryOperator::BitXor => 4,
            BinaryOperator::BitAnd => 5,
            BinaryOperator::Equal | BinaryOperator::NotEqual => 6,
            BinaryOperator::LessThan
            | BinaryOperator::GreaterThan
            | BinaryOperator::LessThanOrEqual
            | BinaryOperator::GreaterThanOrEqual => 7,
            BinaryOperator::LeftShift | BinaryOperator::RightShift | BinaryOperator::UnsignedRightShift => 8,
            BinaryOperator::Addition | BinaryOperator::Subtraction => 9,
            BinaryOperator::Multiplication | BinaryOperator::Division | BinaryOperator::Modulo => 10,
        }
    }
}

pub const INSTANCEOF_PRECEDENCE: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentOperator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    UnsignedRightShift,
}

impl AssignmentOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignmentOperator::Addition => "+=",
            AssignmentOperator::Subtraction => "-=",
            AssignmentOperator::Multiplication => "*=",
            AssignmentOperator::Division => "/=",
            AssignmentOperator::Modulo => "%=",
            AssignmentOperator::BitAnd => "&=",
            AssignmentOperator::BitOr => "|=",
            AssignmentOperator::BitXor => "^=",
            AssignmentOperator::LeftShift => "<<=",
            AssignmentOperator::RightShift => ">>=",
            AssignmentOperator::UnsignedRightShift => ">>>=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+=" => AssignmentOperator::Addition,
            "-=" => AssignmentOperator::Subtraction,
            "*=" => AssignmentOperator::Multiplication,
            "/=" => AssignmentOperator::Division,
            "%=" => AssignmentOperator::Modulo,
            "&=" => AssignmentOperator::BitAnd,
            "|=" => AssignmentOperator::BitOr,
            "^=" => AssignmentOperator::BitXor,
            "<<=" => AssignmentOperator::LeftShift,
            ">>=" => AssignmentOperator::RightShift,
            ">>>=" => AssignmentOperator::UnsignedRightShift,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
    Positive,
    Negative,
    Complement,
    Not,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::PreIncrement | UnaryOperator::PostIncrement => "++",
            UnaryOperator::PreDecrement | UnaryOperator::PostDecrement => "--",
            UnaryOperator::Positive => "+",
            UnaryOperator::Negative => "-",
            UnaryOperator::Complement => "~",
            UnaryOperator::Not => "!",
        }
    }

    pub fn is_prefix(self) -> bool {
        !matches!(self, UnaryOperator::PostIncrement | UnaryOperator::PostDecrement)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Enum,
    Interface,
}

impl ClassKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Enum => "enum",
            ClassKind::Interface => "interface",
        }
    }
}

/// A modifier keyword or an annotation, kept as source text
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    pub prefix: Space,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub meta: Meta,
    pub prefix: Space,
    pub source_path: PathBuf,
    pub charset: String,
    pub package: Option<RightPadded<J>>,
    pub imports: Vec<RightPadded<J>>,
    pub types: Vec<J>,
    pub eof: Space,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub meta: Meta,
    pub prefix: Space,
    pub name: J,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub meta: Meta,
    pub prefix: Space,
    /// Space before `static`, for static imports
    pub static_keyword: Option<Space>,
    pub qualid: J,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub meta: Meta,
    pub prefix: Space,
    pub modifiers: Vec<Modifier>,
    pub kind_prefix: Space,
    pub kind: ClassKind,
    pub name: J,
    pub extends: Option<LeftPadded<J>>,
    pub implements: Option<Container<J>>,
    pub body: J,
    pub class_type: JavaType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueSet {
    pub meta: Meta,
    pub prefix: Space,
    pub enums: Vec<RightPadded<J>>,
    pub trailing_comma: bool,
    pub terminated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub meta: Meta,
    pub prefix: Space,
    pub name: J,
    pub arguments: Option<Container<J>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub meta: Meta,
    pub prefix: Space,
    pub modifiers: Vec<Modifier>,
    /// Absent for constructors
    pub return_type: Option<J>,
    pub name: J,
    pub parameters: Container<J>,
    pub throws: Option<Container<J>>,
    pub body: Option<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarations {
    pub meta: Meta,
    pub prefix: Space,
    pub modifiers: Vec<Modifier>,
    /// Absent for untyped lambda parameters
    pub type_expr: Option<J>,
    pub varargs: Option<Space>,
    pub vars: Vec<RightPadded<J>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedVariable {
    pub meta: Meta,
    pub prefix: Space,
    pub name: J,
    pub initializer: Option<LeftPadded<J>>,
    pub var_type: JavaType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub meta: Meta,
    pub prefix: Space,
    pub statements: Vec<RightPadded<J>>,
    pub end: Space,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub meta: Meta,
    pub prefix: Space,
    pub condition: J,
    pub then_part: RightPadded<J>,
    pub else_part: Option<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Else {
    pub meta: Meta,
    pub prefix: Space,
    pub body: RightPadded<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileLoop {
    pub meta: Meta,
    pub prefix: Space,
    pub condition: J,
    pub body: RightPadded<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileLoop {
    pub meta: Meta,
    pub prefix: Space,
    pub body: RightPadded<J>,
    pub while_condition: LeftPadded<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub meta: Meta,
    pub prefix: Space,
    pub control: J,
    pub body: RightPadded<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForControl {
    pub meta: Meta,
    pub prefix: Space,
    pub init: Vec<RightPadded<J>>,
    pub condition: RightPadded<J>,
    pub update: Vec<RightPadded<J>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForEachLoop {
    pub meta: Meta,
    pub prefix: Space,
    pub control: J,
    pub body: RightPadded<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForEachControl {
    pub meta: Meta,
    pub prefix: Space,
    pub variable: RightPadded<J>,
    pub iterable: RightPadded<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub meta: Meta,
    pub prefix: Space,
    pub expression: Option<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Throw {
    pub meta: Meta,
    pub prefix: Space,
    pub exception: J,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Break {
    pub meta: Meta,
    pub prefix: Space,
    pub label: Option<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Continue {
    pub meta: Meta,
    pub prefix: Space,
    pub label: Option<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub meta: Meta,
    pub prefix: Space,
    pub variable: J,
    pub assignment: LeftPadded<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOperation {
    pub meta: Meta,
    pub prefix: Space,
    pub variable: J,
    pub operator: LeftPadded<AssignmentOperator>,
    pub assignment: J,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub meta: Meta,
    pub prefix: Space,
    pub left: J,
    pub operator: LeftPadded<BinaryOperator>,
    pub right: J,
    pub binary_type: JavaType,
}

/// `operator.before` is only printed for postfix operators
#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub meta: Meta,
    pub prefix: Space,
    pub operator: LeftPadded<UnaryOperator>,
    pub expression: J,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ternary {
    pub meta: Meta,
    pub prefix: Space,
    pub condition: J,
    pub true_part: LeftPadded<J>,
    pub false_part: LeftPadded<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parentheses {
    pub meta: Meta,
    pub prefix: Space,
    pub tree: RightPadded<J>,
}

/// Parentheses required by the syntax of `if`, `while`, `do` and casts
#[derive(Debug, Clone, PartialEq)]
pub struct ControlParentheses {
    pub meta: Meta,
    pub prefix: Space,
    pub tree: RightPadded<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInvocation {
    pub meta: Meta,
    pub prefix: Space,
    pub select: Option<RightPadded<J>>,
    pub name: J,
    pub arguments: Container<J>,
    pub method_type: Option<MethodType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccess {
    pub meta: Meta,
    pub prefix: Space,
    pub target: J,
    pub name: LeftPadded<J>,
    pub field_type: JavaType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub meta: Meta,
    pub prefix: Space,
    pub simple_name: String,
    pub ident_type: JavaType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub meta: Meta,
    pub prefix: Space,
    pub value_source: String,
    pub primitive: Primitive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClass {
    pub meta: Meta,
    pub prefix: Space,
    pub clazz: J,
    pub arguments: Container<J>,
    pub body: Option<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaParameters {
    pub parenthesized: bool,
    pub params: Vec<RightPadded<J>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub meta: Meta,
    pub prefix: Space,
    pub parameters: LambdaParameters,
    pub arrow: Space,
    pub body: J,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberReference {
    pub meta: Meta,
    pub prefix: Space,
    pub containing: J,
    pub reference: LeftPadded<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccess {
    pub meta: Meta,
    pub prefix: Space,
    pub indexed: J,
    pub open: Space,
    pub index: RightPadded<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceOf {
    pub meta: Meta,
    pub prefix: Space,
    pub expression: RightPadded<J>,
    pub clazz: J,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeCast {
    pub meta: Meta,
    pub prefix: Space,
    /// `ControlParentheses` around the target type
    pub clazz: J,
    pub expression: J,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveType {
    pub meta: Meta,
    pub prefix: Space,
    pub primitive: Primitive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub meta: Meta,
    pub prefix: Space,
    pub element_type: J,
    pub open: Space,
    pub close: Space,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedType {
    pub meta: Meta,
    pub prefix: Space,
    pub clazz: J,
    pub type_parameters: Container<J>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Empty {
    pub meta: Meta,
    pub prefix: Space,
}
