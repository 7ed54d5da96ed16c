//! Method matching and read-only searches over Java trees.

use std::cell::Cell;
use std::sync::Arc;

use regex::Regex;
use rewrite_core::{
    downcast, Applicability, ExecutionContext, RecipeError, SourceFile, Traversal, TreeVisitor, VisitResult,
};

use crate::tree::*;
use crate::visitor::{dispatch, walk_method_invocation, JavaVisitor};

const SIGNATURE: &str = r"^\s*([\w.$*]+)\s+([\w$*]+)\s*\(\s*(.*?)\s*\)\s*$";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatcherError {
    #[error("malformed method pattern '{0}': expected 'declaring.Type name(arg.Type, ...)'")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Arguments {
    /// `..` matches any argument list
    Any,
    Exactly(Vec<String>),
}

/// Matches method invocations against a pattern such as
/// `java.lang.Enum equals(java.lang.Object)`.
///
/// `*` matches any declaring type, name or single argument, and `..` any
/// argument list. `java.lang.Enum` matches every enum type and
/// `java.lang.Object` accepts any argument.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodMatcher {
    declaring_type: String,
    name: String,
    arguments: Arguments,
}

impl MethodMatcher {
    pub fn new(declaring_type: &str, name: &str, arguments: &[&str]) -> Self {
        Self {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
            arguments: Arguments::Exactly(arguments.iter().map(|a| a.to_string()).collect()),
        }
    }

    pub fn parse(pattern: &str) -> Result<Self, MatcherError> {
        let re = Regex::new(SIGNATURE).map_err(|_| MatcherError::Malformed(pattern.to_string()))?;
        let captures = re
            .captures(pattern)
            .ok_or_else(|| MatcherError::Malformed(pattern.to_string()))?;
        let group = |i: usize| captures.get(i).map(|m| m.as_str()).unwrap_or_default();

        let arguments = match group(3) {
            ".." => Arguments::Any,
            "" => Arguments::Exactly(Vec::new()),
            list => Arguments::Exactly(list.split(',').map(|a| a.trim().to_string()).collect()),
        };
        Ok(Self {
            declaring_type: group(1).to_string(),
            name: group(2).to_string(),
            arguments,
        })
    }

    pub fn matches(&self, method: &MethodType) -> bool {
        if self.name != "*" && self.name != method.name {
            return false;
        }
        if !self.matches_declaring_type(&method.declaring_type) {
            return false;
        }
        match &self.arguments {
            Arguments::Any => true,
            Arguments::Exactly(expected) => {
                expected.len() == method.parameter_types.len()
                    && expected
                        .iter()
                        .zip(&method.parameter_types)
                        .all(|(pattern, actual)| matches_argument(pattern, actual))
            }
        }
    }

    pub fn matches_invocation(&self, invocation: &MethodInvocation) -> bool {
        invocation.method_type.as_ref().is_some_and(|m| self.matches(m))
    }

    fn matches_declaring_type(&self, declaring: &JavaType) -> bool {
        match self.declaring_type.as_str() {
            "*" => true,
            "java.lang.Enum" if declaring.is_enum() => true,
            expected => declaring.fully_qualified_name() == Some(expected),
        }
    }
}

fn matches_argument(pattern: &str, actual: &JavaType) -> bool {
    match (pattern, actual) {
        ("*", _) | ("java.lang.Object", _) => true,
        ("java.lang.String", JavaType::Primitive(Primitive::String)) => true,
        (_, JavaType::Primitive(primitive)) => primitive.keyword() == pattern,
        (_, JavaType::Class(class)) => class.fully_qualified_name == pattern,
        (_, JavaType::Unknown) => false,
    }
}

/// Read-only search for the first matching invocation
struct FindInvocation<'a> {
    matcher: &'a MethodMatcher,
    found: Cell<bool>,
}

impl TreeVisitor<J, ()> for FindInvocation<'_> {
    fn dispatch(&self, tree: &J, p: &(), cx: &mut Traversal<J>) -> VisitResult<J> {
        if self.found.get() {
            return Ok(tree.clone());
        }
        dispatch(self, tree, p, cx)
    }
}

impl JavaVisitor<()> for FindInvocation<'_> {
    fn visit_method_invocation(&self, node: &Arc<MethodInvocation>, p: &(), cx: &mut Traversal<J>) -> VisitResult<J> {
        if self.matcher.matches_invocation(node) {
            self.found.set(true);
            return Ok(J::MethodInvocation(node.clone()));
        }
        walk_method_invocation(self, node, p, cx)
    }
}

/// Whether `tree` contains an invocation matching `matcher`
pub fn uses_method(tree: &J, matcher: &MethodMatcher) -> VisitResult<bool> {
    let search = FindInvocation {
        matcher,
        found: Cell::new(false),
    };
    search.visit_root(tree, &())?;
    Ok(search.found.get())
}

/// Applicability: Java files invoking a matching method
pub struct UsesMethod {
    matcher: MethodMatcher,
}

impl UsesMethod {
    pub fn new(matcher: MethodMatcher) -> Self {
        Self { matcher }
    }
}

impl Applicability for UsesMethod {
    fn applies_to(&self, source: &Arc<dyn SourceFile>, _ctx: &ExecutionContext) -> Result<bool, RecipeError> {
        let Some(cu) = downcast::<CompilationUnit>(source) else {
            return Ok(false);
        };
        let tree = J::CompilationUnit(cu);
        uses_method(&tree, &self.matcher).map_err(|e| RecipeError::defect("UsesMethod", source.source_path(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(declaring: JavaType, name: &str, parameter_types: Vec<JavaType>) -> MethodType {
        MethodType {
            declaring_type: declaring,
            name: name.to_string(),
            parameter_types,
        }
    }

    #[test]
    fn test_enum_equals() {
        let matcher = MethodMatcher::parse("java.lang.Enum equals(java.lang.Object)").unwrap();
        let enum_type = JavaType::class("a.A", TypeKind::Enum);
        let class_type = JavaType::class("a.B", TypeKind::Class);

        assert!(matcher.matches(&method(enum_type.clone(), "equals", vec![JavaType::Unknown])));
        assert!(!matcher.matches(&method(class_type, "equals", vec![enum_type.clone()])));
        assert!(!matcher.matches(&method(enum_type.clone(), "equals", vec![])));
        assert!(!matcher.matches(&method(enum_type, "hashCode", vec![])));
    }

    #[test]
    fn test_wildcards() {
        let any_args = MethodMatcher::parse("java.util.List add(..)").unwrap();
        let list = JavaType::class("java.util.List", TypeKind::Interface);
        assert!(any_args.matches(&method(list.clone(), "add", vec![])));
        assert!(any_args.matches(&method(list.clone(), "add", vec![JavaType::Primitive(Primitive::Int); 2])));

        let typed = MethodMatcher::parse("* valueOf(int)").unwrap();
        assert!(typed.matches(&method(list.clone(), "valueOf", vec![JavaType::Primitive(Primitive::Int)])));
        assert!(!typed.matches(&method(list, "valueOf", vec![JavaType::Primitive(Primitive::Long)])));
    }

    #[test]
    fn test_parse_matches_new() {
        assert_eq!(
            MethodMatcher::parse("java.lang.Enum equals(java.lang.Object)").unwrap(),
            MethodMatcher::new("java.lang.Enum", "equals", &["java.lang.Object"])
        );
    }

    #[test]
    fn test_malformed() {
        assert_eq!(
            MethodMatcher::parse("equals"),
            Err(MatcherError::Malformed("equals".to_string()))
        );
    }
}
