//! Java source parser.
//!
//! Tokenizes with nom recognizers, builds the tree with a recursive-descent
//! grammar, then runs the attribution pass over every unit parsed together.

pub mod attribution;
mod grammar;
pub mod lexer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rewrite_core::parser::parse_failure;
use rewrite_core::{ExecutionContext, Parser, ParserInput, SourceFile};
use tracing::debug;

use crate::printer::qualified_name;
use crate::tree::{CompilationUnit, J};
use attribution::{attribute, TypeTable};
use grammar::Grammar;

/// Error types for Java parsing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JavaParseError {
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },

    #[error("unterminated {what} starting at offset {offset}")]
    Unterminated { what: &'static str, offset: usize },

    #[error("expected {expected} but found '{found}' at offset {offset}")]
    Unexpected {
        expected: String,
        found: String,
        offset: usize,
    },

    #[error("{what} is not supported (offset {offset})")]
    Unsupported { what: String, offset: usize },

    #[error("source is not valid UTF-8")]
    Encoding,

    /// Printing the parsed tree did not reproduce the input
    #[error("printed tree diverges from the input at offset {offset}")]
    PrintMismatch { offset: usize },
}

/// Parse one compilation unit without type attribution.
///
/// The tree is checked to print back to `source` exactly.
pub fn parse_compilation_unit(source: &str) -> Result<CompilationUnit, JavaParseError> {
    let tokens = lexer::tokenize(source)?;
    let mut cu = Grammar::new(tokens).compilation_unit()?;

    let printed = cu.print();
    if printed != source {
        let offset = printed
            .bytes()
            .zip(source.bytes())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| printed.len().min(source.len()));
        return Err(JavaParseError::PrintMismatch { offset });
    }

    cu.source_path = default_source_path(&cu);
    Ok(cu)
}

/// `pkg/dirs/FirstType.java`, the path javac expects for the unit
fn default_source_path(cu: &CompilationUnit) -> PathBuf {
    let mut path = PathBuf::new();
    if let Some(package) = cu.package_name() {
        for segment in package.split('.') {
            path.push(segment);
        }
    }
    let first_type = cu.types.first().and_then(|tree| match tree {
        J::ClassDeclaration(class) => Some(qualified_name(&class.name)),
        _ => None,
    });
    path.push(format!("{}.java", first_type.as_deref().unwrap_or("Unnamed")));
    path
}

/// Parses `.java` inputs together so enum types declared in one file are
/// known to all others
#[derive(Debug, Default, Clone)]
pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse and attribute source strings, using each unit's default path
    pub fn parse_sources(&self, sources: &[&str], ctx: &ExecutionContext) -> Vec<Arc<dyn SourceFile>> {
        let inputs: Vec<ParserInput> = sources
            .iter()
            .map(|source| ParserInput::new(PathBuf::new(), source.as_bytes()))
            .collect();
        self.parse_inputs(&inputs, ctx)
    }
}

impl Parser for JavaParser {
    fn name(&self) -> &'static str {
        "java"
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "java")
    }

    fn parse_inputs(&self, inputs: &[ParserInput], _ctx: &ExecutionContext) -> Vec<Arc<dyn SourceFile>> {
        let parsed: Vec<Result<CompilationUnit, JavaParseError>> = inputs
            .iter()
            .map(|input| {
                let text = input.text().map_err(|_| JavaParseError::Encoding)?;
                let mut cu = parse_compilation_unit(text)?;
                if !input.path.as_os_str().is_empty() {
                    cu.source_path = input.path.clone();
                }
                Ok(cu)
            })
            .collect();

        let units: Vec<&CompilationUnit> = parsed.iter().filter_map(|r| r.as_ref().ok()).collect();
        let table = TypeTable::build(&units);
        debug!(units = units.len(), types = table.len(), "parsed java sources");

        parsed
            .into_iter()
            .zip(inputs)
            .map(|(result, input)| match result {
                Ok(cu) => Arc::new(attribute(&cu, &table)) as Arc<dyn SourceFile>,
                Err(e) => parse_failure(self.name(), input, e.to_string()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rewrite_core::ParseExceptionResult;

    fn round_trip(source: &str) {
        match parse_compilation_unit(source) {
            Ok(cu) => assert_eq!(cu.print(), source),
            Err(e) => panic!("failed to parse: {e}\n{source}"),
        }
    }

    #[test]
    fn test_round_trip_declarations() {
        round_trip(
            "package a.b;\n\nimport java.util.List;\nimport static a.A.FOO;\nimport java.util.*;\n\n/** doc */\n@Deprecated\npublic final class Test extends Base implements Runnable, Comparable<Test> {\n    private static final int X = 1, Y = 2;\n    String[] names;\n\n    Test() {\n        super();\n    }\n\n    public abstract void run() throws Exception;\n\n    static class Inner {}\n}\n",
        );
    }

    #[test]
    fn test_round_trip_enum() {
        round_trip("public enum A { FOO, BAR, BUZ }\n");
        round_trip(
            "enum B {\n    ONE(1),\n    TWO(2),\n    ;\n    private final int n;\n    B(int n) { this.n = n; }\n}\n",
        );
        round_trip("enum C { ; }\n");
    }

    #[test]
    fn test_round_trip_statements() {
        round_trip(
            "class T {\n    void f(int a, String... rest) {\n        int i = 0;\n        if (a > 0) { i++; } else if (a < 0) i--; else ;\n        while ((a = next()) != 0) {}\n        do { a -= 1; } while (a >= 0);\n        for (int j = 0, k = 1; j < 10; j++, k++) continue;\n        for (;;) { break; }\n        for (String s : rest) System.out.println(s);\n        a >>>= 2;\n        a = a >> 1 >>> 2 << 3;\n        return;\n    }\n}\n",
        );
    }

    #[test]
    fn test_round_trip_expressions() {
        round_trip(
            "class T {\n    Object f(Object o, java.util.List<String> xs) {\n        boolean b = !(o instanceof String) && o != null ? true : false;\n        int n = (int) 3.0 + -1 * ~2 % 4;\n        Runnable r = () -> {};\n        java.util.function.Function<String, Integer> len = s -> s.length();\n        xs.forEach((x) -> System.out.println(x));\n        xs.stream().map(String::trim);\n        Object anon = new Object() { public String toString() { return \"x\"; } };\n        char c = 'c';\n        long l = 0xFFL;\n        return xs.get(0)[1];\n    }\n}\n",
        );
    }

    #[test]
    fn test_comments_survive() {
        round_trip("// header\nclass A /* name */ {\n    int x; // trailing\n    /* before } */\n}\n// tail\n");
    }

    #[test]
    fn test_unsupported_constructs_fail_cleanly() {
        assert!(matches!(
            parse_compilation_unit("class A { void f() { switch (x) {} } }"),
            Err(JavaParseError::Unsupported { .. })
        ));
        assert!(matches!(
            parse_compilation_unit("class A<T> {}"),
            Err(JavaParseError::Unsupported { .. })
        ));
        assert!(matches!(
            parse_compilation_unit("class A { void f() { 1 + 2; } }"),
            Err(JavaParseError::Unexpected { .. })
        ));
    }

    #[test]
    fn test_default_source_path() {
        let cu = parse_compilation_unit("package a.b;\nclass Test {}\n").unwrap();
        assert_eq!(cu.source_path, PathBuf::from("a/b/Test.java"));
    }

    #[test]
    fn test_parser_isolates_failures() {
        let ctx = ExecutionContext::new();
        let inputs = vec![
            ParserInput::new("src/Ok.java", "class Ok {}\n"),
            ParserInput::new("src/Bad.java", "class {"),
        ];
        let parsed = JavaParser::new().parse_inputs(&inputs, &ctx);

        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].as_any().is::<CompilationUnit>());
        assert_eq!(parsed[0].source_path(), Path::new("src/Ok.java"));
        assert_eq!(parsed[1].print(), "class {");
        assert!(parsed[1].markers().contains::<ParseExceptionResult>());
    }
}
