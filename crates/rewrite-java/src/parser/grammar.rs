//! Recursive-descent grammar over the token stream.
//!
//! Each node starts by taking the prefix of its first token
//! (`take_prefix`), so the space before a construct lives on the outermost
//! node that begins there. Left-recursive constructs (binary operators,
//! selects, postfix operators) are built after their leftmost operand and
//! hoist that operand's prefix instead.
//!
//! Ambiguities a full Java parser settles with types (casts, local variable
//! declarations, lambdas) are resolved with bounded token lookahead.

use std::path::PathBuf;

use rewrite_core::Meta;

use super::lexer::{Token, TokenKind};
use super::JavaParseError;
use crate::tree::*;

type ParseResult<T> = Result<T, JavaParseError>;

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "native",
    "synchronized",
    "transient",
    "volatile",
    "strictfp",
    "default",
];

const UNSUPPORTED_STATEMENTS: &[&str] =
    &["switch", "try", "synchronized", "assert", "case", "catch", "finally", "goto"];

const RESERVED: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "try",
    "void",
    "volatile",
    "while",
    "true",
    "false",
    "null",
];

fn is_name(token: &Token) -> bool {
    token.kind == TokenKind::Ident && !RESERVED.contains(&token.text.as_str())
}

fn primitive_keyword(token: &Token) -> Option<Primitive> {
    if token.kind == TokenKind::Ident {
        Primitive::from_keyword(&token.text)
    } else {
        None
    }
}

fn is_op(token: Option<&Token>, op: &str) -> bool {
    token.is_some_and(|t| t.kind == TokenKind::Operator && t.text == op)
}

/// Move the prefix of `tree` out so an enclosing node can own it
fn hoist(tree: J) -> (Space, J) {
    let prefix = tree.prefix().clone();
    (prefix, tree.with_prefix(Space::EMPTY))
}

pub(crate) struct Grammar {
    tokens: Vec<Token>,
    pos: usize,
}

impl Grammar {
    /// `tokens` must end with an `Eof` token, as `tokenize` guarantees
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn last(&self) -> usize {
        self.tokens.len().saturating_sub(1)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.last())]
    }

    fn peek_at(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    fn at_op(&self, op: &str) -> bool {
        is_op(Some(self.peek()), op)
    }

    fn op_at(&self, n: usize, op: &str) -> bool {
        is_op(self.peek_at(n), op)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Ident && token.text == keyword
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn at_type_keyword(&self) -> bool {
        self.at_keyword("class") || self.at_keyword("enum") || self.at_keyword("interface")
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.last() {
            self.pos += 1;
        }
        token
    }

    /// Detach the prefix of the next token for the node starting there
    fn take_prefix(&mut self) -> Space {
        let index = self.pos.min(self.last());
        Space::format(std::mem::take(&mut self.tokens[index].prefix))
    }

    fn expect_op(&mut self, op: &str) -> ParseResult<Space> {
        if self.at_op(op) {
            Ok(Space::format(self.bump().prefix))
        } else {
            Err(self.unexpected(format!("'{op}'")))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> ParseResult<Space> {
        if self.at_keyword(keyword) {
            Ok(Space::format(self.bump().prefix))
        } else {
            Err(self.unexpected(format!("'{keyword}'")))
        }
    }

    fn unexpected(&self, expected: impl Into<String>) -> JavaParseError {
        let token = self.peek();
        JavaParseError::Unexpected {
            expected: expected.into(),
            found: if token.kind == TokenKind::Eof {
                "end of file".to_string()
            } else {
                token.text.clone()
            },
            offset: token.offset,
        }
    }

    fn unsupported(&self, what: &str) -> JavaParseError {
        JavaParseError::Unsupported {
            what: what.to_string(),
            offset: self.peek().offset,
        }
    }

    fn identifier(&mut self) -> ParseResult<J> {
        if !is_name(self.peek()) {
            return Err(self.unexpected("identifier"));
        }
        let token = self.bump();
        Ok(Identifier::build(Space::format(token.prefix), token.text, JavaType::Unknown))
    }

    /// Member name after `.` or `::`, where keywords such as `class` or
    /// `new` are legal
    fn member_name(&mut self) -> ParseResult<J> {
        if self.peek().kind != TokenKind::Ident {
            return Err(self.unexpected("member name"));
        }
        let token = self.bump();
        Ok(Identifier::build(Space::format(token.prefix), token.text, JavaType::Unknown))
    }

    pub fn compilation_unit(&mut self) -> ParseResult<CompilationUnit> {
        let package = if self.at_keyword("package") {
            let prefix = self.take_prefix();
            self.expect_keyword("package")?;
            let name = self.qualified_name(false)?;
            let after = self.expect_op(";")?;
            Some(RightPadded::new(
                Package {
                    meta: Meta::new(),
                    prefix,
                    name,
                }
                .into(),
                after,
            ))
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.at_keyword("import") {
            let prefix = self.take_prefix();
            self.expect_keyword("import")?;
            let static_keyword = if self.at_keyword("static") {
                Some(Space::format(self.bump().prefix))
            } else {
                None
            };
            let qualid = self.qualified_name(true)?;
            let after = self.expect_op(";")?;
            imports.push(RightPadded::new(
                Import {
                    meta: Meta::new(),
                    prefix,
                    static_keyword,
                    qualid,
                }
                .into(),
                after,
            ));
        }

        let mut types = Vec::new();
        while !self.at_eof() {
            let prefix = self.take_prefix();
            let modifiers = self.modifiers()?;
            if !self.at_type_keyword() {
                return Err(self.unexpected("class, enum or interface declaration"));
            }
            types.push(self.class_declaration(prefix, modifiers)?);
        }
        let eof = Space::format(self.bump().prefix);

        Ok(CompilationUnit {
            meta: Meta::new(),
            prefix: Space::EMPTY,
            source_path: PathBuf::new(),
            charset: "UTF-8".to_string(),
            package,
            imports,
            types,
            eof,
        })
    }

    fn qualified_name(&mut self, allow_star: bool) -> ParseResult<J> {
        let mut name = self.identifier()?;
        while self.at_op(".") {
            let before = self.expect_op(".")?;
            let segment = if allow_star && self.at_op("*") {
                let token = self.bump();
                Identifier::build(Space::format(token.prefix), "*", JavaType::Unknown)
            } else {
                self.identifier()?
            };
            let (prefix, target) = hoist(name);
            name = FieldAccess {
                meta: Meta::new(),
                prefix,
                target,
                name: LeftPadded::new(before, segment),
                field_type: JavaType::Unknown,
            }
            .into();
        }
        Ok(name)
    }

    fn modifiers(&mut self) -> ParseResult<Vec<Modifier>> {
        let mut modifiers = Vec::new();
        loop {
            if self.at_op("@") {
                if self.peek_at(1).is_some_and(|t| t.text == "interface") {
                    return Err(self.unsupported("annotation type declaration"));
                }
                modifiers.push(self.annotation()?);
            } else if self.peek().kind == TokenKind::Ident
                && MODIFIERS.contains(&self.peek().text.as_str())
                && !(self.at_keyword("default") && self.op_at(1, ":"))
            {
                let token = self.bump();
                modifiers.push(Modifier {
                    prefix: Space::format(token.prefix),
                    text: token.text,
                });
            } else {
                return Ok(modifiers);
            }
        }
    }

    /// Annotations are kept verbatim as modifier text
    fn annotation(&mut self) -> ParseResult<Modifier> {
        let at = self.bump();
        let mut text = at.text;
        let push = |text: &mut String, token: Token| {
            text.push_str(&token.prefix);
            text.push_str(&token.text);
        };

        if self.peek().kind != TokenKind::Ident {
            return Err(self.unexpected("annotation name"));
        }
        let name = self.bump();
        push(&mut text, name);
        while self.at_op(".") && self.peek_at(1).is_some_and(|t| t.kind == TokenKind::Ident) {
            let dot = self.bump();
            push(&mut text, dot);
            let segment = self.bump();
            push(&mut text, segment);
        }

        if self.at_op("(") {
            let mut depth = 0usize;
            loop {
                if self.at_eof() {
                    return Err(self.unexpected("')'"));
                }
                let token = self.bump();
                let closes = token.kind == TokenKind::Operator && token.text == ")";
                if token.kind == TokenKind::Operator && token.text == "(" {
                    depth += 1;
                } else if closes {
                    depth -= 1;
                }
                push(&mut text, token);
                if closes && depth == 0 {
                    break;
                }
            }
        }

        Ok(Modifier {
            prefix: Space::format(at.prefix),
            text,
        })
    }

    fn class_declaration(&mut self, prefix: Space, modifiers: Vec<Modifier>) -> ParseResult<J> {
        let kind = match self.peek().text.as_str() {
            "class" => ClassKind::Class,
            "enum" => ClassKind::Enum,
            "interface" => ClassKind::Interface,
            _ => return Err(self.unexpected("class, enum or interface")),
        };
        let kind_prefix = Space::format(self.bump().prefix);
        let name = self.identifier()?;
        if self.at_op("<") {
            return Err(self.unsupported("generic type declaration"));
        }

        let mut extends = None;
        let mut implements = None;
        if self.at_keyword("extends") {
            let before = Space::format(self.bump().prefix);
            if kind == ClassKind::Interface {
                implements = Some(Container::new(before, self.type_list()?));
            } else {
                extends = Some(LeftPadded::new(before, self.type_tree()?));
            }
        }
        if self.at_keyword("implements") {
            let before = Space::format(self.bump().prefix);
            implements = Some(Container::new(before, self.type_list()?));
        }
        if self.at_keyword("permits") {
            return Err(self.unsupported("sealed type"));
        }

        let body = self.class_body(kind)?;
        Ok(ClassDeclaration {
            meta: Meta::new(),
            prefix,
            modifiers,
            kind_prefix,
            kind,
            name,
            extends,
            implements,
            body,
            class_type: JavaType::Unknown,
        }
        .into())
    }

    fn type_list(&mut self) -> ParseResult<Vec<RightPadded<J>>> {
        let mut elements = Vec::new();
        loop {
            let element = self.type_tree()?;
            if self.at_op(",") {
                let after = self.expect_op(",")?;
                elements.push(RightPadded::new(element, after));
            } else {
                elements.push(RightPadded::build(element));
                return Ok(elements);
            }
        }
    }

    fn class_body(&mut self, kind: ClassKind) -> ParseResult<J> {
        let prefix = self.take_prefix();
        self.expect_op("{")?;
        let mut statements = Vec::new();
        if kind == ClassKind::Enum && !self.at_op("}") {
            statements.push(self.enum_values()?);
        }
        while !self.at_op("}") {
            if self.at_eof() {
                return Err(self.unexpected("'}'"));
            }
            statements.push(self.member()?);
        }
        let end = self.expect_op("}")?;
        Ok(Block {
            meta: Meta::new(),
            prefix,
            statements,
            end,
        }
        .into())
    }

    fn enum_values(&mut self) -> ParseResult<RightPadded<J>> {
        let prefix = self.take_prefix();
        let mut enums = Vec::new();
        let mut trailing_comma = false;
        if !self.at_op(";") {
            loop {
                let value = self.enum_value()?;
                if self.at_op(",") {
                    let after = self.expect_op(",")?;
                    enums.push(RightPadded::new(value, after));
                    if self.at_op(";") || self.at_op("}") {
                        trailing_comma = true;
                        break;
                    }
                } else {
                    enums.push(RightPadded::build(value));
                    break;
                }
            }
        }

        let terminated = self.at_op(";");
        let after = if terminated { self.expect_op(";")? } else { Space::EMPTY };
        Ok(RightPadded::new(
            EnumValueSet {
                meta: Meta::new(),
                prefix,
                enums,
                trailing_comma,
                terminated,
            }
            .into(),
            after,
        ))
    }

    fn enum_value(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        let name = self.identifier()?;
        let arguments = if self.at_op("(") { Some(self.arguments()?) } else { None };
        if self.at_op("{") {
            return Err(self.unsupported("enum constant body"));
        }
        Ok(EnumValue {
            meta: Meta::new(),
            prefix,
            name,
            arguments,
        }
        .into())
    }

    fn member(&mut self) -> ParseResult<RightPadded<J>> {
        let member = if self.at_op(";") {
            Empty::build(self.take_prefix())
        } else if self.at_op("{") {
            self.block()?
        } else {
            let prefix = self.take_prefix();
            let modifiers = self.modifiers()?;
            if self.at_op("{") {
                return Err(self.unsupported("static initializer"));
            }
            if self.at_type_keyword() {
                self.class_declaration(prefix, modifiers)?
            } else if self.at_op("<") {
                return Err(self.unsupported("generic method"));
            } else if is_name(self.peek()) && self.op_at(1, "(") {
                self.method_declaration(prefix, modifiers, None)?
            } else {
                let type_expr = self.type_tree()?;
                if is_name(self.peek()) && self.op_at(1, "(") {
                    self.method_declaration(prefix, modifiers, Some(type_expr))?
                } else {
                    self.variable_declarations_rest(prefix, modifiers, type_expr)?
                }
            }
        };
        self.finish_statement(member)
    }

    fn method_declaration(
        &mut self,
        prefix: Space,
        modifiers: Vec<Modifier>,
        return_type: Option<J>,
    ) -> ParseResult<J> {
        let name = self.identifier()?;
        let parameters = self.parameters()?;
        if self.at_op("[") {
            return Err(self.unsupported("array dimensions after a method signature"));
        }
        let throws = if self.at_keyword("throws") {
            let before = Space::format(self.bump().prefix);
            Some(Container::new(before, self.type_list()?))
        } else {
            None
        };
        let body = if self.at_op("{") {
            Some(self.block()?)
        } else if self.at_keyword("default") {
            return Err(self.unsupported("annotation default value"));
        } else {
            None
        };
        Ok(MethodDeclaration {
            meta: Meta::new(),
            prefix,
            modifiers,
            return_type,
            name,
            parameters,
            throws,
            body,
        }
        .into())
    }

    fn parameters(&mut self) -> ParseResult<Container<J>> {
        let before = self.expect_op("(")?;
        let mut elements = Vec::new();
        if self.at_op(")") {
            let after = self.expect_op(")")?;
            elements.push(RightPadded::new(Empty::build(Space::EMPTY), after));
            return Ok(Container::new(before, elements));
        }
        loop {
            let parameter = self.parameter()?;
            if self.at_op(",") {
                let after = self.expect_op(",")?;
                elements.push(RightPadded::new(parameter, after));
            } else {
                let after = self.expect_op(")")?;
                elements.push(RightPadded::new(parameter, after));
                return Ok(Container::new(before, elements));
            }
        }
    }

    fn parameter(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        let modifiers = self.modifiers()?;
        let type_expr = self.type_tree()?;
        let varargs = if self.at_op("...") {
            Some(Space::format(self.bump().prefix))
        } else {
            None
        };
        let variable = self.named_variable(false)?;
        Ok(VariableDeclarations {
            meta: Meta::new(),
            prefix,
            modifiers,
            type_expr: Some(type_expr),
            varargs,
            vars: vec![RightPadded::build(variable)],
        }
        .into())
    }

    fn named_variable(&mut self, allow_initializer: bool) -> ParseResult<J> {
        let prefix = self.take_prefix();
        let name = self.identifier()?;
        if self.at_op("[") {
            return Err(self.unsupported("array dimensions after a variable name"));
        }
        let initializer = if allow_initializer && self.at_op("=") {
            let before = self.expect_op("=")?;
            if self.at_op("{") {
                return Err(self.unsupported("array initializer"));
            }
            Some(LeftPadded::new(before, self.expression()?))
        } else {
            None
        };
        Ok(NamedVariable {
            meta: Meta::new(),
            prefix,
            name,
            initializer,
            var_type: JavaType::Unknown,
        }
        .into())
    }

    fn variable_declarations_rest(&mut self, prefix: Space, modifiers: Vec<Modifier>, type_expr: J) -> ParseResult<J> {
        let mut vars = Vec::new();
        loop {
            let variable = self.named_variable(true)?;
            if self.at_op(",") {
                let after = self.expect_op(",")?;
                vars.push(RightPadded::new(variable, after));
            } else {
                vars.push(RightPadded::build(variable));
                break;
            }
        }
        Ok(VariableDeclarations {
            meta: Meta::new(),
            prefix,
            modifiers,
            type_expr: Some(type_expr),
            varargs: None,
            vars,
        }
        .into())
    }

    fn local_variable_declarations(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        let modifiers = self.modifiers()?;
        if self.at_type_keyword() {
            return self.class_declaration(prefix, modifiers);
        }
        let type_expr = self.type_tree()?;
        self.variable_declarations_rest(prefix, modifiers, type_expr)
    }

    /// Pair a statement with the space before its `;`, consuming the `;`
    /// when the statement kind ends with one
    fn finish_statement(&mut self, statement: J) -> ParseResult<RightPadded<J>> {
        let after = if statement.needs_semicolon() {
            self.expect_op(";")?
        } else {
            Space::EMPTY
        };
        Ok(RightPadded::new(statement, after))
    }

    fn block(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        self.expect_op("{")?;
        let mut statements = Vec::new();
        while !self.at_op("}") {
            if self.at_eof() {
                return Err(self.unexpected("'}'"));
            }
            statements.push(self.block_statement()?);
        }
        let end = self.expect_op("}")?;
        Ok(Block {
            meta: Meta::new(),
            prefix,
            statements,
            end,
        }
        .into())
    }

    fn block_statement(&mut self) -> ParseResult<RightPadded<J>> {
        let statement = self.statement()?;
        self.finish_statement(statement)
    }

    fn statement(&mut self) -> ParseResult<J> {
        if self.at_op("{") {
            return self.block();
        }
        if self.at_op(";") {
            return Ok(Empty::build(self.take_prefix()));
        }
        if self.at_op("@") {
            return self.local_variable_declarations();
        }
        if self.peek().kind == TokenKind::Ident {
            let keyword = self.peek().text.clone();
            match keyword.as_str() {
                "if" => return self.if_statement(),
                "while" => return self.while_loop(),
                "do" => return self.do_while_loop(),
                "for" => return self.for_loop(),
                "return" => return self.return_statement(),
                "throw" => return self.throw_statement(),
                "break" | "continue" => return self.jump(),
                "class" | "interface" | "enum" => {
                    let prefix = self.take_prefix();
                    return self.class_declaration(prefix, Vec::new());
                }
                "final" | "abstract" | "static" => return self.local_variable_declarations(),
                k if UNSUPPORTED_STATEMENTS.contains(&k) => {
                    return Err(self.unsupported(&format!("'{k}' statement")));
                }
                _ => {}
            }
            if is_name(self.peek()) && self.op_at(1, ":") {
                return Err(self.unsupported("labeled statement"));
            }
            if self.looks_like_local_variable() {
                return self.local_variable_declarations();
            }
        }

        let offset = self.peek().offset;
        let expression = self.expression()?;
        if !expression.is_statement() {
            return Err(JavaParseError::Unexpected {
                expected: "statement".to_string(),
                found: format!("{:?}", expression.kind()),
                offset,
            });
        }
        Ok(expression)
    }

    fn if_statement(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        self.expect_keyword("if")?;
        let condition = self.control_parentheses()?;
        let then_part = self.block_statement()?;
        let else_part = if self.at_keyword("else") {
            let else_prefix = self.take_prefix();
            self.expect_keyword("else")?;
            let body = self.block_statement()?;
            Some(
                Else {
                    meta: Meta::new(),
                    prefix: else_prefix,
                    body,
                }
                .into(),
            )
        } else {
            None
        };
        Ok(If {
            meta: Meta::new(),
            prefix,
            condition,
            then_part,
            else_part,
        }
        .into())
    }

    fn control_parentheses(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        self.expect_op("(")?;
        let tree = self.expression()?;
        let after = self.expect_op(")")?;
        Ok(ControlParentheses {
            meta: Meta::new(),
            prefix,
            tree: RightPadded::new(tree, after),
        }
        .into())
    }

    fn while_loop(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        self.expect_keyword("while")?;
        let condition = self.control_parentheses()?;
        let body = self.block_statement()?;
        Ok(WhileLoop {
            meta: Meta::new(),
            prefix,
            condition,
            body,
        }
        .into())
    }

    fn do_while_loop(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        self.expect_keyword("do")?;
        let body = self.block_statement()?;
        let before = self.expect_keyword("while")?;
        let condition = self.control_parentheses()?;
        Ok(DoWhileLoop {
            meta: Meta::new(),
            prefix,
            body,
            while_condition: LeftPadded::new(before, condition),
        }
        .into())
    }

    /// `for (x : xs)` rather than `for (init; cond; update)`
    fn is_for_each(&self) -> bool {
        let mut depth = 0usize;
        let mut pending_ternaries = 0usize;
        let mut i = self.pos + 1;
        while let Some(token) = self.tokens.get(i) {
            if token.kind == TokenKind::Eof {
                return false;
            }
            if token.kind == TokenKind::Operator {
                match token.text.as_str() {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => {
                        if depth == 0 {
                            return false;
                        }
                        depth -= 1;
                    }
                    ";" if depth == 0 => return false,
                    "?" if depth == 0 => pending_ternaries += 1,
                    ":" if depth == 0 => {
                        if pending_ternaries == 0 {
                            return true;
                        }
                        pending_ternaries -= 1;
                    }
                    _ => {}
                }
            }
            i += 1;
        }
        false
    }

    fn for_loop(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        self.expect_keyword("for")?;
        if !self.at_op("(") {
            return Err(self.unexpected("'('"));
        }
        if self.is_for_each() {
            return self.for_each_loop(prefix);
        }

        let control_prefix = self.take_prefix();
        self.expect_op("(")?;

        let init = if self.at_op(";") {
            vec![RightPadded::new(Empty::build(Space::EMPTY), self.expect_op(";")?)]
        } else if self.at_op("@") || self.at_keyword("final") || self.looks_like_local_variable() {
            let declarations = self.local_variable_declarations()?;
            vec![RightPadded::new(declarations, self.expect_op(";")?)]
        } else {
            self.expression_list(";")?
        };

        let condition = if self.at_op(";") {
            RightPadded::new(Empty::build(Space::EMPTY), self.expect_op(";")?)
        } else {
            let condition = self.expression()?;
            RightPadded::new(condition, self.expect_op(";")?)
        };

        let update = if self.at_op(")") {
            vec![RightPadded::new(Empty::build(Space::EMPTY), self.expect_op(")")?)]
        } else {
            self.expression_list(")")?
        };

        let control = ForControl {
            meta: Meta::new(),
            prefix: control_prefix,
            init,
            condition,
            update,
        }
        .into();
        let body = self.block_statement()?;
        Ok(ForLoop {
            meta: Meta::new(),
            prefix,
            control,
            body,
        }
        .into())
    }

    /// Comma-separated expressions ending at (and consuming) `close`
    fn expression_list(&mut self, close: &str) -> ParseResult<Vec<RightPadded<J>>> {
        let mut elements = Vec::new();
        loop {
            let expression = self.expression()?;
            if self.at_op(",") {
                let after = self.expect_op(",")?;
                elements.push(RightPadded::new(expression, after));
            } else {
                let after = self.expect_op(close)?;
                elements.push(RightPadded::new(expression, after));
                return Ok(elements);
            }
        }
    }

    fn for_each_loop(&mut self, prefix: Space) -> ParseResult<J> {
        let control_prefix = self.take_prefix();
        self.expect_op("(")?;

        let variable_prefix = self.take_prefix();
        let modifiers = self.modifiers()?;
        let type_expr = self.type_tree()?;
        let variable = self.named_variable(false)?;
        let declaration = VariableDeclarations {
            meta: Meta::new(),
            prefix: variable_prefix,
            modifiers,
            type_expr: Some(type_expr),
            varargs: None,
            vars: vec![RightPadded::build(variable)],
        }
        .into();
        let variable = RightPadded::new(declaration, self.expect_op(":")?);
        let iterable = self.expression()?;
        let iterable = RightPadded::new(iterable, self.expect_op(")")?);

        let control = ForEachControl {
            meta: Meta::new(),
            prefix: control_prefix,
            variable,
            iterable,
        }
        .into();
        let body = self.block_statement()?;
        Ok(ForEachLoop {
            meta: Meta::new(),
            prefix,
            control,
            body,
        }
        .into())
    }

    fn return_statement(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        self.expect_keyword("return")?;
        let expression = if self.at_op(";") { None } else { Some(self.expression()?) };
        Ok(Return {
            meta: Meta::new(),
            prefix,
            expression,
        }
        .into())
    }

    fn throw_statement(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        self.expect_keyword("throw")?;
        let exception = self.expression()?;
        Ok(Throw {
            meta: Meta::new(),
            prefix,
            exception,
        }
        .into())
    }

    fn jump(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        let keyword = self.bump();
        let label = if is_name(self.peek()) { Some(self.identifier()?) } else { None };
        Ok(if keyword.text == "break" {
            Break {
                meta: Meta::new(),
                prefix,
                label,
            }
            .into()
        } else {
            Continue {
                meta: Meta::new(),
                prefix,
                label,
            }
            .into()
        })
    }

    pub fn expression(&mut self) -> ParseResult<J> {
        if self.is_lambda_start() {
            return self.lambda();
        }
        let target = self.ternary()?;

        if self.at_op("=") {
            let before = self.expect_op("=")?;
            let value = self.expression()?;
            let (prefix, variable) = hoist(target);
            return Ok(Assignment {
                meta: Meta::new(),
                prefix,
                variable,
                assignment: LeftPadded::new(before, value),
            }
            .into());
        }

        if let Some((operator, width)) = self.peek_assignment_operator() {
            let before = self.consume(width);
            let value = self.expression()?;
            let (prefix, variable) = hoist(target);
            return Ok(AssignmentOperation {
                meta: Meta::new(),
                prefix,
                variable,
                operator: LeftPadded::new(before, operator),
                assignment: value,
            }
            .into());
        }

        Ok(target)
    }

    /// Operator spelled by a run of adjacent `>` tokens, optionally closed
    /// by `=`, e.g. `>>>=`
    fn glued_greater_than(&self) -> Option<(String, usize)> {
        if !self.at_op(">") {
            return None;
        }
        let adjacent = |n: usize, op: &str| self.op_at(n, op) && self.peek_at(n).is_some_and(|t| t.prefix.is_empty());
        let mut text = String::from(">");
        let mut width = 1;
        while width < 3 && adjacent(width, ">") {
            text.push('>');
            width += 1;
        }
        if adjacent(width, "=") {
            text.push('=');
            width += 1;
        }
        Some((text, width))
    }

    fn peek_assignment_operator(&self) -> Option<(AssignmentOperator, usize)> {
        if let Some((text, width)) = self.glued_greater_than() {
            return AssignmentOperator::from_symbol(&text).map(|op| (op, width));
        }
        let token = self.peek();
        if token.kind != TokenKind::Operator {
            return None;
        }
        AssignmentOperator::from_symbol(&token.text).map(|op| (op, 1))
    }

    fn peek_binary_operator(&self) -> Option<(BinaryOperator, usize)> {
        if let Some((text, width)) = self.glued_greater_than() {
            return BinaryOperator::from_symbol(&text).map(|op| (op, width));
        }
        let token = self.peek();
        if token.kind != TokenKind::Operator {
            return None;
        }
        BinaryOperator::from_symbol(&token.text).map(|op| (op, 1))
    }

    /// Consume `width` tokens of one glued operator, returning the space
    /// before it
    fn consume(&mut self, width: usize) -> Space {
        let first = self.bump();
        for _ in 1..width {
            self.bump();
        }
        Space::format(first.prefix)
    }

    fn ternary(&mut self) -> ParseResult<J> {
        let condition = self.binary(1)?;
        if !self.at_op("?") {
            return Ok(condition);
        }
        let question = self.expect_op("?")?;
        let true_part = self.expression()?;
        let colon = self.expect_op(":")?;
        let false_part = if self.is_lambda_start() { self.lambda()? } else { self.ternary()? };
        let (prefix, condition) = hoist(condition);
        Ok(Ternary {
            meta: Meta::new(),
            prefix,
            condition,
            true_part: LeftPadded::new(question, true_part),
            false_part: LeftPadded::new(colon, false_part),
        }
        .into())
    }

    /// Precedence climbing over binary operators and `instanceof`
    fn binary(&mut self, min_precedence: u8) -> ParseResult<J> {
        let mut left = self.unary()?;
        loop {
            if self.at_keyword("instanceof") {
                if INSTANCEOF_PRECEDENCE < min_precedence {
                    break;
                }
                let after = Space::format(self.bump().prefix);
                let clazz = self.type_tree()?;
                if is_name(self.peek()) {
                    return Err(self.unsupported("instanceof pattern"));
                }
                let (prefix, expression) = hoist(left);
                left = InstanceOf {
                    meta: Meta::new(),
                    prefix,
                    expression: RightPadded::new(expression, after),
                    clazz,
                }
                .into();
                continue;
            }

            let Some((operator, width)) = self.peek_binary_operator() else {
                break;
            };
            if operator.precedence() < min_precedence {
                break;
            }
            let before = self.consume(width);
            let right = self.binary(operator.precedence() + 1)?;
            let (prefix, operand) = hoist(left);
            left = Binary {
                meta: Meta::new(),
                prefix,
                left: operand,
                operator: LeftPadded::new(before, operator),
                right,
                binary_type: JavaType::Unknown,
            }
            .into();
        }
        Ok(left)
    }

    fn unary(&mut self) -> ParseResult<J> {
        let token = self.peek();
        if token.kind == TokenKind::Operator {
            let operator = match token.text.as_str() {
                "!" => Some(UnaryOperator::Not),
                "~" => Some(UnaryOperator::Complement),
                "+" => Some(UnaryOperator::Positive),
                "-" => Some(UnaryOperator::Negative),
                "++" => Some(UnaryOperator::PreIncrement),
                "--" => Some(UnaryOperator::PreDecrement),
                _ => None,
            };
            if let Some(operator) = operator {
                let prefix = self.take_prefix();
                self.bump();
                let expression = self.unary()?;
                return Ok(Unary {
                    meta: Meta::new(),
                    prefix,
                    operator: LeftPadded::new(Space::EMPTY, operator),
                    expression,
                }
                .into());
            }

            if self.at_op("(") && !self.is_lambda_start() && self.looks_like_cast() {
                let prefix = self.take_prefix();
                self.expect_op("(")?;
                let target = self.type_tree()?;
                let after = self.expect_op(")")?;
                let clazz = ControlParentheses {
                    meta: Meta::new(),
                    prefix: Space::EMPTY,
                    tree: RightPadded::new(target, after),
                }
                .into();
                let expression = self.unary()?;
                return Ok(TypeCast {
                    meta: Meta::new(),
                    prefix,
                    clazz,
                    expression,
                }
                .into());
            }
        }

        let primary = self.primary()?;
        self.postfix(primary)
    }

    fn postfix(&mut self, mut expression: J) -> ParseResult<J> {
        loop {
            if self.at_op(".") {
                let dot = self.expect_op(".")?;
                if self.at_op("<") {
                    return Err(self.unsupported("explicit generic invocation"));
                }
                if self.at_keyword("new") {
                    return Err(self.unsupported("qualified instance creation"));
                }
                let name = self.member_name()?;
                if self.at_op("(") {
                    let arguments = self.arguments()?;
                    let (prefix, select) = hoist(expression);
                    expression = MethodInvocation {
                        meta: Meta::new(),
                        prefix,
                        select: Some(RightPadded::new(select, dot)),
                        name,
                        arguments,
                        method_type: None,
                    }
                    .into();
                } else {
                    let (prefix, target) = hoist(expression);
                    expression = FieldAccess {
                        meta: Meta::new(),
                        prefix,
                        target,
                        name: LeftPadded::new(dot, name),
                        field_type: JavaType::Unknown,
                    }
                    .into();
                }
            } else if self.at_op("[") {
                let open = self.expect_op("[")?;
                let index = self.expression()?;
                let after = self.expect_op("]")?;
                let (prefix, indexed) = hoist(expression);
                expression = ArrayAccess {
                    meta: Meta::new(),
                    prefix,
                    indexed,
                    open,
                    index: RightPadded::new(index, after),
                }
                .into();
            } else if self.at_op("++") || self.at_op("--") {
                let token = self.bump();
                let operator = if token.text == "++" {
                    UnaryOperator::PostIncrement
                } else {
                    UnaryOperator::PostDecrement
                };
                let (prefix, operand) = hoist(expression);
                expression = Unary {
                    meta: Meta::new(),
                    prefix,
                    operator: LeftPadded::new(Space::format(token.prefix), operator),
                    expression: operand,
                }
                .into();
            } else if self.at_op("::") {
                let before = self.expect_op("::")?;
                let reference = self.member_name()?;
                let (prefix, containing) = hoist(expression);
                expression = MemberReference {
                    meta: Meta::new(),
                    prefix,
                    containing,
                    reference: LeftPadded::new(before, reference),
                }
                .into();
            } else {
                return Ok(expression);
            }
        }
    }

    fn literal(&mut self, primitive: Primitive) -> J {
        let token = self.bump();
        Literal {
            meta: Meta::new(),
            prefix: Space::format(token.prefix),
            value_source: token.text,
            primitive,
        }
        .into()
    }

    fn primary(&mut self) -> ParseResult<J> {
        if self.is_lambda_start() {
            return self.lambda();
        }
        let token = self.peek().clone();
        match token.kind {
            TokenKind::IntLiteral => Ok(self.literal(Primitive::Int)),
            TokenKind::LongLiteral => Ok(self.literal(Primitive::Long)),
            TokenKind::FloatLiteral => Ok(self.literal(Primitive::Float)),
            TokenKind::DoubleLiteral => Ok(self.literal(Primitive::Double)),
            TokenKind::CharLiteral => Ok(self.literal(Primitive::Char)),
            TokenKind::StringLiteral => Ok(self.literal(Primitive::String)),
            TokenKind::Operator if token.text == "(" => {
                let prefix = self.take_prefix();
                self.expect_op("(")?;
                let inner = self.expression()?;
                let after = self.expect_op(")")?;
                Ok(Parentheses {
                    meta: Meta::new(),
                    prefix,
                    tree: RightPadded::new(inner, after),
                }
                .into())
            }
            TokenKind::Ident => match token.text.as_str() {
                "true" | "false" => Ok(self.literal(Primitive::Boolean)),
                "null" => Ok(self.literal(Primitive::Null)),
                "new" => self.new_class(),
                "switch" => Err(self.unsupported("switch expression")),
                "this" | "super" => {
                    let prefix = self.take_prefix();
                    let name = self.member_name()?;
                    if self.at_op("(") {
                        let arguments = self.arguments()?;
                        Ok(MethodInvocation {
                            meta: Meta::new(),
                            prefix,
                            select: None,
                            name,
                            arguments,
                            method_type: None,
                        }
                        .into())
                    } else {
                        Ok(name.with_prefix(prefix))
                    }
                }
                _ if is_name(&token) => {
                    if self.op_at(1, "(") {
                        let prefix = self.take_prefix();
                        let name = self.identifier()?;
                        let arguments = self.arguments()?;
                        Ok(MethodInvocation {
                            meta: Meta::new(),
                            prefix,
                            select: None,
                            name,
                            arguments,
                            method_type: None,
                        }
                        .into())
                    } else {
                        self.identifier()
                    }
                }
                _ if primitive_keyword(&token).is_some() => Err(self.unsupported("primitive type in expression")),
                _ => Err(self.unexpected("expression")),
            },
            _ => Err(self.unexpected("expression")),
        }
    }

    fn new_class(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        self.expect_keyword("new")?;
        if primitive_keyword(self.peek()).is_some() {
            return Err(self.unsupported("array creation"));
        }
        let clazz = self.type_tree()?;
        if self.at_op("[") || clazz.kind() == JKind::ArrayType {
            return Err(self.unsupported("array creation"));
        }
        let arguments = self.arguments()?;
        let body = if self.at_op("{") {
            Some(self.class_body(ClassKind::Class)?)
        } else {
            None
        };
        Ok(NewClass {
            meta: Meta::new(),
            prefix,
            clazz,
            arguments,
            body,
        }
        .into())
    }

    fn arguments(&mut self) -> ParseResult<Container<J>> {
        let before = self.expect_op("(")?;
        if self.at_op(")") {
            let after = self.expect_op(")")?;
            return Ok(Container::new(
                before,
                vec![RightPadded::new(Empty::build(Space::EMPTY), after)],
            ));
        }
        Ok(Container::new(before, self.expression_list(")")?))
    }

    /// `x ->` or a parenthesized list followed by `->`
    fn is_lambda_start(&self) -> bool {
        if is_name(self.peek()) {
            return self.op_at(1, "->");
        }
        if !self.at_op("(") {
            return false;
        }
        let mut depth = 0usize;
        let mut i = self.pos;
        while let Some(token) = self.tokens.get(i) {
            if token.kind == TokenKind::Eof {
                return false;
            }
            if token.kind == TokenKind::Operator {
                if token.text == "(" {
                    depth += 1;
                } else if token.text == ")" {
                    depth -= 1;
                    if depth == 0 {
                        return is_op(self.tokens.get(i + 1), "->");
                    }
                }
            }
            i += 1;
        }
        false
    }

    fn lambda(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        let parameters = if self.at_op("(") {
            self.expect_op("(")?;
            let mut params = Vec::new();
            if self.at_op(")") {
                let after = self.expect_op(")")?;
                params.push(RightPadded::new(Empty::build(Space::EMPTY), after));
            } else {
                loop {
                    let parameter = self.lambda_parameter()?;
                    if self.at_op(",") {
                        let after = self.expect_op(",")?;
                        params.push(RightPadded::new(parameter, after));
                    } else {
                        let after = self.expect_op(")")?;
                        params.push(RightPadded::new(parameter, after));
                        break;
                    }
                }
            }
            LambdaParameters {
                parenthesized: true,
                params,
            }
        } else {
            LambdaParameters {
                parenthesized: false,
                params: vec![RightPadded::build(self.untyped_parameter()?)],
            }
        };
        let arrow = self.expect_op("->")?;
        let body = if self.at_op("{") { self.block()? } else { self.expression()? };
        Ok(Lambda {
            meta: Meta::new(),
            prefix,
            parameters,
            arrow,
            body,
        }
        .into())
    }

    fn untyped_parameter(&mut self) -> ParseResult<J> {
        let prefix = self.take_prefix();
        let variable = self.named_variable(false)?;
        Ok(VariableDeclarations {
            meta: Meta::new(),
            prefix,
            modifiers: Vec::new(),
            type_expr: None,
            varargs: None,
            vars: vec![RightPadded::build(variable)],
        }
        .into())
    }

    fn lambda_parameter(&mut self) -> ParseResult<J> {
        if is_name(self.peek()) && (self.op_at(1, ",") || self.op_at(1, ")")) {
            return self.untyped_parameter();
        }
        self.parameter()
    }

    /// End index of a type starting at token `start`, if one is there
    fn scan_type(&self, start: usize) -> Option<usize> {
        let first = self.tokens.get(start)?;
        let mut i = if primitive_keyword(first).is_some() {
            start + 1
        } else if is_name(first) {
            let mut j = start + 1;
            while is_op(self.tokens.get(j), ".") && self.tokens.get(j + 1).is_some_and(is_name) {
                j += 2;
            }
            if is_op(self.tokens.get(j), "<") {
                let mut depth = 0usize;
                loop {
                    let token = self.tokens.get(j)?;
                    match (token.kind, token.text.as_str()) {
                        (TokenKind::Operator, "<") => depth += 1,
                        (TokenKind::Operator, ">") => {
                            depth -= 1;
                            if depth == 0 {
                                j += 1;
                                break;
                            }
                        }
                        (TokenKind::Operator, "," | "." | "?" | "[" | "]") | (TokenKind::Ident, _) => {}
                        _ => return None,
                    }
                    j += 1;
                }
            }
            j
        } else {
            return None;
        };
        while is_op(self.tokens.get(i), "[") && is_op(self.tokens.get(i + 1), "]") {
            i += 2;
        }
        Some(i)
    }

    /// `(Type) operand` rather than a parenthesized expression
    fn looks_like_cast(&self) -> bool {
        let Some(end) = self.scan_type(self.pos + 1) else {
            return false;
        };
        if !is_op(self.tokens.get(end), ")") {
            return false;
        }
        if self.peek_at(1).and_then(primitive_keyword).is_some() {
            return true;
        }
        match self.tokens.get(end + 1) {
            Some(next) => match next.kind {
                TokenKind::Ident => next.text != "instanceof",
                TokenKind::Operator => matches!(next.text.as_str(), "(" | "!" | "~"),
                TokenKind::Eof => false,
                _ => true,
            },
            None => false,
        }
    }

    /// `Type name` followed by something a declarator allows
    fn looks_like_local_variable(&self) -> bool {
        let Some(end) = self.scan_type(self.pos) else {
            return false;
        };
        self.tokens.get(end).is_some_and(is_name)
            && self
                .tokens
                .get(end + 1)
                .is_some_and(|t| {
                    t.kind == TokenKind::Operator && matches!(t.text.as_str(), "=" | ";" | "," | ":" | "[")
                })
    }

    fn type_tree(&mut self) -> ParseResult<J> {
        let mut tree = if let Some(primitive) = primitive_keyword(self.peek()) {
            let token = self.bump();
            PrimitiveType {
                meta: Meta::new(),
                prefix: Space::format(token.prefix),
                primitive,
            }
            .into()
        } else if self.at_op("?") {
            let token = self.bump();
            if self.at_keyword("extends") || self.at_keyword("super") {
                return Err(self.unsupported("bounded wildcard"));
            }
            Identifier::build(Space::format(token.prefix), "?", JavaType::Unknown)
        } else {
            let mut name = self.identifier()?;
            while self.at_op(".") && self.peek_at(1).is_some_and(is_name) {
                let before = self.expect_op(".")?;
                let segment = self.identifier()?;
                let (prefix, target) = hoist(name);
                name = FieldAccess {
                    meta: Meta::new(),
                    prefix,
                    target,
                    name: LeftPadded::new(before, segment),
                    field_type: JavaType::Unknown,
                }
                .into();
            }
            if self.at_op("<") {
                let before = self.expect_op("<")?;
                let mut elements = Vec::new();
                if self.at_op(">") {
                    let after = self.expect_op(">")?;
                    elements.push(RightPadded::new(Empty::build(Space::EMPTY), after));
                } else {
                    loop {
                        let argument = self.type_tree()?;
                        if self.at_op(",") {
                            let after = self.expect_op(",")?;
                            elements.push(RightPadded::new(argument, after));
                        } else {
                            let after = self.expect_op(">")?;
                            elements.push(RightPadded::new(argument, after));
                            break;
                        }
                    }
                }
                let (prefix, clazz) = hoist(name);
                name = ParameterizedType {
                    meta: Meta::new(),
                    prefix,
                    clazz,
                    type_parameters: Container::new(before, elements),
                }
                .into();
            }
            name
        };

        while self.at_op("[") && self.op_at(1, "]") {
            let open = self.expect_op("[")?;
            let close = self.expect_op("]")?;
            let (prefix, element_type) = hoist(tree);
            tree = ArrayType {
                meta: Meta::new(),
                prefix,
                element_type,
                open,
                close,
            }
            .into();
        }
        Ok(tree)
    }
}
