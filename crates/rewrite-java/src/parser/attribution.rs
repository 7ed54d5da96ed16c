//! Light type attribution.
//!
//! Not a compiler: types are resolved only as far as recipes need them.
//! Declared types of every unit parsed together are collected first, so an
//! enum declared in one file is known where another file imports it. Then
//! each unit is walked once, attaching types to identifiers, field accesses,
//! variables, binaries and method invocations.

use std::collections::HashMap;
use std::sync::Arc;

use rewrite_core::{Cursor, Traversal, TreeId, TreeVisitor, VisitResult};
use tracing::warn;

use crate::printer::qualified_name;
use crate::tree::*;
use crate::visitor::{
    dispatch, walk_binary, walk_class_declaration, walk_field_access, walk_identifier, walk_method_invocation,
    walk_named_variable, JavaVisitor,
};

const JAVA_LANG: &[(&str, TypeKind)] = &[
    ("Object", TypeKind::Class),
    ("String", TypeKind::Class),
    ("Boolean", TypeKind::Class),
    ("Byte", TypeKind::Class),
    ("Character", TypeKind::Class),
    ("Short", TypeKind::Class),
    ("Integer", TypeKind::Class),
    ("Long", TypeKind::Class),
    ("Float", TypeKind::Class),
    ("Double", TypeKind::Class),
    ("Number", TypeKind::Class),
    ("Math", TypeKind::Class),
    ("System", TypeKind::Class),
    ("StringBuilder", TypeKind::Class),
    ("Thread", TypeKind::Class),
    ("Class", TypeKind::Class),
    ("Enum", TypeKind::Class),
    ("Throwable", TypeKind::Class),
    ("Exception", TypeKind::Class),
    ("RuntimeException", TypeKind::Class),
    ("IllegalArgumentException", TypeKind::Class),
    ("IllegalStateException", TypeKind::Class),
    ("Runnable", TypeKind::Interface),
    ("Iterable", TypeKind::Interface),
    ("Comparable", TypeKind::Interface),
    ("CharSequence", TypeKind::Interface),
];

fn type_kind(kind: ClassKind) -> TypeKind {
    match kind {
        ClassKind::Class => TypeKind::Class,
        ClassKind::Enum => TypeKind::Enum,
        ClassKind::Interface => TypeKind::Interface,
    }
}

fn qualify(outer: Option<&str>, name: &str) -> String {
    match outer {
        Some(outer) => format!("{outer}.{name}"),
        None => name.to_string(),
    }
}

/// Class declarations directly inside a class body
fn nested_classes(class: &ClassDeclaration) -> impl Iterator<Item = &ClassDeclaration> {
    let statements = match &class.body {
        J::Block(block) => block.statements.as_slice(),
        _ => &[],
    };
    statements.iter().filter_map(|statement| match &statement.element {
        J::ClassDeclaration(nested) => Some(nested.as_ref()),
        _ => None,
    })
}

fn members(class: &ClassDeclaration) -> &[RightPadded<J>] {
    match &class.body {
        J::Block(block) => &block.statements,
        _ => &[],
    }
}

/// Types and fields declared across a set of compilation units
#[derive(Debug, Default, Clone)]
pub struct TypeTable {
    types: HashMap<String, TypeKind>,
    fields: HashMap<String, HashMap<String, JavaType>>,
}

impl TypeTable {
    pub fn build(units: &[&CompilationUnit]) -> Self {
        let mut table = TypeTable::default();
        for cu in units {
            let package = cu.package_name();
            for tree in &cu.types {
                if let J::ClassDeclaration(class) = tree {
                    table.collect_types(class, package.as_deref());
                }
            }
        }

        let mut fields = HashMap::new();
        for cu in units {
            let resolver = Resolver::new(&table, cu);
            for tree in &cu.types {
                if let J::ClassDeclaration(class) = tree {
                    resolver.collect_fields(class, &mut Vec::new(), &mut fields);
                }
            }
        }
        table.fields = fields;
        table
    }

    fn collect_types(&mut self, class: &ClassDeclaration, outer: Option<&str>) {
        let fqn = qualify(outer, &qualified_name(&class.name));
        for nested in nested_classes(class) {
            self.collect_types(nested, Some(&fqn));
        }
        self.types.insert(fqn, type_kind(class.kind));
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn kind_of(&self, fully_qualified_name: &str) -> Option<TypeKind> {
        self.types.get(fully_qualified_name).copied()
    }

    /// Declared type of a field or enum constant
    pub fn field(&self, owner: &str, name: &str) -> Option<&JavaType> {
        self.fields.get(owner)?.get(name)
    }

    fn class_type(&self, fully_qualified_name: &str) -> Option<JavaType> {
        self.kind_of(fully_qualified_name)
            .map(|kind| JavaType::class(fully_qualified_name, kind))
    }
}

/// Name resolution scope of one compilation unit
struct Resolver<'a> {
    table: &'a TypeTable,
    package: Option<String>,
    single: HashMap<String, String>,
    on_demand: Vec<String>,
    static_members: HashMap<String, String>,
    static_on_demand: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn new(table: &'a TypeTable, cu: &CompilationUnit) -> Self {
        let mut resolver = Self {
            table,
            package: cu.package_name(),
            single: HashMap::new(),
            on_demand: Vec::new(),
            static_members: HashMap::new(),
            static_on_demand: Vec::new(),
        };
        for import in &cu.imports {
            let J::Import(import) = &import.element else {
                continue;
            };
            let name = qualified_name(&import.qualid);
            match (import.static_keyword.is_some(), name.strip_suffix(".*")) {
                (false, Some(prefix)) => resolver.on_demand.push(prefix.to_string()),
                (true, Some(owner)) => resolver.static_on_demand.push(owner.to_string()),
                (false, None) => {
                    let simple = name.rsplit('.').next().unwrap_or(&name).to_string();
                    resolver.single.insert(simple, name);
                }
                (true, None) => {
                    if let Some((owner, member)) = name.rsplit_once('.') {
                        resolver.static_members.insert(member.to_string(), owner.to_string());
                    }
                }
            }
        }
        resolver
    }

    /// Resolve a simple type name. `enclosing` lists the fully qualified
    /// names of enclosing classes, innermost first.
    fn resolve_name(&self, simple: &str, enclosing: &[String]) -> JavaType {
        for outer in enclosing {
            if outer.rsplit('.').next() == Some(simple) {
                if let Some(found) = self.table.class_type(outer) {
                    return found;
                }
            }
            if let Some(found) = self.table.class_type(&format!("{outer}.{simple}")) {
                return found;
            }
        }

        if let Some(found) = self.table.class_type(&qualify(self.package.as_deref(), simple)) {
            return found;
        }

        if let Some(fqn) = self.single.get(simple) {
            let kind = self.table.kind_of(fqn).unwrap_or(TypeKind::Class);
            return JavaType::class(fqn.as_str(), kind);
        }

        for prefix in &self.on_demand {
            if let Some(found) = self.table.class_type(&format!("{prefix}.{simple}")) {
                return found;
            }
        }

        JAVA_LANG
            .iter()
            .find(|(name, _)| *name == simple)
            .map(|(name, kind)| JavaType::class(format!("java.lang.{name}"), *kind))
            .unwrap_or_default()
    }

    /// Resolve a dotted name such as `a.A` or `Outer.Inner`
    fn resolve_qualified(&self, name: &str, enclosing: &[String]) -> JavaType {
        if let Some(found) = self.table.class_type(name) {
            return found;
        }
        let Some((first, rest)) = name.split_once('.') else {
            return self.resolve_name(name, enclosing);
        };
        if let JavaType::Class(outer) = self.resolve_name(first, enclosing) {
            if let Some(found) = self.table.class_type(&format!("{}.{rest}", outer.fully_qualified_name)) {
                return found;
            }
        }
        if first.starts_with(|c: char| c.is_lowercase()) {
            return JavaType::class(name, TypeKind::Class);
        }
        JavaType::Unknown
    }

    fn resolve_type_tree(&self, tree: &J, enclosing: &[String]) -> JavaType {
        match tree {
            J::PrimitiveType(primitive) => JavaType::Primitive(primitive.primitive),
            J::Identifier(ident) => self.resolve_name(&ident.simple_name, enclosing),
            J::FieldAccess(_) => self.resolve_qualified(&qualified_name(tree), enclosing),
            J::ParameterizedType(parameterized) => self.resolve_type_tree(&parameterized.clazz, enclosing),
            _ => JavaType::Unknown,
        }
    }

    /// A statically imported field or enum constant
    fn resolve_static(&self, name: &str) -> Option<JavaType> {
        if let Some(owner) = self.static_members.get(name) {
            if let Some(found) = self.table.field(owner, name) {
                return Some(found.clone());
            }
        }
        self.static_on_demand
            .iter()
            .find_map(|owner| self.table.field(owner, name).cloned())
    }

    fn collect_fields(
        &self,
        class: &ClassDeclaration,
        enclosing: &mut Vec<String>,
        fields: &mut HashMap<String, HashMap<String, JavaType>>,
    ) {
        let outer = enclosing.first().cloned().or_else(|| self.package.clone());
        let fqn = qualify(outer.as_deref(), &qualified_name(&class.name));
        enclosing.insert(0, fqn.clone());

        let mut declared = HashMap::new();
        for member in members(class) {
            match &member.element {
                J::VariableDeclarations(decls) => {
                    let field_type = decls
                        .type_expr
                        .as_ref()
                        .map(|t| self.resolve_type_tree(t, enclosing))
                        .unwrap_or_default();
                    for var in &decls.vars {
                        if let J::NamedVariable(var) = &var.element {
                            declared.insert(qualified_name(&var.name), field_type.clone());
                        }
                    }
                }
                J::EnumValueSet(set) => {
                    let enum_type = JavaType::class(fqn.as_str(), TypeKind::Enum);
                    for value in &set.enums {
                        if let J::EnumValue(value) = &value.element {
                            declared.insert(qualified_name(&value.name), enum_type.clone());
                        }
                    }
                }
                J::ClassDeclaration(nested) => self.collect_fields(nested, enclosing, fields),
                _ => {}
            }
        }
        fields.insert(fqn, declared);
        enclosing.remove(0);
    }
}

/// Type of the variable `name` if `tree` declares it
fn declared_in(tree: &J, name: &str, resolver: &Resolver<'_>, enclosing: &[String]) -> Option<JavaType> {
    let J::VariableDeclarations(decls) = tree else {
        return None;
    };
    let declares = decls
        .vars
        .iter()
        .any(|var| matches!(&var.element, J::NamedVariable(v) if v.name.simple_name() == Some(name)));
    if !declares {
        return None;
    }
    Some(
        decls
            .type_expr
            .as_ref()
            .map(|t| resolver.resolve_type_tree(t, enclosing))
            .unwrap_or_default(),
    )
}

/// Visitor attaching resolved types to one compilation unit
struct TypeAttribution<'a> {
    resolver: Resolver<'a>,
}

impl TypeAttribution<'_> {
    /// Fully qualified names of the classes enclosing the cursor position,
    /// innermost first. A class declaration at the cursor counts.
    fn enclosing_types(&self, cursor: &Cursor<J>) -> Vec<String> {
        let mut names: Vec<String> = cursor
            .path()
            .filter_map(|tree| match tree {
                J::ClassDeclaration(class) => Some(qualified_name(&class.name)),
                _ => None,
            })
            .collect();
        names.reverse();

        let mut fqns = Vec::with_capacity(names.len());
        let mut outer = self.resolver.package.clone();
        for name in names {
            let fqn = qualify(outer.as_deref(), &name);
            fqns.push(fqn.clone());
            outer = Some(fqn);
        }
        fqns.reverse();
        fqns
    }

    /// Walk outward from the cursor through every scope that can declare a
    /// variable, nearest first
    fn lookup_variable(&self, name: &str, cursor: &Cursor<J>, enclosing: &[String]) -> Option<JavaType> {
        let children = cursor.path();
        let parents = cursor.path().skip(1);
        let mut class_depth = 0;
        for (child, parent) in children.zip(parents) {
            let found = match parent {
                J::Block(block) => block
                    .statements
                    .iter()
                    .take_while(|statement| statement.element.id() != child.id())
                    .find_map(|statement| declared_in(&statement.element, name, &self.resolver, enclosing)),
                J::MethodDeclaration(method) => method
                    .parameters
                    .elements
                    .iter()
                    .find_map(|param| declared_in(&param.element, name, &self.resolver, enclosing)),
                J::Lambda(lambda) => lambda
                    .parameters
                    .params
                    .iter()
                    .find_map(|param| declared_in(&param.element, name, &self.resolver, enclosing)),
                J::ForControl(control) => control
                    .init
                    .iter()
                    .find_map(|init| declared_in(&init.element, name, &self.resolver, enclosing)),
                J::ForLoop(for_loop) => match &for_loop.control {
                    J::ForControl(control) => control
                        .init
                        .iter()
                        .find_map(|init| declared_in(&init.element, name, &self.resolver, enclosing)),
                    _ => None,
                },
                J::ForEachLoop(for_each) => match &for_each.control {
                    J::ForEachControl(control) => {
                        declared_in(&control.variable.element, name, &self.resolver, enclosing)
                    }
                    _ => None,
                },
                J::ClassDeclaration(_) => {
                    let owner = enclosing.get(class_depth);
                    class_depth += 1;
                    owner.and_then(|fqn| self.resolver.table.field(fqn, name)).cloned()
                }
                _ => None,
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }
}

/// Names that are declared or selected rather than referenced
fn is_declared_or_selected_name(id: TreeId, cursor: &Cursor<J>) -> bool {
    if cursor
        .ancestors()
        .any(|tree| matches!(tree.kind(), JKind::Package | JKind::Import))
    {
        return true;
    }
    match cursor.parent_value() {
        Some(J::ClassDeclaration(class)) => class.name.id() == id,
        Some(J::MethodDeclaration(method)) => method.name.id() == id,
        Some(J::NamedVariable(var)) => var.name.id() == id,
        Some(J::EnumValue(value)) => value.name.id() == id,
        Some(J::FieldAccess(access)) => access.name.element.id() == id,
        Some(J::MethodInvocation(method)) => method.name.id() == id,
        Some(J::MemberReference(reference)) => reference.reference.element.id() == id,
        Some(J::Break(_)) | Some(J::Continue(_)) => true,
        _ => false,
    }
}

/// Positions where an identifier can only name a type
fn is_type_position(id: TreeId, cursor: &Cursor<J>) -> bool {
    match cursor.parent_value() {
        Some(J::VariableDeclarations(decls)) => decls.type_expr.as_ref().is_some_and(|t| t.id() == id),
        Some(J::ClassDeclaration(_))
        | Some(J::MethodDeclaration(_))
        | Some(J::ParameterizedType(_))
        | Some(J::ArrayType(_)) => true,
        Some(J::NewClass(new_class)) => new_class.clazz.id() == id,
        Some(J::InstanceOf(instance_of)) => instance_of.clazz.id() == id,
        _ => false,
    }
}

fn is_string(java_type: &JavaType) -> bool {
    match java_type {
        JavaType::Primitive(Primitive::String) => true,
        JavaType::Class(class) => class.fully_qualified_name == "java.lang.String",
        _ => false,
    }
}

impl TreeVisitor<J, ()> for TypeAttribution<'_> {
    fn dispatch(&self, tree: &J, p: &(), cx: &mut Traversal<J>) -> VisitResult<J> {
        dispatch(self, tree, p, cx)
    }
}

impl JavaVisitor<()> for TypeAttribution<'_> {
    fn visit_class_declaration(&self, node: &Arc<ClassDeclaration>, p: &(), cx: &mut Traversal<J>) -> VisitResult<J> {
        let enclosing = self.enclosing_types(cx.cursor());
        let walked = walk_class_declaration(self, node, p, cx)?;
        let (J::ClassDeclaration(class), Some(fqn)) = (&walked, enclosing.first()) else {
            return Ok(walked);
        };
        Ok(ClassDeclaration {
            class_type: JavaType::class(fqn.as_str(), type_kind(class.kind)),
            ..(**class).clone()
        }
        .into())
    }

    fn visit_identifier(&self, node: &Arc<Identifier>, p: &(), cx: &mut Traversal<J>) -> VisitResult<J> {
        let cursor = cx.cursor();
        let id = node.meta.id;
        if is_declared_or_selected_name(id, cursor) {
            return walk_identifier(self, node, p, cx);
        }

        let enclosing = self.enclosing_types(cursor);
        let resolved = if is_type_position(id, cursor) {
            self.resolver.resolve_name(&node.simple_name, &enclosing)
        } else {
            self.lookup_variable(&node.simple_name, cursor, &enclosing)
                .or_else(|| self.resolver.resolve_static(&node.simple_name))
                .unwrap_or_else(|| self.resolver.resolve_name(&node.simple_name, &enclosing))
        };

        if !resolved.is_known() {
            return walk_identifier(self, node, p, cx);
        }
        Ok(Identifier {
            ident_type: resolved,
            ..(**node).clone()
        }
        .into())
    }

    fn visit_field_access(&self, node: &Arc<FieldAccess>, p: &(), cx: &mut Traversal<J>) -> VisitResult<J> {
        let enclosing = self.enclosing_types(cx.cursor());
        let walked = walk_field_access(self, node, p, cx)?;
        let J::FieldAccess(access) = &walked else {
            return Ok(walked);
        };
        let Some(name) = access.name.element.simple_name() else {
            return Ok(walked);
        };

        let table = self.resolver.table;
        let field_type = match access.target.java_type() {
            JavaType::Class(owner) => table
                .field(&owner.fully_qualified_name, name)
                .cloned()
                .or_else(|| table.class_type(&format!("{}.{name}", owner.fully_qualified_name))),
            _ => None,
        }
        .or_else(|| table.class_type(&qualified_name(&walked)))
        .unwrap_or_else(|| {
            // Fully qualified references to types outside the parsed set
            let name = qualified_name(&walked);
            if cx.cursor().parent_value().is_some_and(|parent| {
                matches!(parent, J::VariableDeclarations(_) | J::MethodDeclaration(_) | J::NewClass(_))
            }) {
                self.resolver.resolve_qualified(&name, &enclosing)
            } else {
                JavaType::Unknown
            }
        });

        if !field_type.is_known() {
            return Ok(walked);
        }
        let name = match &access.name.element {
            J::Identifier(ident) => Identifier {
                ident_type: field_type.clone(),
                ..(**ident).clone()
            }
            .into(),
            other => other.clone(),
        };
        Ok(FieldAccess {
            name: access.name.with_element(name),
            field_type,
            ..(**access).clone()
        }
        .into())
    }

    fn visit_method_invocation(&self, node: &Arc<MethodInvocation>, p: &(), cx: &mut Traversal<J>) -> VisitResult<J> {
        let enclosing = self.enclosing_types(cx.cursor());
        let walked = walk_method_invocation(self, node, p, cx)?;
        let J::MethodInvocation(method) = &walked else {
            return Ok(walked);
        };

        let declaring_type = match &method.select {
            Some(select) => select.element.java_type(),
            None => enclosing
                .first()
                .and_then(|fqn| self.resolver.table.class_type(fqn))
                .unwrap_or_default(),
        };
        let parameter_types = method
            .arguments
            .elements
            .iter()
            .filter(|arg| arg.element.kind() != JKind::Empty)
            .map(|arg| arg.element.java_type())
            .collect();
        let method_type = MethodType {
            declaring_type,
            name: method.name.simple_name().unwrap_or_default().to_string(),
            parameter_types,
        };
        Ok(MethodInvocation {
            method_type: Some(method_type),
            ..(**method).clone()
        }
        .into())
    }

    fn visit_named_variable(&self, node: &Arc<NamedVariable>, p: &(), cx: &mut Traversal<J>) -> VisitResult<J> {
        let enclosing = self.enclosing_types(cx.cursor());
        let var_type = match cx.cursor().parent_value() {
            Some(J::VariableDeclarations(decls)) => decls
                .type_expr
                .as_ref()
                .map(|t| self.resolver.resolve_type_tree(t, &enclosing))
                .unwrap_or_default(),
            _ => JavaType::Unknown,
        };
        let walked = walk_named_variable(self, node, p, cx)?;
        let J::NamedVariable(var) = &walked else {
            return Ok(walked);
        };
        if !var_type.is_known() {
            return Ok(walked);
        }
        let name = match &var.name {
            J::Identifier(ident) => Identifier {
                ident_type: var_type.clone(),
                ..(**ident).clone()
            }
            .into(),
            other => other.clone(),
        };
        Ok(NamedVariable {
            name,
            var_type,
            ..(**var).clone()
        }
        .into())
    }

    fn visit_binary(&self, node: &Arc<Binary>, p: &(), cx: &mut Traversal<J>) -> VisitResult<J> {
        let walked = walk_binary(self, node, p, cx)?;
        let J::Binary(binary) = &walked else {
            return Ok(walked);
        };
        let left = binary.left.java_type();
        let right = binary.right.java_type();
        let binary_type = match binary.operator.element {
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::LessThan
            | BinaryOperator::GreaterThan
            | BinaryOperator::LessThanOrEqual
            | BinaryOperator::GreaterThanOrEqual
            | BinaryOperator::And
            | BinaryOperator::Or => JavaType::Primitive(Primitive::Boolean),
            BinaryOperator::Addition if is_string(&right) && !is_string(&left) => right,
            _ => left,
        };
        if binary_type == binary.binary_type {
            return Ok(walked);
        }
        Ok(Binary {
            binary_type,
            ..(**binary).clone()
        }
        .into())
    }
}

/// Attach types to `cu` using declarations from `table`
pub fn attribute(cu: &CompilationUnit, table: &TypeTable) -> CompilationUnit {
    let visitor = TypeAttribution {
        resolver: Resolver::new(table, cu),
    };
    let tree = J::from(cu.clone());
    match visitor.visit_root(&tree, &()) {
        Ok(J::CompilationUnit(attributed)) => Arc::unwrap_or_clone(attributed),
        Ok(_) => cu.clone(),
        Err(e) => {
            warn!(path = %cu.source_path.display(), error = %e, "type attribution failed");
            cu.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::parser::parse_compilation_unit;
    use crate::printer::ToSource;
    use pretty_assertions::assert_eq;

    /// Records the printed form and type of every identifier and field access
    #[derive(Default)]
    struct Collect {
        seen: RefCell<Vec<(String, JavaType)>>,
    }

    impl TreeVisitor<J, ()> for Collect {
        fn dispatch(&self, tree: &J, p: &(), cx: &mut Traversal<J>) -> VisitResult<J> {
            match tree {
                J::FieldAccess(_) | J::Identifier(_) => {
                    self.seen
                        .borrow_mut()
                        .push((tree.to_source().trim().to_string(), tree.java_type()));
                }
                _ => {}
            }
            dispatch(self, tree, p, cx)
        }
    }

    impl JavaVisitor<()> for Collect {}

    impl Collect {
        fn type_of(&self, source: &str) -> Option<JavaType> {
            self.seen
                .borrow()
                .iter()
                .find(|(printed, _)| printed == source)
                .map(|(_, t)| t.clone())
        }
    }

    fn parse(source: &str) -> CompilationUnit {
        parse_compilation_unit(source).unwrap()
    }

    fn collect(cu: &CompilationUnit) -> Collect {
        let collect = Collect::default();
        collect.visit_root(&J::from(cu.clone()), &()).unwrap();
        collect
    }

    #[test]
    fn test_imported_enum_constant() {
        let enum_a = parse("package a; public enum A { FOO, BAR, BUZ }");
        let test = parse(
            "import a.A;\nclass Test {\n    boolean f(A arg0) {\n        return A.FOO.equals(arg0);\n    }\n}\n",
        );
        let table = TypeTable::build(&[&enum_a, &test]);
        assert_eq!(table.kind_of("a.A"), Some(TypeKind::Enum));

        let attributed = attribute(&test, &table);
        let seen = collect(&attributed);

        let foo = seen.type_of("A.FOO").unwrap();
        assert!(foo.is_enum());
        assert_eq!(foo.fully_qualified_name(), Some("a.A"));
        assert_eq!(
            seen.type_of("arg0").and_then(|t| t.fully_qualified_name().map(String::from)),
            Some("a.A".to_string())
        );
    }

    #[test]
    fn test_method_type_uses_receiver() {
        let enum_a = parse("package a; public enum A { FOO, BAR, BUZ }");
        let test =
            parse("import a.A;\nclass Test {\n    boolean f(A arg0) {\n        return A.FOO.equals(arg0);\n    }\n}\n");
        let table = TypeTable::build(&[&enum_a, &test]);
        let attributed = attribute(&test, &table);

        let J::ClassDeclaration(class) = &attributed.types[0] else {
            panic!("expected a class");
        };
        assert_eq!(class.class_type.fully_qualified_name(), Some("Test"));

        let J::Block(body) = &class.body else { panic!() };
        let J::MethodDeclaration(method) = &body.statements[0].element else { panic!() };
        let Some(J::Block(block)) = &method.body else { panic!() };
        let J::Return(ret) = &block.statements[0].element else { panic!() };
        let Some(J::MethodInvocation(invocation)) = &ret.expression else { panic!() };
        let method_type = invocation.method_type.as_ref().unwrap();
        assert_eq!(method_type.name, "equals");
        assert!(method_type.declaring_type.is_enum());
        assert!(method_type.parameter_types[0].is_enum());
    }

    #[test]
    fn test_nested_enum_in_same_unit() {
        let cu = parse(
            "package b;\nclass Outer {\n    enum Color { RED, GREEN }\n    Color current;\n    boolean f() {\n        return current == Color.RED;\n    }\n}\n",
        );
        let table = TypeTable::build(&[&cu]);
        assert_eq!(table.kind_of("b.Outer.Color"), Some(TypeKind::Enum));

        let seen = collect(&attribute(&cu, &table));
        assert_eq!(
            seen.type_of("Color.RED").and_then(|t| t.fully_qualified_name().map(String::from)),
            Some("b.Outer.Color".to_string())
        );
        assert!(seen.type_of("current").is_some_and(|t| t.is_enum()));
    }

    #[test]
    fn test_locals_shadow_and_scope() {
        let cu = parse(
            "class T {\n    void f(String s) {\n        int n = s.length();\n        for (int i = 0; i < n; i++) {}\n        Runnable r = () -> {};\n    }\n}\n",
        );
        let table = TypeTable::build(&[&cu]);
        let seen = collect(&attribute(&cu, &table));

        assert_eq!(
            seen.type_of("s").and_then(|t| t.fully_qualified_name().map(String::from)),
            Some("java.lang.String".to_string())
        );
        assert_eq!(seen.type_of("n"), Some(JavaType::Primitive(Primitive::Int)));
        assert_eq!(seen.type_of("i"), Some(JavaType::Primitive(Primitive::Int)));
    }

    #[test]
    fn test_static_import_of_enum_constant() {
        let enum_a = parse("package a; public enum A { FOO, BAR }");
        let test = parse("import static a.A.FOO;\nclass Test {\n    Object f() {\n        return FOO;\n    }\n}\n");
        let table = TypeTable::build(&[&enum_a, &test]);
        let seen = collect(&attribute(&test, &table));

        assert!(seen.type_of("FOO").is_some_and(|t| t.is_enum()));
    }
}
