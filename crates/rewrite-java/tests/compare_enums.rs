use rewrite_java::CompareEnumsWithEqualityOperator;
use rewrite_test::{java, RewriteTest, SourceSpec};

fn rewrite_test() -> RewriteTest {
    RewriteTest::new(CompareEnumsWithEqualityOperator::default())
}

fn enum_a() -> SourceSpec {
    java(
        r#"package a;
public enum A {
    FOO, BAR, BUZ
}
"#,
    )
}

#[test]
fn change_enum_equals() {
    rewrite_test().rewrite_run(vec![
        enum_a(),
        java(
            r#"import a.A;
class Test {
    void method(A arg0) {
        if (A.FOO.equals(arg0)) {
        }
        if (arg0.equals(A.FOO)) {
        }
    }
}
"#,
        )
        .after(
            r#"import a.A;
class Test {
    void method(A arg0) {
        if (A.FOO == arg0) {
        }
        if (arg0 == A.FOO) {
        }
    }
}
"#,
        ),
    ]);
}

#[test]
fn change_enum_not_equals() {
    rewrite_test().rewrite_run(vec![
        enum_a(),
        java(
            r#"import a.A;
class Test {
    void method(A arg0) {
        if (!A.FOO.equals(arg0)) {
        }
        if (!arg0.equals(A.FOO)) {
        }
    }
}
"#,
        )
        .after(
            r#"import a.A;
class Test {
    void method(A arg0) {
        if (A.FOO != arg0) {
        }
        if (arg0 != A.FOO) {
        }
    }
}
"#,
        ),
    ]);
}

#[test]
fn change_enum_not_equals_with_parentheses() {
    rewrite_test().rewrite_run(vec![
        enum_a(),
        java(
            r#"import a.A;
class Test {
    void method(A arg0) {
        if (!(A.FOO.equals(arg0))) {
        }
    }
}
"#,
        )
        .after(
            r#"import a.A;
class Test {
    void method(A arg0) {
        if (A.FOO != arg0) {
        }
    }
}
"#,
        ),
    ]);
}

#[test]
fn nested_enum_inside_condition() {
    rewrite_test().rewrite_run(vec![java(
        r#"class T {
    enum Type {
        SIMPLE_PROPERTY
    }
    void m(Object parameterValue, Type partType) {
        if (parameterValue == null && Type.SIMPLE_PROPERTY.equals(partType)) {
            throw new IllegalArgumentException();
        }
    }
}
"#,
    )
    .after(
        r#"class T {
    enum Type {
        SIMPLE_PROPERTY
    }
    void m(Object parameterValue, Type partType) {
        if (parameterValue == null && Type.SIMPLE_PROPERTY == partType) {
            throw new IllegalArgumentException();
        }
    }
}
"#,
    )]);
}

#[test]
fn nested_enum_negated_inside_condition() {
    rewrite_test().rewrite_run(vec![java(
        r#"class T {
    enum Type {
        SIMPLE_PROPERTY
    }
    void m(Object parameterValue, Type partType) {
        if (parameterValue == null && !Type.SIMPLE_PROPERTY.equals(partType)) {
            throw new IllegalArgumentException();
        }
    }
}
"#,
    )
    .after(
        r#"class T {
    enum Type {
        SIMPLE_PROPERTY
    }
    void m(Object parameterValue, Type partType) {
        if (parameterValue == null && Type.SIMPLE_PROPERTY != partType) {
            throw new IllegalArgumentException();
        }
    }
}
"#,
    )]);
}

#[test]
fn string_equals_is_left_alone() {
    rewrite_test().rewrite_run(vec![java(
        r#"class Test {
    boolean method(String a, String b) {
        return a.equals(b);
    }
}
"#,
    )]);
}
