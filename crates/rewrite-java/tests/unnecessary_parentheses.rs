use rewrite_java::{UnnecessaryParentheses, UnnecessaryParenthesesStyle};
use rewrite_test::{java, RewriteTest};

fn rewrite_test() -> RewriteTest {
    RewriteTest::new(UnnecessaryParentheses::default())
}

#[test]
fn unwrap_identifier_and_literal() {
    rewrite_test().rewrite_run(vec![java(
        r#"class Test {
    int method(int a) {
        int b = (a);
        int c = (1);
        b += (2);
        return (b);
    }
}
"#,
    )
    .after(
        r#"class Test {
    int method(int a) {
        int b = a;
        int c = 1;
        b += 2;
        return b;
    }
}
"#,
    )]);
}

#[test]
fn return_keeps_a_separating_space() {
    rewrite_test().rewrite_run(vec![java(
        r#"class Test {
    int method(int a) {
        return(a);
    }
}
"#,
    )
    .after(
        r#"class Test {
    int method(int a) {
        return a;
    }
}
"#,
    )]);
}

#[test]
fn unwrap_doubled_condition() {
    rewrite_test().rewrite_run(vec![java(
        r#"class Test {
    void method(int a, int b) {
        if ((a > b)) {
        }
        while ((a < b)) {
            a++;
        }
    }
}
"#,
    )
    .after(
        r#"class Test {
    void method(int a, int b) {
        if (a > b) {
        }
        while (a < b) {
            a++;
        }
    }
}
"#,
    )]);
}

#[test]
fn negated_comparison_keeps_parentheses() {
    rewrite_test().rewrite_run(vec![java(
        r#"class Test {
    boolean method(int a) {
        return !(a > 1);
    }
}
"#,
    )]);
}

#[test]
fn disabled_style_is_respected() {
    let style = UnnecessaryParenthesesStyle {
        ident: false,
        assign: false,
        ..Default::default()
    };
    RewriteTest::new(UnnecessaryParentheses::with_style(style)).rewrite_run(vec![java(
        r#"class Test {
    void method(int a) {
        int b = (a);
    }
}
"#,
    )]);
}

#[test]
fn instanceof_operand_keeps_its_separation() {
    rewrite_test().rewrite_run(vec![
        java(
            r#"class Test {
    boolean method(Object a) {
        boolean b = (a)instanceof String;
        return b;
    }
}
"#,
        ),
        java(
            r#"class Other {
    boolean method(Object a) {
        return (a) instanceof String;
    }
}
"#,
        )
        .after(
            r#"class Other {
    boolean method(Object a) {
        return a instanceof String;
    }
}
"#,
        ),
    ]);
}
