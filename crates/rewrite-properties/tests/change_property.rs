use rewrite_properties::{ChangePropertyKey, ChangePropertyValue};
use rewrite_test::{properties, RewriteTest};

#[test]
fn change_key() {
    RewriteTest::new(ChangePropertyKey::new(
        "management.metrics.binders.files.enabled",
        "management.metrics.enable.process.files",
    ))
    .rewrite_run(vec![
        properties("management.metrics.binders.files.enabled=true\n")
            .after("management.metrics.enable.process.files=true\n"),
    ]);
}

#[test]
fn change_key_of_subproperties() {
    RewriteTest::new(ChangePropertyKey::new("server", "chassis")).rewrite_run(vec![properties(
        "# ports\nserver.port=8080\nserver.ssl.enabled : false\nmanagement.port=9090\n",
    )
    .after("# ports\nchassis.port=8080\nchassis.ssl.enabled : false\nmanagement.port=9090\n")]);
}

#[test]
fn change_key_with_relaxed_binding() {
    RewriteTest::new(ChangePropertyKey::new("acme.my-project.person.first-name", "acme.my-project.person.name"))
        .rewrite_run(vec![properties("acme.myProject.person.firstName=example\n")
            .after("acme.my-project.person.name=example\n")]);
}

#[test]
fn change_key_without_relaxed_binding() {
    RewriteTest::new(
        ChangePropertyKey::new("acme.my-project.person.first-name", "acme.my-project.person.name")
            .relaxed_binding(false),
    )
    .rewrite_run(vec![properties("acme.myProject.person.firstName=example\n")]);
}

#[test]
fn pound_sign_in_value_is_not_a_key() {
    RewriteTest::new(ChangePropertyKey::new("server.port", "chassis.name"))
        .rewrite_run(vec![properties("key=**##**chassis.management.metrics.export.cloudwatch.awsAccessKey\n")]);
}

#[test]
fn change_value() {
    RewriteTest::new(ChangePropertyValue::new("management.metrics.binders.files.enabled", "false"))
        .rewrite_run(vec![properties("management.metrics.binders.files.enabled=true\n")
            .after("management.metrics.binders.files.enabled=false\n")]);
}

#[test]
fn change_value_only_when_old_value_matches() {
    RewriteTest::new(ChangePropertyValue::new("logging.level", "INFO").old_value("DEBUG"))
        .rewrite_run(vec![properties("logging.level=WARN\n")]);
    RewriteTest::new(ChangePropertyValue::new("logging.level", "INFO").old_value("DEBUG"))
        .rewrite_run(vec![properties("logging.level=DEBUG\n").after("logging.level=INFO\n")]);
}

#[test]
fn change_value_by_regex() {
    RewriteTest::new(ChangePropertyValue::new("hosts", "$1.example.org").old_value("([a-z]+)\\.local").regex(true))
        .rewrite_run(vec![properties("hosts=alpha.local,beta.local\nother=alpha.local\n")
            .after("hosts=alpha.example.org,beta.example.org\nother=alpha.local\n")]);
}

#[test]
fn value_already_set_is_left_alone() {
    RewriteTest::new(ChangePropertyValue::new("server.tomcat.accesslog.enabled", "true")).rewrite_run(vec![properties(
        "boot.features=https://docs.spring.io/spring-boot/docs/current/reference/htmlsingle**/#**boot-features-jersey\nserver.tomcat.accesslog.enabled=true\n",
    )]);
}

#[test]
#[should_panic(expected = "oldValue")]
fn regex_without_old_value_is_rejected() {
    RewriteTest::new(ChangePropertyValue::new("hosts", "x").regex(true)).rewrite_run(vec![properties("hosts=a\n")]);
}
