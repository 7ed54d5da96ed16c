use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use rewrite_cli::{load_config, parse_option, run, write_results};
use rewrite_core::RewriteConfig;
use serde_json::json;
use tempfile::TempDir;

fn write(dir: &Path, relative: &str, text: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn config(recipe: &str, options: serde_json::Value) -> RewriteConfig {
    RewriteConfig {
        recipe: Some(recipe.to_string()),
        options: options.as_object().cloned().unwrap_or_default(),
        ..Default::default()
    }
}

#[test]
fn test_change_property_key_in_place() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "src/main/resources/application.properties", "server.port=8080\n");
    write(temp_dir.path(), "README.md", "server.port is documented here\n");

    let summary = run(
        temp_dir.path(),
        &config("ChangePropertyKey", json!({"oldPropertyKey": "server.port", "newPropertyKey": "chassis.port"})),
    )
    .unwrap();

    assert_eq!(summary.changed, 1);
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("src/main/resources/application.properties")).unwrap(),
        "chassis.port=8080\n"
    );
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("README.md")).unwrap(),
        "server.port is documented here\n"
    );
}

#[test]
fn test_dry_run_leaves_files_alone() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "src/Test.java",
        "class Test {\n    int f(int a) {\n        return (a);\n    }\n}\n",
    );

    let summary = run(
        temp_dir.path(),
        &RewriteConfig {
            dry_run: true,
            ..config("UnnecessaryParentheses", json!({}))
        },
    )
    .unwrap();

    assert_eq!(summary.changed, 1);
    assert_eq!(summary.diffs.len(), 1);
    assert!(summary.diffs[0].contains("+        return a;"));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("src/Test.java")).unwrap(),
        "class Test {\n    int f(int a) {\n        return (a);\n    }\n}\n"
    );
}

#[test]
fn test_gradle_wrapper_is_written() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "build.gradle", "plugins {\n    id 'java'\n}\n");

    let summary = run(temp_dir.path(), &config("AddGradleWrapper", json!({"version": "7.6.1"}))).unwrap();

    assert_eq!(summary.generated, 4);
    assert_eq!(summary.skipped, 1);
    let properties = fs::read_to_string(temp_dir.path().join("gradle/wrapper/gradle-wrapper.properties")).unwrap();
    assert!(properties.contains("distributionUrl=https\\://services.gradle.org/distributions/gradle-7.6.1-bin.zip\n"));
    assert!(temp_dir.path().join("gradlew").exists());
    assert!(temp_dir.path().join("gradlew.bat").exists());
    assert!(!temp_dir.path().join("gradle/wrapper/gradle-wrapper.jar").exists());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(temp_dir.path().join("gradlew")).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
    }
}

#[test]
fn test_invalid_options_stop_the_run() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.properties", "a=1\n");

    let err = run(temp_dir.path(), &config("ChangePropertyKey", json!({"oldPropertyKey": "a"}))).unwrap_err();
    assert!(format!("{err:#}").contains("newPropertyKey"));
    assert_eq!(fs::read_to_string(temp_dir.path().join("a.properties")).unwrap(), "a=1\n");
}

#[test]
fn test_unknown_recipe_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(run(temp_dir.path(), &config("NoSuchRecipe", json!({}))).is_err());
}

#[test]
fn test_config_file_in_project_root() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "rewrite.json",
        r#"{"recipe": "ChangePropertyValue", "maxCycles": 2, "options": {"propertyKey": "a", "newValue": "2"}}"#,
    );

    let config = load_config(temp_dir.path(), None).unwrap();
    assert_eq!(config.recipe.as_deref(), Some("ChangePropertyValue"));
    assert_eq!(config.max_cycles, 2);
    assert_eq!(config.options["newValue"], "2");

    let missing = TempDir::new().unwrap();
    assert_eq!(load_config(missing.path(), None).unwrap(), RewriteConfig::default());
}

#[test]
fn test_nothing_to_write() {
    let temp_dir = TempDir::new().unwrap();
    let summary = write_results(temp_dir.path(), &[]).unwrap();
    assert_eq!(summary.changed + summary.generated + summary.deleted, 0);
}

#[test]
fn test_numeric_option_value_from_command_line() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "application.properties", "server.port=80\n");

    let mut config = config("ChangePropertyValue", json!({}));
    for arg in ["propertyKey=server.port", "newValue=8080"] {
        let (key, value) = parse_option(arg).unwrap();
        config.options.insert(key, value);
    }
    let summary = run(temp_dir.path(), &config).unwrap();

    assert_eq!(summary.changed, 1);
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("application.properties")).unwrap(),
        "server.port=8080\n"
    );
}
