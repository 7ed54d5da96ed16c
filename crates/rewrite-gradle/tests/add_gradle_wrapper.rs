use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rewrite_core::{downcast, paths, same_file, Corpus, ExecutionContext, PlainText, Recipe, Remote, SourceFile};
use rewrite_gradle::wrapper::KNOWN_RELEASES_KEY;
use rewrite_gradle::{AddGradleWrapper, GradleRelease};
use rewrite_test::{generated, remote, text, Language, RewriteTest};

const GRADLEW: &str = include_str!("../resources/gradlew");
const GRADLEW_BAT: &str = include_str!("../resources/gradlew.bat");

const BUILD_GRADLE: &str = "plugins {\n    id 'java'\n}\n";

fn wrapper_properties(url: &str, checksum: Option<&str>) -> String {
    let mut text =
        format!("distributionBase=GRADLE_USER_HOME\ndistributionPath=wrapper/dists\ndistributionUrl={url}\n");
    if let Some(checksum) = checksum {
        text.push_str(&format!("distributionSha256Sum={checksum}\n"));
    }
    text.push_str("zipStoreBase=GRADLE_USER_HOME\nzipStorePath=wrapper/dists\n");
    text
}

#[test]
fn add_wrapper_to_project_without_one() {
    RewriteTest::new(AddGradleWrapper::new(Some("7.6.1"), None)).rewrite_run(vec![
        text(BUILD_GRADLE).path("build.gradle"),
        generated(
            Language::Properties,
            "gradle/wrapper/gradle-wrapper.properties",
            &wrapper_properties("https\\://services.gradle.org/distributions/gradle-7.6.1-bin.zip", None),
        ),
        generated(Language::Text, "gradlew", GRADLEW),
        generated(Language::Text, "gradlew.bat", GRADLEW_BAT),
        remote(
            "gradle/wrapper/gradle-wrapper.jar",
            "https://services.gradle.org/distributions/gradle-7.6.1-bin.zip",
        ),
    ]);
}

#[test]
fn only_missing_files_are_added() {
    RewriteTest::new(AddGradleWrapper::new(Some("7.x"), Some("all"))).rewrite_run(vec![
        text(BUILD_GRADLE).path("build.gradle.kts"),
        text("#!/bin/sh\necho custom\n").path("gradlew"),
        text("@echo custom\r\n").path("gradlew.bat"),
        generated(
            Language::Properties,
            "gradle/wrapper/gradle-wrapper.properties",
            &wrapper_properties("https\\://services.gradle.org/distributions/gradle-7.6.3-all.zip", None),
        ),
        remote(
            "gradle/wrapper/gradle-wrapper.jar",
            "https://services.gradle.org/distributions/gradle-7.6.3-all.zip",
        ),
    ]);
}

#[test]
fn checksum_comes_from_known_releases() {
    let ctx = ExecutionContext::new();
    ctx.put_message(
        KNOWN_RELEASES_KEY,
        vec![
            GradleRelease::new("8.0"),
            GradleRelease {
                version: "8.1".to_string(),
                bin_checksum: Some("03ec176d388f2aa99defcadc3ac6adf8dd2bce5145a129659537c0874dea5ad1".to_string()),
                all_checksum: None,
            },
        ],
    );
    RewriteTest::new(AddGradleWrapper::default().repository_url("https://mirror.example.org/gradle"))
        .execution_context(ctx)
        .rewrite_run(vec![
            text(BUILD_GRADLE).path("build.gradle"),
            text("#!/bin/sh\n").path("gradlew"),
            text("@rem\r\n").path("gradlew.bat"),
            text("").path("gradle/wrapper/gradle-wrapper.jar"),
            generated(
                Language::Properties,
                "gradle/wrapper/gradle-wrapper.properties",
                &wrapper_properties(
                    "https\\://mirror.example.org/gradle/gradle-8.1-bin.zip",
                    Some("03ec176d388f2aa99defcadc3ac6adf8dd2bce5145a129659537c0874dea5ad1"),
                ),
            ),
        ]);
}

#[test]
fn projects_without_build_script_are_skipped() {
    RewriteTest::new(AddGradleWrapper::default()).rewrite_run(vec![text("<project/>\n").path("pom.xml")]);
}

#[test]
fn complete_wrapper_is_left_alone() {
    RewriteTest::new(AddGradleWrapper::default()).rewrite_run(vec![
        text(BUILD_GRADLE).path("build.gradle"),
        text("distributionUrl=x\n").path("gradle/wrapper/gradle-wrapper.properties"),
        text("#!/bin/sh\n").path("gradlew"),
        text("@rem\r\n").path("gradlew.bat"),
        text("").path("gradle/wrapper/gradle-wrapper.jar"),
    ]);
}

#[test]
#[should_panic(expected = "version")]
fn unknown_version_is_rejected() {
    RewriteTest::new(AddGradleWrapper::new(Some("1.x"), None))
        .rewrite_run(vec![text(BUILD_GRADLE).path("build.gradle")]);
}

#[test]
fn generated_files_follow_the_existing_ones() {
    let build: Arc<dyn SourceFile> = Arc::new(PlainText::new("build.gradle", BUILD_GRADLE));
    let script: Arc<dyn SourceFile> = Arc::new(PlainText::new("gradlew", "#!/bin/sh\n"));
    let before: Corpus = Arc::new(vec![build.clone(), script.clone()]);

    let after = AddGradleWrapper::new(Some("7.6.1"), None)
        .transform_corpus(&before, &ExecutionContext::new())
        .unwrap();

    assert_eq!(after.len(), before.len() + 3);
    assert!(same_file(&after[0], &build));
    assert!(same_file(&after[1], &script));

    let added: Vec<String> = after[2..].iter().map(|s| paths::normalize(s.source_path())).collect();
    assert_eq!(
        added,
        vec![
            "gradle/wrapper/gradle-wrapper.properties",
            "gradlew.bat",
            "gradle/wrapper/gradle-wrapper.jar",
        ]
    );
    assert!(downcast::<Remote>(&after[4]).is_some());
    assert!(paths::equal_ignoring_separators(after[3].source_path(), Path::new("gradlew.bat")));
}
