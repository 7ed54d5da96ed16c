use std::path::Path;
use std::sync::Arc;

use rewrite_core::{
    paths, Applicability, Corpus, ExecutionContext, FileAttributes, PlainText, Recipe, RecipeError, RecipeOption,
    SourceFile, Validated,
};
use rewrite_properties::PropertiesParser;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::is_build_gradle::IsBuildGradle;
use crate::wrapper::*;

const GRADLEW: &str = include_str!("../resources/gradlew");
const GRADLEW_BAT: &str = include_str!("../resources/gradlew.bat");

/// Adds the wrapper properties, scripts and jar to a Gradle project that
/// lacks any of them. Files already present are never replaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddGradleWrapper {
    pub version: Option<String>,
    pub distribution: Option<String>,
    pub repository_url: Option<String>,
}

impl AddGradleWrapper {
    pub const NAME: &'static str = "AddGradleWrapper";

    pub fn new(version: Option<&str>, distribution: Option<&str>) -> Self {
        Self {
            version: version.map(str::to_string),
            distribution: distribution.map(str::to_string),
            repository_url: None,
        }
    }

    pub fn repository_url(mut self, url: impl Into<String>) -> Self {
        self.repository_url = Some(url.into());
        self
    }

    fn wrapper(&self, ctx: &ExecutionContext) -> Validated<GradleWrapper> {
        GradleWrapper::validate(
            self.version.as_deref(),
            self.distribution.as_deref(),
            self.repository_url.as_deref(),
            ctx,
        )
    }
}

#[derive(Debug, Default)]
struct Missing {
    properties: bool,
    script: bool,
    batch: bool,
    jar: bool,
}

impl Missing {
    fn in_corpus(corpus: &Corpus) -> Self {
        let present = |location: &str| {
            corpus
                .iter()
                .any(|source| paths::equal_ignoring_separators(source.source_path(), Path::new(location)))
        };
        Self {
            properties: !present(WRAPPER_PROPERTIES_LOCATION),
            script: !present(WRAPPER_SCRIPT_LOCATION),
            batch: !present(WRAPPER_BATCH_LOCATION),
            jar: !present(WRAPPER_JAR_LOCATION),
        }
    }

    fn any(&self) -> bool {
        self.properties || self.script || self.batch || self.jar
    }
}

fn script(location: &str, text: &str) -> Arc<dyn SourceFile> {
    Arc::new(
        PlainText::new(paths::from_slashes(location), text)
            .with_file_attributes(FileAttributes::generated(true))
            .with_charset("UTF-8"),
    )
}

impl Recipe for AddGradleWrapper {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Add Gradle wrapper"
    }

    fn description(&self) -> &str {
        "Add a Gradle wrapper where one does not exist."
    }

    fn options(&self) -> Vec<RecipeOption> {
        vec![
            RecipeOption::new(
                "version",
                "New version",
                "An exact version number or a selector such as `7.x`. Defaults to the latest release.",
            )
            .optional()
            .example("7.x")
            .value(self.version.as_ref()),
            RecipeOption::new(
                "distribution",
                "Distribution type",
                "\"bin\" includes Gradle binaries, \"all\" adds sources and documentation. Defaults to \"bin\".",
            )
            .optional()
            .valid(&["bin", "all"])
            .value(self.distribution.as_ref()),
            RecipeOption::new(
                "repositoryUrl",
                "Repository URL",
                "Base URL Gradle distributions are downloaded from.",
            )
            .optional()
            .example(DEFAULT_REPOSITORY_URL)
            .value(self.repository_url.as_ref()),
        ]
    }

    /// Every option is optional, and resolving the wrapper checks each one
    fn validate(&self, ctx: &ExecutionContext) -> Validated<()> {
        self.wrapper(ctx).map(|_| ())
    }

    fn applicability_test(&self) -> Option<Arc<dyn Applicability>> {
        Some(Arc::new(IsBuildGradle::new()))
    }

    fn transform_corpus(&self, before: &Corpus, ctx: &ExecutionContext) -> Result<Corpus, RecipeError> {
        let missing = Missing::in_corpus(before);
        if !missing.any() {
            return Ok(before.clone());
        }
        let wrapper = self
            .wrapper(ctx)
            .value()
            .map_err(|e| RecipeError::failed(Self::NAME, Path::new(WRAPPER_PROPERTIES_LOCATION), e.to_string()))?;

        let mut generated: Vec<Arc<dyn SourceFile>> = Vec::new();
        if missing.properties {
            generated.push(PropertiesParser::new().parse_source(
                paths::from_slashes(WRAPPER_PROPERTIES_LOCATION),
                &wrapper.properties_text(),
                ctx,
            ));
        }
        if missing.script {
            generated.push(script(WRAPPER_SCRIPT_LOCATION, GRADLEW));
        }
        if missing.batch {
            generated.push(script(WRAPPER_BATCH_LOCATION, GRADLEW_BAT));
        }
        if missing.jar {
            generated.push(Arc::new(wrapper.as_remote()));
        }
        info!(version = %wrapper.version, added = generated.len(), "adding Gradle wrapper");

        let mut after: Vec<Arc<dyn SourceFile>> = before.iter().cloned().collect();
        after.extend(generated);
        Ok(Arc::new(after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn corpus(paths: &[&str]) -> Corpus {
        Arc::new(
            paths
                .iter()
                .map(|p| Arc::new(PlainText::new(*p, "")) as Arc<dyn SourceFile>)
                .collect(),
        )
    }

    #[test]
    fn test_missing_ignores_separators() {
        let missing = Missing::in_corpus(&corpus(&["gradle\\wrapper\\gradle-wrapper.properties", "gradlew"]));
        assert!(!missing.properties);
        assert!(!missing.script);
        assert!(missing.batch);
        assert!(missing.jar);
    }

    #[test]
    fn test_complete_wrapper_is_left_alone() {
        let before = corpus(&[
            "build.gradle",
            WRAPPER_PROPERTIES_LOCATION,
            WRAPPER_SCRIPT_LOCATION,
            WRAPPER_BATCH_LOCATION,
            WRAPPER_JAR_LOCATION,
        ]);
        let after = AddGradleWrapper::default()
            .transform_corpus(&before, &ExecutionContext::new())
            .unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_invalid_distribution_is_rejected() {
        let recipe = AddGradleWrapper::new(Some("7.x"), Some("src"));
        let validated = recipe.validate(&ExecutionContext::new());
        assert_eq!(validated.failures().len(), 1);
        assert_eq!(validated.failures()[0].property, "distribution");
        assert_eq!(validated.failures()[0].invalid_value.as_deref(), Some("src"));
    }
}
