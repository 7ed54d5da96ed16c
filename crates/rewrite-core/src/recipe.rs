//! The recipe contract.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::context::ExecutionContext;
use crate::source::{Corpus, SourceFile};
use crate::validated::{Validated, ValidationError};
use crate::visitor::VisitError;

/// Errors raised by a recipe while it transforms a file or the corpus
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    /// A visitor returned a malformed tree
    #[error("recipe {recipe} produced a malformed tree for {}: {source}", path.display())]
    Defect {
        recipe: String,
        path: PathBuf,
        #[source]
        source: VisitError,
    },

    #[error("recipe {recipe} has invalid options: {source}")]
    InvalidOptions {
        recipe: String,
        #[source]
        source: ValidationError,
    },

    #[error("recipe {recipe} failed on {}: {message}", path.display())]
    Failed {
        recipe: String,
        path: PathBuf,
        message: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RecipeError {
    pub fn defect(recipe: &str, path: &Path, source: VisitError) -> Self {
        RecipeError::Defect {
            recipe: recipe.to_string(),
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn failed(recipe: &str, path: &Path, message: impl Into<String>) -> Self {
        RecipeError::Failed {
            recipe: recipe.to_string(),
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// A declared recipe option, with its current value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeOption {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub example: Option<&'static str>,
    pub required: bool,
    /// Accepted values; empty means anything goes
    pub valid: &'static [&'static str],
    pub value: Option<String>,
}

impl RecipeOption {
    pub fn new(name: &'static str, display_name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            display_name,
            description,
            example: None,
            required: true,
            valid: &[],
            value: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn example(mut self, example: &'static str) -> Self {
        self.example = Some(example);
        self
    }

    pub fn valid(mut self, valid: &'static [&'static str]) -> Self {
        self.valid = valid;
        self
    }

    pub fn value<V: ToString>(mut self, value: Option<V>) -> Self {
        self.value = value.map(|v| v.to_string());
        self
    }

    /// Required and allowed-value checks for this option alone
    pub fn validate(&self) -> Validated<()> {
        match &self.value {
            None if self.required => Validated::invalid(self.name, None, "is required"),
            Some(value) if !self.valid.is_empty() && !self.valid.contains(&value.as_str()) => Validated::invalid(
                self.name,
                Some(value.clone()),
                format!("must be one of {}", self.valid.join(", ")),
            ),
            _ => Validated::none(),
        }
    }
}

/// Check every option, reporting all failures together
pub fn validate_options(options: &[RecipeOption]) -> Validated<()> {
    options
        .iter()
        .fold(Validated::none(), |acc, option| acc.and(option.validate()))
}

/// Cheap, read-only pre-test deciding whether a recipe touches a file
pub trait Applicability: Send + Sync {
    fn applies_to(&self, source: &Arc<dyn SourceFile>, ctx: &ExecutionContext) -> Result<bool, RecipeError>;
}

/// Applicability decided by the file's source path alone
pub struct ByPath<F> {
    predicate: F,
}

impl<F> ByPath<F>
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> Applicability for ByPath<F>
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn applies_to(&self, source: &Arc<dyn SourceFile>, _ctx: &ExecutionContext) -> Result<bool, RecipeError> {
        Ok((self.predicate)(source.source_path()))
    }
}

/// A named, validated transformation over one file or the whole corpus.
///
/// Recipes are immutable for the duration of a run. The scheduler validates
/// every recipe before any tree is touched, then for each cycle calls
/// [`Recipe::transform_file`] on every applicable file, then
/// [`Recipe::transform_corpus`] once, then each entry of
/// [`Recipe::recipe_list`] in order.
pub trait Recipe: Send + Sync {
    /// Stable identifier used by the registry and in diagnostics
    fn name(&self) -> &str;

    fn display_name(&self) -> &str {
        self.name()
    }

    fn description(&self) -> &str;

    fn version(&self) -> u32 {
        1
    }

    /// Declared options with their configured values
    fn options(&self) -> Vec<RecipeOption> {
        Vec::new()
    }

    /// Validate options independently of any tree. Recipes that wrap a
    /// collaborator with its own checks combine them with [`Validated::and`].
    fn validate(&self, _ctx: &ExecutionContext) -> Validated<()> {
        validate_options(&self.options())
    }

    fn applicability_test(&self) -> Option<Arc<dyn Applicability>> {
        None
    }

    /// Transform one file. Returning the input instance means "no change".
    fn transform_file(
        &self,
        source: &Arc<dyn SourceFile>,
        _ctx: &ExecutionContext,
    ) -> Result<Arc<dyn SourceFile>, RecipeError> {
        Ok(source.clone())
    }

    /// Transform the ordered corpus after per-file transforms ran. Files may
    /// be passed through, replaced, removed or appended; pre-existing files
    /// keep their relative order. Returning the input `Arc` means "no change".
    fn transform_corpus(&self, before: &Corpus, _ctx: &ExecutionContext) -> Result<Corpus, RecipeError> {
        Ok(before.clone())
    }

    /// Nested recipes, run after this one
    fn recipe_list(&self) -> Vec<Arc<dyn Recipe>> {
        Vec::new()
    }
}

impl fmt::Debug for dyn Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recipe")
            .field("name", &self.name())
            .field("options", &self.options())
            .finish()
    }
}

/// A recipe that only runs other recipes, in sequence
pub struct CompositeRecipe {
    pub name: String,
    pub description: String,
    pub recipes: Vec<Arc<dyn Recipe>>,
}

impl CompositeRecipe {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            recipes: Vec::new(),
        }
    }

    pub fn add_recipe(mut self, recipe: Arc<dyn Recipe>) -> Self {
        self.recipes.push(recipe);
        self
    }
}

impl Recipe for CompositeRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn recipe_list(&self) -> Vec<Arc<dyn Recipe>> {
        self.recipes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::PlainText;

    struct Download {
        version: Option<String>,
        distribution: Option<String>,
    }

    impl Recipe for Download {
        fn name(&self) -> &str {
            "Download"
        }

        fn description(&self) -> &str {
            "Test recipe with two options."
        }

        fn options(&self) -> Vec<RecipeOption> {
            vec![
                RecipeOption::new("version", "Version", "Version to fetch.").value(self.version.as_ref()),
                RecipeOption::new("distribution", "Distribution", "Archive flavor.")
                    .optional()
                    .valid(&["bin", "all"])
                    .value(self.distribution.as_ref()),
            ]
        }
    }

    #[test]
    fn test_default_validate_reports_every_option() {
        let recipe = Download {
            version: None,
            distribution: Some("src".to_string()),
        };
        let result = recipe.validate(&ExecutionContext::new());

        let properties: Vec<_> = result.failures().iter().map(|f| f.property.as_str()).collect();
        assert_eq!(properties, vec!["version", "distribution"]);
    }

    #[test]
    fn test_optional_option_may_be_absent() {
        let recipe = Download {
            version: Some("8.5".to_string()),
            distribution: None,
        };
        assert!(recipe.validate(&ExecutionContext::new()).is_valid());
    }

    #[test]
    fn test_by_path_applicability() {
        let ctx = ExecutionContext::new();
        let test = ByPath::new(|path: &Path| path.ends_with("build.gradle"));
        let build: Arc<dyn SourceFile> = Arc::new(PlainText::new("app/build.gradle", ""));
        let readme: Arc<dyn SourceFile> = Arc::new(PlainText::new("README.md", ""));

        assert!(test.applies_to(&build, &ctx).unwrap());
        assert!(!test.applies_to(&readme, &ctx).unwrap());
    }

    #[test]
    fn test_default_transforms_are_identity() {
        let ctx = ExecutionContext::new();
        let recipe = CompositeRecipe::new("Empty", "Does nothing.");
        let file: Arc<dyn SourceFile> = Arc::new(PlainText::new("a.txt", "a"));
        let corpus: Corpus = Arc::new(vec![file.clone()]);

        let after = recipe.transform_file(&file, &ctx).unwrap();
        assert!(crate::source::same_file(&file, &after));
        assert!(Arc::ptr_eq(&corpus, &recipe.transform_corpus(&corpus, &ctx).unwrap()));
    }
}
