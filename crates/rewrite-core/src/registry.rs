//! Construction boundary for catalog loaders: recipe name plus JSON options
//! in, constructed recipe plus its validation result out.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::context::ExecutionContext;
use crate::recipe::Recipe;
use crate::validated::Validated;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown recipe '{0}'")]
    UnknownRecipe(String),

    #[error("options for recipe '{name}' could not be decoded")]
    Options {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

type Factory = Box<dyn Fn(Value) -> Result<Arc<dyn Recipe>, serde_json::Error> + Send + Sync>;

struct Entry {
    description: String,
    factory: Factory,
}

/// Recipes known by name, in registration order
#[derive(Default)]
pub struct RecipeRegistry {
    entries: IndexMap<String, Entry>,
}

impl RecipeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recipe whose options deserialize from a JSON object
    pub fn register<R>(&mut self, name: impl Into<String>, description: impl Into<String>)
    where
        R: Recipe + DeserializeOwned + 'static,
    {
        self.register_with(name, description, |options| {
            let recipe: R = serde_json::from_value(options)?;
            Ok(Arc::new(recipe) as Arc<dyn Recipe>)
        });
    }

    /// Register a recipe without options
    pub fn register_default<R>(&mut self, name: impl Into<String>, description: impl Into<String>)
    where
        R: Recipe + Default + 'static,
    {
        self.register_with(name, description, |_| Ok(Arc::new(R::default()) as Arc<dyn Recipe>));
    }

    pub fn register_with<F>(&mut self, name: impl Into<String>, description: impl Into<String>, factory: F)
    where
        F: Fn(Value) -> Result<Arc<dyn Recipe>, serde_json::Error> + Send + Sync + 'static,
    {
        self.entries.insert(
            name.into(),
            Entry {
                description: description.into(),
                factory: Box::new(factory),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names with their descriptions
    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.description.as_str()))
    }

    /// Build `name` from `options` and validate it. The caller decides what to
    /// do with an invalid result; nothing has run yet.
    pub fn construct(
        &self,
        name: &str,
        options: Value,
        ctx: &ExecutionContext,
    ) -> Result<(Arc<dyn Recipe>, Validated<()>), RegistryError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| RegistryError::UnknownRecipe(name.to_string()))?;
        let options = match options {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let recipe = (entry.factory)(options).map_err(|source| RegistryError::Options {
            name: name.to_string(),
            source,
        })?;
        let validation = recipe.validate(ctx);
        debug!(recipe = name, valid = validation.is_valid(), "constructed recipe");
        Ok((recipe, validation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeOption;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Rename {
        old_key: Option<String>,
        new_key: Option<String>,
    }

    impl Recipe for Rename {
        fn name(&self) -> &str {
            "Rename"
        }

        fn description(&self) -> &str {
            "Rename a key."
        }

        fn options(&self) -> Vec<RecipeOption> {
            vec![
                RecipeOption::new("oldKey", "Old key", "Key to rename.").value(self.old_key.as_ref()),
                RecipeOption::new("newKey", "New key", "Replacement key.").value(self.new_key.as_ref()),
            ]
        }
    }

    #[derive(Default)]
    struct Noop;

    impl Recipe for Noop {
        fn name(&self) -> &str {
            "Noop"
        }

        fn description(&self) -> &str {
            "Does nothing."
        }
    }

    fn registry() -> RecipeRegistry {
        let mut registry = RecipeRegistry::new();
        registry.register::<Rename>("Rename", "Rename a key.");
        registry.register_default::<Noop>("Noop", "Does nothing.");
        registry
    }

    #[test]
    fn test_construct_and_validate() {
        let ctx = ExecutionContext::new();
        let (recipe, validation) = registry()
            .construct("Rename", json!({"oldKey": "a"}), &ctx)
            .unwrap();

        assert_eq!(recipe.name(), "Rename");
        assert_eq!(validation.failures().len(), 1);
        assert_eq!(validation.failures()[0].property, "newKey");
    }

    #[test]
    fn test_null_options_mean_empty() {
        let ctx = ExecutionContext::new();
        let (_, validation) = registry().construct("Noop", Value::Null, &ctx).unwrap();
        assert!(validation.is_valid());
    }

    #[test]
    fn test_unknown_recipe() {
        let ctx = ExecutionContext::new();
        let err = registry().construct("Missing", Value::Null, &ctx).err().unwrap();
        assert!(matches!(err, RegistryError::UnknownRecipe(name) if name == "Missing"));
    }

    #[test]
    fn test_undecodable_options_keep_serde_error_as_source() {
        let ctx = ExecutionContext::new();
        let err = registry().construct("Rename", json!({"oldKey": 1}), &ctx).err().unwrap();
        assert_eq!(err.to_string(), "options for recipe 'Rename' could not be decoded");
        let source = std::error::Error::source(&err).map(ToString::to_string).unwrap();
        assert!(source.contains("invalid type"), "{source}");
    }

    #[test]
    fn test_registration_order_is_kept() {
        let names: Vec<_> = registry().list().map(|(name, _)| name.to_string()).collect();
        assert_eq!(names, vec!["Rename", "Noop"]);
    }
}
