//! Key and value recipes for `.properties` files.

mod change_property_key;
mod change_property_value;

use std::sync::Arc;

use rewrite_core::{downcast, ExecutionContext, RecipeError, RecipeRegistry, SourceFile, TreeVisitor, VisitError};

use crate::tree::{File, Properties};

pub use change_property_key::ChangePropertyKey;
pub use change_property_value::ChangePropertyValue;

/// Run `visitor` over a properties file. Other file kinds, and files the
/// visitor leaves alone, come back as the input instance.
pub fn visit_properties_file<V>(
    recipe: &str,
    visitor: &V,
    source: &Arc<dyn SourceFile>,
    ctx: &ExecutionContext,
) -> Result<Arc<dyn SourceFile>, RecipeError>
where
    V: TreeVisitor<Properties, ExecutionContext>,
{
    let Some(file) = downcast::<File>(source) else {
        return Ok(source.clone());
    };
    let tree = Properties::File(file);
    let visited = visitor
        .visit_root(&tree, ctx)
        .map_err(|e| RecipeError::defect(recipe, source.source_path(), e))?;
    if visited.is_same(&tree) {
        return Ok(source.clone());
    }
    match visited {
        Properties::File(file) => Ok(file as Arc<dyn SourceFile>),
        other => Err(RecipeError::defect(
            recipe,
            source.source_path(),
            VisitError::wrong_shape("a properties file", &other),
        )),
    }
}

/// Spring-style relaxed binding: case, `-` and `_` are ignored
pub(crate) fn key_matches(key: &str, expected: &str, relaxed: bool) -> bool {
    if relaxed {
        let canonical = |k: &str| {
            k.chars()
                .filter(|c| *c != '-' && *c != '_')
                .flat_map(char::to_lowercase)
                .collect::<String>()
        };
        canonical(key) == canonical(expected)
    } else {
        key == expected
    }
}

/// Add the properties recipes to `registry`
pub fn register(registry: &mut RecipeRegistry) {
    registry.register::<ChangePropertyKey>(ChangePropertyKey::NAME, "Rename a property key.");
    registry.register::<ChangePropertyValue>(ChangePropertyValue::NAME, "Change the value of a property.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relaxed_binding() {
        assert!(key_matches("server.max-http-header-size", "server.maxHttpHeaderSize", true));
        assert!(!key_matches("server.port", "server.host", true));
        assert!(!key_matches("server.max-http-header-size", "server.maxHttpHeaderSize", false));
    }
}
