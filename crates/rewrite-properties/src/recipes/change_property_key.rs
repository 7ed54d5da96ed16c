use std::sync::Arc;

use rewrite_core::{
    ExecutionContext, Recipe, RecipeError, RecipeOption, SourceFile, Traversal, TreeVisitor, VisitResult,
};
use serde::{Deserialize, Serialize};

use super::{key_matches, visit_properties_file};
use crate::tree::*;
use crate::visitor::{dispatch, walk_entry, PropertiesVisitor};

/// Renames a property key, and the keys of its subproperties
/// (`old.x` becomes `new.x`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePropertyKey {
    pub old_property_key: Option<String>,
    pub new_property_key: Option<String>,
    /// Match keys ignoring case, `-` and `_`. Defaults to true.
    #[serde(default)]
    pub relaxed_binding: Option<bool>,
}

impl ChangePropertyKey {
    pub const NAME: &'static str = "ChangePropertyKey";

    pub fn new(old_property_key: impl Into<String>, new_property_key: impl Into<String>) -> Self {
        Self {
            old_property_key: Some(old_property_key.into()),
            new_property_key: Some(new_property_key.into()),
            relaxed_binding: None,
        }
    }

    pub fn relaxed_binding(mut self, relaxed: bool) -> Self {
        self.relaxed_binding = Some(relaxed);
        self
    }
}

struct ChangeKeyVisitor<'a> {
    old_key: &'a str,
    new_key: &'a str,
    relaxed: bool,
}

impl ChangeKeyVisitor<'_> {
    /// Whether `key` is `prefix` or one of its subproperties
    fn under(&self, key: &str, prefix: &str) -> Option<Option<String>> {
        let depth = prefix.split('.').count();
        let segments: Vec<&str> = key.splitn(depth + 1, '.').collect();
        if segments.len() < depth || !key_matches(&segments[..depth].join("."), prefix, self.relaxed) {
            return None;
        }
        Some(segments.get(depth).map(|rest| rest.to_string()))
    }

    fn renamed(&self, key: &str) -> Option<String> {
        if self.under(key, self.new_key).is_some() {
            return None;
        }
        let renamed = match self.under(key, self.old_key)? {
            Some(rest) => format!("{}.{}", self.new_key, rest),
            None => self.new_key.to_string(),
        };
        (renamed != key).then_some(renamed)
    }
}

impl TreeVisitor<Properties, ExecutionContext> for ChangeKeyVisitor<'_> {
    fn dispatch(
        &self,
        tree: &Properties,
        p: &ExecutionContext,
        cx: &mut Traversal<Properties>,
    ) -> VisitResult<Properties> {
        dispatch(self, tree, p, cx)
    }
}

impl PropertiesVisitor<ExecutionContext> for ChangeKeyVisitor<'_> {
    fn visit_entry(
        &self,
        node: &Arc<Entry>,
        p: &ExecutionContext,
        cx: &mut Traversal<Properties>,
    ) -> VisitResult<Properties> {
        let visited = walk_entry(self, node, p, cx)?;
        let Properties::Entry(entry) = &visited else {
            return Ok(visited);
        };
        match self.renamed(&entry.key) {
            Some(key) => Ok(Entry {
                key,
                ..(**entry).clone()
            }
            .into()),
            None => Ok(visited),
        }
    }
}

impl Recipe for ChangePropertyKey {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Change property key"
    }

    fn description(&self) -> &str {
        "Change a property key leaving the value intact."
    }

    fn options(&self) -> Vec<RecipeOption> {
        vec![
            RecipeOption::new("oldPropertyKey", "Old property key", "The property key to rename.")
                .example("management.metrics.binders.files.enabled")
                .value(self.old_property_key.as_ref()),
            RecipeOption::new(
                "newPropertyKey",
                "New property key",
                "The new name for the key identified by `oldPropertyKey`.",
            )
            .example("management.metrics.enable.process.files")
            .value(self.new_property_key.as_ref()),
            RecipeOption::new(
                "relaxedBinding",
                "Use relaxed binding",
                "Whether to match keys ignoring case, dashes and underscores.",
            )
            .optional()
            .value(self.relaxed_binding),
        ]
    }

    fn transform_file(
        &self,
        source: &Arc<dyn SourceFile>,
        ctx: &ExecutionContext,
    ) -> Result<Arc<dyn SourceFile>, RecipeError> {
        let (Some(old_key), Some(new_key)) = (&self.old_property_key, &self.new_property_key) else {
            return Ok(source.clone());
        };
        let visitor = ChangeKeyVisitor {
            old_key,
            new_key,
            relaxed: self.relaxed_binding.unwrap_or(true),
        };
        visit_properties_file(Self::NAME, &visitor, source, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn visitor<'a>(old_key: &'a str, new_key: &'a str) -> ChangeKeyVisitor<'a> {
        ChangeKeyVisitor {
            old_key,
            new_key,
            relaxed: true,
        }
    }

    #[test]
    fn test_renamed() {
        let v = visitor("server.port", "chassis.port");
        assert_eq!(v.renamed("server.port"), Some("chassis.port".to_string()));
        assert_eq!(v.renamed("server.port.ssl"), Some("chassis.port.ssl".to_string()));
        assert_eq!(v.renamed("server.portal"), None);
        assert_eq!(v.renamed("server"), None);
        assert_eq!(v.renamed("key"), None);
    }

    #[test]
    fn test_nested_target_converges() {
        let v = visitor("a", "a.b");
        assert_eq!(v.renamed("a"), Some("a.b".to_string()));
        assert_eq!(v.renamed("a.b"), None);
        assert_eq!(v.renamed("a.c"), Some("a.b.c".to_string()));
        assert_eq!(v.renamed("a.b.c"), None);
    }

    #[test]
    fn test_missing_options_are_reported() {
        let recipe = ChangePropertyKey::default();
        let validated = recipe.validate(&ExecutionContext::new());
        let properties: Vec<&str> = validated.failures().iter().map(|f| f.property.as_str()).collect();
        assert_eq!(properties, vec!["oldPropertyKey", "newPropertyKey"]);
    }
}
