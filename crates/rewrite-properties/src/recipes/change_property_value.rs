use std::sync::Arc;

use regex::Regex;
use rewrite_core::recipe::validate_options;
use rewrite_core::{
    ExecutionContext, Recipe, RecipeError, RecipeOption, SourceFile, Traversal, TreeVisitor, Validated, VisitResult,
};
use serde::{Deserialize, Serialize};

use super::{key_matches, visit_properties_file};
use crate::tree::*;
use crate::visitor::{dispatch, walk_entry, PropertiesVisitor};

/// Changes the value of a property, optionally only when it currently
/// holds `oldValue`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePropertyValue {
    pub property_key: Option<String>,
    pub new_value: Option<String>,
    pub old_value: Option<String>,
    /// Treat `oldValue` as a regular expression and replace its matches
    pub regex: Option<bool>,
    pub relaxed_binding: Option<bool>,
}

impl ChangePropertyValue {
    pub const NAME: &'static str = "ChangePropertyValue";

    pub fn new(property_key: impl Into<String>, new_value: impl Into<String>) -> Self {
        Self {
            property_key: Some(property_key.into()),
            new_value: Some(new_value.into()),
            ..Default::default()
        }
    }

    pub fn old_value(mut self, old_value: impl Into<String>) -> Self {
        self.old_value = Some(old_value.into());
        self
    }

    pub fn regex(mut self, regex: bool) -> Self {
        self.regex = Some(regex);
        self
    }

    fn is_regex(&self) -> bool {
        self.regex.unwrap_or(false)
    }
}

enum OldValue<'a> {
    Any,
    Exactly(&'a str),
    Pattern(Regex),
}

struct ChangeValueVisitor<'a> {
    key: &'a str,
    new_value: &'a str,
    old_value: OldValue<'a>,
    relaxed: bool,
}

impl ChangeValueVisitor<'_> {
    fn updated(&self, current: &str) -> Option<String> {
        let updated = match &self.old_value {
            OldValue::Any => self.new_value.to_string(),
            OldValue::Exactly(old) if *old == current => self.new_value.to_string(),
            OldValue::Exactly(_) => return None,
            OldValue::Pattern(pattern) => pattern.replace_all(current, self.new_value).into_owned(),
        };
        (updated != current).then_some(updated)
    }
}

impl TreeVisitor<Properties, ExecutionContext> for ChangeValueVisitor<'_> {
    fn dispatch(
        &self,
        tree: &Properties,
        p: &ExecutionContext,
        cx: &mut Traversal<Properties>,
    ) -> VisitResult<Properties> {
        dispatch(self, tree, p, cx)
    }
}

impl PropertiesVisitor<ExecutionContext> for ChangeValueVisitor<'_> {
    fn visit_entry(
        &self,
        node: &Arc<Entry>,
        p: &ExecutionContext,
        cx: &mut Traversal<Properties>,
    ) -> VisitResult<Properties> {
        if !key_matches(&node.key, self.key, self.relaxed) {
            return Ok(Properties::Entry(node.clone()));
        }
        walk_entry(self, node, p, cx)
    }

    fn visit_value(
        &self,
        node: &Arc<Value>,
        _p: &ExecutionContext,
        _cx: &mut Traversal<Properties>,
    ) -> VisitResult<Properties> {
        match self.updated(&node.text) {
            Some(text) => Ok(Value {
                text,
                ..(**node).clone()
            }
            .into()),
            None => Ok(Properties::Value(node.clone())),
        }
    }
}

impl Recipe for ChangePropertyValue {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Change property value"
    }

    fn description(&self) -> &str {
        "Change a property value leaving the key intact."
    }

    fn options(&self) -> Vec<RecipeOption> {
        vec![
            RecipeOption::new(
                "propertyKey",
                "Property key",
                "The name of the property key whose value is to be changed.",
            )
            .example("management.metrics.binders.files.enabled")
            .value(self.property_key.as_ref()),
            RecipeOption::new("newValue", "New value", "The new value to be used for key specified by `propertyKey`.")
                .value(self.new_value.as_ref()),
            RecipeOption::new(
                "oldValue",
                "Old value",
                "Only change the property value if it matches the configured `oldValue`.",
            )
            .optional()
            .value(self.old_value.as_ref()),
            RecipeOption::new(
                "regex",
                "Regex",
                "Whether `oldValue` is a regular expression whose matches are replaced.",
            )
            .optional()
            .value(self.regex),
            RecipeOption::new(
                "relaxedBinding",
                "Use relaxed binding",
                "Whether to match keys ignoring case, dashes and underscores.",
            )
            .optional()
            .value(self.relaxed_binding),
        ]
    }

    fn validate(&self, _ctx: &ExecutionContext) -> Validated<()> {
        let declared = validate_options(&self.options());
        let pattern = match (&self.old_value, self.is_regex()) {
            (None, true) => Validated::invalid("oldValue", None, "is required when regex is enabled"),
            (Some(old), true) => match Regex::new(old) {
                Ok(_) => Validated::none(),
                Err(e) => Validated::invalid(
                    "oldValue",
                    Some(old.clone()),
                    format!("is not a valid regular expression: {e}"),
                ),
            },
            _ => Validated::none(),
        };
        declared.and(pattern)
    }

    fn transform_file(
        &self,
        source: &Arc<dyn SourceFile>,
        ctx: &ExecutionContext,
    ) -> Result<Arc<dyn SourceFile>, RecipeError> {
        let (Some(key), Some(new_value)) = (&self.property_key, &self.new_value) else {
            return Ok(source.clone());
        };
        let old_value = match (&self.old_value, self.is_regex()) {
            (None, _) => OldValue::Any,
            (Some(old), false) => OldValue::Exactly(old),
            (Some(old), true) => OldValue::Pattern(
                Regex::new(old).map_err(|e| RecipeError::failed(Self::NAME, source.source_path(), e.to_string()))?,
            ),
        };
        let visitor = ChangeValueVisitor {
            key,
            new_value,
            old_value,
            relaxed: self.relaxed_binding.unwrap_or(true),
        };
        visit_properties_file(Self::NAME, &visitor, source, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_requires_old_value() {
        let recipe = ChangePropertyValue::new("a", "b").regex(true);
        let validated = recipe.validate(&ExecutionContext::new());
        assert!(validated.is_invalid());
        assert_eq!(validated.failures()[0].property, "oldValue");

        let recipe = ChangePropertyValue::new("a", "b").regex(true).old_value("(");
        assert!(recipe.validate(&ExecutionContext::new()).is_invalid());
    }

    #[test]
    fn test_updated() {
        let visitor = ChangeValueVisitor {
            key: "k",
            new_value: "v2",
            old_value: OldValue::Pattern(Regex::new("v1").unwrap()),
            relaxed: true,
        };
        assert_eq!(visitor.updated("v1,v1"), Some("v2,v2".to_string()));
        assert_eq!(visitor.updated("v3"), None);
    }
}
