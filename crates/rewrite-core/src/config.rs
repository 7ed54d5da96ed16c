use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a rewrite run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RewriteConfig {
    /// Pass ceiling for the scheduler's fixed-point loop
    pub max_cycles: usize,
    /// Run per-file transforms on the rayon pool
    pub parallel: bool,
    /// Report diffs instead of writing files
    pub dry_run: bool,
    pub charset: String,
    /// Registry name of the recipe to run
    pub recipe: Option<String>,
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            max_cycles: 3,
            parallel: true,
            dry_run: false,
            charset: "UTF-8".to_string(),
            recipe: None,
            options: serde_json::Map::new(),
        }
    }
}

impl RewriteConfig {
    pub fn from_json_file(path: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: RewriteConfig =
            serde_json::from_str(r#"{"recipe": "ChangePropertyKey", "options": {"oldPropertyKey": "a"}}"#).unwrap();

        assert_eq!(config.max_cycles, 3);
        assert!(config.parallel);
        assert_eq!(config.recipe.as_deref(), Some("ChangePropertyKey"));
        assert_eq!(config.options["oldPropertyKey"], "a");
    }
}
