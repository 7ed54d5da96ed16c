use std::path::Path;
use std::sync::Arc;

use rewrite_core::{paths, Applicability, ExecutionContext, RecipeError, SourceFile};

/// Matches Groovy and Kotlin build scripts anywhere in the project
#[derive(Debug, Default, Clone, Copy)]
pub struct IsBuildGradle;

impl IsBuildGradle {
    pub fn new() -> Self {
        Self
    }

    pub fn matches(path: &Path) -> bool {
        matches!(
            paths::file_name(path).as_deref(),
            Some("build.gradle" | "build.gradle.kts")
        )
    }
}

impl Applicability for IsBuildGradle {
    fn applies_to(&self, source: &Arc<dyn SourceFile>, _ctx: &ExecutionContext) -> Result<bool, RecipeError> {
        Ok(Self::matches(source.source_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_scripts() {
        assert!(IsBuildGradle::matches(Path::new("build.gradle")));
        assert!(IsBuildGradle::matches(Path::new("sub/build.gradle.kts")));
        assert!(IsBuildGradle::matches(Path::new("sub\\build.gradle")));
        assert!(!IsBuildGradle::matches(Path::new("settings.gradle")));
        assert!(!IsBuildGradle::matches(Path::new("build.gradle.bak")));
    }
}
