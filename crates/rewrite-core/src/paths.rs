//! OS-independent source path comparisons.

use std::path::{Path, PathBuf};

/// Render a path with `/` separators regardless of platform
pub fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Build a relative path from a `/`-separated string
pub fn from_slashes(path: &str) -> PathBuf {
    path.split(['/', '\\']).filter(|part| !part.is_empty()).collect()
}

pub fn equal_ignoring_separators(a: &Path, b: &Path) -> bool {
    normalize(a) == normalize(b)
}

/// Final path component, compared without separator concerns
pub fn file_name(path: &Path) -> Option<String> {
    normalize(path).rsplit('/').next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_ignoring_separators() {
        assert!(equal_ignoring_separators(
            Path::new("gradle\\wrapper\\gradle-wrapper.properties"),
            Path::new("gradle/wrapper/gradle-wrapper.properties"),
        ));
        assert!(!equal_ignoring_separators(Path::new("gradlew"), Path::new("gradlew.bat")));
    }

    #[test]
    fn test_from_slashes_and_file_name() {
        let path = from_slashes("gradle/wrapper/gradle-wrapper.jar");
        assert_eq!(normalize(&path), "gradle/wrapper/gradle-wrapper.jar");
        assert_eq!(file_name(Path::new("a\\b\\build.gradle")).as_deref(), Some("build.gradle"));
    }
}
