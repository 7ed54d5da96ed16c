//! Gradle wrapper options and the distribution they resolve to.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rewrite_core::{paths, ExecutionContext, Remote, Validated};
use serde::{Deserialize, Serialize};

pub const WRAPPER_PROPERTIES_LOCATION: &str = "gradle/wrapper/gradle-wrapper.properties";
pub const WRAPPER_SCRIPT_LOCATION: &str = "gradlew";
pub const WRAPPER_BATCH_LOCATION: &str = "gradlew.bat";
pub const WRAPPER_JAR_LOCATION: &str = "gradle/wrapper/gradle-wrapper.jar";

pub const DEFAULT_REPOSITORY_URL: &str = "https://services.gradle.org/distributions";

/// Execution context key for a `Vec<GradleRelease>` replacing the built-in
/// release list
pub const KNOWN_RELEASES_KEY: &str = "rewrite.gradle.knownReleases";

const LATEST_RELEASE: &str = "latest.release";

/// Releases known without asking a repository, newest first
const KNOWN_RELEASES: &[&str] = &[
    "8.4", "8.3", "8.2.1", "8.2", "8.1.1", "8.1", "8.0.2", "8.0.1", "8.0", "7.6.3", "7.6.2", "7.6.1", "7.6", "7.5.1",
    "7.5", "7.4.2", "7.4.1", "7.4", "7.3.3", "7.3.2", "7.3.1", "7.3", "7.2", "7.1.1", "7.1", "7.0.2", "7.0.1", "7.0",
    "6.9.4", "6.9.3", "6.9.2", "6.9.1", "6.9", "6.8.3", "6.7.1", "6.6.1", "6.5.1", "6.4.1", "6.3", "6.2.2", "6.1.1",
    "6.0.1",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionType {
    /// Binaries only
    Bin,
    /// Binaries, sources and documentation
    All,
}

impl DistributionType {
    pub fn as_str(self) -> &'static str {
        match self {
            DistributionType::Bin => "bin",
            DistributionType::All => "all",
        }
    }
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistributionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bin" => Ok(DistributionType::Bin),
            "all" => Ok(DistributionType::All),
            other => Err(other.to_string()),
        }
    }
}

/// One published Gradle version and, when known, the SHA-256 sums of its
/// distributions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradleRelease {
    pub version: String,
    #[serde(default)]
    pub bin_checksum: Option<String>,
    #[serde(default)]
    pub all_checksum: Option<String>,
}

impl GradleRelease {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            bin_checksum: None,
            all_checksum: None,
        }
    }

    fn checksum(&self, distribution: DistributionType) -> Option<&String> {
        match distribution {
            DistributionType::Bin => self.bin_checksum.as_ref(),
            DistributionType::All => self.all_checksum.as_ref(),
        }
    }
}

/// Numeric comparison of dotted versions, so `7.10` sorts after `7.9`
fn compare_versions(a: &str, b: &str) -> Ordering {
    let segments = |v: &str| -> Vec<u64> { v.split('.').map(|s| s.parse().unwrap_or(0)).collect() };
    segments(a).cmp(&segments(b))
}

/// Whether `version` satisfies `selector`: `latest.release`, a prefix
/// pattern such as `7.x` or `7.6.x`, or an exact version
fn satisfies(selector: &str, version: &str) -> bool {
    if selector == LATEST_RELEASE {
        return true;
    }
    match selector.strip_suffix(".x") {
        Some(prefix) => version
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.')),
        None => selector == version,
    }
}

/// A resolved wrapper: which distribution to download and from where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradleWrapper {
    pub version: String,
    pub distribution: DistributionType,
    pub distribution_url: String,
    pub checksum: Option<String>,
}

impl GradleWrapper {
    /// Resolve the wrapper options, reporting every invalid one.
    ///
    /// `version` defaults to `latest.release`, `distribution` to `bin` and
    /// `repository_url` to services.gradle.org.
    pub fn validate(
        version: Option<&str>,
        distribution: Option<&str>,
        repository_url: Option<&str>,
        ctx: &ExecutionContext,
    ) -> Validated<GradleWrapper> {
        let selector = version.filter(|v| !v.trim().is_empty()).unwrap_or(LATEST_RELEASE);

        let distribution = match distribution.map(DistributionType::from_str) {
            None => Validated::valid(DistributionType::Bin),
            Some(Ok(distribution)) => Validated::valid(distribution),
            Some(Err(other)) => Validated::invalid("distribution", Some(other), "must be one of bin, all"),
        };

        let repository_url = repository_url.unwrap_or(DEFAULT_REPOSITORY_URL);
        let repository = Validated::test(
            "repositoryUrl",
            "must be an http or https URL",
            repository_url.trim_end_matches('/').to_string(),
            |url| url.starts_with("https://") || url.starts_with("http://"),
        );

        let release = match resolve(selector, &known_releases(ctx)) {
            Some(release) => Validated::valid(release),
            None => Validated::invalid(
                "version",
                Some(selector.to_string()),
                "does not match any known Gradle release",
            ),
        };

        release
            .zip(distribution)
            .zip(repository)
            .map(|((release, distribution), repository)| GradleWrapper {
                distribution_url: format!("{repository}/gradle-{}-{distribution}.zip", release.version),
                checksum: release.checksum(distribution).cloned(),
                version: release.version,
                distribution,
            })
    }

    /// `distributionUrl` with `:` escaped as the properties format expects
    pub fn properties_formatted_url(&self) -> String {
        self.distribution_url.replace("://", "\\://")
    }

    /// Contents of `gradle-wrapper.properties` for this distribution
    pub fn properties_text(&self) -> String {
        let mut text = String::from("distributionBase=GRADLE_USER_HOME\ndistributionPath=wrapper/dists\n");
        text.push_str(&format!("distributionUrl={}\n", self.properties_formatted_url()));
        if let Some(checksum) = &self.checksum {
            text.push_str(&format!("distributionSha256Sum={checksum}\n"));
        }
        text.push_str("zipStoreBase=GRADLE_USER_HOME\nzipStorePath=wrapper/dists\n");
        text
    }

    /// The wrapper jar, shipped inside the distribution archive
    pub fn as_remote(&self) -> Remote {
        Remote::new(
            paths::from_slashes(WRAPPER_JAR_LOCATION),
            self.distribution_url.clone(),
            format!("gradle-{0}/lib/gradle-wrapper-{0}.jar in the Gradle distribution", self.version),
        )
    }
}

fn known_releases(ctx: &ExecutionContext) -> Vec<GradleRelease> {
    match ctx.get_message::<Vec<GradleRelease>>(KNOWN_RELEASES_KEY) {
        Some(releases) => releases.as_ref().clone(),
        None => KNOWN_RELEASES.iter().map(|v| GradleRelease::new(*v)).collect(),
    }
}

/// Newest release satisfying `selector`
fn resolve(selector: &str, releases: &[GradleRelease]) -> Option<GradleRelease> {
    releases
        .iter()
        .filter(|release| satisfies(selector, &release.version))
        .max_by(|a, b| compare_versions(&a.version, &b.version))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_selectors() {
        assert!(satisfies("7.x", "7.6.1"));
        assert!(!satisfies("7.x", "8.0"));
        assert!(!satisfies("7.x", "70.1"));
        assert!(satisfies("7.6.x", "7.6"));
        assert!(satisfies("7.6.1", "7.6.1"));
        assert!(!satisfies("7.6", "7.6.1"));
        assert_eq!(compare_versions("7.10", "7.9"), Ordering::Greater);
    }

    #[test]
    fn test_resolves_newest_match() {
        let ctx = ExecutionContext::new();
        let wrapper = GradleWrapper::validate(Some("7.x"), None, None, &ctx).value().unwrap();
        assert_eq!(wrapper.version, "7.6.3");
        assert_eq!(wrapper.distribution, DistributionType::Bin);
        assert_eq!(
            wrapper.properties_formatted_url(),
            "https\\://services.gradle.org/distributions/gradle-7.6.3-bin.zip"
        );
        assert_eq!(wrapper.checksum, None);
    }

    #[test]
    fn test_every_invalid_option_is_reported() {
        let ctx = ExecutionContext::new();
        let validated = GradleWrapper::validate(Some("5.x"), Some("src"), Some("ftp://example.org"), &ctx);
        let properties: Vec<&str> = validated.failures().iter().map(|f| f.property.as_str()).collect();
        assert_eq!(properties, vec!["version", "distribution", "repositoryUrl"]);
    }

    #[test]
    fn test_releases_from_context() {
        let ctx = ExecutionContext::new();
        ctx.put_message(
            KNOWN_RELEASES_KEY,
            vec![GradleRelease {
                version: "9.0".to_string(),
                bin_checksum: Some("abc123".to_string()),
                all_checksum: None,
            }],
        );
        let wrapper = GradleWrapper::validate(None, Some("bin"), Some("https://mirror.example.org/gradle/"), &ctx)
            .value()
            .unwrap();
        assert_eq!(wrapper.distribution_url, "https://mirror.example.org/gradle/gradle-9.0-bin.zip");
        assert!(wrapper.properties_text().contains("distributionSha256Sum=abc123\n"));

        let all = GradleWrapper::validate(None, Some("all"), None, &ctx).value().unwrap();
        assert!(!all.properties_text().contains("distributionSha256Sum"));
    }
}
