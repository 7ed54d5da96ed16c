//! Rewrite CLI - run a registered recipe over a project directory
//!
//! Files are parsed by extension (`.java` together, `.properties`, and
//! everything else as plain text), the recipe runs to a fixed point, and
//! the results are either reported as unified diffs or written back.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use rewrite_core::{
    downcast, ExecutionContext, FileResult, Parser, ParserInput, PlainTextParser, RecipeRegistry, RecipeScheduler,
    Remote, RewriteConfig, SourceFile,
};
use rewrite_java::JavaParser;
use rewrite_properties::PropertiesParser;
use serde_json::Value;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Name of the configuration file read from the project root
pub const CONFIG_FILE: &str = "rewrite.json";

/// Every recipe the CLI knows by name
pub fn registry() -> RecipeRegistry {
    let mut registry = RecipeRegistry::new();
    rewrite_java::recipes::register(&mut registry);
    rewrite_properties::recipes::register(&mut registry);
    rewrite_gradle::register(&mut registry);
    registry
}

/// Split `key=value`. Booleans, arrays and objects are read as JSON, so
/// `relaxedBinding=false` is a boolean. Anything else stays a string, so
/// `newValue=8080` and `version=7.6` reach string options intact.
pub fn parse_option(arg: &str) -> Result<(String, Value)> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("option '{arg}' is not of the form key=value"))?;
    if key.is_empty() {
        bail!("option '{arg}' has an empty key");
    }
    let value = match serde_json::from_str(value) {
        Ok(json @ (Value::Bool(_) | Value::Array(_) | Value::Object(_))) => json,
        _ => Value::String(value.to_string()),
    };
    Ok((key.to_string(), value))
}

/// Configuration from `explicit`, else `rewrite.json` in `dir`, else defaults
pub fn load_config(dir: &Path, explicit: Option<&Path>) -> Result<RewriteConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => dir.join(CONFIG_FILE),
    };
    if explicit.is_none() && !path.exists() {
        return Ok(RewriteConfig::default());
    }
    RewriteConfig::from_json_file(&path).with_context(|| format!("reading {}", path.display()))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Java,
    Properties,
    Text,
}

/// Parse every non-hidden file under `dir`, in path order. Source paths are
/// relative to `dir`.
pub fn read_project(dir: &Path, ctx: &ExecutionContext) -> Result<Vec<Arc<dyn SourceFile>>> {
    let java = JavaParser::new();
    let properties = PropertiesParser::new();
    let mut inputs = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name().into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir)?.to_path_buf();
        let kind = if java.accepts(&relative) {
            Kind::Java
        } else if properties.accepts(&relative) {
            Kind::Properties
        } else {
            Kind::Text
        };
        let bytes = fs::read(entry.path()).with_context(|| format!("reading {}", entry.path().display()))?;
        inputs.push((kind, ParserInput::new(relative, bytes)));
    }

    let java_inputs: Vec<ParserInput> = inputs
        .iter()
        .filter(|(kind, _)| *kind == Kind::Java)
        .map(|(_, input)| input.clone())
        .collect();
    let mut parsed_java = java.parse_inputs(&java_inputs, ctx).into_iter();

    let mut sources = Vec::with_capacity(inputs.len());
    for (kind, input) in &inputs {
        let parsed = match kind {
            Kind::Java => parsed_java.next(),
            Kind::Properties => properties.parse_inputs(std::slice::from_ref(input), ctx).pop(),
            Kind::Text => PlainTextParser::new().parse_inputs(std::slice::from_ref(input), ctx).pop(),
        };
        let source = parsed.ok_or_else(|| anyhow!("no source parsed for {}", input.path.display()))?;
        sources.push(source);
    }
    debug!(files = sources.len(), java = java_inputs.len(), "read project");
    Ok(sources)
}

/// What a run did, or would do in dry-run mode
#[derive(Debug, Default)]
pub struct Summary {
    pub changed: usize,
    pub generated: usize,
    pub deleted: usize,
    /// Remote files that were not downloaded
    pub skipped: usize,
    pub diffs: Vec<String>,
}

/// Run the configured recipe over `dir`
pub fn run(dir: &Path, config: &RewriteConfig) -> Result<Summary> {
    let name = config
        .recipe
        .as_deref()
        .ok_or_else(|| anyhow!("no recipe given; use --recipe or set \"recipe\" in {CONFIG_FILE}"))?;
    let ctx = ExecutionContext::new();
    let (recipe, validation) = registry().construct(name, Value::Object(config.options.clone()), &ctx)?;
    validation.value().with_context(|| format!("cannot run {name}"))?;

    let sources = read_project(dir, &ctx)?;
    info!(recipe = name, files = sources.len(), "running recipe");
    let run = RecipeScheduler::from_config(config).run(recipe.as_ref(), &Arc::new(sources), &ctx)?;

    for diagnostic in &run.diagnostics {
        warn!("{diagnostic}");
    }
    if !run.converged && !run.cancelled {
        warn!(cycles = run.cycles, "recipe did not converge");
    }

    if config.dry_run {
        let mut summary = tally(&run.results);
        summary.diffs = run.results.iter().map(FileResult::diff).collect();
        return Ok(summary);
    }
    write_results(dir, &run.results)
}

fn tally(results: &[FileResult]) -> Summary {
    let mut summary = Summary::default();
    for result in results {
        if result.is_deleted() {
            summary.deleted += 1;
        } else if result.is_generated() {
            summary.generated += 1;
        } else {
            summary.changed += 1;
        }
    }
    summary
}

/// Apply `results` under `dir`: write changed and generated files, remove
/// deleted ones. Remote files are reported but never fetched.
pub fn write_results(dir: &Path, results: &[FileResult]) -> Result<Summary> {
    let mut summary = tally(results);
    for result in results {
        let Some(after) = &result.after else {
            if let Some(before) = &result.before {
                let path = dir.join(before.source_path());
                fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
            }
            continue;
        };

        if let Some(remote) = downcast::<Remote>(after) {
            warn!(path = %remote.source_path.display(), uri = %remote.uri, "not downloading remote file");
            summary.skipped += 1;
            continue;
        }

        let path: PathBuf = dir.join(after.source_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&path, after.print()).with_context(|| format!("writing {}", path.display()))?;
        if after.file_attributes().is_some_and(|attributes| attributes.executable) {
            set_executable(&path)?;
        }

        if let Some(before) = &result.before {
            if before.source_path() != after.source_path() {
                let old = dir.join(before.source_path());
                fs::remove_file(&old).with_context(|| format!("removing {}", old.display()))?;
            }
        }
        debug!(path = %path.display(), "wrote file");
    }
    Ok(summary)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_option() {
        assert_eq!(
            parse_option("oldPropertyKey=server.port").unwrap(),
            ("oldPropertyKey".to_string(), json!("server.port"))
        );
        assert_eq!(parse_option("relaxedBinding=false").unwrap().1, json!(false));
        assert_eq!(parse_option("newValue=a=b").unwrap().1, json!("a=b"));
        assert_eq!(parse_option("newValue=8080").unwrap().1, json!("8080"));
        assert_eq!(parse_option("version=7.6").unwrap().1, json!("7.6"));
        assert_eq!(parse_option("keys=[\"a\"]").unwrap().1, json!(["a"]));
        assert!(parse_option("novalue").is_err());
        assert!(parse_option("=x").is_err());
    }

    #[test]
    fn test_registry_knows_every_recipe() {
        let registry = registry();
        for name in [
            "UnnecessaryParentheses",
            "CompareEnumsWithEqualityOperator",
            "ChangePropertyKey",
            "ChangePropertyValue",
            "AddGradleWrapper",
        ] {
            assert!(registry.contains(name), "{name} is not registered");
        }
    }
}
