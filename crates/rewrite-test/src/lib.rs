//! # Rewrite Test
//!
//! Before/after harness for recipes. Each [`SourceSpec`] names a source
//! text and, optionally, the text a recipe run must turn it into:
//!
//! ```ignore
//! RewriteTest::new(ChangePropertyKey::new("server.port", "chassis.port"))
//!     .rewrite_run(vec![properties("server.port=8080\n").after("chassis.port=8080\n")]);
//! ```
//!
//! A source without `after` must come back as the very same instance. Every
//! run is repeated on its own output, which must then be left alone.

#![warn(clippy::all)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use pretty_assertions::assert_eq;
use rewrite_core::{
    downcast, paths, same_file, Corpus, ExecutionContext, ParseExceptionResult, Parser, ParserInput, PlainTextParser,
    Recipe, RecipeRun, RecipeScheduler, Remote, SourceFile,
};
use rewrite_java::JavaParser;
use rewrite_properties::PropertiesParser;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Java,
    Properties,
    Text,
    /// A file whose content lives at a URI
    Remote,
}

/// One file taking part in a test run
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub language: Language,
    /// `None` for files the recipe is expected to generate
    pub before: Option<String>,
    pub after: Option<String>,
    pub path: Option<PathBuf>,
}

impl SourceSpec {
    fn new(language: Language, before: &str) -> Self {
        Self {
            language,
            before: Some(before.to_string()),
            after: None,
            path: None,
        }
    }

    pub fn after(mut self, after: &str) -> Self {
        self.after = Some(after.to_string());
        self
    }

    pub fn path(mut self, path: &str) -> Self {
        self.path = Some(paths::from_slashes(path));
        self
    }

    fn default_path(&self) -> PathBuf {
        match self.language {
            // The Java parser derives a path from the package and first type
            Language::Java => PathBuf::new(),
            Language::Properties => PathBuf::from("file.properties"),
            Language::Text | Language::Remote => PathBuf::from("file.txt"),
        }
    }

    fn input(&self) -> ParserInput {
        let path = self.path.clone().unwrap_or_else(|| self.default_path());
        ParserInput::new(path, self.before.clone().unwrap_or_default())
    }
}

pub fn java(before: &str) -> SourceSpec {
    SourceSpec::new(Language::Java, before)
}

pub fn properties(before: &str) -> SourceSpec {
    SourceSpec::new(Language::Properties, before)
}

pub fn text(before: &str) -> SourceSpec {
    SourceSpec::new(Language::Text, before)
}

/// A file the run must add at `path`, printing as `after`
pub fn generated(language: Language, path: &str, after: &str) -> SourceSpec {
    SourceSpec {
        language,
        before: None,
        after: Some(after.to_string()),
        path: Some(paths::from_slashes(path)),
    }
}

/// A remote file the run must add at `path`, pointing at `uri`
pub fn remote(path: &str, uri: &str) -> SourceSpec {
    generated(Language::Remote, path, uri)
}

/// Runs one recipe over a set of [`SourceSpec`]s and checks the outcome
pub struct RewriteTest {
    recipe: Arc<dyn Recipe>,
    ctx: ExecutionContext,
    max_cycles: Option<usize>,
}

impl RewriteTest {
    pub fn new(recipe: impl Recipe + 'static) -> Self {
        Self::from_arc(Arc::new(recipe))
    }

    pub fn from_arc(recipe: Arc<dyn Recipe>) -> Self {
        Self {
            recipe,
            ctx: ExecutionContext::new(),
            max_cycles: None,
        }
    }

    /// Use `ctx` for both runs, e.g. to seed messages recipes read
    pub fn execution_context(mut self, ctx: ExecutionContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn max_cycles(mut self, max: usize) -> Self {
        self.max_cycles = Some(max);
        self
    }

    fn scheduler(&self) -> RecipeScheduler {
        match self.max_cycles {
            Some(max) => RecipeScheduler::new().max_cycles(max),
            None => RecipeScheduler::new(),
        }
    }

    /// Run and assert, panicking on the first mismatch
    pub fn rewrite_run(&self, specs: Vec<SourceSpec>) -> RecipeRun {
        match self.try_rewrite_run(specs) {
            Ok(run) => run,
            Err(e) => panic!("{e:#}"),
        }
    }

    /// Like [`rewrite_run`](Self::rewrite_run), but a source that fails to
    /// parse or a run the scheduler refuses is reported as an error.
    /// Mismatched output still panics.
    pub fn try_rewrite_run(&self, specs: Vec<SourceSpec>) -> Result<RecipeRun> {
        let (inputs, outputs): (Vec<&SourceSpec>, Vec<&SourceSpec>) = specs.iter().partition(|s| s.before.is_some());
        let sources = parse(&inputs, &self.ctx)?;

        let before: Corpus = Arc::new(sources.clone());
        let run = self.scheduler().run(self.recipe.as_ref(), &before, &self.ctx)?;
        debug!(recipe = self.recipe.name(), cycles = run.cycles, changed = run.changed(), "test run");

        for (spec, source) in inputs.iter().zip(&sources) {
            let after = run.corpus.iter().find(|s| s.id() == source.id());
            check_source(spec, source, after);
        }
        check_generated(&outputs, &sources, &run.corpus);

        let again = self.scheduler().run(self.recipe.as_ref(), &run.corpus, &self.ctx)?;
        if again.changed() {
            let diffs: Vec<String> = again.results.iter().map(|r| r.diff()).collect();
            panic!(
                "{} changed its own output on a second run:\n{}",
                self.recipe.name(),
                diffs.join("\n")
            );
        }
        Ok(run)
    }
}

/// Parse specs in order. Java sources are parsed together so their types
/// resolve across files.
fn parse(specs: &[&SourceSpec], ctx: &ExecutionContext) -> Result<Vec<Arc<dyn SourceFile>>> {
    let java_inputs: Vec<ParserInput> = specs
        .iter()
        .filter(|s| s.language == Language::Java)
        .map(|s| s.input())
        .collect();
    let mut java = JavaParser::new().parse_inputs(&java_inputs, ctx).into_iter();

    let mut sources = Vec::with_capacity(specs.len());
    for spec in specs {
        let source = match spec.language {
            Language::Java => java.next(),
            Language::Properties => PropertiesParser::new().parse_inputs(&[spec.input()], ctx).pop(),
            Language::Text => PlainTextParser::new().parse_inputs(&[spec.input()], ctx).pop(),
            Language::Remote => bail!("remote files can only be generated"),
        };
        let Some(source) = source else {
            bail!("no source parsed for {:?}", spec.input().path);
        };
        if let Some(failure) = source.markers().find_first::<ParseExceptionResult>() {
            bail!(
                "{} parser rejected {}: {}\n{}",
                failure.parser,
                source.source_path().display(),
                failure.message,
                spec.before.as_deref().unwrap_or_default()
            );
        }
        sources.push(source);
    }
    Ok(sources)
}

fn check_source(spec: &SourceSpec, before: &Arc<dyn SourceFile>, after: Option<&Arc<dyn SourceFile>>) {
    let path = before.source_path().display().to_string();
    let Some(after) = after else {
        panic!("{path} was deleted by the run");
    };
    match &spec.after {
        Some(expected) => {
            assert_eq!(&after.print(), expected, "unexpected result for {path}");
            assert!(!same_file(before, after), "{path} printed as expected but was never changed");
        }
        None => {
            assert_eq!(after.print(), before.print(), "{path} should not have changed");
            assert!(same_file(before, after), "{path} was rebuilt without any textual change");
        }
    }
}

fn check_generated(specs: &[&SourceSpec], inputs: &[Arc<dyn SourceFile>], corpus: &Corpus) {
    let is_input = |s: &Arc<dyn SourceFile>| inputs.iter().any(|input| input.id() == s.id());
    if let Some(first) = corpus.iter().position(|s| !is_input(s)) {
        assert!(
            corpus[first..].iter().all(|s| !is_input(s)),
            "generated files must follow the existing ones"
        );
    }
    let added: Vec<&Arc<dyn SourceFile>> = corpus.iter().filter(|s| !is_input(s)).collect();

    for spec in specs {
        let (Some(path), Some(expected)) = (&spec.path, &spec.after) else {
            continue;
        };
        let Some(found) = added
            .iter()
            .find(|s| paths::equal_ignoring_separators(s.source_path(), path))
        else {
            panic!("expected {} to be generated", paths::normalize(path));
        };
        if spec.language == Language::Remote {
            let uri = downcast::<Remote>(found).map(|remote| remote.uri.clone());
            assert_eq!(uri.as_deref(), Some(expected.as_str()), "unexpected remote for {}", paths::normalize(path));
        } else {
            assert_eq!(&found.print(), expected, "unexpected content generated at {}", paths::normalize(path));
        }
    }

    let unexpected: Vec<String> = added
        .iter()
        .filter(|s| {
            !specs
                .iter()
                .any(|spec| spec.path.as_deref().is_some_and(|p| paths::equal_ignoring_separators(s.source_path(), p)))
        })
        .map(|s| paths::normalize(s.source_path()))
        .collect();
    assert!(unexpected.is_empty(), "unexpected files generated: {unexpected:?}");
}
