//! Multi-cycle recipe execution.
//!
//! A run is a bounded fixed-point loop: every cycle applies the recipe tree
//! (depth first, registration order) to the corpus, and the loop stops at the
//! first cycle that changes nothing or when `max_cycles` is reached.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use similar::TextDiff;
use tracing::{debug, info, warn};

use crate::config::RewriteConfig;
use crate::context::{Diagnostic, ExecutionContext, Severity};
use crate::marker::{ParseExceptionResult, RecipeFailure};
use crate::paths;
use crate::recipe::{CompositeRecipe, Recipe, RecipeError};
use crate::source::{same_file, Corpus, SourceFile};
use crate::tree::TreeId;
use crate::validated::{Validated, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Options were rejected before any file was touched
    #[error("recipe {recipe} cannot run: {source}")]
    InvalidOptions {
        recipe: String,
        #[source]
        source: ValidationError,
    },
}

/// Before/after pair for one file that a run changed, added or deleted
#[derive(Debug, Clone)]
pub struct FileResult {
    pub before: Option<Arc<dyn SourceFile>>,
    pub after: Option<Arc<dyn SourceFile>>,
    /// Recipes that changed the file, in the order they did
    pub recipes: Vec<String>,
}

impl FileResult {
    pub fn path(&self) -> Option<&Path> {
        self.after
            .as_ref()
            .or(self.before.as_ref())
            .map(|source| source.source_path())
    }

    pub fn is_generated(&self) -> bool {
        self.before.is_none()
    }

    pub fn is_deleted(&self) -> bool {
        self.after.is_none()
    }

    /// Unified diff of the printed file
    pub fn diff(&self) -> String {
        let old = self.before.as_ref().map(|s| s.print()).unwrap_or_default();
        let new = self.after.as_ref().map(|s| s.print()).unwrap_or_default();
        let old_path = self
            .before
            .as_ref()
            .map(|s| format!("a/{}", paths::normalize(s.source_path())))
            .unwrap_or_else(|| "/dev/null".to_string());
        let new_path = self
            .after
            .as_ref()
            .map(|s| format!("b/{}", paths::normalize(s.source_path())))
            .unwrap_or_else(|| "/dev/null".to_string());

        TextDiff::from_lines(old.as_str(), new.as_str())
            .unified_diff()
            .context_radius(3)
            .header(&old_path, &new_path)
            .to_string()
    }
}

/// Outcome of [`RecipeScheduler::run`]
#[derive(Debug)]
pub struct RecipeRun {
    /// Final corpus. Reference-equal to the input when nothing changed.
    pub corpus: Corpus,
    pub results: Vec<FileResult>,
    pub cycles: usize,
    pub converged: bool,
    pub cancelled: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl RecipeRun {
    pub fn changed(&self) -> bool {
        !self.results.is_empty()
    }
}

enum Outcome {
    Unchanged,
    Changed(Arc<dyn SourceFile>),
    Failed(RecipeError),
}

/// Per-run bookkeeping shared by every recipe in the tree
#[derive(Default)]
struct RunState {
    changed_by: HashMap<TreeId, Vec<String>>,
    cancelled: bool,
}

impl RunState {
    fn record(&mut self, id: TreeId, recipe: &str) {
        let recipes = self.changed_by.entry(id).or_default();
        if !recipes.iter().any(|r| r == recipe) {
            recipes.push(recipe.to_string());
        }
    }
}

/// Runs a recipe tree over a corpus until it converges
#[derive(Debug, Clone)]
pub struct RecipeScheduler {
    max_cycles: usize,
    parallel: bool,
}

impl Default for RecipeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeScheduler {
    pub fn new() -> Self {
        Self {
            max_cycles: 3,
            parallel: true,
        }
    }

    pub fn from_config(config: &RewriteConfig) -> Self {
        Self::new().max_cycles(config.max_cycles).parallel(config.parallel)
    }

    /// Set the pass ceiling (at least one cycle always runs)
    pub fn max_cycles(mut self, max: usize) -> Self {
        self.max_cycles = max.max(1);
        self
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Run several recipes as one, in the given order
    pub fn run_all(
        &self,
        recipes: &[Arc<dyn Recipe>],
        before: &Corpus,
        ctx: &ExecutionContext,
    ) -> Result<RecipeRun, SchedulerError> {
        let composite = recipes
            .iter()
            .cloned()
            .fold(CompositeRecipe::new("recipes", "Recipes run together."), CompositeRecipe::add_recipe);
        self.run(&composite, before, ctx)
    }

    pub fn run(
        &self,
        recipe: &dyn Recipe,
        before: &Corpus,
        ctx: &ExecutionContext,
    ) -> Result<RecipeRun, SchedulerError> {
        validate_tree(recipe, ctx)
            .value()
            .map_err(|source| SchedulerError::InvalidOptions {
                recipe: recipe.name().to_string(),
                source,
            })?;

        let mut state = RunState::default();
        let mut corpus = before.clone();
        let mut cycles = 0;
        let mut converged = false;

        while cycles < self.max_cycles {
            if ctx.is_cancelled() {
                state.cancelled = true;
                break;
            }
            cycles += 1;
            debug!(cycle = cycles, recipe = recipe.name(), "starting cycle");

            let after = self.run_recipe(recipe, &corpus, ctx, &mut state);
            let changed = corpus_changed(&corpus, &after);
            corpus = after;

            if state.cancelled {
                break;
            }
            if !changed {
                converged = true;
                break;
            }
        }

        if !converged && !state.cancelled {
            warn!(recipe = recipe.name(), cycles, "recipe did not converge");
            ctx.add_diagnostic(
                Diagnostic::new(
                    Severity::Warning,
                    format!("did not converge after {cycles} cycle(s); returning the last result"),
                )
                .with_recipe(recipe.name()),
            );
        }
        if state.cancelled {
            info!(recipe = recipe.name(), cycles, "run cancelled");
        }

        let results = collect_results(before, &corpus, &state);
        info!(
            recipe = recipe.name(),
            cycles,
            converged,
            changed = results.len(),
            "run finished"
        );

        Ok(RecipeRun {
            corpus,
            results,
            cycles,
            converged,
            cancelled: state.cancelled,
            diagnostics: ctx.diagnostics(),
        })
    }

    /// Apply one recipe, then its sub-recipes, to the corpus
    fn run_recipe(&self, recipe: &dyn Recipe, before: &Corpus, ctx: &ExecutionContext, state: &mut RunState) -> Corpus {
        if state.cancelled || ctx.is_cancelled() {
            state.cancelled = true;
            return before.clone();
        }

        let name = recipe.name();
        let test = recipe.applicability_test();
        let test = test.as_deref();

        let visit = |source: &Arc<dyn SourceFile>| -> Option<(bool, Outcome)> {
            if ctx.is_cancelled() {
                return None;
            }
            if source.markers().contains::<ParseExceptionResult>() {
                return Some((false, Outcome::Unchanged));
            }
            let applicable = match test {
                Some(test) => match test.applies_to(source, ctx) {
                    Ok(applicable) => applicable,
                    Err(e) => return Some((false, Outcome::Failed(e))),
                },
                None => true,
            };
            if !applicable {
                return Some((false, Outcome::Unchanged));
            }
            let outcome = match recipe.transform_file(source, ctx) {
                Ok(after) if same_file(source, &after) => Outcome::Unchanged,
                Ok(after) => Outcome::Changed(after),
                Err(e) => Outcome::Failed(e),
            };
            Some((true, outcome))
        };

        let outcomes: Vec<Option<(bool, Outcome)>> = if self.parallel {
            before.par_iter().map(visit).collect()
        } else {
            before.iter().map(visit).collect()
        };

        let mut any_applicable = false;
        let mut changed = 0usize;
        let mut files = Vec::with_capacity(before.len());
        for (source, outcome) in before.iter().zip(outcomes) {
            let Some((applicable, outcome)) = outcome else {
                state.cancelled = true;
                files.push(source.clone());
                continue;
            };
            any_applicable |= applicable;
            match outcome {
                Outcome::Unchanged => files.push(source.clone()),
                Outcome::Changed(after) => {
                    state.record(after.id(), name);
                    changed += 1;
                    files.push(after);
                }
                Outcome::Failed(e) => files.push(mark_failure(name, source, &e, ctx)),
            }
        }

        let mut corpus = if changed == 0 && files.iter().zip(before.iter()).all(|(a, b)| same_file(a, b)) {
            before.clone()
        } else {
            Arc::new(files)
        };
        if changed > 0 {
            debug!(recipe = name, changed, "per-file transforms changed files");
        }

        if !state.cancelled && (test.is_none() || any_applicable) {
            corpus = self.run_corpus_transform(recipe, corpus, ctx, state);
        }

        for sub in recipe.recipe_list() {
            corpus = self.run_recipe(sub.as_ref(), &corpus, ctx, state);
        }
        corpus
    }

    fn run_corpus_transform(
        &self,
        recipe: &dyn Recipe,
        before: Corpus,
        ctx: &ExecutionContext,
        state: &mut RunState,
    ) -> Corpus {
        let name = recipe.name();
        let after = match recipe.transform_corpus(&before, ctx) {
            Ok(after) => after,
            Err(e) => {
                warn!(recipe = name, error = %e, "corpus transform failed");
                ctx.add_diagnostic(Diagnostic::new(Severity::Error, e.to_string()).with_recipe(name));
                return before;
            }
        };
        if Arc::ptr_eq(&before, &after) {
            return before;
        }
        if !preserves_order(&before, &after) {
            warn!(recipe = name, "corpus transform reordered existing files; result discarded");
            ctx.add_diagnostic(
                Diagnostic::new(Severity::Error, "corpus transform reordered existing files; result discarded")
                    .with_recipe(name),
            );
            return before;
        }

        let previous: HashMap<TreeId, &Arc<dyn SourceFile>> = before.iter().map(|s| (s.id(), s)).collect();
        for source in after.iter() {
            let unchanged = previous.get(&source.id()).is_some_and(|old| same_file(old, source));
            if !unchanged {
                state.record(source.id(), name);
            }
        }
        let kept: HashSet<TreeId> = after.iter().map(|s| s.id()).collect();
        for source in before.iter().filter(|s| !kept.contains(&s.id())) {
            state.record(source.id(), name);
        }
        after
    }
}

/// Validate a recipe and all of its sub-recipes, accumulating failures
fn validate_tree(recipe: &dyn Recipe, ctx: &ExecutionContext) -> Validated<()> {
    recipe
        .recipe_list()
        .iter()
        .fold(recipe.validate(ctx), |acc, sub| acc.and(validate_tree(sub.as_ref(), ctx)))
}

fn mark_failure(
    recipe: &str,
    source: &Arc<dyn SourceFile>,
    error: &RecipeError,
    ctx: &ExecutionContext,
) -> Arc<dyn SourceFile> {
    warn!(recipe, path = %source.source_path().display(), error = %error, "recipe failed on file");
    ctx.add_diagnostic(
        Diagnostic::new(Severity::Error, error.to_string())
            .with_recipe(recipe)
            .with_path(source.source_path()),
    );
    let already_marked = source
        .markers()
        .iter()
        .filter_map(|m| m.as_any().downcast_ref::<RecipeFailure>())
        .any(|m| m.recipe == recipe);
    if already_marked {
        return source.clone();
    }
    source.with_markers(source.markers().add(RecipeFailure::new(recipe, error.to_string())))
}

fn corpus_changed(before: &Corpus, after: &Corpus) -> bool {
    !Arc::ptr_eq(before, after)
        && (before.len() != after.len() || before.iter().zip(after.iter()).any(|(a, b)| !same_file(a, b)))
}

/// Files present on both sides must appear in the same relative order
fn preserves_order(before: &Corpus, after: &Corpus) -> bool {
    let positions: HashMap<TreeId, usize> = before.iter().enumerate().map(|(i, s)| (s.id(), i)).collect();
    let mut last = None;
    for source in after.iter() {
        if let Some(&position) = positions.get(&source.id()) {
            if last.is_some_and(|last| position <= last) {
                return false;
            }
            last = Some(position);
        }
    }
    true
}

fn collect_results(before: &Corpus, after: &Corpus, state: &RunState) -> Vec<FileResult> {
    let originals: IndexMap<TreeId, &Arc<dyn SourceFile>> = before.iter().map(|s| (s.id(), s)).collect();
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for source in after.iter() {
        let id = source.id();
        seen.insert(id);
        let original = originals.get(&id).copied();
        if original.is_some_and(|original| same_file(original, source)) {
            continue;
        }
        results.push(FileResult {
            before: original.cloned(),
            after: Some(source.clone()),
            recipes: state.changed_by.get(&id).cloned().unwrap_or_default(),
        });
    }
    for (id, original) in originals.iter().filter(|(id, _)| !seen.contains(*id)) {
        results.push(FileResult {
            before: Some((*original).clone()),
            after: None,
            recipes: state.changed_by.get(id).cloned().unwrap_or_default(),
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{ByPath, RecipeOption};
    use crate::source::downcast;
    use crate::text::PlainText;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn text(path: &str, body: &str) -> Arc<dyn SourceFile> {
        Arc::new(PlainText::new(path, body))
    }

    fn corpus(files: Vec<Arc<dyn SourceFile>>) -> Corpus {
        Arc::new(files)
    }

    /// Appends "!" to text files until they end with "!!!"
    struct Shout;

    impl Recipe for Shout {
        fn name(&self) -> &str {
            "Shout"
        }

        fn description(&self) -> &str {
            "Append exclamation marks."
        }

        fn applicability_test(&self) -> Option<Arc<dyn crate::recipe::Applicability>> {
            Some(Arc::new(ByPath::new(|path: &Path| {
                path.extension().is_some_and(|ext| ext == "txt")
            })))
        }

        fn transform_file(
            &self,
            source: &Arc<dyn SourceFile>,
            _ctx: &ExecutionContext,
        ) -> Result<Arc<dyn SourceFile>, RecipeError> {
            let Some(text) = downcast::<PlainText>(source) else {
                return Ok(source.clone());
            };
            if text.text.ends_with("!!!") {
                return Ok(source.clone());
            }
            Ok(Arc::new(text.with_text(format!("{}!", text.text))))
        }
    }

    struct AlwaysChange;

    impl Recipe for AlwaysChange {
        fn name(&self) -> &str {
            "AlwaysChange"
        }

        fn description(&self) -> &str {
            "Never converges."
        }

        fn transform_file(
            &self,
            source: &Arc<dyn SourceFile>,
            _ctx: &ExecutionContext,
        ) -> Result<Arc<dyn SourceFile>, RecipeError> {
            let Some(text) = downcast::<PlainText>(source) else {
                return Ok(source.clone());
            };
            Ok(Arc::new(text.with_text(format!("{}.", text.text))))
        }
    }

    struct FailOn(&'static str);

    impl Recipe for FailOn {
        fn name(&self) -> &str {
            "FailOn"
        }

        fn description(&self) -> &str {
            "Fails on one path."
        }

        fn transform_file(
            &self,
            source: &Arc<dyn SourceFile>,
            _ctx: &ExecutionContext,
        ) -> Result<Arc<dyn SourceFile>, RecipeError> {
            if source.source_path() == Path::new(self.0) {
                return Err(RecipeError::failed(self.name(), source.source_path(), "boom"));
            }
            Ok(source.clone())
        }
    }

    struct AddFile;

    impl Recipe for AddFile {
        fn name(&self) -> &str {
            "AddFile"
        }

        fn description(&self) -> &str {
            "Adds NOTICE once."
        }

        fn transform_corpus(&self, before: &Corpus, _ctx: &ExecutionContext) -> Result<Corpus, RecipeError> {
            if before.iter().any(|s| s.source_path() == Path::new("NOTICE")) {
                return Ok(before.clone());
            }
            let mut files = before.as_ref().clone();
            files.push(text("NOTICE", "generated"));
            Ok(Arc::new(files))
        }
    }

    struct Reverse;

    impl Recipe for Reverse {
        fn name(&self) -> &str {
            "Reverse"
        }

        fn description(&self) -> &str {
            "Illegally reorders files."
        }

        fn transform_corpus(&self, before: &Corpus, _ctx: &ExecutionContext) -> Result<Corpus, RecipeError> {
            let mut files = before.as_ref().clone();
            files.reverse();
            Ok(Arc::new(files))
        }
    }

    struct NeedsOption;

    impl Recipe for NeedsOption {
        fn name(&self) -> &str {
            "NeedsOption"
        }

        fn description(&self) -> &str {
            "Has a required option with no value."
        }

        fn options(&self) -> Vec<RecipeOption> {
            vec![RecipeOption::new("key", "Key", "Required key.")]
        }

        fn transform_file(
            &self,
            _source: &Arc<dyn SourceFile>,
            _ctx: &ExecutionContext,
        ) -> Result<Arc<dyn SourceFile>, RecipeError> {
            panic!("must not run with invalid options");
        }
    }

    struct CountingCancel {
        seen: AtomicUsize,
    }

    impl Recipe for CountingCancel {
        fn name(&self) -> &str {
            "CountingCancel"
        }

        fn description(&self) -> &str {
            "Cancels the run after the first file."
        }

        fn transform_file(
            &self,
            source: &Arc<dyn SourceFile>,
            ctx: &ExecutionContext,
        ) -> Result<Arc<dyn SourceFile>, RecipeError> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            ctx.cancel();
            let Some(text) = downcast::<PlainText>(source) else {
                return Ok(source.clone());
            };
            Ok(Arc::new(text.with_text("done")))
        }
    }

    #[test]
    fn test_runs_until_fixed_point() {
        let ctx = ExecutionContext::new();
        let input = corpus(vec![text("a.txt", "hi"), text("b.md", "skip")]);

        let run = RecipeScheduler::new()
            .max_cycles(5)
            .run(&Shout, &input, &ctx)
            .unwrap();

        assert!(run.converged);
        assert_eq!(run.cycles, 4);
        assert_eq!(run.corpus[0].print(), "hi!!!");
        assert!(same_file(&run.corpus[1], &input[1]));
        assert_eq!(run.results.len(), 1);
        assert_eq!(run.results[0].recipes, vec!["Shout".to_string()]);
        assert_eq!(run.corpus[0].id(), input[0].id());
    }

    #[test]
    fn test_no_change_returns_same_corpus() {
        let ctx = ExecutionContext::new();
        let input = corpus(vec![text("b.md", "skip")]);

        let run = RecipeScheduler::new().run(&Shout, &input, &ctx).unwrap();

        assert!(Arc::ptr_eq(&run.corpus, &input));
        assert!(run.converged);
        assert_eq!(run.cycles, 1);
        assert!(!run.changed());
    }

    #[test]
    fn test_non_convergence_is_a_diagnostic() {
        let ctx = ExecutionContext::new();
        let input = corpus(vec![text("a.txt", "")]);

        let run = RecipeScheduler::new().run(&AlwaysChange, &input, &ctx).unwrap();

        assert!(!run.converged);
        assert_eq!(run.cycles, 3);
        assert_eq!(run.corpus[0].print(), "...");
        assert!(run
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning && d.message.contains("did not converge")));
    }

    #[test]
    fn test_failure_is_isolated_to_one_file() {
        let ctx = ExecutionContext::new();
        let input = corpus(vec![text("bad.txt", "x"), text("good.txt", "y")]);
        let recipe = CompositeRecipe::new("Both", "Fail then shout.")
            .add_recipe(Arc::new(FailOn("bad.txt")))
            .add_recipe(Arc::new(Shout));

        let run = RecipeScheduler::new().max_cycles(5).run(&recipe, &input, &ctx).unwrap();

        let bad = &run.corpus[0];
        assert_eq!(
            bad.markers().find_first::<RecipeFailure>().map(|m| m.recipe.as_str()),
            Some("FailOn")
        );
        assert_eq!(run.corpus[1].print(), "y!!!");
        assert!(run.converged);
        assert_eq!(
            run.diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .count(),
            run.cycles
        );
    }

    #[test]
    fn test_parse_failures_are_skipped() {
        let ctx = ExecutionContext::new();
        let broken = crate::parser::parse_failure("text", &crate::parser::ParserInput::new("a.txt", "x"), "bad");
        let input = corpus(vec![broken.clone()]);

        let run = RecipeScheduler::new().run(&Shout, &input, &ctx).unwrap();
        assert!(same_file(&run.corpus[0], &broken));
    }

    #[test]
    fn test_corpus_transform_appends_once() {
        let ctx = ExecutionContext::new();
        let input = corpus(vec![text("a.txt", "a")]);

        let run = RecipeScheduler::new().run(&AddFile, &input, &ctx).unwrap();

        assert_eq!(run.corpus.len(), 2);
        assert!(same_file(&run.corpus[0], &input[0]));
        assert!(run.converged);
        assert_eq!(run.results.len(), 1);
        assert!(run.results[0].is_generated());
        assert!(run.results[0].diff().contains("+generated"));
    }

    #[test]
    fn test_reordering_is_rejected() {
        let ctx = ExecutionContext::new();
        let input = corpus(vec![text("a.txt", "a"), text("b.txt", "b")]);

        let run = RecipeScheduler::new().run(&Reverse, &input, &ctx).unwrap();

        assert!(Arc::ptr_eq(&run.corpus, &input));
        assert!(run.diagnostics.iter().any(|d| d.message.contains("reordered")));
    }

    #[test]
    fn test_invalid_options_stop_before_any_file() {
        let ctx = ExecutionContext::new();
        let input = corpus(vec![text("a.txt", "a")]);
        let recipe = CompositeRecipe::new("Outer", "Nested invalid recipe.").add_recipe(Arc::new(NeedsOption));

        let err = RecipeScheduler::new().run(&recipe, &input, &ctx).unwrap_err();
        let SchedulerError::InvalidOptions { recipe, source } = err;
        assert_eq!(recipe, "Outer");
        assert_eq!(source.0[0].property, "key");
    }

    #[test]
    fn test_cancellation_keeps_completed_files_only() {
        let ctx = ExecutionContext::new();
        let input = corpus(vec![text("a.txt", "a"), text("b.txt", "b"), text("c.txt", "c")]);
        let recipe = CountingCancel {
            seen: AtomicUsize::new(0),
        };

        let run = RecipeScheduler::new()
            .parallel(false)
            .run(&recipe, &input, &ctx)
            .unwrap();

        assert!(run.cancelled);
        assert_eq!(recipe.seen.load(Ordering::SeqCst), 1);
        assert_eq!(run.corpus[0].print(), "done");
        assert!(same_file(&run.corpus[1], &input[1]));
        assert!(same_file(&run.corpus[2], &input[2]));
    }

    #[test]
    fn test_run_all_in_order() {
        let ctx = ExecutionContext::new();
        let input = corpus(vec![text("a.txt", "a")]);
        let recipes: Vec<Arc<dyn Recipe>> = vec![Arc::new(Shout), Arc::new(AddFile)];

        let run = RecipeScheduler::new()
            .max_cycles(5)
            .run_all(&recipes, &input, &ctx)
            .unwrap();

        assert!(run.converged);
        assert_eq!(run.corpus.len(), 2);
        assert_eq!(run.corpus[0].print(), "a!!!");
        assert_eq!(run.corpus[1].print(), "generated");
    }
}
