//! Java cleanup recipes.

mod compare_enums;
mod unnecessary_parentheses;
mod unwrap_parentheses;

use std::sync::Arc;

use rewrite_core::{downcast, ExecutionContext, RecipeError, RecipeRegistry, SourceFile, TreeVisitor, VisitError};

use crate::tree::{CompilationUnit, J};

pub use compare_enums::{CompareEnumsVisitor, CompareEnumsWithEqualityOperator};
pub use unnecessary_parentheses::{UnnecessaryParentheses, UnnecessaryParenthesesStyle, UnnecessaryParenthesesVisitor};
pub use unwrap_parentheses::{is_unwrappable, UnwrapParentheses};

/// Run `visitor` over a Java source file. Other file kinds, and units the
/// visitor leaves alone, come back as the input instance.
pub fn visit_java_file<V>(
    recipe: &str,
    visitor: &V,
    source: &Arc<dyn SourceFile>,
    ctx: &ExecutionContext,
) -> Result<Arc<dyn SourceFile>, RecipeError>
where
    V: TreeVisitor<J, ExecutionContext>,
{
    let Some(cu) = downcast::<CompilationUnit>(source) else {
        return Ok(source.clone());
    };
    let tree = J::CompilationUnit(cu);
    let visited = visitor
        .visit_root(&tree, ctx)
        .map_err(|e| RecipeError::defect(recipe, source.source_path(), e))?;
    if visited.is_same(&tree) {
        return Ok(source.clone());
    }
    match visited {
        J::CompilationUnit(cu) => Ok(cu as Arc<dyn SourceFile>),
        other => Err(RecipeError::defect(
            recipe,
            source.source_path(),
            VisitError::wrong_shape("a compilation unit", &other),
        )),
    }
}

/// Add the Java recipes to `registry`
pub fn register(registry: &mut RecipeRegistry) {
    registry.register::<UnnecessaryParentheses>(
        UnnecessaryParentheses::NAME,
        "Remove parentheses that do not change evaluation order.",
    );
    registry.register_default::<CompareEnumsWithEqualityOperator>(
        CompareEnumsWithEqualityOperator::NAME,
        "Compare enum values with == instead of equals().",
    );
}
