//! # Rewrite Gradle
//!
//! Gradle build support for the rewrite engine:
//! - Wrapper option resolution against known Gradle releases
//! - Build script detection for recipe applicability
//! - `AddGradleWrapper`, which adds missing wrapper files to a project

#![warn(clippy::all)]

pub mod add_gradle_wrapper;
pub mod is_build_gradle;
pub mod wrapper;

pub use add_gradle_wrapper::AddGradleWrapper;
pub use is_build_gradle::IsBuildGradle;
pub use wrapper::{DistributionType, GradleRelease, GradleWrapper};

use rewrite_core::RecipeRegistry;

/// Add this crate's recipes to `registry`
pub fn register(registry: &mut RecipeRegistry) {
    registry.register::<AddGradleWrapper>(AddGradleWrapper::NAME, "Add a Gradle wrapper where one does not exist.");
}
