//! Specflow Classifier
//!
//! Maps free-text task descriptions to a complexity tier, a set of domain
//! tags, and the roles a plan should include. Classification is a pure
//! function of the text, the static keyword table in [`keywords`], and the
//! configured thresholds.

mod classifier;
mod error;
pub mod keywords;

pub use classifier::{Classification, ComplexityTier, TaskClassifier, TaskDescriptor};
pub use error::ClassifyError;
