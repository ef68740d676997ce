//! Feature pipeline and its building blocks

pub mod derived;
pub mod encoding;
pub mod guard;
pub mod pipeline;
pub mod sources;

pub use encoding::CategoryIndex;
pub use guard::LeakageGuard;
pub use pipeline::{compute_features, FeaturePipeline};
pub use sources::{FeatureSource, FeatureSources};
