//! Feature pipeline: bars in, one typed [`FeatureRow`] per bar out.

pub mod pipeline;
pub mod row;

pub use pipeline::{compute_features, FeaturePipeline, MIN_FEATURE_ROWS};
pub use row::FeatureRow;
