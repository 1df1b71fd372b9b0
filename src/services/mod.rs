pub mod enrichment;
pub mod normalizer;
pub mod pipeline;
pub mod profile;
pub mod providers;
pub mod scoring;
pub mod selector;
pub mod sources;

pub use pipeline::{PipelineRun, RecommendationPipeline};
pub use scoring::{ScoringEngine, ScoringWeights};
