//! Pipelines.
//!
//! Batch processing over record files is implemented here, and the module
//! provides a light [pipeline::Pipeline] trait so that new pipelines slot in
//! behind the same interface.
pub mod extract;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod preprocess;

pub use extract::ExtractPipeline;
pub use pipeline::Pipeline;
pub use preprocess::PreprocessPipeline;
