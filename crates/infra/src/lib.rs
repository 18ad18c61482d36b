//! Orchestration layer: runs the pipeline stages in order and persists
//! their tables and chart views.

pub mod charts;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod summary;


pub use output::{
    Artifact, ArtifactSink, FsArtifactSink, InMemoryArtifactSink, OutputError, persist,
};
pub use pipeline::{Pipeline, PipelineRun};
pub use summary::RunSummary;
