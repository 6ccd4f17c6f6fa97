//! Application services - Use case implementations

mod turn_pipeline;

pub use turn_pipeline::{
    ChatOutcome, TurnPipeline, TurnPipelineConfig, VoiceTurnOutcome, parse_history,
};
