use crate::pipeline::batch::RunSummary;

#[derive(Clone, Debug)]
pub enum AppMsg {
    // Pipeline control
    PipelineStarted,
    PipelineProgress(usize, usize),
    AnimationPacked {
        index: usize,
        name: String,
        frames: usize,
    },
    PipelineCompleted(RunSummary),
    PipelineFailed(String),

    // General
    ErrorOccurred(String),
    LogMessage(String),
}
