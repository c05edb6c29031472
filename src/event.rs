use std::path::PathBuf;

/// Messages the batch worker sends back to its caller.
#[derive(Clone, Debug)]
pub enum AppMsg {
    PipelineStarted(usize),
    PipelineProgress(usize, usize),
    CursorWritten(PathBuf),
    PipelineCompleted(usize),
    PipelineFailed(String),
    LogMessage(String),
}
