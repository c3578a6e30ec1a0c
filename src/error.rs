use thiserror::Error;

use crate::stages::Stage;

/// Failure that halted a cleaning run. Earlier stages' results are discarded
/// with the working set; the destination is only written by the emit stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} stage failed")]
    Stage {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Stage { stage, .. } => *stage,
        }
    }
}
