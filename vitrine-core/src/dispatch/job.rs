use tokio::sync::oneshot;
use vitrine_model::{ItemId, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub job_id: JobId,
    pub item_id: ItemId,
    pub result: JobResult,
}

/// Handle on a launched job. Dropping it does not cancel the job.
#[derive(Debug)]
pub struct JobTicket {
    pub job_id: JobId,
    pub item_id: ItemId,
    pub(crate) outcome: oneshot::Receiver<JobOutcome>,
}

impl JobTicket {
    /// Waits for the job to finish. `None` if the job task was torn down
    /// before reporting, e.g. on runtime shutdown.
    pub async fn outcome(self) -> Option<JobOutcome> {
        self.outcome.await.ok()
    }
}
