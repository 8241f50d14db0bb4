//! Enqueueing acquisition jobs for identifiers the ledger has not seen.
//!
//! For one identifier at most one job runs at a time. The check against
//! the in-flight set and the insertion into it happen under one lock, so
//! concurrent requests for the same identifier launch a single job; the
//! later requests are answered as enqueued and marked `coalesced`. The
//! identifier leaves the in-flight set when its job ends, successful or
//! not, which makes a failed acquisition retryable.
//!
//! Job tasks are tracked so [`DownloadDispatcher::shutdown`] can give
//! queued jobs a bounded chance to start before the process exits.

mod job;
mod launcher;

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::{Mutex, Semaphore, oneshot};
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};
use vitrine_model::{DispatchStatus, ItemId, JobId};

use crate::{error::DispatchError, ledger::Ledger};

pub use job::{JobOutcome, JobResult, JobTicket};
pub use launcher::{CommandLauncher, JobLauncher};

/// The answer to one enqueue request.
#[derive(Debug)]
pub struct Dispatch {
    pub status: DispatchStatus,
    /// Present only when this request launched a job.
    pub ticket: Option<JobTicket>,
    /// The identifier was already in flight; no new job was launched.
    pub coalesced: bool,
}

impl Dispatch {
    fn already_present(id: ItemId) -> Self {
        Self {
            status: DispatchStatus::AlreadyPresent { id },
            ticket: None,
            coalesced: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobPhase {
    /// Waiting for a job slot.
    Queued,
    /// The launcher was called.
    Running,
}

#[derive(Debug, Clone)]
pub struct DownloadDispatcher {
    ledger: Arc<dyn Ledger>,
    launcher: Arc<dyn JobLauncher>,
    permits: Arc<Semaphore>,
    in_flight: Arc<Mutex<HashMap<ItemId, JobPhase>>>,
    jobs: TaskTracker,
}

impl DownloadDispatcher {
    /// `max_concurrent_jobs` bounds running jobs; further jobs wait for a
    /// slot. Zero is treated as one.
    pub fn new(
        ledger: Arc<dyn Ledger>,
        launcher: Arc<dyn JobLauncher>,
        max_concurrent_jobs: usize,
    ) -> Self {
        Self {
            ledger,
            launcher,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            jobs: TaskTracker::new(),
        }
    }

    /// Normalizes `raw` to upper case, consults the ledger and launches a
    /// job unless the identifier is recorded or already in flight.
    ///
    /// Returns as soon as the job is scheduled; the job itself runs in the
    /// background.
    pub async fn enqueue(&self, raw: &str) -> Result<Dispatch, DispatchError> {
        let id = ItemId::parse(raw)?.normalized();

        if self.ledger.contains(&id).await? {
            info!(item_id = %id, "already downloaded");
            return Ok(Dispatch::already_present(id));
        }

        {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight.contains_key(&id) {
                info!(item_id = %id, "job already in flight, coalescing");
                return Ok(Dispatch {
                    status: DispatchStatus::Enqueued { id },
                    ticket: None,
                    coalesced: true,
                });
            }
            in_flight.insert(id.clone(), JobPhase::Queued);
        }

        // A job for this id may have finished between the first lookup and
        // the mark; the ledger is authoritative once the id is marked.
        match self.ledger.contains(&id).await {
            Ok(false) => {}
            Ok(true) => {
                self.in_flight.lock().await.remove(&id);
                info!(item_id = %id, "already downloaded");
                return Ok(Dispatch::already_present(id));
            }
            Err(err) => {
                self.in_flight.lock().await.remove(&id);
                return Err(err.into());
            }
        }

        let ticket = self.spawn_job(id.clone());
        info!(item_id = %id, job_id = %ticket.job_id, "added to download queue");
        Ok(Dispatch {
            status: DispatchStatus::Enqueued { id },
            ticket: Some(ticket),
            coalesced: false,
        })
    }

    pub async fn in_flight(&self) -> Vec<ItemId> {
        let mut ids: Vec<_> = self.in_flight.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Waits up to `grace` for every tracked job to finish. Returns the
    /// identifiers whose job never reached the launcher; each is logged.
    /// Jobs already running are left to their external process.
    pub async fn shutdown(&self, grace: Duration) -> Vec<ItemId> {
        self.jobs.close();
        if self.jobs.is_empty() {
            return Vec::new();
        }
        info!(jobs = self.jobs.len(), ?grace, "waiting for acquisition jobs");
        if tokio::time::timeout(grace, self.jobs.wait()).await.is_ok() {
            info!("acquisition jobs drained");
            return Vec::new();
        }

        let mut dropped = Vec::new();
        let mut in_flight: Vec<_> = self
            .in_flight
            .lock()
            .await
            .iter()
            .map(|(id, phase)| (id.clone(), *phase))
            .collect();
        in_flight.sort_by(|a, b| a.0.cmp(&b.0));
        for (id, phase) in in_flight {
            match phase {
                JobPhase::Queued => {
                    warn!(item_id = %id, "queued job dropped at shutdown; it was never launched");
                    dropped.push(id);
                }
                JobPhase::Running => {
                    warn!(item_id = %id, "job still running at shutdown; no outcome will be recorded");
                }
            }
        }
        dropped
    }

    fn spawn_job(&self, id: ItemId) -> JobTicket {
        let job_id = JobId::new();
        let (tx, rx) = oneshot::channel();
        let launcher = Arc::clone(&self.launcher);
        let permits = Arc::clone(&self.permits);
        let in_flight = Arc::clone(&self.in_flight);
        let item_id = id.clone();

        self.jobs.spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => {
                    if let Some(phase) = in_flight.lock().await.get_mut(&item_id) {
                        *phase = JobPhase::Running;
                    }
                    match launcher.launch(&item_id).await {
                        Ok(()) => {
                            info!(item_id = %item_id, job_id = %job_id, "job finished");
                            JobResult::Succeeded
                        }
                        Err(err) => {
                            error!(item_id = %item_id, job_id = %job_id, error = %err, "job failed");
                            JobResult::Failed(err.to_string())
                        }
                    }
                }
                Err(_) => {
                    warn!(item_id = %item_id, job_id = %job_id, "job slots closed");
                    JobResult::Failed("job slots closed".to_string())
                }
            };

            in_flight.lock().await.remove(&item_id);
            // The requester may have dropped its ticket.
            let _ = tx.send(JobOutcome {
                job_id,
                item_id,
                result,
            });
        });

        JobTicket {
            job_id,
            item_id: id,
            outcome: rx,
        }
    }
}
