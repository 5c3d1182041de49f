use futures::future;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::GenerationError,
    models::{GenerationJob, JobStatus, MusicPrompt},
    services::replicate::{JobRequest, JobService, JobStatusReport},
};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 300;

/// Bounds of the status polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay before each status check
    pub interval: Duration,
    /// Status checks allowed before giving up
    pub max_attempts: u32,
    /// Wall-clock limit measured from submission
    pub deadline: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            deadline: None,
        }
    }
}

/// Submits one generation job and polls it to a terminal state.
#[derive(Clone)]
pub struct JobPoller {
    service: Arc<dyn JobService>,
    settings: PollSettings,
}

enum Wait<T> {
    Done(T),
    Cancelled,
    DeadlineReached,
}

impl JobPoller {
    pub fn new(service: Arc<dyn JobService>, settings: PollSettings) -> Self {
        Self { service, settings }
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// Submit a job for `prompt` and return the URL of the generated audio.
    ///
    /// URL-only view of [`JobPoller::run`] for callers that do not need the
    /// job record.
    pub async fn generate_audio(
        &self,
        prompt: &MusicPrompt,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        let job = self.run(prompt, cancel).await?;
        job.result_url.ok_or_else(|| {
            GenerationError::MalformedResult(format!("job {} has no audio URL", job.job_id))
        })
    }

    /// Submit and poll until the job succeeds.
    ///
    /// This is the entry point [`SoundtrackService`](crate::services::SoundtrackService)
    /// uses, since pairing the prompt with the result needs the finished job.
    /// Returns the job only in the `Succeeded` state with a validated URL.
    /// With `max_attempts == 0` nothing is submitted.
    pub async fn run(
        &self,
        prompt: &MusicPrompt,
        cancel: &CancellationToken,
    ) -> Result<GenerationJob, GenerationError> {
        if self.settings.max_attempts == 0 {
            warn!("Status check budget is zero, not submitting a job");
            return Err(GenerationError::Timeout { attempts: 0 });
        }

        let deadline = self.settings.deadline.map(|d| Instant::now() + d);
        let request = JobRequest::for_prompt(prompt);

        let job_id = match wait(self.service.submit(&request), cancel, deadline).await {
            Wait::Done(job_id) => job_id?,
            Wait::Cancelled => return Err(GenerationError::Cancelled),
            Wait::DeadlineReached => return Err(GenerationError::Timeout { attempts: 0 }),
        };
        info!("Generation job submitted: {}", job_id);

        let mut job = GenerationJob::submitted(job_id);
        let mut attempts = 0;

        while !job.status.is_terminal() {
            if attempts >= self.settings.max_attempts {
                warn!(
                    "Job {} still pending after {} status checks, giving up",
                    job.job_id, attempts
                );
                return Err(GenerationError::Timeout { attempts });
            }

            let check = async {
                sleep(self.settings.interval).await;
                self.service.get_status(&job.job_id).await
            };
            let report = match wait(check, cancel, deadline).await {
                Wait::Done(report) => report?,
                Wait::Cancelled => {
                    info!("Job {} polling cancelled", job.job_id);
                    return Err(GenerationError::Cancelled);
                }
                Wait::DeadlineReached => {
                    warn!("Job {} exceeded its deadline", job.job_id);
                    return Err(GenerationError::Timeout { attempts });
                }
            };
            attempts += 1;
            debug!("Job {} status: {:?}", job.job_id, report.status);

            job = advance(job, report)?;
        }

        info!("Job {} succeeded after {} status checks", job.job_id, attempts);
        Ok(job)
    }
}

/// Race `fut` against cancellation and the optional deadline
async fn wait<F, T>(fut: F, cancel: &CancellationToken, deadline: Option<Instant>) -> Wait<T>
where
    F: std::future::Future<Output = T>,
{
    let deadline_reached = async {
        match deadline {
            Some(at) => sleep_until(at).await,
            None => future::pending::<()>().await,
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Wait::Cancelled,
        _ = deadline_reached => Wait::DeadlineReached,
        value = fut => Wait::Done(value),
    }
}

/// Apply one status report to the job, validating terminal outcomes
fn advance(mut job: GenerationJob, report: JobStatusReport) -> Result<GenerationJob, GenerationError> {
    job.status = report.status;

    match report.status {
        JobStatus::Pending => Ok(job),
        JobStatus::Failed => {
            let reason = report.error.unwrap_or_else(|| "unknown error".to_string());
            warn!("Job {} failed: {}", job.job_id, reason);
            job.error_detail = Some(reason.clone());
            Err(GenerationError::GenerationFailed(reason))
        }
        JobStatus::Succeeded => match report.output {
            Some(Value::String(url)) if !url.trim().is_empty() => {
                job.result_url = Some(url);
                Ok(job)
            }
            other => {
                warn!("Invalid output format for job {}: {:?}", job.job_id, other);
                Err(GenerationError::MalformedResult(match other {
                    Some(value) => value.to_string(),
                    None => "no output".to_string(),
                }))
            }
        },
    }
}
