//! Job executor: the submit/poll surface over the registry.

use std::sync::Arc;

use clipjob_models::{validate_source_url, Job, JobId, JobResult, JobStatus, StatusUpdate};
use clipjob_registry::JobRegistry;
use tokio::sync::Semaphore;
use tracing::{info, Instrument};

use crate::collaborators::{ClipFinder, SourceAcquirer, Transcriber};
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::processor::JobProcessor;

/// Outcome of a result lookup.
#[derive(Debug, Clone)]
pub enum ResultLookup {
    NotFound,
    NotCompleted(JobStatus),
    Ready(Box<JobResult>),
}

/// Availability of the external collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollaboratorHealth {
    pub acquisition_available: bool,
    pub transcription_available: bool,
}

/// Accepts jobs, runs each one in its own task, and answers status queries.
pub struct JobExecutor {
    config: WorkerConfig,
    registry: Arc<JobRegistry>,
    processor: Arc<JobProcessor>,
    job_semaphore: Option<Arc<Semaphore>>,
}

impl JobExecutor {
    /// Create a new job executor.
    pub fn new(
        config: WorkerConfig,
        registry: Arc<JobRegistry>,
        acquirer: Arc<dyn SourceAcquirer>,
        transcriber: Arc<dyn Transcriber>,
        clip_finder: Arc<dyn ClipFinder>,
    ) -> Self {
        let job_semaphore = match config.max_concurrent_jobs {
            0 => None,
            n => Some(Arc::new(Semaphore::new(n))),
        };
        let processor = Arc::new(JobProcessor::new(
            config.clone(),
            Arc::clone(&registry),
            acquirer,
            transcriber,
            clip_finder,
        ));

        Self {
            config,
            registry,
            processor,
            job_semaphore,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Validate a request, register a queued job and start processing it.
    ///
    /// Returns as soon as the job is registered. Invalid input yields
    /// [`WorkerError::Validation`] and creates nothing. Must be called from
    /// within a tokio runtime.
    pub fn submit(&self, url: &str, max_duration: Option<f64>) -> WorkerResult<JobId> {
        let url = validate_source_url(url)?;
        let max_duration = match max_duration {
            Some(d) if d.is_finite() && d > 0.0 => d,
            Some(d) => {
                return Err(WorkerError::validation(format!(
                    "max_duration must be a positive number of seconds, got {}",
                    d
                )))
            }
            None => self.config.default_max_clip_duration,
        };

        let job = Job::new(url, max_duration);
        let job_id = job.id.clone();
        self.registry.create(job)?;
        metrics::record_job_submitted();
        info!(job_id = %job_id, max_duration, "Job submitted");

        let processor = Arc::clone(&self.processor);
        let registry = Arc::clone(&self.registry);
        let semaphore = self.job_semaphore.clone();
        let task_id = job_id.clone();
        let span = JobLogger::new(&job_id, "clip_pipeline").create_span();

        tokio::spawn(
            async move {
                // Waiting jobs stay queued until a slot frees up.
                let _permit = match semaphore {
                    Some(semaphore) => match semaphore.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(_) => {
                            let logger = JobLogger::new(&task_id, "clip_pipeline");
                            logger.log_warning("Job semaphore closed");
                            if let Err(e) = registry
                                .set_status(&task_id, StatusUpdate::failed("Worker shutting down"))
                            {
                                logger.log_warning(&format!("Could not record failure: {}", e));
                            }
                            metrics::record_job_failed();
                            return;
                        }
                    },
                    None => None,
                };
                processor.run(&task_id).await;
            }
            .instrument(span),
        );

        Ok(job_id)
    }

    /// Snapshot of a job.
    pub fn get_status(&self, job_id: &JobId) -> Option<Job> {
        self.registry.get(job_id)
    }

    /// Newest jobs first.
    pub fn list_jobs(&self, limit: usize) -> Vec<Job> {
        self.registry.list(limit)
    }

    /// Final payload of a job, if it has one.
    pub fn get_result(&self, job_id: &JobId) -> ResultLookup {
        match self.registry.get(job_id) {
            None => ResultLookup::NotFound,
            Some(job) => match (job.status, job.result) {
                (JobStatus::Completed, Some(result)) => ResultLookup::Ready(Box::new(result)),
                (status, _) => ResultLookup::NotCompleted(status),
            },
        }
    }

    /// Ask each collaborator whether it is usable right now.
    pub async fn health(&self) -> CollaboratorHealth {
        let (acquisition_available, transcription_available) = tokio::join!(
            self.processor.acquirer().is_available(),
            self.processor.transcriber().is_available(),
        );
        CollaboratorHealth {
            acquisition_available,
            transcription_available,
        }
    }
}
