//! Per-job pipeline.
//!
//! fetch → transcribe → find clips → reconstruct transcript → select clips →
//! assemble result. Progress is reported into the registry at fixed
//! checkpoints, with download progress mapped into the 10–35 band.

use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use clipjob_media::{mime_type_for, remove_dir_best_effort, sanitize_title};
use clipjob_models::{
    scale_fraction, Job, JobId, JobPatch, JobResult, StatusUpdate, TranscriptPayload,
    VideoFileMetadata, VideoPayload,
};
use clipjob_registry::JobRegistry;
use futures_util::FutureExt;

use crate::clip_select::select_clips;
use crate::collaborators::{ClipFinder, FetchProgress, SourceAcquirer, Transcriber};
use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::logging::JobLogger;
use crate::metrics::{self, stages};
use crate::transcript::reconstruct;

const DOWNLOAD_START: u8 = 10;
const DOWNLOAD_END: u8 = 35;
const TRANSCRIBE_PROGRESS: u8 = 40;
const FIND_CLIPS_PROGRESS: u8 = 70;
const FINALIZE_PROGRESS: u8 = 95;

/// Runs the pipeline for one job and records the outcome in the registry.
pub struct JobProcessor {
    config: WorkerConfig,
    registry: Arc<JobRegistry>,
    acquirer: Arc<dyn SourceAcquirer>,
    transcriber: Arc<dyn Transcriber>,
    clip_finder: Arc<dyn ClipFinder>,
}

impl JobProcessor {
    pub fn new(
        config: WorkerConfig,
        registry: Arc<JobRegistry>,
        acquirer: Arc<dyn SourceAcquirer>,
        transcriber: Arc<dyn Transcriber>,
        clip_finder: Arc<dyn ClipFinder>,
    ) -> Self {
        Self {
            config,
            registry,
            acquirer,
            transcriber,
            clip_finder,
        }
    }

    pub fn acquirer(&self) -> &Arc<dyn SourceAcquirer> {
        &self.acquirer
    }

    pub fn transcriber(&self) -> &Arc<dyn Transcriber> {
        &self.transcriber
    }

    /// Process a job to a terminal state.
    ///
    /// Never returns with the job still in `processing`: errors and panics
    /// inside the pipeline both end in `failed`, after the job's work
    /// directory has been removed.
    pub async fn run(&self, job_id: &JobId) {
        let logger = JobLogger::new(job_id, "clip_pipeline");
        let Some(job) = self.registry.get(job_id) else {
            logger.log_warning("Job disappeared before processing started");
            return;
        };

        logger.log_start(&job.source_url);
        let work_dir = self.config.job_dir(job_id);

        let outcome = AssertUnwindSafe(self.process(&job, &work_dir, &logger))
            .catch_unwind()
            .await;

        let error = match outcome {
            Ok(Ok(result)) => {
                let clips = result.video.clips.len();
                match self.registry.set_status(job_id, StatusUpdate::completed(result)) {
                    Ok(()) => {
                        metrics::record_job_completed();
                        logger.log_completion(&format!("{} clips selected", clips));
                        return;
                    }
                    Err(e) => e.to_string(),
                }
            }
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("Internal error: {}", panic_message(panic.as_ref())),
        };

        logger.log_error(&error);
        remove_dir_best_effort(&work_dir).await;
        if let Err(e) = self.registry.set_status(job_id, StatusUpdate::failed(error)) {
            logger.log_warning(&format!("Could not record failure: {}", e));
        }
        metrics::record_job_failed();
    }

    async fn process(
        &self,
        job: &Job,
        work_dir: &Path,
        logger: &JobLogger,
    ) -> WorkerResult<JobResult> {
        let url = job.source_url.as_str();

        // Acquisition
        let started = Instant::now();
        self.report(job, logger, DOWNLOAD_START, "Downloading video...");
        let metadata = self.acquirer.resolve_metadata(url).await?;
        let mut patch = JobPatch::new().title(metadata.title.clone());
        if let Some(duration) = metadata.duration {
            patch = patch.duration(duration);
        }
        if let Some(thumbnail) = &metadata.thumbnail {
            patch = patch.thumbnail(thumbnail.clone());
        }
        self.registry.merge_fields(&job.id, patch);

        tokio::fs::create_dir_all(work_dir).await?;
        let file_stem = sanitize_title(&metadata.title);
        let media_path = self
            .acquirer
            .fetch(url, work_dir, &file_stem, self.download_progress(&job.id))
            .await?;
        self.registry.merge_fields(
            &job.id,
            JobPatch::new().path(media_path.to_string_lossy().into_owned()),
        );
        metrics::record_stage_duration(stages::DOWNLOAD, started.elapsed().as_secs_f64());

        // Transcription
        let started = Instant::now();
        self.report(job, logger, TRANSCRIBE_PROGRESS, "Transcribing video...");
        let transcription = self.transcriber.transcribe(&media_path).await?;
        metrics::record_stage_duration(stages::TRANSCRIBE, started.elapsed().as_secs_f64());

        // Clip detection
        let started = Instant::now();
        self.report(job, logger, FIND_CLIPS_PROGRESS, "Finding clips...");
        let candidates = self.clip_finder.find_clips(&transcription).await?;
        metrics::record_stage_duration(stages::FIND_CLIPS, started.elapsed().as_secs_f64());

        let started = Instant::now();
        let text = reconstruct(&transcription.words);
        let video_id = generate_video_id();
        let created = Utc::now().timestamp();
        let clips = select_clips(&candidates, &text, job.max_clip_duration, &video_id, created);
        logger.log_progress(
            FIND_CLIPS_PROGRESS,
            &format!("{} of {} clips kept", clips.len(), candidates.len()),
        );
        metrics::record_clips_selected(clips.len());

        self.report(job, logger, FINALIZE_PROGRESS, "Finalizing...");
        let file_size = tokio::fs::metadata(&media_path).await?.len();
        let source = media_path.to_string_lossy().into_owned();

        let result = JobResult {
            video: VideoPayload {
                id: video_id.clone(),
                object: "video".to_string(),
                clips,
                created,
                metadata: VideoFileMetadata {
                    duration: metadata.duration.unwrap_or(0.0),
                    file_size,
                    mime_type: mime_type_for(&media_path),
                },
                source: source.clone(),
                status: "complete".to_string(),
                title: metadata.title,
            },
            transcript: TranscriptPayload {
                id: format!("{}-transcript", video_id),
                object: "transcript".to_string(),
                created,
                words: transcription.words,
                transcription: text,
            },
            temp_video_path: source,
            temp_dir: work_dir.to_string_lossy().into_owned(),
        };
        metrics::record_stage_duration(stages::FINALIZE, started.elapsed().as_secs_f64());

        Ok(result)
    }

    fn report(&self, job: &Job, logger: &JobLogger, progress: u8, message: &str) {
        logger.log_progress(progress, message);
        if let Err(e) = self
            .registry
            .set_status(&job.id, StatusUpdate::processing(progress, message))
        {
            logger.log_warning(&e.to_string());
        }
    }

    /// Callback merging download progress into the job.
    fn download_progress(&self, job_id: &JobId) -> FetchProgress {
        let registry = Arc::clone(&self.registry);
        let job_id = job_id.clone();
        Box::new(move |fraction| {
            let progress = scale_fraction(fraction, DOWNLOAD_START, DOWNLOAD_END);
            let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u32;
            registry.merge_fields(
                &job_id,
                JobPatch::new()
                    .progress(progress)
                    .message(format!("Downloading video... {}%", percent)),
            );
        })
    }
}

/// `youtube-` followed by 16 random hex characters.
pub fn generate_video_id() -> String {
    format!("youtube-{:016x}", rand::random::<u64>())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "job task panicked".to_string()
    }
}
