//! Job processor implementation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::converter::{ConversionJob, Converter};
use crate::job::{Job, JobParseError};
use crate::metrics::{
    ACKNOWLEDGEMENTS_TOTAL, CONVERSION_DURATION, CYCLES_TOTAL, JOBS_TOTAL, JOB_DURATION,
    JOB_FAILURES_TOTAL,
};
use crate::notify::{JobOutcome, NotificationSink, StatusEvent};
use crate::queue::{JobQueue, QueueMessage};
use crate::storage::{ObjectReader, ObjectStore, StorageError};

use super::clock::{Clock, SystemClock};
use super::config::{FailurePolicy, PoisonPolicy, ProcessorConfig};
use super::error::{JobError, ProcessorError};
use super::types::{AttemptReport, CycleReport, ProcessorStatus};

/// Running counters behind [`ProcessorStatus`].
#[derive(Default)]
struct ProcessorStats {
    cycles: AtomicU64,
    idle_cycles: AtomicU64,
    receive_errors: AtomicU64,
    jobs_completed: AtomicU64,
    jobs_failed: AtomicU64,
    messages_acknowledged: AtomicU64,
    acknowledge_failures: AtomicU64,
    last_error: RwLock<Option<String>>,
}

impl ProcessorStats {
    async fn to_status(&self) -> ProcessorStatus {
        ProcessorStatus {
            cycles: self.cycles.load(Ordering::Relaxed),
            idle_cycles: self.idle_cycles.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
            jobs_completed: self.jobs_completed.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
            messages_acknowledged: self.messages_acknowledged.load(Ordering::Relaxed),
            acknowledge_failures: self.acknowledge_failures.load(Ordering::Relaxed),
            last_error: self.last_error.read().await.clone(),
        }
    }

    async fn set_last_error(&self, error: String) {
        *self.last_error.write().await = Some(error);
    }
}

/// Result of a successful fetch → transform → store.
struct StoredOutput {
    output_file: String,
    output_key: String,
    url: String,
}

/// Processes queue messages into converted objects and status events.
pub struct JobProcessor {
    config: ProcessorConfig,
    queue: Arc<dyn JobQueue>,
    store: Arc<dyn ObjectStore>,
    converter: Arc<dyn Converter>,
    sink: NotificationSink,
    clock: Arc<dyn Clock>,
    stats: ProcessorStats,
}

impl JobProcessor {
    /// Creates a processor using the wall clock for output names.
    pub fn new(
        config: ProcessorConfig,
        queue: Arc<dyn JobQueue>,
        store: Arc<dyn ObjectStore>,
        converter: Arc<dyn Converter>,
        sink: NotificationSink,
    ) -> Self {
        Self {
            config,
            queue,
            store,
            converter,
            sink,
            clock: Arc::new(SystemClock),
            stats: ProcessorStats::default(),
        }
    }

    /// Replaces the clock used for output file names.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Names of the channels status events are published to.
    pub fn channel_names(&self) -> Vec<String> {
        self.sink.channel_names()
    }

    /// Returns statistics accumulated since startup.
    pub async fn status(&self) -> ProcessorStatus {
        self.stats.to_status().await
    }

    /// Runs one receive and handles every message it returned.
    ///
    /// Only a failed receive is returned as an error; failures of individual
    /// jobs are reported through status events and the returned report.
    pub async fn run_one_cycle(&self) -> Result<CycleReport, ProcessorError> {
        self.stats.cycles.fetch_add(1, Ordering::Relaxed);

        let messages = match self
            .queue
            .receive(
                self.config.effective_max_messages(),
                self.config.effective_wait_time_seconds(),
            )
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                self.stats.receive_errors.fetch_add(1, Ordering::Relaxed);
                self.stats.set_last_error(e.to_string()).await;
                CYCLES_TOTAL.with_label_values(&["receive_error"]).inc();
                return Err(ProcessorError::QueueReceive(e));
            }
        };

        if messages.is_empty() {
            debug!(queue = %self.queue.name(), "No messages received");
            self.stats.idle_cycles.fetch_add(1, Ordering::Relaxed);
            CYCLES_TOTAL.with_label_values(&["idle"]).inc();
            return Ok(CycleReport::idle());
        }

        CYCLES_TOTAL.with_label_values(&["processed"]).inc();
        let mut report = CycleReport {
            received: messages.len(),
            ..Default::default()
        };
        for message in &messages {
            let attempt = self.handle_message(message).await;
            report.record(attempt);
        }

        info!(
            received = report.received,
            completed = report.completed,
            failed = report.failed,
            "Cycle finished"
        );
        Ok(report)
    }

    /// Handles one message from parse to acknowledgement.
    async fn handle_message(&self, message: &QueueMessage) -> AttemptReport {
        let started = Instant::now();

        let job = match Job::parse(&message.body) {
            Ok(job) => job,
            Err(e) => return self.handle_poison(message, e, started).await,
        };

        debug!(
            message_id = %message.log_id(),
            username = %job.username,
            file = %job.file_name,
            format = %job.format,
            "Processing job"
        );

        let result = match self.config.job_timeout_secs {
            Some(timeout_secs) => {
                match tokio::time::timeout(
                    Duration::from_secs(timeout_secs),
                    self.execute(&job, message),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(JobError::Timeout { timeout_secs }),
                }
            }
            None => self.execute(&job, message).await,
        };

        match result {
            Ok(output) => self.complete(message, &job, output, started).await,
            Err(e) => self.fail(message, &job, e, started).await,
        }
    }

    /// Fetch, transform and store one job inside its own staging directory.
    ///
    /// The staging directory is removed when this future completes or is
    /// dropped.
    async fn execute(&self, job: &Job, message: &QueueMessage) -> Result<StoredOutput, JobError> {
        let timestamp = self.clock.now_millis();
        let input_key = job.input_key();
        let output_file = job.output_file_name(timestamp);
        let output_key = job.output_key(timestamp);

        tokio::fs::create_dir_all(&self.config.temp_dir).await?;
        let staging = tempfile::Builder::new()
            .prefix("job-")
            .tempdir_in(&self.config.temp_dir)?;

        let input_path = staging.path().join(staged_input_name(job));

        let mut reader = self
            .store
            .fetch(&input_key)
            .await
            .map_err(|source| JobError::Fetch {
                key: input_key.clone(),
                source,
            })?;
        let staged_bytes = stage_body(&mut reader, &input_path, &input_key).await?;

        debug!(
            input_key = %input_key,
            bytes = staged_bytes,
            "Staged source object"
        );

        let conversion = ConversionJob {
            job_id: message.log_id().to_string(),
            input_path,
            output_path: staging.path().join(&output_file),
            format: job.format.clone(),
        };
        let result = self.converter.convert(conversion).await?;
        CONVERSION_DURATION
            .with_label_values(&[result.output_format.as_str()])
            .observe(result.duration_ms as f64 / 1000.0);

        self.store
            .store(&output_key, &result.output_path, &result.content_type)
            .await
            .map_err(|source| JobError::Store {
                key: output_key.clone(),
                source,
            })?;

        debug!(
            output_key = %output_key,
            bytes = result.output_size_bytes,
            content_type = %result.content_type,
            "Stored converted object"
        );

        let url = self.store.public_url(&output_key);
        Ok(StoredOutput {
            output_file,
            output_key,
            url,
        })
    }

    async fn complete(
        &self,
        message: &QueueMessage,
        job: &Job,
        output: StoredOutput,
        started: Instant,
    ) -> AttemptReport {
        info!(
            message_id = %message.log_id(),
            input_key = %job.input_key(),
            output_key = %output.output_key,
            "Conversion completed"
        );

        let event = StatusEvent::completed(job, output.output_file.clone(), output.url.clone());
        self.sink.publish(&event).await;

        let acknowledged = self.acknowledge(message).await;

        self.stats.jobs_completed.fetch_add(1, Ordering::Relaxed);
        JOBS_TOTAL.with_label_values(&["completed"]).inc();
        JOB_DURATION
            .with_label_values(&["completed"])
            .observe(started.elapsed().as_secs_f64());

        AttemptReport {
            message_id: message.message_id.clone(),
            username: job.username.clone(),
            file_name: job.file_name.clone(),
            outcome: JobOutcome::Completed,
            output_key: Some(output.output_key),
            url: Some(output.url),
            error: None,
            acknowledged,
        }
    }

    async fn fail(
        &self,
        message: &QueueMessage,
        job: &Job,
        err: JobError,
        started: Instant,
    ) -> AttemptReport {
        match &err {
            JobError::Stage(_) => error!(
                message_id = %message.log_id(),
                input_key = %job.input_key(),
                stage = err.stage(),
                "Job failed: {}",
                err
            ),
            _ => warn!(
                message_id = %message.log_id(),
                input_key = %job.input_key(),
                stage = err.stage(),
                "Job failed: {}",
                err
            ),
        }

        let event = StatusEvent::failed(&job.username, &job.file_name, &err);
        self.sink.publish(&event).await;

        let acknowledged = match self.config.failure_policy {
            FailurePolicy::Acknowledge => self.acknowledge(message).await,
            FailurePolicy::Retain => {
                debug!(
                    message_id = %message.log_id(),
                    receive_count = message.receive_count,
                    "Retaining failed message for redelivery"
                );
                ACKNOWLEDGEMENTS_TOTAL.with_label_values(&["retained"]).inc();
                false
            }
        };

        self.record_failure(&err, started).await;

        AttemptReport {
            message_id: message.message_id.clone(),
            username: job.username.clone(),
            file_name: job.file_name.clone(),
            outcome: JobOutcome::Failed,
            output_key: None,
            url: None,
            error: Some(err.to_string()),
            acknowledged,
        }
    }

    /// A message whose body is not a job.
    async fn handle_poison(
        &self,
        message: &QueueMessage,
        parse_error: JobParseError,
        started: Instant,
    ) -> AttemptReport {
        let err = JobError::MessageParse(parse_error);
        let (username, file_name) = identity_hint(&message.body);

        let event = StatusEvent::failed(&username, &file_name, &err);
        self.sink.publish(&event).await;

        let acknowledged = match self.config.poison_policy {
            PoisonPolicy::Discard => {
                warn!(
                    message_id = %message.log_id(),
                    receive_count = message.receive_count,
                    "Discarding unreadable job message: {}",
                    err
                );
                self.acknowledge(message).await
            }
            PoisonPolicy::Retain => {
                warn!(
                    message_id = %message.log_id(),
                    receive_count = message.receive_count,
                    "Retaining unreadable job message for redelivery: {}",
                    err
                );
                ACKNOWLEDGEMENTS_TOTAL.with_label_values(&["retained"]).inc();
                false
            }
        };

        self.record_failure(&err, started).await;

        AttemptReport {
            message_id: message.message_id.clone(),
            username,
            file_name,
            outcome: JobOutcome::Failed,
            output_key: None,
            url: None,
            error: Some(err.to_string()),
            acknowledged,
        }
    }

    async fn record_failure(&self, err: &JobError, started: Instant) {
        self.stats.jobs_failed.fetch_add(1, Ordering::Relaxed);
        self.stats.set_last_error(err.to_string()).await;
        JOBS_TOTAL.with_label_values(&["failed"]).inc();
        JOB_FAILURES_TOTAL.with_label_values(&[err.stage()]).inc();
        JOB_DURATION
            .with_label_values(&["failed"])
            .observe(started.elapsed().as_secs_f64());
    }

    /// Deletes the message. Failures are logged and reported as `false`.
    async fn acknowledge(&self, message: &QueueMessage) -> bool {
        match self.queue.acknowledge(&message.receipt).await {
            Ok(()) => {
                debug!(message_id = %message.log_id(), "Message acknowledged");
                self.stats
                    .messages_acknowledged
                    .fetch_add(1, Ordering::Relaxed);
                ACKNOWLEDGEMENTS_TOTAL
                    .with_label_values(&["acknowledged"])
                    .inc();
                true
            }
            Err(e) => {
                warn!(message_id = %message.log_id(), "Failed to acknowledge message: {}", e);
                self.stats
                    .acknowledge_failures
                    .fetch_add(1, Ordering::Relaxed);
                ACKNOWLEDGEMENTS_TOTAL.with_label_values(&["failed"]).inc();
                false
            }
        }
    }
}

/// Owner and file name from a body that failed to parse, where readable.
fn identity_hint(body: &str) -> (String, String) {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return (String::new(), String::new()),
    };
    let field = |name: &str| {
        value
            .get(name)
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };
    (field("username"), field("fileName"))
}

/// Copies a fetched body to `path`.
///
/// Errors reading the body count against the fetch; errors writing the
/// staged file count against staging.
async fn stage_body(reader: &mut ObjectReader, path: &Path, key: &str) -> Result<u64, JobError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut buf = vec![0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).await.map_err(|e| JobError::Fetch {
            key: key.to_string(),
            source: StorageError::fetch_failed(key, e.to_string()),
        })?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).await?;
        total += n as u64;
    }
    file.flush().await?;
    Ok(total)
}

/// File name of the staged source, keeping its extension for format sniffing.
fn staged_input_name(job: &Job) -> PathBuf {
    match job.input_extension() {
        Some(ext) => PathBuf::from(format!("input.{}", ext)),
        None => PathBuf::from("input"),
    }
}
