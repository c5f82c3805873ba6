//! Job processor lifecycle integration tests.
//!
//! These tests drive complete cycles through the processor with mock adapters:
//! receive -> fetch -> transform -> store -> notify -> acknowledge

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use mediaconv_core::notify::UpstreamConfig;

use mediaconv_core::{
    testing::{
        fixtures, CallLog, FixedClock, MockChannel, MockConverter, MockJobQueue, MockObjectStore,
    },
    BroadcastChannel, Converter, ConverterConfig, ConverterError, FailurePolicy, ImageConverter,
    JobOutcome, JobProcessor, JobQueue, NotificationSink, NotifyError, ObjectStore, PoisonPolicy,
    ProcessorConfig, ProcessorError, QueueError, StorageError, UpstreamChannel,
};

const NOW: i64 = 1_700_000_000_000;

/// Test helper holding the mocks behind one processor.
struct TestHarness {
    queue: Arc<MockJobQueue>,
    store: Arc<MockObjectStore>,
    converter: Arc<MockConverter>,
    channel: Arc<MockChannel>,
    clock: Arc<FixedClock>,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            queue: Arc::new(MockJobQueue::new()),
            store: Arc::new(MockObjectStore::with_location("mybucket", "us-east-1")),
            converter: Arc::new(MockConverter::new()),
            channel: Arc::new(MockChannel::new("mock")),
            clock: Arc::new(FixedClock::new(NOW)),
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Harness whose mocks all record into one call sequence.
    fn with_call_log(log: &CallLog) -> Self {
        Self {
            queue: Arc::new(MockJobQueue::new().with_call_log(log.clone())),
            store: Arc::new(
                MockObjectStore::with_location("mybucket", "us-east-1")
                    .with_call_log(log.clone()),
            ),
            converter: Arc::new(MockConverter::new().with_call_log(log.clone())),
            channel: Arc::new(MockChannel::new("mock").with_call_log(log.clone())),
            ..Self::new()
        }
    }

    fn staging_root(&self) -> PathBuf {
        self.temp_dir.path().join("staging")
    }

    fn config(&self) -> ProcessorConfig {
        ProcessorConfig::default()
            .with_wait_time(0)
            .with_temp_dir(self.staging_root())
    }

    fn processor(&self) -> JobProcessor {
        self.processor_with(self.config())
    }

    fn processor_with(&self, config: ProcessorConfig) -> JobProcessor {
        self.processor_with_converter(config, Arc::clone(&self.converter) as Arc<dyn Converter>)
    }

    fn processor_with_converter(
        &self,
        config: ProcessorConfig,
        converter: Arc<dyn Converter>,
    ) -> JobProcessor {
        let sink = NotificationSink::new().with_channel(Arc::clone(&self.channel) as _);
        JobProcessor::new(
            config,
            Arc::clone(&self.queue) as Arc<dyn JobQueue>,
            Arc::clone(&self.store) as Arc<dyn ObjectStore>,
            converter,
            sink,
        )
        .with_clock(Arc::clone(&self.clock) as _)
    }

    /// Number of entries left under the staging root.
    fn staging_entries(&self) -> usize {
        match std::fs::read_dir(self.staging_root()) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }
}

#[tokio::test]
async fn test_successful_conversion_end_to_end() {
    let h = TestHarness::new();
    h.store
        .put_object("alice/photo.bmp", fixtures::bmp_bytes(8, 8))
        .await;
    let receipt = h
        .queue
        .push_body(fixtures::job_body("alice", "photo.bmp", "png"))
        .await;

    let processor = h.processor();
    let report = processor.run_one_cycle().await.unwrap();

    assert_eq!(report.received, 1);
    assert_eq!(report.completed, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.acknowledged, 1);

    // Exactly one fetch against the derived input key
    assert_eq!(h.store.fetched_keys().await, vec!["alice/photo.bmp".to_string()]);

    // Exactly one store under the owner's namespace
    let stored = h.store.stored_objects().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].key, "alice/converted-1700000000000.png");
    assert_eq!(stored[0].content_type, "image/png");

    // Exactly one completed event with the S3 locator
    let events = h.channel.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, JobOutcome::Completed);
    assert_eq!(events[0].username, "alice");
    assert_eq!(events[0].file_name, "photo.bmp");
    assert_eq!(
        events[0].output_file.as_deref(),
        Some("converted-1700000000000.png")
    );
    assert_eq!(
        events[0].url.as_deref(),
        Some("https://mybucket.s3.us-east-1.amazonaws.com/alice/converted-1700000000000.png")
    );
    assert_eq!(events[0].message, "File conversion completed");

    // Exactly one acknowledgement
    assert_eq!(h.queue.acknowledged().await, vec![receipt]);

    let attempt = &report.attempts[0];
    assert_eq!(attempt.message_id.as_deref(), Some("msg-1"));
    assert_eq!(
        attempt.output_key.as_deref(),
        Some("alice/converted-1700000000000.png")
    );
    assert!(attempt.error.is_none());

    let status = processor.status().await;
    assert_eq!(status.cycles, 1);
    assert_eq!(status.jobs_completed, 1);
    assert_eq!(status.messages_acknowledged, 1);
}

#[tokio::test]
async fn test_real_image_converter_produces_png() {
    let h = TestHarness::new();
    h.store
        .put_object("alice/photo.bmp", fixtures::bmp_bytes(16, 9))
        .await;
    h.queue
        .push_body(fixtures::job_body("alice", "photo.bmp", "png"))
        .await;

    let converter = Arc::new(ImageConverter::new(ConverterConfig::default()));
    let processor = h.processor_with_converter(h.config(), converter);
    let report = processor.run_one_cycle().await.unwrap();
    assert_eq!(report.completed, 1);

    let bytes = h
        .store
        .object("alice/converted-1700000000000.png")
        .await
        .expect("converted object stored");
    let decoded = image::load_from_memory(&bytes).expect("valid image");
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
    assert_eq!((decoded.width(), decoded.height()), (16, 9));
    assert_eq!(h.staging_entries(), 0);
}

#[tokio::test]
async fn test_missing_source_fails_and_retains_message() {
    let h = TestHarness::new();
    h.queue
        .push_body(fixtures::job_body("alice", "missing.bmp", "png"))
        .await;

    let processor = h.processor();
    let report = processor.run_one_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.acknowledged, 0);
    assert_eq!(h.store.fetched_keys().await, vec!["alice/missing.bmp".to_string()]);
    assert!(h.store.stored_objects().await.is_empty());
    assert_eq!(h.converter.conversion_count().await, 0);

    let events = h.channel.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, JobOutcome::Failed);
    assert!(events[0].url.is_none());
    assert!(events[0].output_file.is_none());
    assert!(events[0].message.starts_with("File conversion failed:"));
    assert!(events[0].message.contains("alice/missing.bmp"));

    // Default policy leaves the message for redelivery
    assert!(h.queue.acknowledged().await.is_empty());

    let status = processor.status().await;
    assert_eq!(status.jobs_failed, 1);
    assert!(status.last_error.unwrap().contains("alice/missing.bmp"));
}

#[tokio::test]
async fn test_missing_source_acknowledged_under_acknowledge_policy() {
    let h = TestHarness::new();
    let receipt = h
        .queue
        .push_body(fixtures::job_body("alice", "missing.bmp", "png"))
        .await;

    let processor =
        h.processor_with(h.config().with_failure_policy(FailurePolicy::Acknowledge));
    let report = processor.run_one_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.acknowledged, 1);
    assert_eq!(h.queue.acknowledged().await, vec![receipt]);
    assert_eq!(h.channel.events().await.len(), 1);
}

#[tokio::test]
async fn test_transform_failure_publishes_failed_event() {
    let h = TestHarness::new();
    h.store.put_object("bob/clip.bmp", b"bytes".to_vec()).await;
    h.queue
        .push_body(fixtures::job_body("bob", "clip.bmp", "xyz"))
        .await;

    let report = h.processor().run_one_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert!(h.store.stored_objects().await.is_empty());
    let events = h.channel.events().await;
    assert_eq!(events[0].outcome, JobOutcome::Failed);
    assert!(events[0].message.contains("xyz"));
    assert_eq!(events[0].username, "bob");
    assert!(h.queue.acknowledged().await.is_empty());
}

#[tokio::test]
async fn test_corrupt_input_reported() {
    let h = TestHarness::new();
    h.store.put_object("bob/clip.bmp", b"bytes".to_vec()).await;
    h.queue
        .push_body(fixtures::job_body("bob", "clip.bmp", "png"))
        .await;
    h.converter
        .set_next_error(ConverterError::corrupt_input("truncated header"))
        .await;

    let report = h.processor().run_one_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert!(report.attempts[0]
        .error
        .as_deref()
        .unwrap()
        .contains("truncated header"));
}

#[tokio::test]
async fn test_store_failure_publishes_failed_event() {
    let h = TestHarness::new();
    h.store
        .put_object("alice/photo.bmp", fixtures::bmp_bytes(4, 4))
        .await;
    h.queue
        .push_body(fixtures::job_body("alice", "photo.bmp", "png"))
        .await;
    h.store
        .set_next_store_error(StorageError::store_failed(
            "alice/converted-1700000000000.png",
            "access denied",
        ))
        .await;

    let report = h.processor().run_one_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert!(h.store.stored_objects().await.is_empty());
    let events = h.channel.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, JobOutcome::Failed);
    assert!(events[0].url.is_none());
    assert!(h.queue.acknowledged().await.is_empty());
    assert_eq!(h.staging_entries(), 0);
}

#[tokio::test]
async fn test_empty_poll_is_idle() {
    let h = TestHarness::new();

    let processor = h.processor();
    let report = processor.run_one_cycle().await.unwrap();

    assert!(report.is_idle());
    assert!(h.store.fetched_keys().await.is_empty());
    assert!(h.store.stored_objects().await.is_empty());
    assert_eq!(h.channel.attempts().await, 0);
    assert!(h.queue.acknowledged().await.is_empty());

    let status = processor.status().await;
    assert_eq!(status.cycles, 1);
    assert_eq!(status.idle_cycles, 1);
}

#[tokio::test]
async fn test_receive_error_aborts_cycle() {
    let h = TestHarness::new();
    h.queue
        .set_next_receive_error(QueueError::receive("throttled"))
        .await;

    let processor = h.processor();
    let err = processor.run_one_cycle().await.unwrap_err();
    assert!(matches!(err, ProcessorError::QueueReceive(_)));
    assert_eq!(h.channel.attempts().await, 0);

    let status = processor.status().await;
    assert_eq!(status.receive_errors, 1);
    assert!(status.last_error.unwrap().contains("throttled"));

    // The next cycle works again
    assert!(processor.run_one_cycle().await.unwrap().is_idle());
}

#[tokio::test]
async fn test_receive_parameters_are_clamped() {
    let h = TestHarness::new();
    let config = h.config().with_max_messages(50).with_wait_time(99);
    h.processor_with(config).run_one_cycle().await.unwrap();

    let calls = h.queue.receive_calls().await;
    assert_eq!(calls[0].max_messages, 10);
    assert_eq!(calls[0].wait_time_seconds, 20);
}

#[tokio::test]
async fn test_poison_message_discarded_by_default() {
    let h = TestHarness::new();
    let receipt = h.queue.push_body(r#"{"username": "alice", "format": "png"}"#).await;

    let processor = h.processor();
    let report = processor.run_one_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(h.queue.acknowledged().await, vec![receipt]);
    assert!(h.store.fetched_keys().await.is_empty());

    let events = h.channel.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, JobOutcome::Failed);
    assert_eq!(events[0].username, "alice");
    assert_eq!(events[0].file_name, "");
    assert!(events[0].message.contains("invalid job message"));
}

#[tokio::test]
async fn test_poison_message_retained_when_configured() {
    let h = TestHarness::new();
    h.queue.push_body("not json at all").await;

    let processor = h.processor_with(h.config().with_poison_policy(PoisonPolicy::Retain));
    let report = processor.run_one_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.acknowledged, 0);
    assert!(h.queue.acknowledged().await.is_empty());
    assert_eq!(h.channel.events().await.len(), 1);
}

/// Log lines written while a test holds the returned guard.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn install(&self) -> tracing::subscriber::DefaultGuard {
        let logs = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_poison_log_matches_policy() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();

    let h = TestHarness::new();
    h.queue.push_body("not json at all").await;
    h.processor_with(h.config().with_poison_policy(PoisonPolicy::Retain))
        .run_one_cycle()
        .await
        .unwrap();

    let retained = logs.text();
    assert!(retained.contains("Retaining unreadable job message"), "{}", retained);
    assert!(!retained.contains("Discarding"), "{}", retained);

    h.queue.push_body("still not json").await;
    h.processor_with(h.config().with_poison_policy(PoisonPolicy::Discard))
        .run_one_cycle()
        .await
        .unwrap();

    assert!(logs.text().contains("Discarding unreadable job message"));
}

#[tokio::test]
async fn test_reprocessing_yields_distinct_output_keys() {
    let h = TestHarness::new();
    h.store
        .put_object("alice/photo.bmp", fixtures::bmp_bytes(4, 4))
        .await;
    let body = fixtures::job_body("alice", "photo.bmp", "webp");
    h.queue.push_body(body.clone()).await;

    let processor = h.processor();
    processor.run_one_cycle().await.unwrap();

    h.clock.advance(1);
    h.queue.push_body(body).await;
    processor.run_one_cycle().await.unwrap();

    let keys: Vec<String> = h
        .store
        .stored_objects()
        .await
        .into_iter()
        .map(|o| o.key)
        .collect();
    assert_eq!(
        keys,
        vec![
            "alice/converted-1700000000000.webp".to_string(),
            "alice/converted-1700000000001.webp".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_explicit_input_key_is_used() {
    let h = TestHarness::new();
    h.store
        .put_object("uploads/2024/raw.bmp", fixtures::bmp_bytes(4, 4))
        .await;
    h.queue
        .push_body(fixtures::job_body_with_key(
            "alice",
            "raw.bmp",
            "png",
            "uploads/2024/raw.bmp",
        ))
        .await;

    let report = h.processor().run_one_cycle().await.unwrap();

    assert_eq!(report.completed, 1);
    assert_eq!(
        h.store.fetched_keys().await,
        vec!["uploads/2024/raw.bmp".to_string()]
    );
    // Output still lands under the owner
    assert_eq!(
        h.store.stored_objects().await[0].key,
        "alice/converted-1700000000000.png"
    );
}

#[tokio::test]
async fn test_batch_processes_every_message() {
    let h = TestHarness::new();
    h.store
        .put_object("alice/a.bmp", fixtures::bmp_bytes(4, 4))
        .await;
    h.queue
        .push_body(fixtures::job_body("alice", "a.bmp", "png"))
        .await;
    h.queue
        .push_body(fixtures::job_body("alice", "missing.bmp", "png"))
        .await;
    h.queue.push_body("{}").await;

    let report = h
        .processor_with(h.config().with_max_messages(3))
        .run_one_cycle()
        .await
        .unwrap();

    assert_eq!(report.received, 3);
    assert_eq!(report.completed, 1);
    assert_eq!(report.failed, 2);
    // Success plus the discarded poison message
    assert_eq!(report.acknowledged, 2);
    assert_eq!(h.channel.events().await.len(), 3);
}

#[tokio::test]
async fn test_acknowledge_failure_does_not_fail_job() {
    let h = TestHarness::new();
    h.store
        .put_object("alice/photo.bmp", fixtures::bmp_bytes(4, 4))
        .await;
    h.queue
        .push_body(fixtures::job_body("alice", "photo.bmp", "png"))
        .await;
    h.queue
        .set_next_ack_error(QueueError::acknowledge("receipt expired"))
        .await;

    let processor = h.processor();
    let report = processor.run_one_cycle().await.unwrap();

    assert_eq!(report.completed, 1);
    assert_eq!(report.acknowledged, 0);
    assert_eq!(h.channel.events().await[0].outcome, JobOutcome::Completed);

    let status = processor.status().await;
    assert_eq!(status.acknowledge_failures, 1);
    assert_eq!(status.messages_acknowledged, 0);
}

#[tokio::test]
async fn test_failing_channel_does_not_block_others() {
    let h = TestHarness::new();
    h.store
        .put_object("alice/photo.bmp", fixtures::bmp_bytes(4, 4))
        .await;
    h.queue
        .push_body(fixtures::job_body("alice", "photo.bmp", "png"))
        .await;

    let broken = Arc::new(MockChannel::new("upstream"));
    broken
        .set_next_error(NotifyError::Rejected { status: 503 })
        .await;
    let live = BroadcastChannel::new(8);
    let mut subscriber = live.subscribe();

    let sink = NotificationSink::new()
        .with_channel(Arc::clone(&broken) as _)
        .with_channel(Arc::new(live) as _)
        .with_channel(Arc::clone(&h.channel) as _);
    let processor = JobProcessor::new(
        h.config(),
        Arc::clone(&h.queue) as _,
        Arc::clone(&h.store) as _,
        Arc::clone(&h.converter) as _,
        sink,
    )
    .with_clock(Arc::clone(&h.clock) as _);

    let report = processor.run_one_cycle().await.unwrap();

    assert_eq!(report.completed, 1);
    assert_eq!(report.acknowledged, 1);
    assert_eq!(broken.attempts().await, 1);
    assert!(broken.events().await.is_empty());
    assert_eq!(h.channel.events().await.len(), 1);

    let payload = subscriber.try_recv().unwrap();
    assert_eq!(payload.message, "File conversion completed");
    assert_eq!(payload.file, "converted-1700000000000.png");
    assert_eq!(
        payload.url.as_deref(),
        Some("https://mybucket.s3.us-east-1.amazonaws.com/alice/converted-1700000000000.png")
    );
}

#[tokio::test]
async fn test_processor_without_channels() {
    let h = TestHarness::new();
    h.store
        .put_object("alice/photo.bmp", fixtures::bmp_bytes(4, 4))
        .await;
    h.queue
        .push_body(fixtures::job_body("alice", "photo.bmp", "png"))
        .await;

    let processor = JobProcessor::new(
        h.config(),
        Arc::clone(&h.queue) as _,
        Arc::clone(&h.store) as _,
        Arc::clone(&h.converter) as _,
        NotificationSink::new(),
    );

    let report = processor.run_one_cycle().await.unwrap();
    assert_eq!(report.completed, 1);
    assert_eq!(report.acknowledged, 1);
}

#[tokio::test]
async fn test_job_timeout_fails_attempt_and_cleans_up() {
    let h = TestHarness::new();
    h.store
        .put_object("alice/photo.bmp", fixtures::bmp_bytes(4, 4))
        .await;
    h.queue
        .push_body(fixtures::job_body("alice", "photo.bmp", "png"))
        .await;
    h.converter
        .set_conversion_delay(Duration::from_secs(5))
        .await;

    let processor = h.processor_with(h.config().with_job_timeout(1));
    let report = processor.run_one_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert!(report.attempts[0]
        .error
        .as_deref()
        .unwrap()
        .contains("timed out"));
    assert!(h.store.stored_objects().await.is_empty());
    assert_eq!(h.channel.events().await[0].outcome, JobOutcome::Failed);
    assert_eq!(h.staging_entries(), 0);
}

#[tokio::test]
async fn test_staging_directories_removed_after_each_cycle() {
    let h = TestHarness::new();
    h.store
        .put_object("alice/photo.bmp", fixtures::bmp_bytes(4, 4))
        .await;
    h.queue
        .push_body(fixtures::job_body("alice", "photo.bmp", "png"))
        .await;
    h.queue
        .push_body(fixtures::job_body("alice", "photo.bmp", "xyz"))
        .await;

    let processor = h.processor();
    processor.run_one_cycle().await.unwrap();
    assert_eq!(h.staging_entries(), 0);
    processor.run_one_cycle().await.unwrap();
    assert_eq!(h.staging_entries(), 0);

    // The converter saw a staged input inside a per-attempt directory
    let conversions = h.converter.recorded_conversions().await;
    assert_eq!(conversions.len(), 2);
    assert!(conversions.iter().all(|c| c.input_existed));
    assert!(conversions[0].job.input_path.starts_with(h.staging_root()));
    assert_eq!(
        conversions[0].job.input_path.file_name().unwrap(),
        "input.bmp"
    );
    assert_ne!(
        conversions[0].job.input_path.parent(),
        conversions[1].job.input_path.parent()
    );
    assert!(!conversions[0].job.input_path.exists());
}

#[tokio::test]
async fn test_success_calls_adapters_in_order() {
    let log = CallLog::new();
    let h = TestHarness::with_call_log(&log);
    h.store
        .put_object("alice/photo.bmp", fixtures::bmp_bytes(4, 4))
        .await;
    h.queue
        .push_body(fixtures::job_body("alice", "photo.bmp", "png"))
        .await;

    h.processor().run_one_cycle().await.unwrap();

    assert_eq!(
        log.entries().await,
        vec!["fetch", "convert", "store", "notify", "ack"]
    );
}

#[tokio::test]
async fn test_fetch_failure_notifies_without_ack_when_retained() {
    let log = CallLog::new();
    let h = TestHarness::with_call_log(&log);
    h.queue
        .push_body(fixtures::job_body("alice", "missing.bmp", "png"))
        .await;

    let processor = h.processor_with(h.config().with_failure_policy(FailurePolicy::Retain));
    processor.run_one_cycle().await.unwrap();

    assert_eq!(log.entries().await, vec!["fetch", "notify"]);
}

#[tokio::test]
async fn test_store_failure_still_notifies_then_acknowledges() {
    let log = CallLog::new();
    let h = TestHarness::with_call_log(&log);
    h.store
        .put_object("alice/photo.bmp", fixtures::bmp_bytes(4, 4))
        .await;
    h.store
        .set_next_store_error(StorageError::store_failed("alice/x.png", "denied"))
        .await;
    h.queue
        .push_body(fixtures::job_body("alice", "photo.bmp", "png"))
        .await;

    let processor =
        h.processor_with(h.config().with_failure_policy(FailurePolicy::Acknowledge));
    processor.run_one_cycle().await.unwrap();

    assert_eq!(
        log.entries().await,
        vec!["fetch", "convert", "store", "notify", "ack"]
    );
    assert_eq!(h.channel.events().await[0].outcome, JobOutcome::Failed);
}

#[tokio::test]
async fn test_slow_upstream_does_not_delay_acknowledgement() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/update-status"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let h = TestHarness::new();
    h.store
        .put_object("alice/photo.bmp", fixtures::bmp_bytes(4, 4))
        .await;
    let receipt = h
        .queue
        .push_body(fixtures::job_body("alice", "photo.bmp", "png"))
        .await;

    let upstream = UpstreamChannel::new(&UpstreamConfig::new(server.uri())).unwrap();
    let processor = JobProcessor::new(
        h.config(),
        Arc::clone(&h.queue) as Arc<dyn JobQueue>,
        Arc::clone(&h.store) as Arc<dyn ObjectStore>,
        Arc::clone(&h.converter) as Arc<dyn Converter>,
        NotificationSink::new().with_channel(Arc::new(upstream)),
    )
    .with_clock(Arc::clone(&h.clock) as _);

    let started = std::time::Instant::now();
    let report = processor.run_one_cycle().await.unwrap();

    assert!(
        started.elapsed() < Duration::from_secs(1),
        "cycle waited on upstream: {:?}",
        started.elapsed()
    );
    assert_eq!(report.completed, 1);
    assert_eq!(h.queue.acknowledged().await, vec![receipt]);

    // The status still reaches the coordinator in the background
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    loop {
        let received = server.received_requests().await.unwrap_or_default();
        if !received.is_empty() {
            let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
            assert_eq!(body["status"], "completed");
            assert_eq!(body["fileName"], "photo.bmp");
            break;
        }
        assert!(std::time::Instant::now() < deadline, "upstream never called");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn test_body_read_error_reported_as_fetch_failure() {
    let h = TestHarness::new();
    h.store
        .put_broken_object("alice/photo.bmp", fixtures::bmp_bytes(4, 4))
        .await;
    h.queue
        .push_body(fixtures::job_body("alice", "photo.bmp", "png"))
        .await;

    let report = h.processor().run_one_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(h.converter.conversion_count().await, 0);
    let error = report.attempts[0].error.as_deref().unwrap();
    assert!(error.contains("failed to fetch alice/photo.bmp"), "{}", error);
    assert!(error.contains("connection reset"), "{}", error);

    let events = h.channel.events().await;
    assert_eq!(events[0].outcome, JobOutcome::Failed);
    assert!(events[0].message.contains("failed to fetch"));
    assert_eq!(h.staging_entries(), 0);
}
