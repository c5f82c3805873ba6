pub mod aws;
pub mod config;
pub mod converter;
pub mod job;
pub mod metrics;
pub mod notify;
pub mod poller;
pub mod processor;
pub mod queue;
pub mod storage;
pub mod testing;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, load_config_or_env,
    validate_config, AwsConfig, Config, ConfigError, SanitizedConfig, ServerConfig,
};
pub use converter::{
    ConversionJob, ConversionResult, Converter, ConverterConfig, ConverterError, ImageConverter,
};
pub use job::{Job, JobParseError};
pub use notify::{
    BroadcastChannel, BroadcastPayload, JobOutcome, NotificationChannel, NotificationSink,
    NotifierConfig, NotifyError, StatusEvent, UpstreamChannel,
};
pub use poller::{Poller, PollerConfig, PollerStatus};
pub use processor::{
    Clock, CycleReport, FailurePolicy, JobError, JobProcessor, PoisonPolicy, ProcessorConfig,
    ProcessorError, ProcessorStatus, SystemClock,
};
pub use queue::{JobQueue, QueueConfig, QueueError, QueueMessage, SqsJobQueue};
pub use storage::{ObjectReader, ObjectStore, S3ObjectStore, StorageConfig, StorageError};
