//! SQS-backed job queue.

use async_trait::async_trait;
use aws_sdk_sqs::types::MessageSystemAttributeName;
use aws_sdk_sqs::Client;
use tracing::{debug, warn};

use super::config::QueueConfig;
use super::error::QueueError;
use super::traits::JobQueue;
use super::types::QueueMessage;

/// Job queue reading from an AWS SQS queue.
#[derive(Debug, Clone)]
pub struct SqsJobQueue {
    client: Client,
    config: QueueConfig,
}

impl SqsJobQueue {
    /// Creates a queue adapter around an existing SQS client.
    pub fn new(client: Client, config: QueueConfig) -> Self {
        Self { client, config }
    }

    /// Creates a queue adapter from shared AWS configuration.
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, config: QueueConfig) -> Self {
        Self::new(Client::new(sdk_config), config)
    }
}

#[async_trait]
impl JobQueue for SqsJobQueue {
    fn name(&self) -> &str {
        "sqs"
    }

    async fn receive(
        &self,
        max_messages: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        let response = self
            .client
            .receive_message()
            .queue_url(&self.config.url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_time_seconds)
            .set_visibility_timeout(self.config.visibility_timeout_secs)
            .message_system_attribute_names(MessageSystemAttributeName::ApproximateReceiveCount)
            .send()
            .await
            .map_err(|e| QueueError::receive(format!("SQS receive failed: {}", e)))?;

        let sqs_messages = response.messages.unwrap_or_default();
        debug!("Received {} messages from SQS", sqs_messages.len());

        let mut messages = Vec::with_capacity(sqs_messages.len());
        for msg in sqs_messages {
            let Some(receipt) = msg.receipt_handle else {
                warn!(
                    message_id = msg.message_id.as_deref().unwrap_or("unknown"),
                    "SQS message without receipt handle, skipping"
                );
                continue;
            };

            let receive_count = msg
                .attributes
                .as_ref()
                .and_then(|attrs| attrs.get(&MessageSystemAttributeName::ApproximateReceiveCount))
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);

            messages.push(QueueMessage {
                message_id: msg.message_id,
                body: msg.body.unwrap_or_default(),
                receipt,
                receive_count,
            });
        }

        Ok(messages)
    }

    async fn acknowledge(&self, receipt: &str) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(&self.config.url)
            .receipt_handle(receipt)
            .send()
            .await
            .map_err(|e| QueueError::acknowledge(format!("SQS delete failed: {}", e)))?;
        Ok(())
    }
}
