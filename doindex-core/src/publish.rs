//! Full replacement of the hosted search index.
//!
//! The replace is done the way the service's own clients do it: copy the
//! live index's settings into a temporary index, upload every record there,
//! then move the temporary index over the live one. Each step is awaited
//! until the service reports the task as published.

use crate::config::SearchConfig;
use crate::error::PublishError;
use crate::record::Record;
use futures::future::try_join_all;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub type Result<T> = std::result::Result<T, PublishError>;

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

const COPY_SCOPE: &[&str] = &["settings", "synonyms", "rules"];

/// Something that can swap the full contents of a search index
pub trait IndexPublisher {
    fn replace_all_objects(
        &self,
        records: &[Record],
    ) -> impl Future<Output = Result<PublishReceipt>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub index_name: String,
    pub objects: usize,
    pub task_ids: Vec<u64>,
}

#[derive(Serialize)]
struct OperationRequest<'a> {
    operation: &'a str,
    destination: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<&'a [&'a str]>,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    requests: Vec<BatchOperation<'a>>,
}

#[derive(Serialize)]
struct BatchOperation<'a> {
    action: &'static str,
    body: &'a Record,
}

#[derive(Deserialize)]
struct TaskResponse {
    #[serde(rename = "taskID")]
    task_id: u64,
}

#[derive(Deserialize)]
struct TaskStatus {
    status: String,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

pub struct AlgoliaIndex {
    client: Client,
    base: Url,
    app_id: String,
    api_key: String,
    index_name: String,
    batch_size: usize,
    poll_interval: Duration,
}

impl AlgoliaIndex {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let host = config
            .host
            .clone()
            .unwrap_or_else(|| format!("https://{}.algolia.net", config.app_id));
        let base =
            Url::parse(&host).map_err(|e| PublishError::InvalidHost(format!("{}: {}", host, e)))?;
        if base.cannot_be_a_base() {
            return Err(PublishError::InvalidHost(host));
        }

        let client = Client::builder()
            .user_agent(concat!("doindex/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base,
            app_id: config.app_id.clone(),
            api_key: config.api_key.clone(),
            index_name: config.index_name.clone(),
            batch_size: DEFAULT_BATCH_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| PublishError::InvalidHost(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .header("X-Algolia-Application-Id", &self.app_id)
            .header("X-Algolia-API-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiMessage>(&body)
            .map(|m| m.message)
            .unwrap_or(body);
        Err(classify_failure(status, message))
    }

    async fn operation(
        &self,
        source: &str,
        operation: &str,
        destination: &str,
        scope: Option<&[&str]>,
    ) -> Result<u64> {
        let url = self.endpoint(&["1", "indexes", source, "operation"])?;
        debug!("{} {} -> {}", operation, source, destination);
        let body = OperationRequest {
            operation,
            destination,
            scope,
        };
        let task: TaskResponse = self.send(self.client.post(url).json(&body)).await?;
        Ok(task.task_id)
    }

    async fn batch(&self, index: &str, records: &[Record]) -> Result<u64> {
        let url = self.endpoint(&["1", "indexes", index, "batch"])?;
        let body = BatchRequest {
            requests: records
                .iter()
                .map(|record| BatchOperation {
                    action: "updateObject",
                    body: record,
                })
                .collect(),
        };
        let task: TaskResponse = self.send(self.client.post(url).json(&body)).await?;
        debug!("Uploaded {} records to {} (task {})", records.len(), index, task.task_id);
        Ok(task.task_id)
    }

    /// Poll a task until the service reports it published
    pub async fn wait_task(&self, index: &str, task_id: u64) -> Result<()> {
        let task = task_id.to_string();
        let url = self.endpoint(&["1", "indexes", index, "task", &task])?;

        loop {
            let status: TaskStatus = self.send(self.client.get(url.clone())).await?;
            if status.status == "published" {
                debug!("Task {} on {} published", task_id, index);
                return Ok(());
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl IndexPublisher for AlgoliaIndex {
    async fn replace_all_objects(&self, records: &[Record]) -> Result<PublishReceipt> {
        let tmp_index = format!(
            "{}_tmp_{}",
            self.index_name,
            chrono::Utc::now().timestamp_millis()
        );
        info!(
            "Replacing all objects in {} with {} records",
            self.index_name,
            records.len()
        );

        let copy_task = self
            .operation(&self.index_name, "copy", &tmp_index, Some(COPY_SCOPE))
            .await?;
        self.wait_task(&self.index_name, copy_task).await?;

        let mut batch_tasks = Vec::new();
        for chunk in records.chunks(self.batch_size) {
            batch_tasks.push(self.batch(&tmp_index, chunk).await?);
        }
        try_join_all(batch_tasks.iter().map(|id| self.wait_task(&tmp_index, *id))).await?;

        let move_task = self
            .operation(&tmp_index, "move", &self.index_name, None)
            .await?;
        self.wait_task(&tmp_index, move_task).await?;

        info!("Index {} replaced", self.index_name);

        let mut task_ids = vec![copy_task];
        task_ids.extend(batch_tasks);
        task_ids.push(move_task);

        Ok(PublishReceipt {
            index_name: self.index_name.clone(),
            objects: records.len(),
            task_ids,
        })
    }
}

fn classify_failure(status: StatusCode, message: String) -> PublishError {
    if status == StatusCode::TOO_MANY_REQUESTS || message.to_ascii_lowercase().contains("quota") {
        PublishError::QuotaExceeded { message }
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        PublishError::Unauthorized { status, message }
    } else {
        PublishError::Api { status, message }
    }
}
