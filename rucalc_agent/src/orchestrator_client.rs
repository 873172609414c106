use ::std::time::Duration;

use ::reqwest::StatusCode;
use ::rucalc_common::task::{Task, TaskResponse, TaskResult};

type Result<T> = std::result::Result<T, reqwest::Error>;

/// Client for the internal task api of the rucalc orchestrator.
pub struct OrchestratorClient {
    /// Base URL of the orchestrator.
    base_url: String,
    /// HTTP client for making requests to the orchestrator.
    client: reqwest::Client,
}

impl OrchestratorClient {
    const TASK_PATH: &'static str = "/internal/task";

    /// Create a new `OrchestratorClient`.
    /// Every request gives up after `request_timeout`.
    pub fn new(base_url: String, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self { base_url, client })
    }

    /// Fetch the next ready task.
    /// Return `Ok(None)` if the orchestrator has nothing to compute.
    pub async fn get_task(&self) -> Result<Option<Task>> {
        let url = self.build_url(Self::TASK_PATH);
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let TaskResponse { task } = response.error_for_status()?.json().await?;
        Ok(Some(task))
    }

    pub async fn send_result(&self, result: &TaskResult) -> Result<()> {
        let url = self.build_url(Self::TASK_PATH);
        self.client
            .post(url)
            .json(result)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Build a full URL from a path.
    fn build_url(&self, path: &str) -> String {
        self.base_url.to_owned() + path
    }
}
