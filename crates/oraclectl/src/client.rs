//! HTTP client for the oracled API.

use anyhow::{Context, Result};
use oracle_common::rpc::{
    MetricsReport, QueueView, ResolveAck, RosterEntry, Submission, SubmissionReceipt,
};
use std::time::Duration;

pub struct ApiClient {
    base: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Resolve the daemon address: explicit flag, then ORACLED_ADDR, then
    /// the default localhost port.
    pub fn discover_addr(explicit: Option<&str>) -> String {
        if let Some(addr) = explicit {
            return addr.to_string();
        }
        if let Ok(addr) = std::env::var("ORACLED_ADDR") {
            return addr;
        }
        "http://127.0.0.1:7610".to_string()
    }

    pub fn new(addr: Option<&str>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            base: Self::discover_addr(addr),
            client,
        })
    }

    pub async fn roster(&self) -> Result<Vec<RosterEntry>> {
        self.get("/v1/roster").await
    }

    pub async fn queue(&self) -> Result<Vec<QueueView>> {
        self.get("/v1/queue").await
    }

    pub async fn metrics(&self) -> Result<MetricsReport> {
        self.get("/v1/metrics").await
    }

    pub async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt> {
        let response = self
            .client
            .post(format!("{}/v1/questions", self.base))
            .json(submission)
            .send()
            .await
            .context("is oracled running?")?;
        Self::decode(response).await
    }

    pub async fn resolve(&self, queue_id: u64) -> Result<ResolveAck> {
        let response = self
            .client
            .post(format!("{}/v1/queue/{}/resolve", self.base, queue_id))
            .send()
            .await
            .context("is oracled running?")?;
        Self::decode(response).await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .context("is oracled running?")?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("daemon returned {status}: {body}");
        }
        response.json().await.context("malformed daemon response")
    }
}
