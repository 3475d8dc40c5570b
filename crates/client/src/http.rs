//! `reqwest`-backed implementation of [`WorkflowBackend`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::backend::WorkflowBackend;
use crate::error::ClientError;
use crate::models::{
    Activity, ActivityDetail, BookingAck, BookingRequest, LogAck, ThrottleDecision,
    ThrottleExecuteRequest, Trigger, WorkflowLogEntry,
};

/// HTTP client for the collaborator backend with optional API-key auth.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Create a client from `PULSE_BACKEND_URL` and `PULSE_API_KEY`.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("PULSE_BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let api_key = std::env::var("PULSE_API_KEY").ok();
        Self::new(base_url, api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("X-API-Key", key.as_str()),
            None => request,
        }
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(resource.to_owned()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status: status.as_u16(), body });
        }

        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        debug!(path, "GET");
        let mut request = self.apply_auth(self.client.get(self.url(path)));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        Self::decode(response, path).await
    }

    async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        debug!(path, "POST");
        let request = self.apply_auth(self.client.post(self.url(path)).json(body));
        let response = request.send().await?;
        Self::decode(response, path).await
    }
}

#[async_trait]
impl WorkflowBackend for HttpBackend {
    async fn triggers_by_slug(&self, items_slug: &str) -> Result<Vec<Trigger>, ClientError> {
        self.get("/triggers", &[("slug", items_slug)]).await
    }

    async fn activities_by_workflow(
        &self,
        workflow_items_id: &str,
    ) -> Result<Vec<Activity>, ClientError> {
        self.get(&format!("/workflows/{workflow_items_id}/activities"), &[])
            .await
    }

    async fn activity_details(&self, activity_id: &str) -> Result<ActivityDetail, ClientError> {
        self.get(&format!("/activities/{activity_id}"), &[]).await
    }

    async fn throttle_execute(
        &self,
        request: &ThrottleExecuteRequest,
    ) -> Result<ThrottleDecision, ClientError> {
        self.post_json("/throttle/execute", request).await
    }

    async fn write_log(&self, entry: &WorkflowLogEntry) -> Result<LogAck, ClientError> {
        self.post_json("/workflow-logs", entry).await
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingAck, ClientError> {
        self.post_json("/bookings", request).await
    }
}
