//! Typed client for the wellness backend's JSON endpoints.

use crate::models::{
    ChatReply, ChatRequest, ErrorBody, HelpAccepted, HelpRequest, Resource, StressHistoryEntry,
    StressLogRequest,
};
use crate::stress_check::StressSource;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

pub const CONNECTIVITY_MESSAGE: &str = "Can't connect right now. Please check your connection.";
pub const SERVER_FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Network(#[source] reqwest::Error),
    #[error("login required")]
    Unauthorized,
    #[error("backend returned status {status}")]
    Server { status: u16, message: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl BackendError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => CONNECTIVITY_MESSAGE.to_string(),
            Self::Unauthorized => "Please log in to continue.".to_string(),
            Self::Server {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Server { message: None, .. } | Self::Decode(_) => {
                SERVER_FALLBACK_MESSAGE.to_string()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    retries: u32,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, retries: u32) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retries,
        }
    }

    pub async fn chat(&self, message: &str) -> Result<ChatReply, BackendError> {
        let url = self.url("/api/chat");
        let response = self
            .send(|http| http.post(&url).json(&ChatRequest { message }))
            .await?;
        decode(response).await
    }

    pub async fn resources(&self) -> Result<Vec<Resource>, BackendError> {
        let url = self.url("/api/resources");
        let response = self.send(|http| http.get(&url)).await?;
        decode(response).await
    }

    pub async fn log_stress(&self, level: u8, source: StressSource) -> Result<(), BackendError> {
        let url = self.url("/api/log_stress");
        let body = StressLogRequest {
            level,
            source: source.label(),
        };
        let response = self.send(|http| http.post(&url).json(&body)).await?;
        ensure_success(response).await.map(|_| ())
    }

    pub async fn stress_history(&self) -> Result<Vec<StressHistoryEntry>, BackendError> {
        let url = self.url("/api/stress_history");
        let response = self.send(|http| http.get(&url)).await?;
        decode(response).await
    }

    pub async fn request_help(&self, request: &HelpRequest) -> Result<HelpAccepted, BackendError> {
        let url = self.url("/api/request_help");
        let response = self.send(|http| http.post(&url).json(request)).await?;
        decode(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends a request, retrying only when the connection itself could not
    /// be established.
    async fn send(&self, build: impl Fn(&Client) -> RequestBuilder) -> Result<Response, BackendError> {
        let mut attempt = 0;
        loop {
            match build(&self.http).send().await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_connect() && attempt < self.retries => {
                    attempt += 1;
                    warn!(attempt, "backend connection failed, retrying: {err}");
                    sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(err) => return Err(BackendError::Network(err)),
            }
        }
    }
}

async fn ensure_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(BackendError::Unauthorized);
    }
    if !status.is_success() {
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .filter(|message| !message.trim().is_empty());
        return Err(BackendError::Server {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    ensure_success(response)
        .await?
        .json::<T>()
        .await
        .map_err(BackendError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use crate::testing::{closed_port_url, spawn_mock_backend};
    use axum::{
        Json, Router,
        http::StatusCode as HttpStatus,
        routing::{get, post},
    };
    use serde_json::{Value, json};

    fn help(message: &str) -> HelpRequest {
        HelpRequest {
            severity: Severity::High,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn request_help_reads_after_hours_flag() {
        let app = Router::new().route(
            "/api/request_help",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["severity"], "high");
                Json(json!({ "status": "success", "after_hours": true }))
            }),
        );
        let client = BackendClient::new(spawn_mock_backend(app).await, 0);

        let accepted = client.request_help(&help("need help")).await.unwrap();
        assert!(accepted.after_hours);
    }

    #[tokio::test]
    async fn statuses_map_to_typed_errors() {
        let app = Router::new()
            .route(
                "/api/request_help",
                post(|| async { (HttpStatus::UNAUTHORIZED, "login") }),
            )
            .route(
                "/api/chat",
                post(|| async {
                    (
                        HttpStatus::BAD_REQUEST,
                        Json(json!({ "error": "Message is required" })),
                    )
                }),
            )
            .route(
                "/api/stress_history",
                get(|| async { (HttpStatus::INTERNAL_SERVER_ERROR, "boom") }),
            );
        let client = BackendClient::new(spawn_mock_backend(app).await, 0);

        assert!(matches!(
            client.request_help(&help("x")).await,
            Err(BackendError::Unauthorized)
        ));

        let err = client.chat("hello").await.unwrap_err();
        assert_eq!(err.user_message(), "Message is required");

        let err = client.stress_history().await.unwrap_err();
        assert!(matches!(err, BackendError::Server { status: 500, message: None }));
        assert_eq!(err.user_message(), SERVER_FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn log_stress_ignores_ack_body() {
        let app = Router::new().route(
            "/api/log_stress",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body, json!({ "level": 9, "source": "Exam/Deadline" }));
                "logged"
            }),
        );
        let client = BackendClient::new(spawn_mock_backend(app).await, 0);

        client.log_stress(9, StressSource::ExamDeadline).await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error_after_retry() {
        let client = BackendClient::new(closed_port_url(), 1);

        let err = client.resources().await.unwrap_err();
        assert!(matches!(err, BackendError::Network(_)));
        assert_eq!(err.user_message(), CONNECTIVITY_MESSAGE);
    }
}
