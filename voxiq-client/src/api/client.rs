//! Typed HTTP client for the VoxIQ backend
//!
//! One client instance per process, cheap to clone. Every call is
//! bearer-token authenticated against a single base URL. Non-2xx
//! responses carry a JSON body with a `detail` string; absent a body,
//! the HTTP status text is used instead.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use voxiq_common::api::{
    AskRequest, AskResponse, ConversationDetail, ConversationSummary, InsightCreate,
    InsightResponse, InsightUpdate, InterviewCreate, InterviewDetailResponse, InterviewResponse,
    InterviewSort, LimitsResponse, ThemeDetailResponse, ThemeResponse, ThemeSort, ThemeUpdate,
    UploadUrlRequest, UploadUrlResponse, UsageResponse, UserResponse, VerifyRequest,
};
use voxiq_common::{Error, Result};

/// Default timeout for backend API requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error envelope returned by the backend on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    detail: Option<String>,
}

/// Typed request/response wrapper over HTTP
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue the request and decode the error envelope on failure
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let fallback = status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
        let detail = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => envelope.detail.unwrap_or(fallback),
            Err(_) => fallback,
        };
        debug!(status = status.as_u16(), detail = %detail, "API request failed");
        Err(Error::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T> {
        let response = self
            .send(self.http.get(self.url(path)).bearer_auth(token))
            .await?;
        Ok(response.json().await?)
    }

    async fn get_text(&self, path: &str, token: &str) -> Result<String> {
        let response = self
            .send(self.http.get(self.url(path)).bearer_auth(token))
            .await?;
        Ok(response.text().await?)
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .send(self.http.post(self.url(path)).bearer_auth(token).json(body))
            .await?;
        Ok(response.json().await?)
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T> {
        let response = self
            .send(self.http.post(self.url(path)).bearer_auth(token))
            .await?;
        Ok(response.json().await?)
    }

    async fn patch_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .send(self.http.patch(self.url(path)).bearer_auth(token).json(body))
            .await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, path: &str, token: &str) -> Result<()> {
        self.send(self.http.delete(self.url(path)).bearer_auth(token))
            .await?;
        Ok(())
    }

    // === Auth ===

    /// Verify a bearer token, returning the authenticated user
    pub async fn verify_token(&self, token: &str) -> Result<UserResponse> {
        let body = VerifyRequest {
            token: token.to_string(),
        };
        let response = self
            .send(self.http.post(self.url("/api/auth/verify")).json(&body))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn me(&self, token: &str) -> Result<UserResponse> {
        self.get_json("/api/auth/me", token).await
    }

    // === Interviews ===

    pub async fn upload_url(
        &self,
        token: &str,
        request: &UploadUrlRequest,
    ) -> Result<UploadUrlResponse> {
        self.post_json("/api/interviews/upload-url", token, request)
            .await
    }

    /// PUT raw bytes to a signed upload target. The target is not under
    /// the API base URL and takes no bearer token.
    pub async fn put_upload(
        &self,
        upload_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<()> {
        self.send(
            self.http
                .put(upload_url)
                .header(CONTENT_TYPE, content_type)
                .body(bytes),
        )
        .await?;
        Ok(())
    }

    /// Register the interview record; this triggers backend processing
    pub async fn create_interview(
        &self,
        token: &str,
        request: &InterviewCreate,
    ) -> Result<InterviewResponse> {
        self.post_json("/api/interviews", token, request).await
    }

    pub async fn list_interviews(
        &self,
        token: &str,
        sort: InterviewSort,
    ) -> Result<Vec<InterviewResponse>> {
        self.get_json(&format!("/api/interviews?sort={}", sort), token)
            .await
    }

    pub async fn get_interview(&self, token: &str, id: &str) -> Result<InterviewDetailResponse> {
        self.get_json(&format!("/api/interviews/{}", id), token)
            .await
    }

    pub async fn delete_interview(&self, token: &str, id: &str) -> Result<()> {
        self.delete(&format!("/api/interviews/{}", id), token).await
    }

    // === Themes ===

    pub async fn list_themes(&self, token: &str, sort: ThemeSort) -> Result<Vec<ThemeResponse>> {
        self.get_json(&format!("/api/themes?sort={}", sort), token)
            .await
    }

    pub async fn get_theme(&self, token: &str, id: &str) -> Result<ThemeDetailResponse> {
        self.get_json(&format!("/api/themes/{}", id), token).await
    }

    pub async fn rename_theme(&self, token: &str, id: &str, name: &str) -> Result<ThemeResponse> {
        let body = ThemeUpdate {
            name: name.to_string(),
        };
        self.patch_json(&format!("/api/themes/{}", id), token, &body)
            .await
    }

    // === Insights ===

    pub async fn create_insight(
        &self,
        token: &str,
        request: &InsightCreate,
    ) -> Result<InsightResponse> {
        self.post_json("/api/insights", token, request).await
    }

    pub async fn update_insight(
        &self,
        token: &str,
        id: &str,
        request: &InsightUpdate,
    ) -> Result<InsightResponse> {
        self.patch_json(&format!("/api/insights/{}", id), token, request)
            .await
    }

    pub async fn dismiss_insight(&self, token: &str, id: &str) -> Result<()> {
        self.delete(&format!("/api/insights/{}", id), token).await
    }

    pub async fn flag_insight(&self, token: &str, id: &str) -> Result<InsightResponse> {
        self.post_empty(&format!("/api/insights/{}/flag", id), token)
            .await
    }

    // === Ask ===

    pub async fn ask(&self, token: &str, request: &AskRequest) -> Result<AskResponse> {
        self.post_json("/api/ask", token, request).await
    }

    pub async fn list_conversations(&self, token: &str) -> Result<Vec<ConversationSummary>> {
        self.get_json("/api/ask/conversations", token).await
    }

    pub async fn get_conversation(&self, token: &str, id: &str) -> Result<ConversationDetail> {
        self.get_json(&format!("/api/ask/conversations/{}", id), token)
            .await
    }

    // === Export ===

    /// All active themes and insights as a markdown document
    pub async fn export_insights(&self, token: &str) -> Result<String> {
        self.get_text("/api/export/insights", token).await
    }

    /// One interview (metadata, insights, transcript) as markdown
    pub async fn export_interview(&self, token: &str, id: &str) -> Result<String> {
        self.get_text(&format!("/api/export/interview/{}", id), token)
            .await
    }

    // === Billing ===

    pub async fn billing_usage(&self, token: &str) -> Result<UsageResponse> {
        self.get_json("/api/billing/usage", token).await
    }

    pub async fn billing_limits(&self, token: &str) -> Result<LimitsResponse> {
        self.get_json("/api/billing/limits", token).await
    }

    // === Demo ===

    pub async fn load_sample_data(&self, token: &str) -> Result<serde_json::Value> {
        self.post_empty("/api/demo/load-sample-data", token).await
    }
}
