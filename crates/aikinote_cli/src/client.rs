//! reqwest-backed [`PagesBackend`] speaking the AikiNote HTTP API.

use aikinote_core::models::{
    ApiResponse, CreatePageRequest, ListPagesQuery, TagList, TrainingPageWithTags,
    TrainingPagesList, UpdatePageRequest,
};
use aikinote_core::sync::PagesBackend;
use aikinote_core::SyncError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Pull a human-readable message out of a failed response body.
pub(crate) fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

pub(crate) fn api_url(server: &str, segments: &[&str]) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(server)
        .map_err(|err| format!("Invalid server URL '{}': {}", server, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| "Server URL cannot be used as an API base".to_string())?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

/// Rewrite `http://localhost` to the loopback address and drop trailing slashes.
pub(crate) fn normalize_server(server: String) -> String {
    if let Ok(mut url) = reqwest::Url::parse(&server) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return server;
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    server
}

/// Decode an envelope, turning non-envelope error bodies into failures.
pub(crate) fn decode_envelope<T: DeserializeOwned>(
    status: reqwest::StatusCode,
    body: &str,
) -> Result<ApiResponse<T>, SyncError> {
    match serde_json::from_str::<ApiResponse<T>>(body) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !status.is_success() => Ok(ApiResponse::failure(error_message_for_response(
            status, body,
        ))),
        Err(err) => Err(SyncError::Transport(format!(
            "invalid response from server: {}",
            err
        ))),
    }
}

/// HTTP client for one AikiNote server.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    server: String,
}

impl HttpBackend {
    pub fn new(client: reqwest::Client, server: impl Into<String>) -> Self {
        Self {
            client,
            server: server.into(),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, SyncError> {
        api_url(&self.server, segments).map_err(SyncError::Transport)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<T>, SyncError> {
        let response = request
            .send()
            .await
            .map_err(|err| SyncError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| SyncError::Transport(format!("failed to read response body: {}", err)))?;
        decode_envelope(status, &body)
    }

    /// Fetch one page with its categorized tags.
    ///
    /// # Errors
    /// Returns [`SyncError::Transport`] when no envelope came back.
    pub async fn get_page(
        &self,
        page_id: &str,
        user_id: &str,
    ) -> Result<ApiResponse<TrainingPageWithTags>, SyncError> {
        let url = self.url(&["api", "pages", page_id])?;
        self.send(self.client.get(url).query(&[("user_id", user_id)]))
            .await
    }

    /// List the tags registered for `user_id`.
    ///
    /// # Errors
    /// Returns [`SyncError::Transport`] when no envelope came back.
    pub async fn list_tags(&self, user_id: &str) -> Result<ApiResponse<TagList>, SyncError> {
        let url = self.url(&["api", "tags"])?;
        self.send(self.client.get(url).query(&[("user_id", user_id)]))
            .await
    }
}

impl PagesBackend for HttpBackend {
    async fn get_pages(
        &self,
        query: &ListPagesQuery,
    ) -> Result<ApiResponse<TrainingPagesList>, SyncError> {
        let url = self.url(&["api", "pages"])?;
        self.send(self.client.get(url).query(query)).await
    }

    async fn create_page(
        &self,
        request: &CreatePageRequest,
    ) -> Result<ApiResponse<TrainingPageWithTags>, SyncError> {
        let url = self.url(&["api", "pages"])?;
        self.send(self.client.post(url).json(request)).await
    }

    async fn update_page(
        &self,
        request: &UpdatePageRequest,
    ) -> Result<ApiResponse<TrainingPageWithTags>, SyncError> {
        let url = self.url(&["api", "pages", request.id.as_str()])?;
        self.send(self.client.put(url).json(request)).await
    }

    async fn delete_page(
        &self,
        page_id: &str,
        user_id: &str,
    ) -> Result<ApiResponse<bool>, SyncError> {
        let url = self.url(&["api", "pages", page_id])?;
        self.send(self.client.delete(url).query(&[("user_id", user_id)]))
            .await
    }
}
