use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::traits::{ClientError, TrackerClient};
use crate::types::{RemoteAttachment, RemoteComment, RemoteIssue, RemoteProject};

/// Issues and comments are fetched in pages of this size; the loop
/// stops at the first short page.
const PAGE_SIZE: usize = 100;

/// Async HTTP implementation of [`TrackerClient`] for Backlog-style
/// REST APIs (`/api/v2`, `apiKey` query parameter).
pub struct HttpClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl HttpClient {
    /// `timeout` applies to every request; a timed-out call surfaces as
    /// `ClientError::Connection`, never a hang.
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = format!("{}{path}?apiKey={}", self.base_url, self.api_key);
        for (name, value) in params {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(value);
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let resp = self
            .client
            .get(self.url(path, params))
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            resp.json::<T>()
                .await
                .map_err(|e| ClientError::Decode(e.to_string()))
        } else {
            Err(error_for_status(status, resp).await)
        }
    }

    async fn delete_req(&self, path: &str) -> Result<(), ClientError> {
        let resp = self
            .client
            .delete(self.url(path, &[]))
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(error_for_status(status, resp).await)
        }
    }
}

async fn error_for_status(status: StatusCode, resp: reqwest::Response) -> ClientError {
    let body = resp.text().await.unwrap_or_default();
    // Backlog wraps failures as {"errors":[{"message": "..."}]}.
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["errors"][0]["message"].as_str().map(String::from))
        .unwrap_or(body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => ClientError::RateLimited,
        _ => ClientError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl TrackerClient for HttpClient {
    async fn test_connection(&self) -> Result<(), ClientError> {
        let _me: serde_json::Value = self.get_json("/api/v2/users/myself", &[]).await?;
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<RemoteProject>, ClientError> {
        self.get_json("/api/v2/projects", &[]).await
    }

    async fn list_issues(&self, project_id: u64) -> Result<Vec<RemoteIssue>, ClientError> {
        let mut all = Vec::new();
        let mut offset = 0usize;
        loop {
            let page: Vec<RemoteIssue> = self
                .get_json(
                    "/api/v2/issues",
                    &[
                        ("projectId[]", project_id.to_string()),
                        ("offset", offset.to_string()),
                        ("count", PAGE_SIZE.to_string()),
                        ("sort", "created".to_string()),
                        ("order", "asc".to_string()),
                    ],
                )
                .await?;
            let fetched = page.len();
            debug!("fetched {fetched} issues at offset {offset}");
            all.extend(page);
            if fetched < PAGE_SIZE {
                break;
            }
            offset += PAGE_SIZE;
        }
        Ok(all)
    }

    async fn issue_attachments(
        &self,
        issue_id: u64,
    ) -> Result<Vec<RemoteAttachment>, ClientError> {
        self.get_json(&format!("/api/v2/issues/{issue_id}/attachments"), &[])
            .await
    }

    async fn issue_comments(&self, issue_id: u64) -> Result<Vec<RemoteComment>, ClientError> {
        // Comment pages are keyed by minId rather than offset.
        let mut all: Vec<RemoteComment> = Vec::new();
        let mut min_id: Option<u64> = None;
        loop {
            let mut params = vec![
                ("count", PAGE_SIZE.to_string()),
                ("order", "asc".to_string()),
            ];
            if let Some(min) = min_id {
                params.push(("minId", min.to_string()));
            }
            let page: Vec<RemoteComment> = self
                .get_json(&format!("/api/v2/issues/{issue_id}/comments"), &params)
                .await?;
            let fetched = page.len();
            min_id = page.last().map(|c| c.id);
            all.extend(page);
            if fetched < PAGE_SIZE {
                break;
            }
        }
        Ok(all)
    }

    async fn delete_attachment(
        &self,
        issue_id: u64,
        attachment_id: u64,
        comment_id: Option<u64>,
    ) -> Result<(), ClientError> {
        let path = match comment_id {
            Some(comment_id) => format!(
                "/api/v2/issues/{issue_id}/comments/{comment_id}/attachments/{attachment_id}"
            ),
            None => format!("/api/v2/issues/{issue_id}/attachments/{attachment_id}"),
        };
        self.delete_req(&path).await
    }
}
