use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use url::Url;
use serde_json::Value;
use tracker_core::{ItemId, RfpRecord};
use tracker_logging::{tracker_debug, tracker_warn};

use crate::{ApiError, FailureKind, PipelineAction, ScanReport, UploadRequest};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_WEBHOOK_URL: &str = "http://localhost:5678/webhook-test/auto-process";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub webhook_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_download_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            // Analysis and proposal calls block on model inference server-side.
            request_timeout: Duration::from_secs(120),
            max_download_bytes: 50 * 1024 * 1024,
        }
    }
}

/// HTTP contract of the pipeline backend.
#[async_trait::async_trait]
pub trait TrackerApi: Send + Sync {
    async fn list_items(&self) -> Result<Vec<RfpRecord>, ApiError>;

    /// The backend has no single-item endpoint, so this filters the list.
    async fn fetch_item(&self, item_id: ItemId) -> Result<Option<RfpRecord>, ApiError> {
        let items = self.list_items().await?;
        Ok(items.into_iter().find(|record| record.id == item_id))
    }

    async fn scan(&self) -> Result<ScanReport, ApiError>;

    async fn run_action(&self, item_id: ItemId, action: PipelineAction) -> Result<(), ApiError>;

    /// Fire-and-forget trigger: only transport failures are reported.
    async fn trigger_auto_run(&self, item_id: ItemId) -> Result<(), ApiError>;

    async fn chat(&self, item_id: ItemId, question: &str) -> Result<String, ApiError>;

    async fn upload(&self, request: &UploadRequest) -> Result<ItemId, ApiError>;

    async fn download_artifact(&self, item_id: ItemId) -> Result<Vec<u8>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// Sends `request` and returns the decoded JSON body of a 2xx response.
    async fn send_json(&self, request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                error_detail(&body).unwrap_or_else(|| status.to_string()),
            ));
        }
        let value = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&body)
                .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?
        };
        reject_error_body(&value)?;
        Ok(value)
    }
}

#[async_trait::async_trait]
impl TrackerApi for ReqwestApi {
    async fn list_items(&self) -> Result<Vec<RfpRecord>, ApiError> {
        let url = self.endpoint("api/agents/sales/rfps")?;
        let value = self.send_json(self.client.get(url)).await?;
        let Value::Array(rows) = value else {
            return Err(ApiError::new(FailureKind::Decode, "expected a list of RFPs"));
        };
        let records = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<RfpRecord>(row) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracker_warn!("Skipping malformed RFP row: {}", err);
                    None
                }
            })
            .collect();
        Ok(records)
    }

    async fn scan(&self) -> Result<ScanReport, ApiError> {
        let url = self.endpoint("api/agents/sales/scan")?;
        let value = self.send_json(self.client.post(url)).await?;
        Ok(ScanReport {
            scanned_count: value
                .get("scanned_count")
                .and_then(Value::as_u64)
                .unwrap_or(0),
        })
    }

    async fn run_action(&self, item_id: ItemId, action: PipelineAction) -> Result<(), ApiError> {
        let url = self.endpoint(&action.path(item_id))?;
        self.send_json(self.client.post(url)).await?;
        Ok(())
    }

    async fn trigger_auto_run(&self, item_id: ItemId) -> Result<(), ApiError> {
        let mut url = Url::parse(&self.settings.webhook_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.query_pairs_mut()
            .append_pair("id", &item_id.to_string());
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        tracker_debug!(
            "Automated run trigger for {} answered {}",
            item_id,
            response.status()
        );
        Ok(())
    }

    async fn chat(&self, item_id: ItemId, question: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&format!("api/agents/main/{item_id}/chat"))?;
        let body = serde_json::to_vec(&serde_json::json!({ "question": question }))
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        let value = self
            .send_json(
                self.client
                    .post(url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body),
            )
            .await?;
        value
            .get("response")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| ApiError::new(FailureKind::Decode, "chat reply has no response"))
    }

    async fn upload(&self, request: &UploadRequest) -> Result<ItemId, ApiError> {
        let url = self.endpoint("api/agents/sales/upload")?;
        let bytes = std::fs::read(&request.file).map_err(|err| {
            ApiError::new(
                FailureKind::Io,
                format!("{}: {err}", request.file.display()),
            )
        })?;
        let file_name = request
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        let form = Form::new()
            .text("title", request.title.clone())
            .text("client", request.client.clone())
            .text("deadline", request.deadline.clone())
            .part("file", part);

        let value = self.send_json(self.client.post(url).multipart(form)).await?;
        value
            .get("rfp_id")
            .and_then(Value::as_u64)
            .ok_or_else(|| ApiError::new(FailureKind::Decode, "upload reply has no rfp_id"))
    }

    async fn download_artifact(&self, item_id: ItemId) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&format!(
            "api/agents/main/download/{}",
            artifact_file_name(item_id)
        ))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_download_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "artifact too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "artifact too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

/// File name the backend uses for an item's generated proposal.
pub fn artifact_file_name(item_id: ItemId) -> String {
    format!("proposal_{item_id}.pptx")
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    // `Url::join` replaces the last segment unless the base ends with a slash.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
}

fn reject_error_body(value: &Value) -> Result<(), ApiError> {
    match value.get("error") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(message)) => Err(ApiError::new(FailureKind::Rejected, message.clone())),
        Some(other) => Err(ApiError::new(FailureKind::Rejected, other.to_string())),
    }
}

/// FastAPI puts the reason for a non-2xx response in `detail`.
fn error_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail").or_else(|| value.get("error"))? {
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ApiError::new(FailureKind::InvalidUrl, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
