use std::path::PathBuf;

use reqwest::multipart;
use tracing::{debug, info};

use crate::models::{ConvertResponse, ConvertTextRequest, ConverterHealth, ClaimMetadata};

/// Default conversion service URL (local development).
pub const DEFAULT_CONVERT_URL: &str = "http://localhost:8001";

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);

/// Failures surfaced by the conversion client.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("conversion rejected: {0}")]
    Rejected(String),

    #[error("conversion service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base URL: {0}")]
    Url(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

/// Client for the conversion service.
#[derive(Debug, Clone)]
pub struct ConvertClient {
    http: reqwest::Client,
    base_url: String,
}

impl ConvertClient {
    /// Creates a client against the given base URL (http/https only).
    pub fn new(base_url: &str) -> ConvertResult<Self> {
        let cleaned = base_url.trim_end_matches('/');

        let parsed = url::Url::parse(cleaned)
            .map_err(|e| ConvertError::Url(format!("cannot parse '{cleaned}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConvertError::Url(format!(
                "URL must use http or https, got: {}",
                parsed.scheme()
            )));
        }

        // Conversions run a model server-side; allow them a long window.
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: cleaned.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health`: service status and model availability.
    pub async fn health(&self) -> ConvertResult<ConverterHealth> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        handle_response(response).await
    }

    /// `POST /convert/claim`: converts one or more PDFs into a claim
    /// bundle. Files are read here and shipped as multipart parts, with
    /// claim metadata as plain form fields.
    pub async fn convert_files(
        &self,
        files: &[PathBuf],
        meta: &ClaimMetadata,
    ) -> ConvertResult<ConvertResponse> {
        if files.is_empty() {
            return Err(ConvertError::Rejected(
                "at least one PDF file is required".into(),
            ));
        }

        let mut form = multipart::Form::new();
        for path in files {
            let bytes = std::fs::read(path).map_err(|source| ConvertError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("document.pdf")
                .to_string();
            debug!("attaching {name} ({} bytes)", bytes.len());
            let part = multipart::Part::bytes(bytes)
                .file_name(name)
                .mime_str("application/pdf")?;
            form = form.part("files", part);
        }
        for (key, value) in meta.form_fields() {
            form = form.text(key, value);
        }

        let response = self
            .http
            .post(format!("{}/convert/claim", self.base_url))
            .multipart(form)
            .send()
            .await?;
        let converted: ConvertResponse = handle_response(response).await?;
        info!(
            "converted {} document(s) into bundle",
            converted.documents_processed
        );
        Ok(converted)
    }

    /// `POST /convert/text`: converts pasted clinical text.
    pub async fn convert_text(&self, request: &ConvertTextRequest) -> ConvertResult<ConvertResponse> {
        if request.text.trim().is_empty() {
            return Err(ConvertError::Rejected("clinical text is empty".into()));
        }

        let response = self
            .http
            .post(format!("{}/convert/text", self.base_url))
            .json(request)
            .send()
            .await?;
        handle_response(response).await
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> ConvertResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or(body);

    if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
        || status == reqwest::StatusCode::BAD_REQUEST
    {
        Err(ConvertError::Rejected(message))
    } else {
        Err(ConvertError::Service {
            status: status.as_u16(),
            message,
        })
    }
}
