//! HTTP client for the report service.
//!
//! Every report is a JSON `POST` of a [`ReportPayload`]. Binary reports can
//! be long-running document renders, so the client sets a connect timeout
//! only and leaves the total request time unbounded.

use reqwest::{Client, Response, Url};
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use mapdash_core::AppConfig;

use super::types::{BinaryReport, JsonReport, LlmInput, ReportKind, ReportPayload, ReportResponse};
use crate::error::ClientError;
use crate::http;

pub struct ReportClient {
    client: Client,
    base_url: Url,
}

impl ReportClient {
    /// Creates a client for the report service named in `config`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Configuration`] if the base URL is invalid.
    /// - [`ClientError::Http`] if the `reqwest::Client` cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::with_base_url(&config.report_base_url, &config.http_user_agent)
    }

    /// Creates a client against an explicit base URL (a wiremock server in
    /// tests).
    ///
    /// # Errors
    ///
    /// Same as [`ReportClient::from_config`].
    pub fn with_base_url(base_url: &str, user_agent: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client: http::build_client(user_agent, None)?,
            base_url: http::parse_base_url(base_url)?,
        })
    }

    /// Dispatches a report by name and returns its shape-tagged result.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Configuration`] if `name` is not a known report;
    ///   no request is sent.
    /// - Any error of [`ReportClient::fetch_binary_report`] or
    ///   [`ReportClient::fetch_json_report`].
    pub async fn fetch_report(
        &self,
        name: &str,
        payload: &ReportPayload,
    ) -> Result<ReportResponse, ClientError> {
        match name.parse::<ReportKind>()? {
            ReportKind::Binary(report) => self
                .fetch_binary_report(report, payload)
                .await
                .map(ReportResponse::Binary),
            ReportKind::Json(report) => self
                .fetch_json_report(report, payload)
                .await
                .map(ReportResponse::Json),
        }
    }

    /// Fetches a binary report fully into memory, byte-for-byte.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Upstream`] on a non-2xx status.
    /// - [`ClientError::Transport`] on connection failure.
    pub async fn fetch_binary_report(
        &self,
        report: BinaryReport,
        payload: &ReportPayload,
    ) -> Result<Vec<u8>, ClientError> {
        let (url, response) = self.post(report.path(), payload).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), &e))?;
        tracing::info!(report = report.name(), bytes = bytes.len(), "received report");
        Ok(bytes.to_vec())
    }

    /// Streams a binary report into `sink` chunk by chunk and returns the
    /// number of bytes written. The sink is flushed on success; on error it
    /// may hold a partial document.
    ///
    /// # Errors
    ///
    /// Same as [`ReportClient::fetch_binary_report`], plus [`ClientError::Io`]
    /// if writing to `sink` fails.
    pub async fn stream_binary_report<W>(
        &self,
        report: BinaryReport,
        payload: &ReportPayload,
        sink: &mut W,
    ) -> Result<u64, ClientError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let (url, mut response) = self.post(report.path(), payload).await?;
        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), &e))?
        {
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;
        tracing::info!(report = report.name(), bytes = written, "streamed report");
        Ok(written)
    }

    /// Fetches a JSON report as an untyped value.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Upstream`] on a non-2xx status.
    /// - [`ClientError::Transport`] on connection failure.
    /// - [`ClientError::Deserialize`] if the body is not JSON.
    pub async fn fetch_json_report(
        &self,
        report: JsonReport,
        payload: &ReportPayload,
    ) -> Result<Value, ClientError> {
        let (url, response) = self.post(report.path(), payload).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), &e))?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Deserialize {
            context: report.name().to_string(),
            source: e,
        })
    }

    /// Fetches the generation brief for `payload`.
    ///
    /// # Errors
    ///
    /// Same as [`ReportClient::fetch_json_report`]; also
    /// [`ClientError::Deserialize`] if the instruction fields have the wrong
    /// types.
    pub async fn fetch_llm_input(&self, payload: &ReportPayload) -> Result<LlmInput, ClientError> {
        let report = JsonReport::GtLlmInput;
        let value = self.fetch_json_report(report, payload).await?;
        serde_json::from_value(value).map_err(|e| ClientError::Deserialize {
            context: report.name().to_string(),
            source: e,
        })
    }

    async fn post(
        &self,
        path: &str,
        payload: &ReportPayload,
    ) -> Result<(Url, Response), ClientError> {
        let url = http::endpoint(&self.base_url, path)?;
        tracing::info!(
            %url,
            brand = %payload.brand,
            category = %payload.category,
            "requesting report"
        );
        let response = self
            .client
            .post(url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), &e))?;
        if !response.status().is_success() {
            return Err(http::upstream_error(response).await);
        }
        Ok((url, response))
    }
}
