//! HTTP client for the content-generation service.

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use mapdash_core::AppConfig;

use super::request::GenerationRequest;
use super::response::{decode, DisplayResult, GenerationOutput};
use crate::error::ClientError;
use crate::http;
use crate::retry::{retry_with_backoff, RetryPolicy};

/// Client for the generation service.
///
/// Each call has a fixed total timeout. [`GenerationClient::run_with_retry`]
/// retries connection failures and timeouts per its [`RetryPolicy`]; a
/// response with any status other than 200 ends the call immediately.
pub struct GenerationClient {
    client: Client,
    base_url: Url,
    policy: RetryPolicy,
}

impl GenerationClient {
    /// Creates a client from the generation settings in `config`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Configuration`] if the base URL is invalid.
    /// - [`ClientError::Http`] if the `reqwest::Client` cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::with_base_url(
            &config.generation_base_url,
            &config.http_user_agent,
            Duration::from_secs(config.generation_timeout_secs),
            RetryPolicy::new(
                config.generation_max_attempts,
                Duration::from_secs(config.generation_backoff_base_secs),
            ),
        )
    }

    /// Creates a client against an explicit base URL.
    ///
    /// # Errors
    ///
    /// Same as [`GenerationClient::from_config`].
    pub fn with_base_url(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: http::build_client(user_agent, Some(timeout))?,
            base_url: http::parse_base_url(base_url)?,
            policy,
        })
    }

    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Sends one generation call and decodes the result.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Upstream`] if the status is not 200; the message is
    ///   the body's JSON `error` field when present.
    /// - [`ClientError::Transport`] on connection failure or timeout.
    /// - [`ClientError::Deserialize`] / [`ClientError::Decode`] if the body
    ///   does not have the expected shape.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<DisplayResult, ClientError> {
        let kind = request.output_kind();
        let url = http::endpoint(&self.base_url, kind.path())?;
        tracing::info!(%url, output_kind = %kind, "sending generation request");

        let response = self
            .client
            .post(url.clone())
            .json(&request.body())
            .send()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), &e))?;
        if response.status() != StatusCode::OK {
            let err = http::upstream_error_message(response).await;
            tracing::warn!(%url, error = %err, "generation service rejected request");
            return Err(err);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), &e))?;
        let body: Value = serde_json::from_slice(&bytes).map_err(|e| ClientError::Deserialize {
            context: kind.path().to_string(),
            source: e,
        })?;
        decode(kind, &body)
    }

    /// Runs [`GenerationClient::generate`] with retry on transport failures.
    ///
    /// # Errors
    ///
    /// - [`ClientError::ExhaustedRetries`] when every attempt failed with a
    ///   transport error.
    /// - Any non-retryable error of [`GenerationClient::generate`], after the
    ///   attempt that produced it.
    pub async fn run_with_retry(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutput, ClientError> {
        let started = Instant::now();
        let (display, attempts) =
            retry_with_backoff(self.policy, || self.generate(request)).await?;
        let elapsed = started.elapsed();
        tracing::info!(
            output_kind = %request.output_kind(),
            attempts,
            elapsed_secs = elapsed.as_secs_f64(),
            "generation complete"
        );
        Ok(GenerationOutput {
            display,
            attempts,
            elapsed,
        })
    }
}
