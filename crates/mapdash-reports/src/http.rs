//! Shared `reqwest` plumbing for both service clients.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde_json::Value;

use crate::error::ClientError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds a client with a connect timeout and, optionally, a total request
/// timeout.
pub(crate) fn build_client(
    user_agent: &str,
    timeout: Option<Duration>,
) -> Result<Client, ClientError> {
    let mut builder = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Parses `base_url`, normalised to end with exactly one slash so relative
/// endpoint paths join under it.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ClientError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised)
        .map_err(|e| ClientError::Configuration(format!("invalid base URL '{base_url}': {e}")))
}

pub(crate) fn endpoint(base_url: &Url, path: &str) -> Result<Url, ClientError> {
    base_url
        .join(path.trim_start_matches('/'))
        .map_err(|e| ClientError::Configuration(format!("invalid endpoint path '{path}': {e}")))
}

/// Turns a non-success response into [`ClientError::Upstream`] carrying the
/// body text unchanged.
pub(crate) async fn upstream_error(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ClientError::Upstream { status, body }
}

/// Like [`upstream_error`], but reduces the body to its JSON `error` string
/// when it has one.
pub(crate) async fn upstream_error_message(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let body = error_field(&text).unwrap_or(text);
    ClientError::Upstream { status, body }
}

fn error_field(text: &str) -> Option<String> {
    serde_json::from_str::<Value>(text)
        .ok()?
        .get("error")?
        .as_str()
        .map(str::to_owned)
}
