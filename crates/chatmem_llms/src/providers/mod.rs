pub mod gemini;
pub mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use std::future::Future;
use std::time::Duration;

use crate::error::{LlmError, Result};

/// Sends a request under `limit`, mapping timeout and status to [`LlmError`].
/// Returns the response body on success.
pub(crate) async fn send_with_timeout<F>(limit: Duration, request: F) -> Result<String>
where
    F: Future<Output = std::result::Result<reqwest::Response, reqwest::Error>>,
{
    let response = tokio::time::timeout(limit, request)
        .await
        .map_err(|_| LlmError::upstream(format!("request timed out after {}s", limit.as_secs())))??;

    let status = response.status();
    let text = tokio::time::timeout(limit, response.text())
        .await
        .map_err(|_| LlmError::upstream(format!("response timed out after {}s", limit.as_secs())))??;
    if !status.is_success() {
        return Err(LlmError::from_status(status, &text));
    }
    Ok(text)
}
