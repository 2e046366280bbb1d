//! HTTP response types

use crate::error::HttpError;

/// HTTP Response type - generic over the body type R and error type E
/// This is the primary return type for all HTTP operations
pub type Response<R, E = HttpError> = Result<R, E>;

/// Turns a non-success status into [`HttpError::Status`], keeping the body as message
pub(crate) async fn ensure_success(response: reqwest::Response) -> Response<reqwest::Response> {
    let status = response.status();

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        tracing::debug!("Relay answered {}: {}", status, message);
        return Err(HttpError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response)
}
