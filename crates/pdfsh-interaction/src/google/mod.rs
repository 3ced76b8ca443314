//! Google Drive and Sheets REST clients.
//!
//! Both authenticate with a bearer access token obtained outside pdfsh.

mod drive;
mod sheets;

pub use drive::GoogleDriveClient;
pub use sheets::GoogleSheetsClient;

use pdfsh_core::error::CloudError;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn transport_error(err: reqwest::Error) -> CloudError {
    CloudError::Transport(err.to_string())
}

fn map_http_error(status: StatusCode, body: &str) -> CloudError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CloudError::Auth(message),
        _ => CloudError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Passes successful responses through and turns the rest into [`CloudError`].
async fn check(response: Response) -> Result<Response, CloudError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read Google error body".to_string());
    Err(map_http_error(status, &body))
}
