use crate::error::CameraError;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// HTTP client for talking to the camera device.
///
/// The device presents a self-signed certificate and offers no way to
/// verify it, so certificate validation is disabled on this client. It
/// must never be used to reach anything but the camera.
#[derive(Debug)]
pub struct CameraHttpClient {
    client: Client,
    base_url: String,
}

impl CameraHttpClient {
    /// Creates a client rooted at `base_url` with a per-request `timeout`
    /// in seconds.
    pub fn new(base_url: &str, timeout: u64) -> Result<Self, CameraError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Sends a JSON POST to the given endpoint and deserializes the
    /// response body. Non-success statuses map to `CameraError`.
    #[instrument(skip(self, body))]
    pub async fn post_json<T: DeserializeOwned + Debug, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, CameraError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Sending POST request to {}", url);

        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            error!("Camera POST failed with status {}", status);
            return Err(Self::status_error(status));
        }

        let body_text = response.text().await?;
        debug!("Response body: {}", body_text);

        let parsed: T = serde_json::from_str(&body_text)?;
        Ok(parsed)
    }

    /// Sends a GET request and returns the raw body bytes. 401 maps to
    /// `TokenExpired` so the session can discard its token and retry.
    #[instrument(skip(self))]
    pub async fn get_bytes(&self, endpoint: &str) -> Result<Vec<u8>, CameraError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Sending GET request to {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            error!("Camera GET failed with status {}", status);
            return Err(Self::status_error(status));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    fn status_error(status: StatusCode) -> CameraError {
        if status == StatusCode::UNAUTHORIZED {
            CameraError::TokenExpired
        } else {
            CameraError::Unexpected(status)
        }
    }
}
