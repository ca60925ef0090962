use crate::config::Config;
use crate::constants::{LOGIN_ENDPOINT, SNAPSHOT_FILENAME, SNAPSHOT_TMP_FILENAME, SNAP_ENDPOINT};
use crate::error::{CameraError, CropError};
use crate::imaging::crop::crop_in_place;
use crate::session::auth::{LoginRequest, LoginResponse};
use crate::transport::http_client::CameraHttpClient;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};

/// Owns the authentication token and drives snapshot retrieval.
///
/// The token is held exclusively here; the presentation server never sees
/// authentication state. A `Some` token was always issued by a successful
/// login, and any authorization failure clears it before a retry.
#[derive(Debug)]
pub struct CameraSession {
    client: CameraHttpClient,
    config: Config,
    token: Option<String>,
}

impl CameraSession {
    pub fn new(config: Config) -> Result<Self, CameraError> {
        let base_url = config.camera.base_url();
        Self::with_base_url(config, &base_url)
    }

    /// Builds a session against an explicit base URL instead of the one
    /// derived from the configured device IP.
    pub fn with_base_url(config: Config, base_url: &str) -> Result<Self, CameraError> {
        let client = CameraHttpClient::new(base_url, config.camera.timeout)?;
        Ok(Self {
            client,
            config,
            token: None,
        })
    }

    /// Authenticates against the device and stores the issued token.
    ///
    /// On any failure the token is cleared before the error is returned,
    /// so a held token always comes from a successful login.
    #[instrument(skip(self))]
    pub async fn login(&mut self) -> Result<(), CameraError> {
        debug!("Logging in to camera {}", self.config.camera.ip);

        let request = [LoginRequest::new(
            &self.config.credentials.username,
            &self.config.credentials.password,
        )];

        let responses: Vec<LoginResponse> =
            match self.client.post_json(LOGIN_ENDPOINT, &request).await {
                Ok(responses) => responses,
                Err(e) => {
                    self.token = None;
                    return Err(e);
                }
            };

        let Some(first) = responses.into_iter().next() else {
            self.token = None;
            error!("Login response was an empty array");
            return Err(CameraError::LoginRejected(-1));
        };

        if first.code != 0 {
            self.token = None;
            error!("Login rejected with device code {}", first.code);
            return Err(CameraError::LoginRejected(first.code));
        }

        match first.value {
            Some(value) => {
                info!("Login successful, token received");
                self.token = Some(value.token.name);
                Ok(())
            }
            None => {
                self.token = None;
                error!("Login response carried code 0 but no token");
                Err(CameraError::LoginRejected(0))
            }
        }
    }

    /// Fetches the current frame and persists it at the snapshot path.
    ///
    /// Logs in first when no token is held. A 401 or transport failure is
    /// retried exactly once behind a fresh login; a second failure yields
    /// `None`. No error escapes, the polling driver treats `None` as "try
    /// again next cycle".
    #[instrument(skip(self))]
    pub async fn fetch_image(&mut self) -> Option<PathBuf> {
        if self.token.is_none() {
            debug!("No token held, logging in before snapshot");
            if let Err(e) = self.login().await {
                error!("Login failed, skipping snapshot: {}", e);
                return None;
            }
        }

        let token = self.token.clone()?;
        let first_error = match self.try_snapshot(&token).await {
            Ok(path) => return Some(path),
            Err(e) => e,
        };

        match &first_error {
            CameraError::TokenExpired => warn!("Token expired, re-authenticating"),
            e => error!("Snapshot fetch failed: {}, re-authenticating", e),
        }
        self.token = None;

        // Single bounded retry behind a fresh login.
        if let Err(e) = self.login().await {
            error!("Re-login failed, giving up this cycle: {}", e);
            return None;
        }
        let token = self.token.clone()?;
        match self.try_snapshot(&token).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Snapshot retry failed, giving up this cycle: {}", e);
                None
            }
        }
    }

    /// Path of the single persisted snapshot.
    pub fn snapshot_path(&self) -> PathBuf {
        Path::new(&self.config.storage.save_dir).join(SNAPSHOT_FILENAME)
    }

    async fn try_snapshot(&self, token: &str) -> Result<PathBuf, CameraError> {
        let endpoint = format!("{}&token={}", SNAP_ENDPOINT, token);
        let bytes = self.client.get_bytes(&endpoint).await?;

        // Write to a temp file and rename into place so readers always
        // see a complete frame, old or new.
        let path = self.snapshot_path();
        let tmp = Path::new(&self.config.storage.save_dir).join(SNAPSHOT_TMP_FILENAME);
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &path).await?;
        info!("Snapshot stored at {}", path.display());

        // Decode/re-encode is CPU-bound; keep it off the async runtime.
        let insets = self.config.crop;
        let crop_target = path.clone();
        match tokio::task::spawn_blocking(move || crop_in_place(&crop_target, &insets)).await {
            Ok(Ok(())) => debug!("Crop applied: {}", insets),
            Ok(Err(CropError::InvalidBox { .. })) => {
                warn!(
                    "Crop insets {} do not fit the frame, image kept uncropped",
                    insets
                );
            }
            Ok(Err(e)) => error!("Crop failed, image kept uncropped: {}", e),
            Err(e) => error!("Crop task failed, image kept uncropped: {}", e),
        }

        Ok(path)
    }
}
