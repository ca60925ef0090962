use reqwest::StatusCode;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::io;

/// Errors from the camera-facing pipeline. None of these ever reach the
/// presentation server; they terminate in a log line inside the session
/// manager or the polling driver.
#[derive(Debug)]
pub enum CameraError {
    Network(reqwest::Error),
    Io(io::Error),
    Json(serde_json::Error),
    /// The device answered the login call with a non-zero result code.
    LoginRejected(i64),
    /// HTTP 401 on an authenticated call; the token must be discarded.
    TokenExpired,
    Unexpected(StatusCode),
}

impl Display for CameraError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::Network(e) => write!(f, "network error: {e}"),
            CameraError::Io(e) => write!(f, "io error: {e}"),
            CameraError::Json(e) => write!(f, "json error: {e}"),
            CameraError::LoginRejected(code) => write!(f, "login rejected: device code {code}"),
            CameraError::TokenExpired => write!(f, "session token expired"),
            CameraError::Unexpected(s) => write!(f, "unexpected http status: {s}"),
        }
    }
}

impl std::error::Error for CameraError {}

impl From<reqwest::Error> for CameraError {
    fn from(e: reqwest::Error) -> Self {
        CameraError::Network(e)
    }
}
impl From<io::Error> for CameraError {
    fn from(e: io::Error) -> Self {
        CameraError::Io(e)
    }
}
impl From<serde_json::Error> for CameraError {
    fn from(e: serde_json::Error) -> Self {
        CameraError::Json(e)
    }
}

/// Errors from the crop transform. The caller logs these and keeps the
/// uncropped snapshot; they are never fatal.
#[derive(Debug)]
pub enum CropError {
    /// The configured insets do not form a valid box inside the image.
    InvalidBox {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
        width: u32,
        height: u32,
    },
    Image(image::ImageError),
    Io(io::Error),
}

impl Display for CropError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CropError::InvalidBox {
                left,
                top,
                right,
                bottom,
                width,
                height,
            } => write!(
                f,
                "invalid crop box ({left},{top})-({right},{bottom}) for {width}x{height} image"
            ),
            CropError::Image(e) => write!(f, "image error: {e}"),
            CropError::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for CropError {}

impl From<image::ImageError> for CropError {
    fn from(e: image::ImageError) -> Self {
        CropError::Image(e)
    }
}
impl From<io::Error> for CropError {
    fn from(e: io::Error) -> Self {
        CropError::Io(e)
    }
}
