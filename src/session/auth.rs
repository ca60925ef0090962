//! Wire types for the device login call.
//!
//! The device API wraps every command in a JSON array, so a login request
//! is `[{"cmd":"Login","param":{"User":{...}}}]` and the response mirrors
//! that shape with a `code` per element.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub cmd: String,
    pub param: LoginParam,
}

#[derive(Debug, Serialize)]
pub struct LoginParam {
    #[serde(rename = "User")]
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            cmd: "Login".to_string(),
            param: LoginParam {
                user: LoginUser {
                    version: "0".to_string(),
                    user_name: username.to_string(),
                    password: password.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub cmd: Option<String>,
    /// Device result code; 0 means success.
    pub code: i64,
    pub value: Option<LoginValue>,
}

#[derive(Debug, Deserialize)]
pub struct LoginValue {
    #[serde(rename = "Token")]
    pub token: DeviceToken,
}

#[derive(Debug, Deserialize)]
pub struct DeviceToken {
    pub name: String,
    #[serde(rename = "leaseTime")]
    pub lease_time: Option<u64>,
}
