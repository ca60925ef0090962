use crate::constants::DEFAULT_USERNAME;
use crate::imaging::crop::CropInsets;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;
use tracing::error;

#[derive(Debug, Deserialize, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub camera: CameraConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub crop: CropInsets,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    pub ip: String,
    /// Per-request timeout towards the camera, in seconds.
    pub timeout: u64,
    /// Seconds between capture cycles.
    pub poll_interval: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Client-side image refresh interval, in milliseconds.
    pub refresh_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub save_dir: String,
}

impl CameraConfig {
    /// Base URL of the device API. The camera only speaks HTTPS with a
    /// self-signed certificate.
    pub fn base_url(&self) -> String {
        format!("https://{}", self.ip)
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"username\":\"{}\",\"password\":\"[REDACTED]\"}}",
            self.username
        )
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"credentials\":{},\"camera\":{},\"server\":{},\"storage\":{},\"crop\":{}}}",
            self.credentials, self.camera, self.server, self.storage, self.crop
        )
    }
}

impl fmt::Display for CameraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"ip\":\"{}\",\"timeout\":{},\"poll_interval\":{}}}",
            self.ip, self.timeout, self.poll_interval
        )
    }
}

impl fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"port\":{},\"refresh_interval_ms\":{}}}",
            self.port, self.refresh_interval_ms
        )
    }
}

impl fmt::Display for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"save_dir\":\"{}\"}}", self.save_dir)
    }
}

pub fn get_env_or_default<T: FromStr>(env_var: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    match env::var(env_var) {
        Ok(val) => val.parse::<T>().unwrap_or_else(|_| {
            error!("Failed to parse {}: {}, using default", env_var, val);
            default
        }),
        Err(_) => default,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Config {
            credentials: Credentials {
                username: get_env_or_default(
                    "CAMERA_USERNAME",
                    String::from(DEFAULT_USERNAME),
                ),
                password: get_env_or_default("PASSWORD", String::new()),
            },
            camera: CameraConfig {
                ip: get_env_or_default("CAMERA_IP", String::from("192.168.1.10")),
                timeout: get_env_or_default("CAMERA_TIMEOUT", 5),
                poll_interval: get_env_or_default("POLL_INTERVAL", 5),
            },
            server: ServerConfig {
                port: get_env_or_default("PORT", 8000),
                refresh_interval_ms: get_env_or_default("TIMETOLOAD", 5000),
            },
            storage: StorageConfig {
                save_dir: get_env_or_default("SAVE_DIR", String::from("./images")),
            },
            crop: CropInsets {
                left: get_env_or_default("CROP_LEFT", 0),
                top: get_env_or_default("CROP_TOP", 0),
                right: get_env_or_default("CROP_RIGHT", 0),
                bottom: get_env_or_default("CROP_BOTTOM", 0),
            },
        }
    }
}

#[cfg(test)]
mod tests_config {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn with_env_vars<F>(vars: Vec<(&str, &str)>, test: F)
    where
        F: FnOnce(),
    {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut old_vars = Vec::new();

        for (key, value) in vars {
            old_vars.push((key, env::var(key).ok()));
            env::set_var(key, value);
        }

        test();

        for (key, value) in old_vars {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }

    #[test]
    fn test_config_new() {
        with_env_vars(
            vec![
                ("CAMERA_IP", "10.0.0.42"),
                ("CAMERA_USERNAME", "operator"),
                ("PASSWORD", "hunter2"),
                ("SAVE_DIR", "/var/lib/camsnap"),
                ("PORT", "9000"),
                ("TIMETOLOAD", "2500"),
                ("CROP_LEFT", "100"),
                ("CROP_TOP", "50"),
                ("CROP_RIGHT", "100"),
                ("CROP_BOTTOM", "50"),
            ],
            || {
                let config = Config::new();

                assert_eq!(config.camera.ip, "10.0.0.42");
                assert_eq!(config.credentials.username, "operator");
                assert_eq!(config.credentials.password, "hunter2");
                assert_eq!(config.storage.save_dir, "/var/lib/camsnap");
                assert_eq!(config.server.port, 9000);
                assert_eq!(config.server.refresh_interval_ms, 2500);
                assert_eq!(config.crop.left, 100);
                assert_eq!(config.crop.top, 50);
                assert_eq!(config.crop.right, 100);
                assert_eq!(config.crop.bottom, 50);
            },
        );
    }

    #[test]
    fn test_default_values() {
        with_env_vars(vec![], || {
            let config = Config::new();

            assert_eq!(config.credentials.username, "admin");
            assert_eq!(config.credentials.password, "");
            assert_eq!(config.camera.ip, "192.168.1.10");
            assert_eq!(config.camera.timeout, 5);
            assert_eq!(config.camera.poll_interval, 5);
            assert_eq!(config.server.port, 8000);
            assert_eq!(config.server.refresh_interval_ms, 5000);
            assert_eq!(config.storage.save_dir, "./images");
            assert_eq!(config.crop.left, 0);
        });
    }

    #[test]
    fn test_invalid_value_falls_back_to_default() {
        with_env_vars(vec![("PORT", "not-a-port")], || {
            let config = Config::new();
            assert_eq!(config.server.port, 8000);
        });
    }

    #[test]
    fn test_base_url() {
        let camera = CameraConfig {
            ip: "10.1.2.3".to_string(),
            timeout: 5,
            poll_interval: 5,
        };
        assert_eq!(camera.base_url(), "https://10.1.2.3");
    }
}
