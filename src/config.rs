//! Runtime configuration resolved from the environment.
//!
//! | Variable                    | Default                                   |
//! |-----------------------------|-------------------------------------------|
//! | `EZEATS_DATA_DIR`           | platform data dir + `app.ezeats.staff`    |
//! | `EZEATS_LOG_DIR`            | `<data dir>/logs`                         |
//! | `EZEATS_SIMULATED_DELAY_MS` | `1000`                                    |
//! | `EZEATS_MANAGER_CODE`       | `1234`                                    |
//! | `EZEATS_MANAGER_CODE_HASH`  | unset (bcrypt hash, overrides the code)   |
//!
//! Log verbosity follows `RUST_LOG` (see `lib.rs`).

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::manager_auth::DEFAULT_MANAGER_CODE;
use crate::sign_in::DEFAULT_SIMULATED_DELAY;

const APP_DIR_NAME: &str = "app.ezeats.staff";

pub const ENV_DATA_DIR: &str = "EZEATS_DATA_DIR";
pub const ENV_LOG_DIR: &str = "EZEATS_LOG_DIR";
pub const ENV_SIMULATED_DELAY_MS: &str = "EZEATS_SIMULATED_DELAY_MS";
pub const ENV_MANAGER_CODE: &str = "EZEATS_MANAGER_CODE";
pub const ENV_MANAGER_CODE_HASH: &str = "EZEATS_MANAGER_CODE_HASH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Latency of the simulated SMS, OTP and manager-code checks.
    pub simulated_delay: Duration,
    pub manager_code: String,
    pub manager_code_hash: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let data_dir = non_empty_var(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let log_dir = non_empty_var(ENV_LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("logs"));

        let simulated_delay = match non_empty_var(ENV_SIMULATED_DELAY_MS) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    warn!(value = %raw, "ignoring invalid {ENV_SIMULATED_DELAY_MS}");
                    DEFAULT_SIMULATED_DELAY
                }
            },
            None => DEFAULT_SIMULATED_DELAY,
        };

        let manager_code = match non_empty_var(ENV_MANAGER_CODE) {
            Some(code) if is_keypad_code(&code) => code,
            Some(_) => {
                warn!("ignoring {ENV_MANAGER_CODE}: expected exactly 4 digits");
                DEFAULT_MANAGER_CODE.to_string()
            }
            None => DEFAULT_MANAGER_CODE.to_string(),
        };

        Self {
            data_dir,
            log_dir,
            simulated_delay,
            manager_code,
            manager_code_hash: non_empty_var(ENV_MANAGER_CODE_HASH),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_keypad_code(code: &str) -> bool {
    code.len() == crate::manager_auth::CODE_LENGTH && code.chars().all(|c| c.is_ascii_digit())
}

fn default_data_dir() -> PathBuf {
    let base = std::env::var("LOCALAPPDATA")
        .or_else(|_| std::env::var("XDG_DATA_HOME"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(target_os = "windows")]
            {
                PathBuf::from(std::env::var("USERPROFILE").unwrap_or_else(|_| ".".into()))
                    .join("AppData")
                    .join("Local")
            }
            #[cfg(not(target_os = "windows"))]
            {
                PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()))
                    .join(".local")
                    .join("share")
            }
        });
    base.join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: [&str; 5] = [
        ENV_DATA_DIR,
        ENV_LOG_DIR,
        ENV_SIMULATED_DELAY_MS,
        ENV_MANAGER_CODE,
        ENV_MANAGER_CODE_HASH,
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn defaults_without_environment() {
        clear_env();
        let config = AppConfig::from_env();
        assert!(config.data_dir.ends_with(APP_DIR_NAME));
        assert_eq!(config.log_dir, config.data_dir.join("logs"));
        assert_eq!(config.simulated_delay, DEFAULT_SIMULATED_DELAY);
        assert_eq!(config.manager_code, DEFAULT_MANAGER_CODE);
        assert_eq!(config.manager_code_hash, None);
    }

    #[test]
    #[serial]
    fn environment_overrides() {
        clear_env();
        std::env::set_var(ENV_DATA_DIR, "/tmp/ezeats-data");
        std::env::set_var(ENV_SIMULATED_DELAY_MS, "0");
        std::env::set_var(ENV_MANAGER_CODE, "0000");

        let config = AppConfig::from_env();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/ezeats-data"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/ezeats-data/logs"));
        assert_eq!(config.simulated_delay, Duration::ZERO);
        assert_eq!(config.manager_code, "0000");
        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_values_fall_back_to_defaults() {
        clear_env();
        std::env::set_var(ENV_SIMULATED_DELAY_MS, "soon");
        std::env::set_var(ENV_MANAGER_CODE, "12ab5");
        std::env::set_var(ENV_LOG_DIR, "   ");

        let config = AppConfig::from_env();
        assert_eq!(config.simulated_delay, DEFAULT_SIMULATED_DELAY);
        assert_eq!(config.manager_code, DEFAULT_MANAGER_CODE);
        assert_eq!(config.log_dir, config.data_dir.join("logs"));
        clear_env();
    }
}
