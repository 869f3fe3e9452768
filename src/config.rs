//! Bridge connection settings and controller tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::types::MirekRange;

type Result<T> = std::result::Result<T, Error>;

/// Connection settings for a Hue bridge.
///
/// Passed explicitly to [`HttpClient::new`](crate::HttpClient::new); nothing in
/// the crate reads the environment on its own.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Host name or IP address of the bridge.
    pub host: String,
    /// Application key obtained when pairing with the bridge.
    pub app_key: String,
    /// Per-request timeout in milliseconds. Must be non-zero.
    #[serde(default = "BridgeConfig::default_timeout_ms")]
    pub timeout_ms: u64,
    /// The bridge serves a self-signed certificate.
    #[serde(default = "BridgeConfig::default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
}

impl BridgeConfig {
    pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
    pub const HOST_ENV: &'static str = "HUE_BRIDGE_IP";
    pub const APP_KEY_ENV: &'static str = "HUE_APP_KEY";
    const APP_KEY_ENV_FALLBACK: &'static str = "APP_KEY";

    pub fn new(host: &str, app_key: &str) -> Self {
        BridgeConfig {
            host: host.to_string(),
            app_key: app_key.to_string(),
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            accept_invalid_certs: Self::default_accept_invalid_certs(),
        }
    }

    /// Read `HUE_BRIDGE_IP` and `HUE_APP_KEY` (or `APP_KEY`).
    pub fn from_env() -> Result<Self> {
        let host = std::env::var(Self::HOST_ENV)
            .map_err(|_| Error::InvalidConfig(format!("missing env var {}", Self::HOST_ENV)))?;
        let app_key = std::env::var(Self::APP_KEY_ENV)
            .or_else(|_| std::env::var(Self::APP_KEY_ENV_FALLBACK))
            .map_err(|_| {
                Error::InvalidConfig(format!("missing env var {}", Self::APP_KEY_ENV))
            })?;

        let config = Self::new(host.trim(), app_key.trim());
        config.validate()?;
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Root of the resource API, e.g. `https://192.168.1.2/clip/v2/resource`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_lights_rs::BridgeConfig;
    ///
    /// let config = BridgeConfig::new("192.168.1.2", "key");
    /// assert_eq!(config.base_url(), "https://192.168.1.2/clip/v2/resource");
    /// ```
    pub fn base_url(&self) -> String {
        format!("https://{}/clip/v2/resource", self.host.trim_end_matches('/'))
    }

    /// Check the settings are usable before building a client.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::InvalidConfig("bridge host is empty".into()));
        }
        if self.app_key.trim().is_empty() {
            return Err(Error::InvalidConfig("application key is empty".into()));
        }
        if self.timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "request timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }

    fn default_timeout_ms() -> u64 {
        Self::DEFAULT_TIMEOUT_MS
    }

    fn default_accept_invalid_certs() -> bool {
        true
    }
}

/// Tuning for a [`GroupController`](crate::GroupController).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ControllerOptions {
    /// Brightness changes at or below this many percentage points are skipped.
    pub brightness_epsilon: f64,
    /// Band color temperature requests are clamped into.
    pub mirek_range: MirekRange,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        ControllerOptions {
            brightness_epsilon: Self::DEFAULT_EPSILON,
            mirek_range: MirekRange::default(),
        }
    }
}

impl ControllerOptions {
    pub const DEFAULT_EPSILON: f64 = 0.05;

    /// Reject an epsilon that would silently disable brightness debouncing.
    pub fn validate(&self) -> Result<()> {
        if !self.brightness_epsilon.is_finite() || self.brightness_epsilon < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "brightness epsilon must be a non-negative number, got {}",
                self.brightness_epsilon
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"host": "10.0.0.2", "app_key": "abc"}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.accept_invalid_certs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = BridgeConfig::new("10.0.0.2", "abc").with_timeout(Duration::ZERO);
        assert_eq!(
            config.validate(),
            Err(Error::InvalidConfig("request timeout must be non-zero".into()))
        );
    }

    #[test]
    fn test_controller_options_epsilon() {
        assert!(ControllerOptions::default().validate().is_ok());

        let zero = ControllerOptions {
            brightness_epsilon: 0.0,
            ..ControllerOptions::default()
        };
        assert!(zero.validate().is_ok());

        for bad in [-0.1, f64::NAN, f64::INFINITY] {
            let options = ControllerOptions {
                brightness_epsilon: bad,
                ..ControllerOptions::default()
            };
            assert!(matches!(options.validate(), Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(BridgeConfig::new(" ", "abc").validate().is_err());
        assert!(BridgeConfig::new("10.0.0.2", "").validate().is_err());
    }
}
