use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use svckit::config::{ApiConfig, AuthConfig, ObservabilityConfig, PollConfig};
use svckit::ClinicError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueDashConfig {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub poll: PollConfig,
    pub observability: ObservabilityConfig,
    /// Serve fixtures instead of talking to the API.
    pub demo: bool,
}

impl QueueDashConfig {
    pub fn validate(&self) -> Result<(), ClinicError> {
        let url = self.api.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClinicError::Config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        if self.api.request_timeout_ms == 0 {
            return Err(ClinicError::Config(
                "api.request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Optional file at `path`, then `QUEUE_DASH__SECTION__KEY` environment
/// overrides. Missing keys fall back to defaults.
pub fn load_config(path: &str) -> Result<QueueDashConfig> {
    let config = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(Environment::with_prefix("QUEUE_DASH").separator("__"))
        .build()?;

    let config: QueueDashConfig = config.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
