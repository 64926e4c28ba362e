use reqwest::Url;

use super::{ConfigError, RelayConfig};

pub fn validate_config(config: &RelayConfig) -> Result<(), ConfigError> {
    validate_http_url("rag.base_url", &config.rag.base_url)?;
    validate_http_url("inference.base_url", &config.inference.base_url)?;

    if config.inference.model.trim().is_empty() {
        return Err(invalid("inference.model", "must not be empty"));
    }
    if config.inference.max_tokens == 0 {
        return Err(invalid("inference.max_tokens", "must be greater than 0"));
    }
    let temperature = config.inference.temperature;
    if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
        return Err(invalid(
            "inference.temperature",
            format!("{} is outside 0.0..=2.0", temperature),
        ));
    }
    if config.upstream.timeout_secs == Some(0) {
        return Err(invalid("upstream.timeout_secs", "must be greater than 0"));
    }
    if config.server.host.trim().is_empty() {
        return Err(invalid("server.host", "must not be empty"));
    }

    Ok(())
}

fn validate_http_url(field: &'static str, raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw).map_err(|e| invalid(field, format!("{raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(field, format!("unsupported scheme {other:?}"))),
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
