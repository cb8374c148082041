//! Configuration validation
//!
//! Checks made at startup, after `Config::validate`. Google settings are left
//! alone here; their absence is reported when first used.

use anyhow::Result;
use ragdesk_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
    }

    let poll = config.poll_settings();
    if poll.initial_interval > poll.timeout {
        tracing::warn!(
            initial_interval_ms = poll.initial_interval.as_millis() as u64,
            timeout_secs = poll.timeout.as_secs(),
            "Upload poll interval exceeds the total wait; uploads will time out after one check"
        );
    }

    Ok(())
}
