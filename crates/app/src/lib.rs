//! PIX Todo Dia application composition root
//!
//! Wires configuration into a backend client and the session core.

use std::time::Duration;

use pixdia_backend::{BackendConfig, BackendFactory};
use pixdia_common::{Config, Error, Result};
use pixdia_session::{SessionClient, SessionOptions};

/// Build the session client for the configured backend. `bootstrap()` is the
/// caller's responsibility so embedders control when the triggers start.
pub fn create_platform(config: &Config) -> Result<SessionClient> {
    let backend_config = BackendConfig {
        provider: config.backend_provider.clone(),
        platform_url: config.platform_url.clone(),
        anon_key: config.platform_anon_key.clone(),
        site_url: config.site_url.clone(),
    };
    let backend =
        BackendFactory::create(backend_config).map_err(|e| Error::Backend(e.to_string()))?;

    let options = SessionOptions {
        capability_timeout: Duration::from_millis(config.bootstrap_timeout_ms),
        site_url: config.site_url.clone(),
    };
    Ok(SessionClient::with_options(backend, options))
}
