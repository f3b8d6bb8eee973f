//! HTTP client construction.

use reqwest::{Client, Proxy};
use tracing::{debug, info};

use crate::config::{ProxySettings, TransportConfig};
use crate::error::PublishError;

/// Build the proxy route for the client.
fn build_proxy(settings: &ProxySettings) -> Result<Proxy, PublishError> {
    let mut proxy = Proxy::all(settings.url())
        .map_err(|e| PublishError::Transport(format!("invalid proxy {}: {e}", settings.url())))?;

    if let Some(auth) = &settings.auth {
        info!(user = %auth.username, "Using proxy authentication");
        proxy = proxy.basic_auth(&auth.username, &auth.password);
    }

    Ok(proxy)
}

/// Build an HTTP client for delivering to `endpoint`.
///
/// The configured proxy is used unless the endpoint host matches one of its
/// no-proxy patterns. Proxies from the process environment are never used.
///
/// # Errors
///
/// Returns [`PublishError::Transport`] if the proxy or TLS setup is rejected.
pub fn build_client(config: &TransportConfig, endpoint: &str) -> Result<Client, PublishError> {
    let mut builder = Client::builder()
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .danger_accept_invalid_certs(config.tls_trust.accepts_invalid_certs())
        .danger_accept_invalid_hostnames(!config.tls_trust.verifies_hostname());

    builder = match &config.proxy {
        Some(proxy) if proxy.no_proxy.is_proxy_required(endpoint) => {
            debug!(proxy = %proxy.url(), "Routing through proxy");
            builder.proxy(build_proxy(proxy)?)
        }
        _ => builder.no_proxy(),
    };

    builder
        .build()
        .map_err(|e| PublishError::Transport(e.to_string()))
}
