//! Service configuration.
//!
//! Configuration is an immutable snapshot handed to a publisher when it is
//! constructed. It can be assembled directly or read from environment
//! variables:
//!
//! - `MATTERMOST_ENDPOINT`: incoming-webhook URL (required)
//! - `MATTERMOST_CHANNEL`: routing string, e.g. `alice@town-square;@bob`
//! - `MATTERMOST_ICON_URL`: avatar shown next to the message
//! - `MATTERMOST_TLS_TRUST`: `strict`, `ignore-hostname` or `trust-self-signed`
//! - `MATTERMOST_PROXY_HOST` / `MATTERMOST_PROXY_PORT`: HTTP proxy
//! - `MATTERMOST_PROXY_USER` / `MATTERMOST_PROXY_PASSWORD`: proxy credentials
//! - `MATTERMOST_NO_PROXY`: hosts reached directly, as globs

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::proxy::ProxyRule;

const ENV_ENDPOINT: &str = "MATTERMOST_ENDPOINT";
const ENV_CHANNEL: &str = "MATTERMOST_CHANNEL";
const ENV_ICON_URL: &str = "MATTERMOST_ICON_URL";
const ENV_TLS_TRUST: &str = "MATTERMOST_TLS_TRUST";
const ENV_PROXY_HOST: &str = "MATTERMOST_PROXY_HOST";
const ENV_PROXY_PORT: &str = "MATTERMOST_PROXY_PORT";
const ENV_PROXY_USER: &str = "MATTERMOST_PROXY_USER";
const ENV_PROXY_PASSWORD: &str = "MATTERMOST_PROXY_PASSWORD";
const ENV_NO_PROXY: &str = "MATTERMOST_NO_PROXY";

/// Default connect and read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Webhook endpoint, routing and icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Incoming-webhook URL
    pub endpoint: String,
    /// Routing string, see [`crate::routing`]
    pub channel_spec: String,
    /// Icon URL sent verbatim as `icon_url`
    pub icon_url: String,
}

impl ServiceConfig {
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        channel_spec: impl Into<String>,
        icon_url: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            channel_spec: channel_spec.into(),
            icon_url: icon_url.into(),
        }
    }

    /// Read the service configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `MATTERMOST_ENDPOINT` is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = non_empty_var(ENV_ENDPOINT).ok_or(ConfigError::Missing(ENV_ENDPOINT))?;
        Ok(Self {
            endpoint,
            channel_spec: std::env::var(ENV_CHANNEL).unwrap_or_default(),
            icon_url: std::env::var(ENV_ICON_URL).unwrap_or_default(),
        })
    }
}

/// Credentials presented to the proxy, never to the webhook.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ProxyAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// HTTP proxy used to reach the webhook.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
    pub auth: Option<ProxyAuth>,
    /// Hosts reached without the proxy
    pub no_proxy: ProxyRule,
}

impl ProxySettings {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            auth: None,
            no_proxy: ProxyRule::default(),
        }
    }

    /// Attach credentials. An empty username leaves the proxy unauthenticated.
    #[must_use]
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.auth = (!username.is_empty()).then(|| ProxyAuth {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    #[must_use]
    pub fn with_no_proxy(mut self, rule: ProxyRule) -> Self {
        self.no_proxy = rule;
        self
    }

    /// Proxy URL handed to the HTTP client.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Read proxy settings from environment variables.
    ///
    /// Returns `Ok(None)` when `MATTERMOST_PROXY_HOST` is unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the port or a no-proxy pattern is invalid.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(host) = non_empty_var(ENV_PROXY_HOST) else {
            return Ok(None);
        };

        let port = match non_empty_var(ENV_PROXY_PORT) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: ENV_PROXY_PORT,
                value: raw,
            })?,
            None => 80,
        };

        let username = std::env::var(ENV_PROXY_USER).unwrap_or_default();
        let password = std::env::var(ENV_PROXY_PASSWORD).unwrap_or_default();
        let no_proxy = ProxyRule::from_no_proxy_hosts(
            &std::env::var(ENV_NO_PROXY).unwrap_or_default(),
        )?;

        Ok(Some(
            Self::new(host, port)
                .with_credentials(&username, &password)
                .with_no_proxy(no_proxy),
        ))
    }
}

/// How far server certificates are trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsTrust {
    /// Verify the chain and the hostname
    Strict,
    /// Verify the chain, accept any hostname
    IgnoreHostname,
    /// Accept self-signed and otherwise unverifiable certificates.
    ///
    /// Hostname checks are skipped as well.
    #[default]
    TrustSelfSigned,
}

impl TlsTrust {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::IgnoreHostname => "ignore-hostname",
            Self::TrustSelfSigned => "trust-self-signed",
        }
    }

    #[must_use]
    pub const fn accepts_invalid_certs(&self) -> bool {
        matches!(self, Self::TrustSelfSigned)
    }

    #[must_use]
    pub const fn verifies_hostname(&self) -> bool {
        matches!(self, Self::Strict)
    }

    /// Read `MATTERMOST_TLS_TRUST`, falling back to the default policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable holds an unknown policy.
    pub fn from_env() -> Result<Self, ConfigError> {
        non_empty_var(ENV_TLS_TRUST).map_or(Ok(Self::default()), |v| v.parse())
    }
}

impl FromStr for TlsTrust {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "ignore-hostname" => Ok(Self::IgnoreHostname),
            "trust-self-signed" | "trust-all-self-signed" => Ok(Self::TrustSelfSigned),
            _ => Err(ConfigError::Invalid {
                name: ENV_TLS_TRUST,
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TlsTrust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings of the HTTP client used for delivery.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub proxy: Option<ProxySettings>,
    pub tls_trust: TlsTrust,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            proxy: None,
            tls_trust: TlsTrust::default(),
        }
    }
}

impl TransportConfig {
    /// Read proxy and TLS settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a proxy or TLS setting is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            proxy: ProxySettings::from_env()?,
            tls_trust: TlsTrust::from_env()?,
            ..Self::default()
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
