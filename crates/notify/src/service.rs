//! Delivery of notifications to the configured webhook.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use tracing::{debug, info, warn};

use crate::config::{ServiceConfig, TransportConfig};
use crate::error::{ConfigError, PublishError};
use crate::payload::NotificationPayload;
use crate::routing::{parse_channel_spec, Destination};
use crate::transport::build_client;

/// Environment variable to disable delivery.
const ENV_DISABLED: &str = "MATTERMOST_DISABLED";

/// Attachment color used when the caller does not pick one.
pub const DEFAULT_COLOR: &str = "warning";

const JSON_UTF8: &str = "application/json; charset=UTF-8";

/// Something that can post a message to Mattermost.
///
/// CI integrations hold a `dyn MattermostService` so tests can swap in a
/// recording double.
#[async_trait]
pub trait MattermostService: Send + Sync {
    /// Post `message` with `text` above it to every configured destination.
    ///
    /// Returns `true` only if every destination accepted the message.
    async fn publish(&self, message: &str, text: &str, color: &str) -> bool;

    /// Post `message` with no top-level text.
    async fn publish_with_color(&self, message: &str, color: &str) -> bool {
        self.publish(message, "", color).await
    }

    /// Post `message` in the default color.
    async fn publish_message(&self, message: &str) -> bool {
        self.publish_with_color(message, DEFAULT_COLOR).await
    }
}

/// Outcome of posting to one destination.
#[derive(Debug)]
pub struct Delivery {
    pub destination: Destination,
    pub result: Result<(), PublishError>,
}

impl Delivery {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Posts notifications to a Mattermost incoming webhook.
///
/// The configuration is fixed at construction; build a new publisher to
/// change it.
#[derive(Debug, Clone)]
pub struct MattermostPublisher {
    config: ServiceConfig,
    transport: TransportConfig,
    disabled: bool,
}

impl MattermostPublisher {
    #[must_use]
    pub const fn new(config: ServiceConfig, transport: TransportConfig) -> Self {
        Self {
            config,
            transport,
            disabled: false,
        }
    }

    /// Create a publisher from environment variables.
    ///
    /// If `MATTERMOST_DISABLED` is `true` or `1` a disabled publisher is
    /// returned without reading anything else.
    ///
    /// # Errors
    ///
    /// Returns an error if a required setting is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let disabled = std::env::var(ENV_DISABLED)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        if disabled {
            info!("Mattermost notifications disabled via MATTERMOST_DISABLED");
            return Ok(Self::disabled());
        }

        Ok(Self::new(
            ServiceConfig::from_env()?,
            TransportConfig::from_env()?,
        ))
    }

    /// Create a publisher that accepts every message without sending it.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            config: ServiceConfig::new("", "", ""),
            transport: TransportConfig::default(),
            disabled: true,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    #[must_use]
    pub const fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Destinations named by the routing string, in order.
    #[must_use]
    pub fn destinations(&self) -> Vec<Destination> {
        parse_channel_spec(&self.config.channel_spec)
    }

    /// Post to every destination and report each outcome.
    ///
    /// A failure never stops the remaining destinations from being tried.
    pub async fn publish_detailed(&self, message: &str, text: &str, color: &str) -> Vec<Delivery> {
        if self.disabled {
            debug!("Mattermost notifications disabled, skipping message");
            return vec![];
        }

        let host = self.endpoint_host();
        let mut deliveries = vec![];

        for destination in self.destinations() {
            let result = self.deliver(&destination, message, text, color).await;

            if let Err(e) = &result {
                warn!(
                    destination = %destination.label(),
                    host = %host,
                    error = %e,
                    "Error posting to Mattermost"
                );
            }

            deliveries.push(Delivery {
                destination,
                result,
            });
        }

        deliveries
    }

    async fn deliver(
        &self,
        destination: &Destination,
        message: &str,
        text: &str,
        color: &str,
    ) -> Result<(), PublishError> {
        let url =
            Url::parse(&self.config.endpoint).map_err(|e| PublishError::InvalidEndpoint {
                endpoint: self.config.endpoint.clone(),
                reason: e.to_string(),
            })?;
        let host = url.host_str().unwrap_or_default().to_string();

        let client = build_client(&self.transport, &self.config.endpoint)?;

        let payload = NotificationPayload::build(
            message,
            text,
            color,
            &destination.room,
            &destination.username,
            &self.config.icon_url,
        );
        let body = serde_json::to_string(&payload)?;

        debug!(destination = %destination.label(), payload = %body, "Sending notification");

        let response = client
            .post(url)
            .header(CONTENT_TYPE, JSON_UTF8)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            info!(
                destination = %destination.label(),
                host = %host,
                status = status.as_u16(),
                message = %message,
                color = %color,
                "Notification posted"
            );
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => body.lines().collect::<Vec<_>>().join(" "),
            Err(e) => {
                warn!(
                    destination = %destination.label(),
                    error = %e,
                    "Failed to read Mattermost error response"
                );
                String::new()
            }
        };

        Err(PublishError::UnexpectedStatus { status, body })
    }

    fn endpoint_host(&self) -> String {
        Url::parse(&self.config.endpoint)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_default()
    }
}

#[async_trait]
impl MattermostService for MattermostPublisher {
    async fn publish(&self, message: &str, text: &str, color: &str) -> bool {
        self.publish_detailed(message, text, color)
            .await
            .iter()
            .all(Delivery::is_success)
    }
}
