//! Build-status notifications for Mattermost.
//!
//! This crate posts CI build messages to a Mattermost incoming webhook. A
//! single routing string fans one message out to several channels or users,
//! each delivered with its own HTTP request.
//!
//! # Usage
//!
//! ```no_run
//! use mattermost_notify::{MattermostPublisher, MattermostService, ServiceConfig, TransportConfig};
//!
//! # async fn run() {
//! let publisher = MattermostPublisher::new(
//!     ServiceConfig::new(
//!         "https://chat.example.com/hooks/xyz",
//!         "ci-bot@builds;@oncall",
//!         "https://ci.example.com/icon.png",
//!     ),
//!     TransportConfig::default(),
//! );
//!
//! let delivered = publisher
//!     .publish("Build #42 *failed*", "", "danger")
//!     .await;
//! # }
//! ```
//!
//! # Routing
//!
//! The routing string holds tokens separated by `,` or `;`:
//!
//! - `channel` posts to a channel as `jenkins`
//! - `@user` posts a direct message as `jenkins`
//! - `bot@channel` posts to a channel as `bot`
//! - an empty token posts to the webhook's default channel
//!
//! # Transport
//!
//! Requests use 10 second connect and read timeouts and are never retried.
//! An HTTP proxy can be configured together with a list of no-proxy host
//! globs; see [`ProxyRule`]. Certificate trust follows [`TlsTrust`].

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod payload;
pub mod proxy;
pub mod routing;
pub mod service;
pub mod status;
pub mod transport;

pub use config::{ProxyAuth, ProxySettings, ServiceConfig, TlsTrust, TransportConfig};
pub use error::{ConfigError, PublishError};
pub use payload::NotificationPayload;
pub use proxy::{create_regex_from_glob, ProxyRule};
pub use routing::{parse_channel_spec, Destination};
pub use service::{Delivery, MattermostPublisher, MattermostService, DEFAULT_COLOR};
pub use status::BuildStatus;
