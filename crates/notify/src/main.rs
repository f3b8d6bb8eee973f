//! CLI for posting a single message to Mattermost
//!
//! Run `mattermost-send --help` for usage information.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use mattermost_notify::{
    BuildStatus, MattermostPublisher, ProxyRule, ProxySettings, ServiceConfig, TlsTrust,
    TransportConfig, DEFAULT_COLOR,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "mattermost-send")]
#[command(about = "Post a build notification to a Mattermost incoming webhook")]
#[command(version)]
struct Cli {
    /// Message shown in the attachment
    message: String,

    /// Incoming-webhook URL
    #[arg(long, env = "MATTERMOST_ENDPOINT")]
    endpoint: String,

    /// Destinations, e.g. "bot@builds;@oncall"
    #[arg(short, long, env = "MATTERMOST_CHANNEL", default_value = "")]
    channel: String,

    /// Icon URL for the posting user
    #[arg(long, env = "MATTERMOST_ICON_URL", default_value = "")]
    icon_url: String,

    /// Text shown above the attachment
    #[arg(short, long, default_value = "")]
    text: String,

    /// Attachment color (good, warning, danger or a hex value)
    #[arg(long, conflicts_with = "status")]
    color: Option<String>,

    /// Build outcome used to pick the color
    #[arg(short, long)]
    status: Option<BuildStatus>,

    /// Certificate trust: strict, ignore-hostname, trust-self-signed
    #[arg(long, env = "MATTERMOST_TLS_TRUST", default_value = "trust-self-signed")]
    tls_trust: TlsTrust,

    /// HTTP proxy host
    #[arg(long, env = "MATTERMOST_PROXY_HOST")]
    proxy_host: Option<String>,

    /// HTTP proxy port
    #[arg(long, env = "MATTERMOST_PROXY_PORT", default_value_t = 80)]
    proxy_port: u16,

    /// Proxy username
    #[arg(long, env = "MATTERMOST_PROXY_USER", default_value = "")]
    proxy_user: String,

    /// Proxy password
    #[arg(long, env = "MATTERMOST_PROXY_PASSWORD", default_value = "", hide_env_values = true)]
    proxy_password: String,

    /// Hosts reached without the proxy (globs, comma separated)
    #[arg(long, env = "MATTERMOST_NO_PROXY", default_value = "")]
    no_proxy: String,

    /// Connect and read timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn color(&self) -> String {
        match (&self.color, self.status) {
            (Some(color), _) => color.clone(),
            (None, Some(status)) => status.color().to_string(),
            (None, None) => DEFAULT_COLOR.to_string(),
        }
    }

    fn transport(&self) -> Result<TransportConfig> {
        let proxy = match &self.proxy_host {
            Some(host) if !host.trim().is_empty() => {
                let no_proxy = ProxyRule::from_no_proxy_hosts(&self.no_proxy)
                    .context("Invalid no-proxy host list")?;
                Some(
                    ProxySettings::new(host.trim(), self.proxy_port)
                        .with_credentials(&self.proxy_user, &self.proxy_password)
                        .with_no_proxy(no_proxy),
                )
            }
            _ => None,
        };

        let timeout = Duration::from_secs(self.timeout);
        Ok(TransportConfig {
            connect_timeout: timeout,
            read_timeout: timeout,
            proxy,
            tls_trust: self.tls_trust,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let publisher = MattermostPublisher::new(
        ServiceConfig::new(&cli.endpoint, &cli.channel, &cli.icon_url),
        cli.transport()?,
    );

    let color = cli.color();
    let deliveries = publisher
        .publish_detailed(&cli.message, &cli.text, &color)
        .await;

    let failed = deliveries.iter().filter(|d| !d.is_success()).count();
    if failed > 0 {
        error!(
            failed,
            total = deliveries.len(),
            "Some destinations did not receive the message"
        );
        bail!("{failed} of {} destinations failed", deliveries.len());
    }

    info!(total = deliveries.len(), "Message delivered");
    Ok(())
}
