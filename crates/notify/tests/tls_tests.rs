//! Certificate trust against a webhook serving a self-signed certificate.

mod common;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mattermost_notify::{
    MattermostPublisher, MattermostService, PublishError, ServiceConfig, TlsTrust,
    TransportConfig,
};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio_rustls::rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio_rustls::rustls::{crypto, ServerConfig};
use tokio_rustls::TlsAcceptor;

// =============================================================================
// Self-signed webhook
// =============================================================================

/// Start an HTTPS peer answering 200 with a certificate for `names`.
///
/// Returns its address and the number of requests it answered.
async fn start_self_signed_peer(names: &[&str]) -> (SocketAddr, Arc<AtomicUsize>) {
    let names: Vec<String> = names.iter().map(ToString::to_string).collect();
    let certified = rcgen::generate_simple_self_signed(names).unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
        certified.key_pair.serialize_der(),
    ));

    let config = ServerConfig::builder_with_provider(Arc::new(crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![certified.cert.der().clone()], key)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let served = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&served);
    tokio::spawn(async move {
        loop {
            let Ok((tcp, _)) = listener.accept().await else {
                return;
            };
            let acceptor = acceptor.clone();
            let counter = Arc::clone(&counter);

            tokio::spawn(async move {
                // Rejected handshakes end here.
                let Ok(mut tls) = acceptor.accept(tcp).await else {
                    return;
                };
                common::read_request(&mut tls).await;
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = tls
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok")
                    .await;
                let _ = tls.shutdown().await;
            });
        }
    });

    (addr, served)
}

fn publisher(addr: SocketAddr, tls_trust: TlsTrust) -> MattermostPublisher {
    MattermostPublisher::new(
        ServiceConfig::new(format!("https://{addr}/hooks/abc"), "general", ""),
        TransportConfig {
            tls_trust,
            ..TransportConfig::default()
        },
    )
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_trust_self_signed_delivers() {
    let (addr, served) = start_self_signed_peer(&["127.0.0.1"]).await;

    assert!(publisher(addr, TlsTrust::TrustSelfSigned)
        .publish_message("internal server")
        .await);
    assert_eq!(served.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_trust_self_signed_skips_hostname_check() {
    let (addr, served) = start_self_signed_peer(&["mattermost.internal"]).await;

    assert!(publisher(addr, TlsTrust::TrustSelfSigned)
        .publish_message("wrong name")
        .await);
    assert_eq!(served.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_strict_rejects_self_signed() {
    let (addr, served) = start_self_signed_peer(&["127.0.0.1"]).await;

    let deliveries = publisher(addr, TlsTrust::Strict)
        .publish_detailed("m", "", "good")
        .await;

    assert_eq!(deliveries.len(), 1);
    assert!(matches!(deliveries[0].result, Err(PublishError::Http(_))));
    assert_eq!(served.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_ignore_hostname_still_verifies_chain() {
    let (addr, served) = start_self_signed_peer(&["127.0.0.1"]).await;

    let deliveries = publisher(addr, TlsTrust::IgnoreHostname)
        .publish_detailed("m", "", "good")
        .await;

    assert!(matches!(deliveries[0].result, Err(PublishError::Http(_))));
    assert_eq!(served.load(Ordering::SeqCst), 0);
}
