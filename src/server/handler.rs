//! Per-connection request handler
//!
//! Each accepted connection gets exactly one exchange: a bounded read, a
//! minimal acknowledgement, a dispatch on the requested view, then close.
//! The handler is generic over the stream so tests can drive it through an
//! in-memory duplex pipe instead of a TCP socket.

use std::net::IpAddr;
use std::sync::Arc;

use bytes::BytesMut;
use time::OffsetDateTime;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::protocol::{Request, ADDR_SEPARATOR, CONTENT_TYPE, STATUS_LINE};
use crate::registry::IpRegistry;
use crate::server::config::ServerConfig;

/// One-shot connection handler
pub struct Connection<S> {
    stream: S,
    peer: IpAddr,
    registry: Arc<IpRegistry>,
    config: Arc<ServerConfig>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Create a handler for an accepted stream
    pub fn new(
        stream: S,
        peer: IpAddr,
        registry: Arc<IpRegistry>,
        config: Arc<ServerConfig>,
    ) -> Self {
        Self {
            stream,
            peer,
            registry,
            config,
        }
    }

    /// Handle the single request/response exchange.
    ///
    /// A request shorter than the configured minimum is dropped without a
    /// reply and without touching the registry. Anything at least that long
    /// is acknowledged with the status line and content-type header before
    /// the view is even inspected, so unknown and malformed-but-long
    /// requests still see a well-formed response prefix.
    pub async fn run(&mut self) -> Result<()> {
        let mut buf = BytesMut::with_capacity(self.config.read_budget);
        let n = self.stream.read_buf(&mut buf).await?;

        if n < self.config.min_request_len {
            tracing::debug!(peer = %self.peer, bytes = n, "request below minimum length, dropping");
            return Ok(());
        }

        self.stream.write_all(STATUS_LINE).await?;
        self.stream.write_all(CONTENT_TYPE).await?;
        tracing::info!(peer = %self.peer, "connection accepted");

        match Request::classify(&buf, &self.config.get_view, &self.config.log_view) {
            Request::Get => {
                // Keep "get" fresh even when the sweep task is lagging.
                let removed = self.registry.maybe_prune(OffsetDateTime::now_utc()).await;
                for addr in removed {
                    tracing::info!(%addr, "ip removed");
                }

                let addrs = self.registry.snapshot().await;
                let body = addrs
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(ADDR_SEPARATOR);
                self.stream.write_all(body.as_bytes()).await?;
                tracing::info!(count = addrs.len(), "data sent");
            }
            Request::Log => {
                // The peer address comes from the socket, never the payload.
                self.registry.touch(self.peer).await;
                tracing::info!(addr = %self.peer, "ip logged");
            }
            Request::Unknown(view) => {
                tracing::info!(view, "unknown view");
            }
            Request::Malformed => {}
        }

        self.stream.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Arc<ServerConfig> {
        Arc::new(ServerConfig::default())
    }

    fn peer(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    /// Drive one request through a duplex pipe and collect the full response.
    async fn exchange(
        registry: Arc<IpRegistry>,
        config: Arc<ServerConfig>,
        peer_addr: IpAddr,
        request: &[u8],
    ) -> Vec<u8> {
        let (mut client, server) = tokio::io::duplex(1024);

        let handle = tokio::spawn(async move {
            let mut conn = Connection::new(server, peer_addr, registry, config);
            conn.run().await
        });

        client.write_all(request).await.unwrap();
        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();

        handle.await.unwrap().unwrap();
        response
    }

    fn body_of(response: &[u8]) -> &[u8] {
        let text = response
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("response has no header terminator");
        &response[text + 4..]
    }

    #[tokio::test]
    async fn test_log_records_peer_address() {
        let registry = Arc::new(IpRegistry::new());
        let response = exchange(
            Arc::clone(&registry),
            test_config(),
            peer("10.0.0.9"),
            b"GET /log HTTP/1.0\r\n\r\n",
        )
        .await;

        assert!(response.starts_with(STATUS_LINE));
        assert!(body_of(&response).is_empty());
        assert_eq!(registry.snapshot().await, vec![peer("10.0.0.9")]);
    }

    #[tokio::test]
    async fn test_get_lists_logged_addresses_once() {
        let registry = Arc::new(IpRegistry::new());
        registry.touch(peer("10.0.0.1")).await;
        registry.touch(peer("10.0.0.2")).await;
        registry.touch(peer("10.0.0.1")).await;

        let response = exchange(
            Arc::clone(&registry),
            test_config(),
            peer("127.0.0.1"),
            b"GET /get HTTP/1.0\r\n\r\n",
        )
        .await;

        let body = String::from_utf8(body_of(&response).to_vec()).unwrap();
        let mut addrs: Vec<&str> = body.split(';').collect();
        addrs.sort();
        assert_eq!(addrs, vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[tokio::test]
    async fn test_get_on_empty_registry_has_empty_body() {
        let registry = Arc::new(IpRegistry::new());
        let response = exchange(
            registry,
            test_config(),
            peer("127.0.0.1"),
            b"GET /get HTTP/1.0\r\n\r\n",
        )
        .await;

        assert!(response.starts_with(STATUS_LINE));
        assert!(body_of(&response).is_empty());
    }

    #[tokio::test]
    async fn test_get_does_not_log_the_caller() {
        let registry = Arc::new(IpRegistry::new());
        let _ = exchange(
            Arc::clone(&registry),
            test_config(),
            peer("10.0.0.5"),
            b"GET /get HTTP/1.0\r\n\r\n",
        )
        .await;

        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_short_request_gets_no_reply_and_no_mutation() {
        let registry = Arc::new(IpRegistry::new());
        let response = exchange(
            Arc::clone(&registry),
            test_config(),
            peer("10.0.0.9"),
            b"hi",
        )
        .await;

        assert!(response.is_empty());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_view_is_acknowledged_without_mutation() {
        let registry = Arc::new(IpRegistry::new());
        let response = exchange(
            Arc::clone(&registry),
            test_config(),
            peer("10.0.0.9"),
            b"GET /foo HTTP/1.0\r\n\r\n",
        )
        .await;

        assert!(response.starts_with(STATUS_LINE));
        assert!(body_of(&response).is_empty());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_long_single_token_request_is_acknowledged_only() {
        // Past the length check but fails token classification.
        let registry = Arc::new(IpRegistry::new());
        let response = exchange(
            Arc::clone(&registry),
            test_config(),
            peer("10.0.0.9"),
            b"AAAAAAAAAAAAAAAA",
        )
        .await;

        assert!(response.starts_with(STATUS_LINE));
        assert!(body_of(&response).is_empty());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_log_exchange_writes_exact_response() {
        let registry = Arc::new(IpRegistry::new());
        let stream = tokio_test::io::Builder::new()
            .read(b"GET /log HTTP/1.0\r\n\r\n")
            .write(STATUS_LINE)
            .write(CONTENT_TYPE)
            .build();

        let mut conn =
            Connection::new(stream, peer("10.0.0.9"), Arc::clone(&registry), test_config());
        conn.run().await.unwrap();

        assert_eq!(registry.snapshot().await, vec![peer("10.0.0.9")]);
    }

    #[tokio::test]
    async fn test_custom_views_are_honored() {
        let registry = Arc::new(IpRegistry::new());
        let config = Arc::new(ServerConfig::default().get_view("/peers").log_view("/announce"));

        let _ = exchange(
            Arc::clone(&registry),
            Arc::clone(&config),
            peer("10.0.0.3"),
            b"GET /announce HTTP/1.0\r\n\r\n",
        )
        .await;
        assert_eq!(registry.snapshot().await, vec![peer("10.0.0.3")]);

        // The default view strings mean nothing under a custom config.
        let _ = exchange(
            Arc::clone(&registry),
            config,
            peer("10.0.0.4"),
            b"GET /log HTTP/1.0\r\n\r\n",
        )
        .await;
        assert_eq!(registry.snapshot().await, vec![peer("10.0.0.3")]);
    }
}
