//! Service listener
//!
//! Owns startup sequencing and the TCP accept loop, and ties the sweep
//! task's lifetime to the service: load snapshot, bind, sweep, accept,
//! and on shutdown stop sweeping and save the snapshot.

use std::net::SocketAddr;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::net::TcpListener;

use crate::error::{Error, Result};
use crate::persist::SnapshotFile;
use crate::registry::IpRegistry;
use crate::server::config::ServerConfig;
use crate::server::handler::Connection;

/// The address-logging service
pub struct IpServer {
    config: Arc<ServerConfig>,
    registry: Arc<IpRegistry>,
    snapshot: SnapshotFile,
    listener: TcpListener,
}

impl IpServer {
    /// Load the snapshot, then bind the listening socket.
    ///
    /// A missing or unreadable snapshot is logged and the service starts
    /// with whatever loaded; failure to bind is the one fatal startup error.
    /// Binding here (rather than in `run`) means callers can read the bound
    /// address immediately, including an ephemeral port.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let registry = Arc::new(IpRegistry::with_config(config.registry_config()));
        let snapshot = SnapshotFile::new(&config.data_file);

        match snapshot.load(OffsetDateTime::now_utc()).await {
            Ok(entries) => {
                tracing::info!(count = entries.len(), "snapshot loaded");
                registry.load_all(entries).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "snapshot load failed, starting fresh");
            }
        }

        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|e| Error::Bind {
                addr: config.bind_addr,
                source: e,
            })?;

        tracing::info!(addr = %config.bind_addr, "server started");

        Ok(Self {
            config: Arc::new(config),
            registry,
            snapshot,
            listener,
        })
    }

    /// Get a reference to the address registry
    pub fn registry(&self) -> &Arc<IpRegistry> {
        &self.registry
    }

    /// The address the listener is actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the server until the accept loop fails
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Run the server until the shutdown future resolves.
    ///
    /// On shutdown the sweep task's pending sleep is interrupted, the
    /// registry is drained to the snapshot file (best-effort), and the
    /// listener is dropped. In-flight connection handlers are left to run
    /// to completion.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let sweep_handle = self.registry.spawn_sweep_task();

        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!("shutdown signal received");
                Ok(())
            }
            result = self.accept_loop() => result,
        };

        sweep_handle.abort();

        let entries = self.registry.dump_all().await;
        match self.snapshot.save(&entries).await {
            Ok(()) => tracing::info!(count = entries.len(), "snapshot saved"),
            Err(e) => tracing::error!(error = %e, "snapshot save failed"),
        }

        tracing::info!("server terminated");
        result
    }

    async fn accept_loop(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.dispatch(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept connection");
                }
            }
        }
    }

    /// Hand an accepted connection to its own task so the acceptor never
    /// waits on a single client.
    fn dispatch(&self, socket: tokio::net::TcpStream, peer_addr: SocketAddr) {
        let registry = Arc::clone(&self.registry);
        let config = Arc::clone(&self.config);

        tokio::spawn(async move {
            let mut connection = Connection::new(socket, peer_addr.ip(), registry, config);

            if let Err(e) = connection.run().await {
                tracing::error!(peer = %peer_addr, error = %e, "connection error");
            }
        });
    }
}
