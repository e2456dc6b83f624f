//! TCP front door: accepts connections and starts a session for each.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{info, warn};
use tokio::net::TcpListener;
use tokio::time::{sleep, Duration};

use crate::config::ServerConfig;
use crate::matchmaker::{Matchmaker, MatchmakerHandle};
use crate::session::{self, SessionId};
use crate::transport::tcp;

/// Pause after a failed accept, e.g. when out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
}

impl Server {
    pub async fn bind(config: ServerConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&config.bind)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", config.bind, e))?;
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Start a matchmaker and serve connections forever.
    pub async fn run(self) -> anyhow::Result<()> {
        let (matchmaker, handle) = Matchmaker::from_config(&self.config);
        tokio::spawn(matchmaker.run());
        self.serve(handle).await
    }

    /// Serve connections using an already running matchmaker.
    pub async fn serve(self, matchmaker: MatchmakerHandle) -> anyhow::Result<()> {
        info!("listening on {}", self.local_addr()?);
        let motd: Arc<str> = Arc::from(self.config.motd.as_str());
        let mut next_id = 0u64;
        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("accept failed: {}", e);
                    sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            next_id += 1;
            let id = SessionId::new(next_id);
            info!("new connection {} from {}", id, addr);

            let (reader, writer) = tcp::split(stream, &self.config.transport);
            let matchmaker = matchmaker.clone();
            let motd = Arc::clone(&motd);
            tokio::spawn(async move {
                if let Err(e) = session::start(id, reader, writer, matchmaker, &motd).await {
                    warn!("session {} failed to start: {:#}", id, e);
                }
            });
        }
    }
}
