//! Mock server listener.

use super::context::ServerContext;
use super::router::route_request;
use crate::state::{ScopeKey, State};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// A bound mock server instance serving one scope.
pub struct MockServer {
    listener: TcpListener,
    context: Arc<ServerContext>,
}

impl MockServer {
    /// Bind the listener. Port 0 picks an ephemeral port; see [`MockServer::local_addr`].
    pub async fn bind(
        addr: SocketAddr,
        state: Arc<State>,
        scope: ScopeKey,
    ) -> Result<Self, anyhow::Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            context: Arc::new(ServerContext::new(state, scope)),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        info!(
            scope = %self.context.scope,
            backend = self.context.state.backend_name(),
            "http-mock listening on http://{}",
            self.listener.local_addr()?
        );

        loop {
            let (stream, remote) = self.listener.accept().await?;
            let io = TokioIo::new(stream);
            let context = Arc::clone(&self.context);

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let context = Arc::clone(&context);
                    async move { route_request(req, context, remote).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Connection error from {}: {}", remote, e);
                }
            });
        }
    }
}
