use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::TcpListener;
use tonic::transport::{Channel, Endpoint};

use super::{ManagedServer, ServerError, Shutdown};
use crate::handlers::{
    grpc::proto::note_service_client::NoteServiceClient,
    rest::{self, NoteClient},
};

/// Serves the HTTP/JSON gateway, which forwards every call to the RPC
/// front end at `upstream`.
pub struct GatewayServer {
    upstream: SocketAddr,
    shutdown: Shutdown,
}

impl GatewayServer {
    pub fn new(upstream: SocketAddr) -> Self {
        Self {
            upstream,
            shutdown: Shutdown::new(),
        }
    }

    /// Address the gateway dials. A wildcard bind address is reached
    /// through loopback.
    pub fn dial_addr(&self) -> SocketAddr {
        let mut addr = self.upstream;
        if addr.ip().is_unspecified() {
            match addr {
                SocketAddr::V4(_) => addr.set_ip(Ipv4Addr::LOCALHOST.into()),
                SocketAddr::V6(_) => addr.set_ip(Ipv6Addr::LOCALHOST.into()),
            }
        }
        addr
    }

    fn client(&self) -> Result<NoteClient, ServerError> {
        // Lazy, so the gateway does not depend on the RPC loop being up yet.
        let channel: Channel = Endpoint::from_shared(format!("http://{}", self.dial_addr()))
            .map_err(ServerError::Upstream)?
            .connect_lazy();
        Ok(NoteServiceClient::new(channel))
    }
}

#[tonic::async_trait]
impl ManagedServer for GatewayServer {
    fn protocol(&self) -> &'static str {
        "http"
    }

    async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let router = rest::router(self.client()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(self.shutdown.wait())
            .await
            .map_err(ServerError::Http)
    }

    fn shutdown(&self) {
        self.shutdown.trigger();
    }
}
