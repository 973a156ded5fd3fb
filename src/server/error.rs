use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {protocol} listener on {addr}: {source}")]
    Bind {
        protocol: &'static str,
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("{protocol} listener has no local address: {source}")]
    LocalAddr {
        protocol: &'static str,
        source: std::io::Error,
    },

    #[error("gRPC server error: {0}")]
    Grpc(#[from] tonic::transport::Error),

    #[error("gRPC reflection setup failed: {0}")]
    Reflection(#[from] tonic_reflection::server::Error),

    #[error("invalid gateway upstream: {0}")]
    Upstream(#[source] tonic::transport::Error),

    #[error("HTTP server error: {0}")]
    Http(#[source] std::io::Error),

    #[error("{protocol} server stopped without a shutdown request")]
    UnexpectedExit { protocol: &'static str },

    #[error("serve task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
