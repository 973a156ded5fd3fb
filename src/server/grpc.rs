use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;

use super::{ManagedServer, ServerError, Shutdown};
use crate::{handlers::grpc, service::NoteService};

/// Serves the note RPC API.
pub struct GrpcServer {
    service: Arc<NoteService>,
    shutdown: Shutdown,
}

impl GrpcServer {
    pub fn new(service: Arc<NoteService>) -> Self {
        Self {
            service,
            shutdown: Shutdown::new(),
        }
    }
}

#[tonic::async_trait]
impl ManagedServer for GrpcServer {
    fn protocol(&self) -> &'static str {
        "grpc"
    }

    async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        // Lets grpcurl and friends discover the API without the .proto file.
        let reflection = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(grpc::FILE_DESCRIPTOR_SET)
            .build_v1()?;

        tonic::transport::Server::builder()
            .add_service(reflection)
            .add_service(grpc::create_grpc_server(self.service.clone()))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), self.shutdown.wait())
            .await
            .map_err(ServerError::from)
    }

    fn shutdown(&self) {
        self.shutdown.trigger();
    }
}
