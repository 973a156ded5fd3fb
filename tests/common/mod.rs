#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use noted::{
    config::Config,
    handlers::grpc::proto::note_service_client::NoteServiceClient,
    server::{ApiServer, LifecycleState, ServerError},
};
use tokio::{
    net::TcpListener,
    sync::{oneshot, watch},
    task::JoinHandle,
};
use tonic::transport::Channel;

pub struct TestService {
    pub grpc_addr: SocketAddr,
    pub http_addr: SocketAddr,
    pub state: watch::Receiver<LifecycleState>,
    cancel: Option<oneshot::Sender<()>>,
    outcome: JoinHandle<Result<(), ServerError>>,
}

impl TestService {
    pub async fn start() -> Self {
        let grpc = TcpListener::bind("127.0.0.1:0").await.expect("bind grpc");
        let http = TcpListener::bind("127.0.0.1:0").await.expect("bind http");

        let server = ApiServer::new(Config {
            shutdown_timeout: Duration::from_secs(5),
            ..Config::default()
        });
        let running = server
            .coordinator_on(grpc.into(), http.into())
            .await
            .expect("coordinator")
            .start()
            .await
            .expect("start");

        let grpc_addr = running.local_addr("grpc").expect("grpc addr");
        let http_addr = running.local_addr("http").expect("http addr");
        let state = running.subscribe();

        let (tx, rx) = oneshot::channel();
        let outcome = tokio::spawn(running.wait(async move {
            let _ = rx.await;
        }));

        Self {
            grpc_addr,
            http_addr,
            state,
            cancel: Some(tx),
            outcome,
        }
    }

    pub async fn grpc_client(&self) -> NoteServiceClient<Channel> {
        NoteServiceClient::connect(format!("http://{}", self.grpc_addr))
            .await
            .expect("connect")
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.http_addr, path)
    }

    /// Cancels the service and returns its single outcome.
    pub async fn stop(mut self) -> Result<(), ServerError> {
        let _ = self.cancel.take().expect("cancel").send(());
        tokio::time::timeout(Duration::from_secs(10), self.outcome)
            .await
            .expect("service stopped in time")
            .expect("coordinator task")
    }
}
