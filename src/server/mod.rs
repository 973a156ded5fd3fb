//! Runs the RPC front end and the HTTP gateway as one service.
//!
//! Both serve-loops share a lifetime: a single cancellation stops both,
//! and the first loop to fail stops its sibling and becomes the result.

mod error;
mod gateway;
mod grpc;
mod shutdown;

pub use error::ServerError;
pub use gateway::GatewayServer;
pub use grpc::GrpcServer;
pub use shutdown::Shutdown;

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use tokio::{
    net::TcpListener,
    sync::watch,
    task::{self, JoinError, JoinSet},
    time::Instant,
};

use crate::{config::Config, repository::NoteStore, service::NoteService};

/// A listener-backed server the coordinator can run and stop without
/// knowing its protocol.
#[tonic::async_trait]
pub trait ManagedServer: Send + Sync + 'static {
    /// Short label used in logs and errors.
    fn protocol(&self) -> &'static str;

    /// Serves on `listener` until `shutdown` is called, then drains
    /// in-flight requests and returns.
    async fn serve(&self, listener: TcpListener) -> Result<(), ServerError>;

    /// Asks a running (or not yet started) `serve` to stop. Idempotent.
    fn shutdown(&self);
}

/// Where a server listens.
pub enum Endpoint {
    Addr(SocketAddr),
    Listener(TcpListener),
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::Addr(addr)
    }
}

impl From<TcpListener> for Endpoint {
    fn from(listener: TcpListener) -> Self {
        Self::Listener(listener)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Starting,
    Running,
    Stopping,
    Stopped,
    Failed,
}

pub struct Coordinator {
    servers: Vec<(Arc<dyn ManagedServer>, Endpoint)>,
    grace: Duration,
    state: watch::Sender<LifecycleState>,
}

impl Coordinator {
    pub fn new(grace: Duration) -> Self {
        Self {
            servers: Vec::new(),
            grace,
            state: watch::Sender::new(LifecycleState::Idle),
        }
    }

    #[must_use]
    pub fn with_server(
        mut self,
        server: impl ManagedServer,
        endpoint: impl Into<Endpoint>,
    ) -> Self {
        self.servers.push((Arc::new(server), endpoint.into()));
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Binds every endpoint, then launches one serve-loop per server.
    /// Nothing is launched unless every bind succeeds.
    pub async fn start(self) -> Result<Running, ServerError> {
        self.state.send_replace(LifecycleState::Starting);

        let mut bound = Vec::with_capacity(self.servers.len());
        for (server, endpoint) in self.servers {
            match bind(server.protocol(), endpoint).await {
                Ok(listening) => bound.push((server, listening)),
                Err(e) => {
                    tracing::error!("{e}");
                    self.state.send_replace(LifecycleState::Failed);
                    return Err(e);
                }
            }
        }

        let mut servers = Vec::with_capacity(bound.len());
        let mut tasks = JoinSet::new();

        for (server, (listener, addr)) in bound {
            tracing::info!("{} server listening on {}", server.protocol(), addr);

            let serving = server.clone();
            let task = tasks
                .spawn(async move { serving.serve(listener).await })
                .id();
            servers.push(Launched {
                server,
                addr,
                task,
                done: false,
            });
        }

        self.state.send_replace(LifecycleState::Running);
        tracing::info!("Servers are ready to accept connections");

        Ok(Running {
            servers,
            tasks,
            grace: self.grace,
            state: self.state,
        })
    }
}

async fn bind(
    protocol: &'static str,
    endpoint: Endpoint,
) -> Result<(TcpListener, SocketAddr), ServerError> {
    let listener = match endpoint {
        Endpoint::Listener(listener) => listener,
        Endpoint::Addr(addr) => TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                protocol,
                addr,
                source,
            })?,
    };
    let addr = listener
        .local_addr()
        .map_err(|source| ServerError::LocalAddr { protocol, source })?;

    Ok((listener, addr))
}

/// A serve-loop spawned by [`Coordinator::start`].
struct Launched {
    server: Arc<dyn ManagedServer>,
    addr: SocketAddr,
    task: task::Id,
    done: bool,
}

/// Handle to launched serve-loops.
pub struct Running {
    servers: Vec<Launched>,
    tasks: JoinSet<Result<(), ServerError>>,
    grace: Duration,
    state: watch::Sender<LifecycleState>,
}

impl Running {
    /// Bound address of the server with the given protocol label.
    pub fn local_addr(&self, protocol: &str) -> Option<SocketAddr> {
        self.servers
            .iter()
            .find(|launched| launched.server.protocol() == protocol)
            .map(|launched| launched.addr)
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Waits for `cancel` or the first serve-loop to finish, whichever
    /// comes first, then stops every server.
    ///
    /// Cancellation yields `Ok(())` even if a loop fails while draining.
    /// Otherwise the first loop's error is returned; a loop that ends
    /// cleanly without being asked to counts as an error too.
    pub async fn wait<F>(mut self, cancel: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let first = tokio::select! {
            // Cancellation wins a tie with a finishing loop.
            biased;
            () = cancel => None,
            Some(joined) = self.tasks.join_next_with_id() => Some(joined),
        };

        let failure = match first {
            None => {
                tracing::info!("Shutdown requested, stopping servers");
                None
            }
            Some(joined) => match self.settle(joined) {
                (protocol, Ok(())) => Some(ServerError::UnexpectedExit { protocol }),
                (_, Err(e)) => Some(e),
            },
        };

        self.state.send_replace(LifecycleState::Stopping);
        if let Some(e) = &failure {
            tracing::error!("Stopping all servers after failure: {e}");
        }

        self.stop_in_reverse().await;

        match failure {
            None => {
                self.state.send_replace(LifecycleState::Stopped);
                tracing::info!("All servers stopped");
                Ok(())
            }
            Some(e) => {
                self.state.send_replace(LifecycleState::Failed);
                Err(e)
            }
        }
    }

    /// Stops servers last-started first, letting each drain before the
    /// next one is asked to stop. A gateway started after its upstream can
    /// then finish the requests it has accepted. The whole sequence shares
    /// one grace period; whatever is left after it is aborted.
    async fn stop_in_reverse(&mut self) {
        let deadline = Instant::now() + self.grace;

        for index in (0..self.servers.len()).rev() {
            self.servers[index].server.shutdown();

            if tokio::time::timeout_at(deadline, self.drain(index))
                .await
                .is_err()
            {
                tracing::warn!(
                    "Servers did not stop within {:?}, aborting remaining tasks",
                    self.grace
                );
                for launched in &self.servers {
                    launched.server.shutdown();
                }
                self.tasks.shutdown().await;
                return;
            }
        }
    }

    /// Reaps finished loops until the one at `index` is among them.
    async fn drain(&mut self, index: usize) {
        while !self.servers[index].done {
            let Some(joined) = self.tasks.join_next_with_id().await else {
                return;
            };
            match self.settle(joined) {
                (protocol, Ok(())) => tracing::info!("{protocol} server stopped"),
                (protocol, Err(e)) => {
                    tracing::warn!("{protocol} server failed while stopping: {e}");
                }
            }
        }
    }

    /// Marks a finished loop as done and names its protocol.
    fn settle(
        &mut self,
        joined: Result<(task::Id, Result<(), ServerError>), JoinError>,
    ) -> (&'static str, Result<(), ServerError>) {
        let (id, result) = match joined {
            Ok((id, result)) => (id, result),
            Err(e) => (e.id(), Err(ServerError::from(e))),
        };

        let protocol = self
            .servers
            .iter_mut()
            .find(|launched| launched.task == id)
            .map_or("unknown", |launched| {
                launched.done = true;
                launched.server.protocol()
            });

        (protocol, result)
    }
}

/// Owns the note store and both front ends.
pub struct ApiServer {
    config: Config,
    service: Arc<NoteService>,
}

impl ApiServer {
    pub fn new(config: Config) -> Self {
        let store = Arc::new(NoteStore::new());
        Self {
            config,
            service: Arc::new(NoteService::new(store)),
        }
    }

    /// Coordinator for both front ends on the configured addresses.
    pub async fn coordinator(&self) -> Result<Coordinator, ServerError> {
        self.coordinator_on(self.config.grpc_addr.into(), self.config.http_addr.into())
            .await
    }

    /// Same as [`Self::coordinator`], with explicit endpoints.
    ///
    /// The RPC endpoint is bound here so the gateway dials the port the
    /// listener actually got, which differs from the configured one for
    /// port 0.
    pub async fn coordinator_on(
        &self,
        grpc: Endpoint,
        http: Endpoint,
    ) -> Result<Coordinator, ServerError> {
        let rpc = GrpcServer::new(self.service.clone());
        let (listener, upstream) = bind(rpc.protocol(), grpc).await?;

        Ok(Coordinator::new(self.config.shutdown_timeout)
            .with_server(rpc, listener)
            .with_server(GatewayServer::new(upstream), http))
    }

    /// Runs both front ends until `cancel` resolves or one of them fails.
    pub async fn listen<F>(self, cancel: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        self.coordinator().await?.start().await?.wait(cancel).await
    }
}
