use std::future::Future;

use tokio::sync::watch;

/// One-shot stop signal shared by a server and whoever stops it.
///
/// Triggering before anyone waits is fine: late waiters see the stored
/// value and return immediately.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(false),
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Resolves once `trigger` has been called.
    pub fn wait(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            // The sender lives in `self`, which outlives every serve call.
            let _ = rx.wait_for(|stopped| *stopped).await.map(|_| ());
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
