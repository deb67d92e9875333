use std::{future::Future, sync::Arc};

use tokio::sync::watch;

use crate::{Error, Result};

/// Cooperative cancellation for [`super::RequestExecutor::perform_cancellable`].
///
/// Clones share one flag. Once cancelled a token stays cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // the sender lives in self, so wait_for cannot see a closed channel
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Runs `fut` unless `cancel` fires first.
pub(crate) async fn guard<F: Future>(cancel: Option<&CancelToken>, fut: F) -> Result<F::Output> {
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(Error::Cancelled),
                out = fut => Ok(out),
            }
        }
        None => Ok(fut.await),
    }
}
