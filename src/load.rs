//! Load Generations
//!
//! Every bulk load (all charts, or insights) begins a new generation. Work
//! started under an older generation is abandoned as soon as a newer one
//! begins and must not write anything, so the newest refresh always wins.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Generation counter shared by all loads of one controller
#[derive(Debug, Clone)]
pub struct LoadEpoch {
    tx: Arc<watch::Sender<u64>>,
}

impl Default for LoadEpoch {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadEpoch {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Start a new generation, superseding every outstanding token
    pub fn begin(&self) -> LoadToken {
        self.tx.send_modify(|epoch| *epoch += 1);
        self.token()
    }

    /// Token for the current generation without superseding it
    pub fn token(&self) -> LoadToken {
        let rx = self.tx.subscribe();
        let epoch = *rx.borrow();
        LoadToken { epoch, rx }
    }

    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }
}

/// Membership in one load generation
#[derive(Debug, Clone)]
pub struct LoadToken {
    epoch: u64,
    rx: watch::Receiver<u64>,
}

impl LoadToken {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether no newer generation has begun
    pub fn is_current(&self) -> bool {
        *self.rx.borrow() == self.epoch
    }

    /// Resolves once a newer generation begins
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() != self.epoch {
                return;
            }
            if rx.changed().await.is_err() {
                // Epoch dropped; nothing can supersede us anymore
                std::future::pending::<()>().await;
            }
        }
    }

    /// Drive `fut` unless the generation is superseded first
    ///
    /// Returns `None` when superseded; `fut` is dropped at that point.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

/// How one panel load ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Content rendered into the container
    Rendered,
    /// Error panel shown; carries the underlying error text
    Failed(String),
    /// A newer generation began before the load finished
    Superseded,
}

impl LoadOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, LoadOutcome::Rendered)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadOutcome::Failed(_))
    }
}
