//! Trailing-edge Debouncer
//!
//! Coalesces bursts of calls into a single invocation that runs once the
//! calls have been quiet for the configured wait. Every call inside the
//! window restarts it. A failing invocation is logged and the loop keeps
//! running.

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::task::{run_logged, spawn_logged};

/// Debounced async callback driven by a background task
pub struct Debouncer {
    tx: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl Debouncer {
    /// Spawn the debounce loop on the current runtime
    pub fn spawn<F, Fut>(wait: Duration, callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let task = spawn_logged("debounce", async move {
            while rx.recv().await.is_some() {
                let mut closed = false;

                loop {
                    tokio::select! {
                        msg = rx.recv() => {
                            if msg.is_none() {
                                closed = true;
                                break;
                            }
                        }
                        _ = tokio::time::sleep(wait) => break,
                    }
                }

                run_logged("debounced call", async {
                    callback().await;
                    Ok::<(), Infallible>(())
                })
                .await;

                if closed {
                    break;
                }
            }
            Ok::<(), Infallible>(())
        });

        Self { tx, task }
    }

    /// Register a call; the callback runs after `wait` of silence
    pub fn call(&self) {
        // The loop only exits once the sender is gone, so this cannot fail
        // while `self` is alive.
        let _ = self.tx.send(());
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
