//! Detached task helpers.
//!
//! Every background task of the dashboard runs through here, so an error
//! or a panic inside one ends up in the log instead of vanishing with the
//! task.

use futures_util::FutureExt;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;

/// Drive `fut` to completion, logging its error or panic
///
/// Returns `true` if the future completed with `Ok`.
pub async fn run_logged<F, E>(name: &'static str, fut: F) -> bool
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!(task = name, error = %e, "Unhandled task failure");
            false
        }
        Err(panic) => {
            tracing::error!(task = name, panic = %panic_message(panic.as_ref()), "Task panicked");
            false
        }
    }
}

/// Spawn a detached task whose error is logged instead of dropped
pub fn spawn_logged<F, E>(name: &'static str, fut: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Display + Send + 'static,
{
    tokio::spawn(async move {
        run_logged(name, fut).await;
    })
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
