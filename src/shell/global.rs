//! Process-wide failure reporting.

pub use crate::util::task::spawn_logged;

/// Route panics through `tracing` before the default hook runs
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        tracing::error!(location = %location, "Global error: {}", info);
        previous(info);
    }));
}
