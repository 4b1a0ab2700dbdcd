use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative Ctrl-C flag. Long sheet runs poll this between rows so an
/// interrupted buffered run can flush partial results before exiting.
#[derive(Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// A flag that flips on the first Ctrl-C. `tokio::signal::ctrl_c`
    /// replaces the default SIGINT disposition for the rest of the process,
    /// so a second Ctrl-C exits explicitly instead of being swallowed.
    pub fn install() -> Self {
        let interrupt = Self::default();
        let flag = Arc::clone(&interrupt.flag);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, finishing current row");
                flag.store(true, Ordering::SeqCst);
            }
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::error!("second interrupt, exiting immediately");
                std::process::exit(130);
            }
        });
        interrupt
    }

    pub fn triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}
