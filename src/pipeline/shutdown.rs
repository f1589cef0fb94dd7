//! Operator-requested stop.
//!
//! The pipeline looks at the signal between items only. A request that is
//! already in flight always finishes and gets recorded first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// Cloneable stop signal shared by the signal listener and the pipeline.
#[derive(Debug, Clone)]
pub struct Shutdown {
    sender: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Ask the pipeline to stop at the next item boundary.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_requested(&self) -> bool {
        *self.sender.borrow()
    }

    /// Sleep for `duration`, returning early if a stop is requested.
    ///
    /// Returns `true` when the full delay elapsed.
    pub async fn sleep(&self, duration: Duration) -> bool {
        let mut receiver = self.sender.subscribe();
        if *receiver.borrow_and_update() {
            return false;
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = receiver.wait_for(|stop| *stop) => false,
        }
    }

    /// Trigger the signal on Ctrl-C.
    pub fn listen_for_ctrl_c(&self) {
        let shutdown = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupted by user, stopping after the current item");
                shutdown.trigger();
            }
        });
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
