use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Channel-backed router used by effect managers to deliver results back to
/// the unit's event loop. Payloads crossing task boundaries must be
/// `Send + 'static`.
pub struct Router<AppEvent> {
    app_tx: UnboundedSender<AppEvent>,
}

// Derived Clone would demand `AppEvent: Clone`; the sender needs no such bound.
impl<AppEvent> Clone for Router<AppEvent> {
    fn clone(&self) -> Self {
        Self {
            app_tx: self.app_tx.clone(),
        }
    }
}

impl<AppEvent> Router<AppEvent> {
    pub fn new(app_tx: UnboundedSender<AppEvent>) -> Self {
        Self { app_tx }
    }

    /// Send an event to the event loop. A closed loop (the unit was torn
    /// down) silently drops the event.
    pub fn send_to_app(&self, event: AppEvent)
    where
        AppEvent: Send + 'static,
    {
        if self.app_tx.send(event).is_err() {
            tracing::trace!("event loop closed, dropping event");
        }
    }

    /// Clone the underlying sender (for spawned tasks).
    pub fn app_sender(&self) -> UnboundedSender<AppEvent> {
        self.app_tx.clone()
    }
}

/// Router plus the receiving end owned by the event loop.
pub struct RouterChannels<AppEvent> {
    pub router: Router<AppEvent>,
    pub app_rx: UnboundedReceiver<AppEvent>,
}

impl<AppEvent> RouterChannels<AppEvent> {
    pub fn new() -> Self {
        let (app_tx, app_rx) = unbounded_channel();
        Self {
            router: Router::new(app_tx),
            app_rx,
        }
    }
}

impl<AppEvent> Default for RouterChannels<AppEvent> {
    fn default() -> Self {
        Self::new()
    }
}
