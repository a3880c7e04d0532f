use std::sync::Arc;

use crate::registry::ConnectionRegistry;

/// Shared server state.
///
/// The connection registry is the only shared mutable resource in the
/// process. It is constructed here at server start and handed by handle into
/// the gateway, router, broadcaster and timer coordinator, so tests can spin
/// up independent instances.
#[derive(Clone, Default)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }
}
