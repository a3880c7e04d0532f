//! Presence broadcaster.
//!
//! After every registry change the full online set goes to every registered
//! connection. No diffing: clients replace their view wholesale, so a missed
//! update heals on the next one.

use signal_proto::event::ServerEvent;

use crate::registry::ConnectionRegistry;
use crate::ws::deliver;

pub fn broadcast_online_users(registry: &ConnectionRegistry) {
    let online = registry.online_identities();
    tracing::debug!(online = online.len(), "broadcasting online users");
    deliver(&registry.connections(), &ServerEvent::GetOnlineUsers(online));
}
