//! Session timer coordinator.
//!
//! A peer starts a shared countdown by naming a counterpart and a duration.
//! The server computes one absolute deadline and pushes it to every
//! connection of the counterpart plus the originating connection, so both
//! sides render the countdown from the same value with no server-side
//! ticking timer and no stored session.

use chrono::Utc;
use signal_proto::event::{ServerEvent, TimerCancel, TimerStart, TimerUpdate};

use crate::registry::{ConnectionRegistry, Tx};
use crate::ws::deliver;

const MIN_DURATION_MINUTES: u32 = 1;
const MAX_DURATION_MINUTES: u32 = 180;

pub fn start_timer(registry: &ConnectionRegistry, origin: &Tx, request: TimerStart) {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&request.duration) {
        tracing::warn!(
            to = %request.to,
            duration = request.duration,
            "rejecting timer outside {MIN_DURATION_MINUTES}-{MAX_DURATION_MINUTES} minute bounds"
        );
        return;
    }

    let end_time = Utc::now().timestamp_millis() + i64::from(request.duration) * 60_000;
    tracing::info!(to = %request.to, duration = request.duration, end_time, "starting shared timer");

    // Echo-to-self: the initiator anchors on the exact same deadline the
    // counterpart receives.
    let mut targets = registry.connections_for(&request.to);
    targets.push(origin.clone());
    deliver(&targets, &ServerEvent::TimerUpdate(TimerUpdate { end_time }));
}

pub fn cancel_timer(registry: &ConnectionRegistry, origin: &Tx, request: TimerCancel) {
    tracing::info!(to = %request.to, "cancelling shared timer");

    let mut targets = registry.connections_for(&request.to);
    targets.push(origin.clone());
    deliver(&targets, &ServerEvent::TimerCancel);
}
