//! Signal router.
//!
//! Relays call envelopes between peers by identity. Routing is stateless:
//! offers and answers are matched purely by the identity strings the clients
//! supply, and the signal payload itself is never inspected. An envelope for
//! an identity with connections fans out to every one of them, so a callee
//! can pick up from any open tab or device.

use signal_proto::event::{AnswerCall, CallEnded, CallInvite, CallUser, EndCall, ServerEvent};

use crate::registry::ConnectionRegistry;
use crate::ws::deliver;

/// Routes a call offer to every connection of the callee.
///
/// A callee with no connections means zero deliveries: the caller gets no
/// failure reply and their UI times the call out. Parity with the platform's
/// original behavior.
pub fn route_offer(registry: &ConnectionRegistry, offer: CallUser) {
    let targets = registry.connections_for(&offer.user_to_call);
    if targets.is_empty() {
        tracing::info!(from = %offer.from, to = %offer.user_to_call, "call offer dropped, callee is offline");
        return;
    }
    tracing::info!(
        from = %offer.from,
        to = %offer.user_to_call,
        connections = targets.len(),
        "routing call offer"
    );
    let invite = ServerEvent::CallUser(CallInvite {
        signal: offer.signal_data,
        from: offer.from,
        name: offer.name,
    });
    deliver(&targets, &invite);
}

/// Routes an answer back to the original caller, whose identity the
/// answering party supplies. No session state is consulted.
pub fn route_answer(registry: &ConnectionRegistry, answer: AnswerCall) {
    let targets = registry.connections_for(&answer.to);
    tracing::info!(to = %answer.to, connections = targets.len(), "routing call answer");
    deliver(&targets, &ServerEvent::CallAccepted(answer.signal));
}

/// Routes a hang-up notice to every connection of the counterpart.
pub fn route_end(registry: &ConnectionRegistry, end: EndCall) {
    let targets = registry.connections_for(&end.to);
    tracing::info!(from = %end.from, to = %end.to, connections = targets.len(), "routing call end");
    deliver(&targets, &ServerEvent::CallEnded(CallEnded { from: end.from }));
}
