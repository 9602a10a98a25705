use std::collections::HashMap;

use voicewire_types::events::server::ToolInvocation;

/// A function call requested by the remote model, awaiting an out-of-band
/// result from the embedder.
#[derive(Debug, Clone)]
pub struct PendingToolCall {
    call_id: String,
    name: String,
    arguments: String,
}

impl PendingToolCall {
    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw argument payload, opaque to the client (typically JSON).
    pub fn arguments(&self) -> &str {
        &self.arguments
    }
}

impl From<&ToolInvocation> for PendingToolCall {
    fn from(invocation: &ToolInvocation) -> Self {
        Self {
            call_id: invocation.call_id().to_string(),
            name: invocation.name().to_string(),
            arguments: invocation.arguments().to_string(),
        }
    }
}

/// Bookkeeping for calls that were emitted but not yet answered. The remote
/// party owns correlation, so resolving an id we never saw is accepted; the
/// tracker only exists so a session that ends early can name its orphans.
#[derive(Default)]
pub(crate) struct ToolCallTracker {
    pending: HashMap<String, PendingToolCall>,
}

impl ToolCallTracker {
    pub(crate) fn record(&mut self, call: &PendingToolCall) {
        self.pending.insert(call.call_id().to_string(), call.clone());
    }

    pub(crate) fn resolve(&mut self, call_id: &str) {
        self.pending.remove(call_id);
    }

    /// Drain whatever is still unanswered, for orphan logging at session end.
    pub(crate) fn drain_orphans(&mut self) -> Vec<PendingToolCall> {
        self.pending.drain().map(|(_, call)| call).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn call(id: &str) -> PendingToolCall {
        PendingToolCall {
            call_id: id.to_string(),
            name: "get_time".to_string(),
            arguments: "{}".to_string(),
        }
    }

    #[test]
    fn test_resolve_clears_pending() {
        let mut tracker = ToolCallTracker::default();
        tracker.record(&call("c1"));
        tracker.resolve("c1");
        assert!(tracker.drain_orphans().is_empty());
    }

    #[test]
    fn test_resolve_unknown_id_is_accepted() {
        let mut tracker = ToolCallTracker::default();
        tracker.resolve("never-seen");
        assert!(tracker.drain_orphans().is_empty());
    }

    #[test]
    fn test_unanswered_calls_become_orphans() {
        let mut tracker = ToolCallTracker::default();
        tracker.record(&call("c1"));
        tracker.record(&call("c2"));
        tracker.resolve("c1");
        let orphans = tracker.drain_orphans();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].call_id(), "c2");
    }
}
