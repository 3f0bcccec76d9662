// self
use crate::obs::{CallKind, CallOutcome};

/// Counter incremented once per recorded call outcome.
pub const CALL_COUNTER: &str = "docdesk_client_call_total";

/// Records a call outcome via the global metrics recorder (when enabled).
///
/// Refresh deduplication shows up as `joined`/`reused` outcomes under `call="refresh"`, so the
/// ratio of `attempt` to `joined` tells how many 401s each refresh absorbed.
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(CALL_COUNTER, "call" => kind.as_str(), "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}
