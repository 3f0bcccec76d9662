//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `docdesk_client.call` with the `call` (kind)
//!   and `stage` (call site) fields, plus debug/warn events for refresh and logout decisions.
//! - Enable `metrics` to increment the `docdesk_client_call_total` counter, labeled by `call`
//!   and `outcome`. Refresh calls also report `joined` when a caller waits on a flight already
//!   in progress and `reused` when a newer token made the refresh unnecessary.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Kinds of calls observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Caller-issued request through a verb function.
	Request,
	/// Single replay of a request after a successful refresh.
	Retry,
	/// Network call to the refresh endpoint.
	Refresh,
	/// Credential exchange at the login endpoint.
	Login,
	/// Best-effort call to the logout endpoint.
	Logout,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Request => "request",
			CallKind::Retry => "retry",
			CallKind::Refresh => "refresh",
			CallKind::Login => "login",
			CallKind::Logout => "logout",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Caller attached to a refresh flight started by another request.
	Joined,
	/// Refresh skipped because a newer flight already rotated the token.
	Reused,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
			CallOutcome::Joined => "joined",
			CallOutcome::Reused => "reused",
		}
	}

	/// Returns `true` for outcomes that end a call rather than mark its progress.
	pub const fn is_terminal(self) -> bool {
		matches!(self, CallOutcome::Success | CallOutcome::Failure | CallOutcome::Reused)
	}

	/// Maps a result onto its terminal outcome.
	pub fn of<T, E>(result: &std::result::Result<T, E>) -> Self {
		if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure }
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
