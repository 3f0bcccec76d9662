//! Environment side effects triggered when a session can no longer be authenticated.
//!
//! A browser host clears its auth cookies and navigates to the login route; a CLI or service
//! host usually does nothing. The client calls these hooks through [`SessionEffects`] so the
//! refresh logic stays testable without a host environment.

// self
#[cfg(any(test, feature = "test"))] use crate::_prelude::*;

/// Hooks invoked on forced logout and on explicit logout.
pub trait SessionEffects
where
	Self: Send + Sync,
{
	/// Clears host-side auth cookies and flags.
	fn clear_auth_cookies(&self);

	/// Navigates the host to `location`, the login route with its unauthorized marker.
	fn redirect_to_login(&self, location: &str);
}

/// Effects for hosts without cookies or navigation; every hook is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSessionEffects;
impl SessionEffects for NoopSessionEffects {
	fn clear_auth_cookies(&self) {}

	fn redirect_to_login(&self, location: &str) {
		let _ = location;
	}
}

/// Effects that record every invocation, for assertions in tests; enabled via `cfg(test)` or
/// the `test` crate feature.
#[cfg(any(test, feature = "test"))]
#[derive(Clone, Debug, Default)]
pub struct RecordingSessionEffects(Arc<Mutex<SessionLog>>);
#[cfg(any(test, feature = "test"))]
impl RecordingSessionEffects {
	/// Number of times cookies were cleared.
	pub fn cookie_clears(&self) -> usize {
		self.0.lock().cookie_clears
	}

	/// Redirect targets in invocation order.
	pub fn redirects(&self) -> Vec<String> {
		self.0.lock().redirects.clone()
	}
}
#[cfg(any(test, feature = "test"))]
impl SessionEffects for RecordingSessionEffects {
	fn clear_auth_cookies(&self) {
		self.0.lock().cookie_clears += 1;
	}

	fn redirect_to_login(&self, location: &str) {
		self.0.lock().redirects.push(location.to_owned());
	}
}

#[cfg(any(test, feature = "test"))]
#[derive(Debug, Default)]
struct SessionLog {
	cookie_clears: usize,
	redirects: Vec<String>,
}
