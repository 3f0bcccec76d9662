//! Session lifecycle: login, logout, and the forced logout run after a failed refresh.

// crates.io
use ::http::Method;
// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	client::{Client, RequestDescriptor, RequestOptions, normalize},
	config::ClientConfig,
	http::{HttpTransport, TransportErrorMapper},
	obs::{self, CallKind, CallOutcome, CallSpan},
	session::SessionEffects,
	store::TokenStore,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
	access_token: String,
	refresh_token: String,
}

impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges `credentials` at the login endpoint and stores the issued pair.
	///
	/// The call never carries an access token. A response missing either token fails with
	/// [`Error::Decode`].
	pub async fn login<B>(&self, credentials: &B) -> Result<CredentialPair>
	where
		B: ?Sized + Serialize,
	{
		const KIND: CallKind = CallKind::Login;

		let span = CallSpan::new(KIND, "login");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let descriptor = RequestDescriptor::new(Method::POST, self.config.login_path.as_str())
					.with_body(credentials)?
					.with_options(RequestOptions::new().without_auth());
				let response = self.execute(&descriptor).await?.decode::<LoginResponse>()?;
				let pair =
					CredentialPair::new(response.data.access_token, response.data.refresh_token);

				self.store.save_tokens(pair.clone()).await?;

				Ok(pair)
			})
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	/// Ends the session.
	///
	/// When an access token is stored, the logout endpoint is called once; its failure is
	/// logged and ignored. Tokens and cookies are cleared either way. Only a token store
	/// failure is returned.
	pub async fn logout(&self) -> Result<()> {
		const KIND: CallKind = CallKind::Logout;

		let span = CallSpan::new(KIND, "logout");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				if self.is_authenticated().await? {
					let descriptor =
						RequestDescriptor::new(Method::POST, self.config.logout_path.as_str());
					let outcome = match self.attempt(&descriptor).await {
						Ok((response, _)) => normalize(&response).map(drop),
						Err(err) => Err(err),
					};

					if let Err(err) = outcome {
						obs::warn_event("logout", &err);
					}
				}

				self.store.clear_tokens().await?;
				self.session.clear_auth_cookies();

				Ok(())
			})
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	/// Returns `true` when an access token is stored.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.store.access_token().await?.is_some_and(|token| !token.expose().is_empty()))
	}
}

/// Clears stored credentials and host cookies, then redirects to the login route.
///
/// Runs inside the refresh flight, so one failed refresh triggers it exactly once no matter
/// how many requests were waiting. A store failure is logged; the redirect still happens.
pub(crate) async fn force_logout(
	store: &dyn TokenStore,
	session: &dyn SessionEffects,
	config: &ClientConfig,
) {
	if let Err(err) = store.clear_tokens().await {
		obs::warn_event("force_logout", &err);
	}

	session.clear_auth_cookies();

	let location = config.login_redirect();

	obs::debug_event("force_logout", &location);
	session.redirect_to_login(&location);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{session::RecordingSessionEffects, store::MemoryStore};

	#[tokio::test]
	async fn force_logout_clears_tokens_then_redirects() {
		let store = MemoryStore::with_tokens(CredentialPair::new("A1", "R1"));
		let session = RecordingSessionEffects::default();
		let config =
			ClientConfig::new("https://api.example.com").expect("Config fixture should build.");

		force_logout(&store, &session, &config).await;

		assert!(store.snapshot().is_none());
		assert_eq!(session.cookie_clears(), 1);
		assert_eq!(session.redirects(), vec!["/login?reason=unauthorized".to_owned()]);
	}
}
