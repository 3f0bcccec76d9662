//! Access/refresh token pair persisted by [`TokenStore`](crate::store::TokenStore) backends.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access and refresh tokens issued together at login and rotated together on refresh.
///
/// Stores persist the pair as one unit, so readers never observe a new access token next to a
/// stale refresh token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
	/// Bearer token attached to authenticated requests.
	pub access_token: TokenSecret,
	/// Token exchanged at the refresh endpoint for a new pair.
	pub refresh_token: TokenSecret,
}
impl CredentialPair {
	/// Builds a pair from raw token strings.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
		}
	}
}

/// Token payload returned by the login and refresh endpoints.
///
/// Both fields are optional on the wire: the refresh endpoint may omit a rotated refresh
/// token, and a missing access token is reported by the caller rather than by serde.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
	/// Newly issued access token.
	#[serde(default)]
	pub access_token: Option<String>,
	/// Newly issued refresh token, if the server rotated it.
	#[serde(default)]
	pub refresh_token: Option<String>,
}
impl TokenGrant {
	/// Returns the access token when present and non-empty.
	pub fn access_token(&self) -> Option<&str> {
		self.access_token.as_deref().filter(|token| !token.is_empty())
	}

	/// Returns the refresh token when present and non-empty.
	pub fn refresh_token(&self) -> Option<&str> {
		self.refresh_token.as_deref().filter(|token| !token.is_empty())
	}

	/// Builds the pair to persist, reusing `previous_refresh` when the server did not rotate it.
	pub fn into_pair(self, previous_refresh: &TokenSecret) -> Option<CredentialPair> {
		let access = self.access_token()?.to_owned();
		let refresh = self
			.refresh_token()
			.map(str::to_owned)
			.unwrap_or_else(|| previous_refresh.expose().to_owned());

		Some(CredentialPair::new(access, refresh))
	}
}
