//! Shared fixtures for integration tests: a scripted backend and client builders.

#![allow(dead_code)]

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::Arc,
	time::Duration,
};
// crates.io
use http::{
	StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use parking_lot::Mutex;
use serde_json::Value;
// self
use docdesk_client::{
	auth::CredentialPair,
	client::Client,
	config::ClientConfig,
	http::{HttpRequest, HttpResponse, HttpTransport, NetworkErrorMapper, TransportFuture},
	session::SessionEffects,
	store::MemoryStore,
};

pub const BASE_URL: &str = "https://api.docdesk.test";

pub type FakeClient = Client<FakeBackend, NetworkErrorMapper>;

#[derive(Debug)]
pub struct FakeTransportError(pub String);
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}", self.0)
	}
}
impl StdError for FakeTransportError {}

/// One request as the backend saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
	pub method: String,
	pub path: String,
	pub authorization: Option<String>,
}

/// Scripted stand-in for the DocDesk API.
///
/// Resource paths accept only the current valid access token and answer 401 otherwise. The
/// refresh endpoint replays its scripted reply after an optional delay; a 2xx reply that
/// carries an `accessToken` makes that token the valid one.
///
/// Special paths: `/public/*` never checks auth, `/forbidden` answers 403, `/slow` never
/// answers within a test, `/network` fails at the transport layer.
#[derive(Clone, Default)]
pub struct FakeBackend(Arc<Mutex<BackendState>>);
impl FakeBackend {
	pub fn accepting(access_token: &str) -> Self {
		let backend = Self::default();

		backend.0.lock().valid_access = Some(access_token.to_owned());

		backend
	}

	pub fn refresh_reply(self, status: u16, body: Value) -> Self {
		self.0.lock().refresh_reply = (status, body.to_string());

		self
	}

	pub fn refresh_delay(self, delay: Duration) -> Self {
		self.0.lock().refresh_delay = delay;

		self
	}

	pub fn always_unauthorized(self) -> Self {
		self.0.lock().always_unauthorized = true;

		self
	}

	pub fn logout_status(self, status: u16) -> Self {
		self.0.lock().logout_status = status;

		self
	}

	/// Bodies sent to the refresh endpoint, in arrival order.
	pub fn refresh_calls(&self) -> Vec<String> {
		self.0.lock().refresh_calls.clone()
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.0.lock().requests.clone()
	}

	pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
		self.requests().into_iter().filter(|request| request.path == path).collect()
	}

	async fn respond(&self, request: HttpRequest) -> Result<HttpResponse, FakeTransportError> {
		let path = request.uri().path().to_owned();
		let authorization = request
			.headers()
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.map(str::to_owned);

		self.0.lock().requests.push(RecordedRequest {
			method: request.method().to_string(),
			path: path.clone(),
			authorization: authorization.clone(),
		});

		match path.as_str() {
			"/auth/refresh" => {
				let body = String::from_utf8_lossy(request.body()).into_owned();
				let (delay, (status, reply)) = {
					let mut state = self.0.lock();

					state.refresh_calls.push(body);

					(state.refresh_delay, state.refresh_reply.clone())
				};

				tokio::time::sleep(delay).await;

				if (200..300).contains(&status) {
					let granted = serde_json::from_str::<Value>(&reply)
						.ok()
						.and_then(|value| value.get("accessToken")?.as_str().map(str::to_owned));

					if let Some(access) = granted {
						self.0.lock().valid_access = Some(access);
					}
				}

				Ok(json(status, &reply))
			},
			"/auth/login" =>
				Ok(json(200, r#"{"accessToken":"A1","refreshToken":"R1","user":{"id":1}}"#)),
			"/auth/logout" => {
				let status = self.0.lock().logout_status;

				Ok(json(status, "{}"))
			},
			"/forbidden" => Ok(json(403, r#"{"message":"Insufficient role."}"#)),
			"/slow" => {
				tokio::time::sleep(Duration::from_secs(30)).await;

				Ok(json(200, "{}"))
			},
			"/network" => Err(FakeTransportError("Connection reset by peer.".into())),
			_ if path.starts_with("/public/") => Ok(json(200, r#"{"ok":true}"#)),
			_ => {
				let state = self.0.lock();
				let accepted = !state.always_unauthorized
					&& state.valid_access.as_ref().map(|token| format!("Bearer {token}"))
						== authorization;

				if accepted {
					let body = serde_json::json!({ "path": path, "authorization": authorization });

					Ok(json(200, &body.to_string()))
				} else {
					Ok(json(401, r#"{"message":"Token expired."}"#))
				}
			},
		}
	}
}
impl HttpTransport for FakeBackend {
	type TransportError = FakeTransportError;

	fn call(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(self.respond(request))
	}
}

struct BackendState {
	valid_access: Option<String>,
	refresh_reply: (u16, String),
	refresh_delay: Duration,
	refresh_calls: Vec<String>,
	requests: Vec<RecordedRequest>,
	always_unauthorized: bool,
	logout_status: u16,
}
impl Default for BackendState {
	fn default() -> Self {
		Self {
			valid_access: None,
			refresh_reply: (401, r#"{"message":"Refresh token revoked."}"#.into()),
			refresh_delay: Duration::ZERO,
			refresh_calls: Vec::new(),
			requests: Vec::new(),
			always_unauthorized: false,
			logout_status: 204,
		}
	}
}

pub fn json(status: u16, body: &str) -> HttpResponse {
	let mut response = HttpResponse::new(body.as_bytes().to_vec());

	*response.status_mut() =
		StatusCode::from_u16(status).expect("Fake backend status should be valid.");
	response.headers_mut().insert(
		CONTENT_TYPE,
		"application/json".parse().expect("Content type should be a valid header value."),
	);

	response
}

/// Session effects that record cookie clears and redirect targets across clones.
#[derive(Clone, Default)]
pub struct RecordingSession(Arc<Mutex<(usize, Vec<String>)>>);
impl RecordingSession {
	pub fn cookie_clears(&self) -> usize {
		self.0.lock().0
	}

	pub fn redirects(&self) -> Vec<String> {
		self.0.lock().1.clone()
	}
}
impl SessionEffects for RecordingSession {
	fn clear_auth_cookies(&self) {
		self.0.lock().0 += 1;
	}

	fn redirect_to_login(&self, location: &str) {
		self.0.lock().1.push(location.to_owned());
	}
}

pub fn config() -> ClientConfig {
	ClientConfig::new(BASE_URL).expect("Fake backend config should build.")
}

/// Builds a client over `backend` with a store seeded from `tokens`.
pub fn fake_client(
	backend: &FakeBackend,
	tokens: Option<CredentialPair>,
) -> (FakeClient, MemoryStore, RecordingSession) {
	let store = tokens.map(MemoryStore::with_tokens).unwrap_or_default();
	let session = RecordingSession::default();
	let client =
		FakeClient::with_transport(config(), Arc::new(store.clone()), backend.clone(), NetworkErrorMapper)
			.with_session_effects(Arc::new(session.clone()));

	(client, store, session)
}
