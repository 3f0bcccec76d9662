//! Method helpers that shape arguments into a [`RequestDescriptor`] and decode the payload.

// crates.io
use ::http::Method;
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	client::{ApiResponse, Client, RequestDescriptor, RequestOptions},
	http::{HttpTransport, TransportErrorMapper},
};

impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Sends `descriptor` and decodes the payload into `T`.
	///
	/// Use [`Value`] for `T` to keep the raw JSON.
	pub async fn request<T>(&self, descriptor: RequestDescriptor) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
	{
		self.send(descriptor).await?.decode()
	}

	/// `GET path`.
	pub async fn get<T>(&self, path: &str) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
	{
		self.request(RequestDescriptor::new(Method::GET, path)).await
	}

	/// `GET path?query`; `None` fields are omitted from the query string.
	pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
		Q: ?Sized + Serialize,
	{
		self.get_with(path, query, RequestOptions::default()).await
	}

	/// `GET path?query` with per-call options.
	pub async fn get_with<T, Q>(
		&self,
		path: &str,
		query: &Q,
		options: RequestOptions,
	) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
		Q: ?Sized + Serialize,
	{
		let descriptor =
			RequestDescriptor::new(Method::GET, path).with_query(query)?.with_options(options);

		self.request(descriptor).await
	}

	/// `POST path` with a JSON body.
	pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.post_with(path, body, RequestOptions::default()).await
	}

	/// `POST path` with a JSON body and per-call options.
	pub async fn post_with<T, B>(
		&self,
		path: &str,
		body: &B,
		options: RequestOptions,
	) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.with_body(Method::POST, path, body, options).await
	}

	/// `PUT path` with a JSON body.
	pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.put_with(path, body, RequestOptions::default()).await
	}

	/// `PUT path` with a JSON body and per-call options.
	pub async fn put_with<T, B>(
		&self,
		path: &str,
		body: &B,
		options: RequestOptions,
	) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.with_body(Method::PUT, path, body, options).await
	}

	/// `PATCH path` with a JSON body.
	pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.patch_with(path, body, RequestOptions::default()).await
	}

	/// `PATCH path` with a JSON body and per-call options.
	pub async fn patch_with<T, B>(
		&self,
		path: &str,
		body: &B,
		options: RequestOptions,
	) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.with_body(Method::PATCH, path, body, options).await
	}

	/// `DELETE path`.
	pub async fn delete<T>(&self, path: &str) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
	{
		self.request(RequestDescriptor::new(Method::DELETE, path)).await
	}

	/// `DELETE path?query` with per-call options.
	pub async fn delete_with<T, Q>(
		&self,
		path: &str,
		query: &Q,
		options: RequestOptions,
	) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
		Q: ?Sized + Serialize,
	{
		let descriptor =
			RequestDescriptor::new(Method::DELETE, path).with_query(query)?.with_options(options);

		self.request(descriptor).await
	}

	async fn with_body<T, B>(
		&self,
		method: Method,
		path: &str,
		body: &B,
		options: RequestOptions,
	) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		let descriptor = RequestDescriptor::new(method, path).with_body(body)?.with_options(options);

		self.request(descriptor).await
	}
}
