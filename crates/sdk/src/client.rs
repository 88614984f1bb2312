// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;

use reqwest::{Client as ReqwestClient, Response, Url, header::LOCATION};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::signing::{authorization_header, sign_request};
use crate::types::{
	CreateOrderRequest, Credentials, NonceWindow, Order, TokenRequest, TokenResponse,
};

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.nbx.com";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the signing timestamp (unix millis)
pub const TIMESTAMP_HEADER: &str = "X-NBX-TIMESTAMP";

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Network error: {0}")]
	Network(String),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Server error: {0}")]
	Server(String),
	#[error("Authentication error: {0}")]
	Authentication(String),
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
}

/// Authenticated session: the account all order paths are scoped to, and the
/// bearer token issued for it.
struct Session {
	account_id: String,
	token: String,
}

#[derive(Deserialize)]
struct CreatedOrder {
	id: String,
}

/// Client for the NBX REST API
///
/// Call [`Client::authenticate`] once before placing or fetching orders.
pub struct Client {
	base_url: String,
	client: ReqwestClient,
	session: Option<Session>,
}

impl Client {
	/// Create a new client with the given base URL
	pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
		Self::with_config(base_url, DEFAULT_TIMEOUT)
	}

	/// Create a new client with custom configuration
	pub fn with_config(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			base_url: base_url.into().trim_end_matches('/').to_string(),
			client,
			session: None,
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	pub fn is_authenticated(&self) -> bool {
		self.session.is_some()
	}

	/// Exchange the API key for a session token
	///
	/// The token request is signed with the key's secret and passphrase. The
	/// returned token authorizes every later call for `nonce_window`.
	///
	/// The signed path is the full request path, including any path prefix
	/// in the base URL (e.g. `/v1` for `https://host/v1`).
	pub async fn authenticate(
		&mut self,
		credentials: &Credentials,
		nonce_window: NonceWindow,
	) -> Result<(), ClientError> {
		let url = Url::parse(&format!(
			"{}/accounts/{}/api_keys/{}/tokens",
			self.base_url, credentials.account_id, credentials.key_id
		))
		.map_err(|e| ClientError::Network(format!("Invalid URL: {}", e)))?;
		let body = serde_json::to_string(&TokenRequest {
			expires_in: nonce_window,
		})
		.map_err(|e| ClientError::Serialization(e.to_string()))?;

		let timestamp = chrono::Utc::now().timestamp_millis().to_string();
		let signature = sign_request(credentials.secret(), &timestamp, "POST", url.path(), &body)
			.map_err(|e| ClientError::Authentication(format!("Signing failed: {}", e)))?;

		debug!(
			account_id = %credentials.account_id,
			path = url.path(),
			"Requesting session token"
		);

		let response = self
			.client
			.post(url)
			.header(
				reqwest::header::AUTHORIZATION,
				authorization_header(credentials.passphrase(), &signature),
			)
			.header(TIMESTAMP_HEADER, timestamp)
			.header(reqwest::header::CONTENT_TYPE, "application/json")
			.body(body)
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		let response = check_status(response)
			.await
			.map_err(|e| match e {
				ClientError::Server(msg) => ClientError::Authentication(msg),
				other => other,
			})?;

		let token: TokenResponse = response
			.json()
			.await
			.map_err(|e| ClientError::Serialization(format!("Failed to parse response: {}", e)))?;

		self.session = Some(Session {
			account_id: credentials.account_id.clone(),
			token: token.token,
		});

		Ok(())
	}

	/// Place a market buy spending `fiat_amount`; returns the order ID
	///
	/// `max_quantity` caps the amount of asset bought, zero leaves it open.
	pub async fn market_buy(
		&self,
		market: &str,
		max_quantity: f64,
		fiat_amount: f64,
	) -> Result<String, ClientError> {
		self.create_order(&CreateOrderRequest::market_buy(market, max_quantity, fiat_amount))
			.await
	}

	/// Place a market sell of exactly `quantity`; returns the order ID
	pub async fn market_sell(&self, market: &str, quantity: f64) -> Result<String, ClientError> {
		self.create_order(&CreateOrderRequest::market_sell(market, quantity))
			.await
	}

	/// Place an order
	pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<String, ClientError> {
		let session = self.session()?;
		let url = format!("{}/accounts/{}/orders", self.base_url, session.account_id);

		debug!(market = %request.market, side = %request.side, "Creating order");

		let response = self
			.client
			.post(&url)
			.bearer_auth(&session.token)
			.json(request)
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		let response = check_status(response).await?;

		if let Some(order_id) = response
			.headers()
			.get(LOCATION)
			.and_then(|value| value.to_str().ok())
			.and_then(order_id_from_location)
		{
			return Ok(order_id);
		}

		let created: CreatedOrder = response.json().await.map_err(|e| {
			ClientError::InvalidResponse(format!("No order ID in Location header or body: {}", e))
		})?;

		Ok(created.id)
	}

	/// Get order by order ID
	pub async fn get_order(&self, order_id: &str) -> Result<Order, ClientError> {
		let session = self.session()?;
		let url = format!(
			"{}/accounts/{}/orders/{}",
			self.base_url, session.account_id, order_id
		);

		let response = self
			.client
			.get(&url)
			.bearer_auth(&session.token)
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		let response = check_status(response).await?;

		let order: Order = response
			.json()
			.await
			.map_err(|e| ClientError::Serialization(format!("Failed to parse response: {}", e)))?;

		Ok(order)
	}

	fn session(&self) -> Result<&Session, ClientError> {
		self.session
			.as_ref()
			.ok_or_else(|| ClientError::Authentication("client is not authenticated".to_string()))
	}
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
	if response.status().is_success() {
		return Ok(response);
	}

	let status = response.status();
	let error_text = response
		.text()
		.await
		.unwrap_or_else(|_| format!("HTTP {}", status));
	Err(ClientError::Server(format!("{}: {}", status, error_text)))
}

/// Last non-empty path segment of a `Location` header value
fn order_id_from_location(location: &str) -> Option<String> {
	let path = location.split(['?', '#']).next()?;
	path.trim_end_matches('/')
		.rsplit('/')
		.next()
		.filter(|segment| !segment.is_empty())
		.map(str::to_string)
}

#[cfg(test)]
mod tests {
	use tokio::{
		io::{AsyncReadExt, AsyncWriteExt},
		net::{TcpListener, TcpStream},
		task::JoinHandle,
	};

	use super::*;

	// base64("nbx-test-secret")
	const SECRET: &str = "bmJ4LXRlc3Qtc2VjcmV0";
	const TOKEN_PATH: &str = "/accounts/acc-1/api_keys/key-1/tokens";
	const TOKEN_OK: &str = r#"{"token":"tok-1"}"#;

	/// One HTTP/1.1 request as received by the stand-in server
	struct Captured {
		method: String,
		path: String,
		headers: Vec<(String, String)>,
		body: String,
	}

	impl Captured {
		fn header(&self, name: &str) -> Option<&str> {
			self.headers
				.iter()
				.find(|(key, _)| key.eq_ignore_ascii_case(name))
				.map(|(_, value)| value.as_str())
		}
	}

	fn credentials() -> Credentials {
		Credentials::new("acc-1", "key-1", SECRET, "pass")
	}

	fn response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
		let mut raw = format!(
			"HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n",
			status,
			body.len()
		);
		raw.push_str("Connection: close\r\n");
		for (name, value) in headers {
			raw.push_str(&format!("{}: {}\r\n", name, value));
		}
		raw.push_str("\r\n");
		raw.push_str(body);
		raw
	}

	async fn read_request(stream: &mut TcpStream) -> Captured {
		let mut buf = Vec::new();
		let mut chunk = [0u8; 4096];
		let header_end = loop {
			let n = stream.read(&mut chunk).await.unwrap();
			assert!(n > 0, "connection closed before the request head");
			buf.extend_from_slice(&chunk[..n]);
			if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
				break pos + 4;
			}
		};

		let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
		let mut lines = head.split("\r\n");
		let mut request_line = lines.next().unwrap().split(' ');
		let method = request_line.next().unwrap().to_string();
		let path = request_line.next().unwrap().to_string();
		let headers: Vec<(String, String)> = lines
			.filter_map(|line| line.split_once(':'))
			.map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
			.collect();

		let content_length = headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
			.map(|(_, value)| value.parse::<usize>().unwrap())
			.unwrap_or(0);
		while buf.len() < header_end + content_length {
			let n = stream.read(&mut chunk).await.unwrap();
			assert!(n > 0, "connection closed before the request body");
			buf.extend_from_slice(&chunk[..n]);
		}
		let body = &buf[header_end..header_end + content_length];
		let body = String::from_utf8_lossy(body).to_string();

		Captured {
			method,
			path,
			headers,
			body,
		}
	}

	/// Answer one connection per canned response and hand back what was sent
	async fn serve(responses: Vec<String>) -> (String, JoinHandle<Vec<Captured>>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let base_url = format!("http://{}", listener.local_addr().unwrap());

		let handle = tokio::spawn(async move {
			let mut captured = Vec::new();
			for response in responses {
				let (mut stream, _) = listener.accept().await.unwrap();
				captured.push(read_request(&mut stream).await);
				stream.write_all(response.as_bytes()).await.unwrap();
				stream.shutdown().await.unwrap();
			}
			captured
		});

		(base_url, handle)
	}

	/// Client authenticated against a server that answers the token request
	/// first and then `responses` in order
	async fn authenticated(responses: Vec<String>) -> (Client, JoinHandle<Vec<Captured>>) {
		let mut all = vec![response("200 OK", &[], TOKEN_OK)];
		all.extend(responses);
		let (base_url, server) = serve(all).await;

		let mut client = Client::new(base_url).unwrap();
		client
			.authenticate(&credentials(), NonceWindow::Minute)
			.await
			.unwrap();
		(client, server)
	}

	fn assert_signed_token_request(request: &Captured, expected_path: &str) {
		assert_eq!(request.method, "POST");
		assert_eq!(request.path, expected_path);
		assert_eq!(request.body, r#"{"expiresIn":"1m"}"#);
		assert_eq!(request.header("content-type"), Some("application/json"));

		let timestamp = request.header(TIMESTAMP_HEADER).unwrap();
		assert!(timestamp.parse::<i64>().unwrap() > 0);

		let signature =
			sign_request(SECRET, timestamp, "POST", expected_path, &request.body).unwrap();
		assert_eq!(
			request.header("authorization"),
			Some(authorization_header("pass", &signature).as_str())
		);
	}

	#[test]
	fn test_client_creation() {
		let client = Client::new("http://localhost:8080/").unwrap();
		assert_eq!(client.base_url(), "http://localhost:8080");
		assert!(!client.is_authenticated());
	}

	#[test]
	fn test_order_id_from_location() {
		assert_eq!(
			order_id_from_location("/accounts/acc-1/orders/abc123").as_deref(),
			Some("abc123")
		);
		assert_eq!(
			order_id_from_location("https://api.nbx.com/accounts/acc-1/orders/xyz789/").as_deref(),
			Some("xyz789")
		);
		assert_eq!(
			order_id_from_location("/accounts/acc-1/orders/abc123?expand=fills").as_deref(),
			Some("abc123")
		);
		assert_eq!(order_id_from_location(""), None);
		assert_eq!(order_id_from_location("/"), None);
	}

	#[tokio::test]
	async fn test_orders_require_authentication() {
		let client = Client::new("http://127.0.0.1:9").unwrap();

		let result = client.market_sell("BTC-NOK", 0.1).await;
		assert!(matches!(result, Err(ClientError::Authentication(_))));

		let result = client.get_order("abc123").await;
		assert!(matches!(result, Err(ClientError::Authentication(_))));
	}

	#[tokio::test]
	async fn test_authenticate_sends_signed_token_request() {
		let (base_url, server) = serve(vec![response("200 OK", &[], TOKEN_OK)]).await;
		let mut client = Client::new(base_url).unwrap();

		client
			.authenticate(&credentials(), NonceWindow::Minute)
			.await
			.unwrap();
		assert!(client.is_authenticated());

		let requests = server.await.unwrap();
		assert_eq!(requests.len(), 1);
		assert_signed_token_request(&requests[0], TOKEN_PATH);
	}

	#[tokio::test]
	async fn test_signature_covers_base_url_path_prefix() {
		let (base_url, server) = serve(vec![response("200 OK", &[], TOKEN_OK)]).await;
		let mut client = Client::new(format!("{}/v1/", base_url)).unwrap();

		client
			.authenticate(&credentials(), NonceWindow::Minute)
			.await
			.unwrap();

		let requests = server.await.unwrap();
		assert_signed_token_request(&requests[0], &format!("/v1{}", TOKEN_PATH));
	}

	#[tokio::test]
	async fn test_rejected_token_request_is_authentication_error() {
		let (base_url, server) = serve(vec![response(
			"401 Unauthorized",
			&[],
			r#"{"error":"invalid signature"}"#,
		)])
		.await;
		let mut client = Client::new(base_url).unwrap();

		let result = client.authenticate(&credentials(), NonceWindow::Minute).await;
		match result {
			Err(ClientError::Authentication(msg)) => assert!(msg.contains("invalid signature")),
			other => panic!("expected authentication error, got {:?}", other),
		}
		assert!(!client.is_authenticated());
		server.await.unwrap();
	}

	#[tokio::test]
	async fn test_create_order_prefers_location_header() {
		let (client, server) = authenticated(vec![response(
			"201 Created",
			&[("Location", "/accounts/acc-1/orders/abc123")],
			r#"{"id":"ignored"}"#,
		)])
		.await;

		let order_id = client.market_sell("BTC-NOK", 0.1).await.unwrap();
		assert_eq!(order_id, "abc123");

		let requests = server.await.unwrap();
		let request = &requests[1];
		assert_eq!(request.method, "POST");
		assert_eq!(request.path, "/accounts/acc-1/orders");
		assert_eq!(request.header("authorization"), Some("Bearer tok-1"));
		assert_eq!(
			serde_json::from_str::<serde_json::Value>(&request.body).unwrap(),
			serde_json::to_value(CreateOrderRequest::market_sell("BTC-NOK", 0.1)).unwrap()
		);
	}

	#[tokio::test]
	async fn test_create_order_falls_back_to_body_id() {
		let (client, server) =
			authenticated(vec![response("201 Created", &[], r#"{"id":"xyz789"}"#)]).await;

		let order_id = client.market_buy("BTC-NOK", 1.0, 1000.0).await.unwrap();
		assert_eq!(order_id, "xyz789");

		let requests = server.await.unwrap();
		assert_eq!(
			serde_json::from_str::<serde_json::Value>(&requests[1].body).unwrap(),
			serde_json::to_value(CreateOrderRequest::market_buy("BTC-NOK", 1.0, 1000.0)).unwrap()
		);
	}

	#[tokio::test]
	async fn test_create_order_without_id_is_invalid_response() {
		let (client, server) = authenticated(vec![response("201 Created", &[], "{}")]).await;

		let result = client.market_sell("BTC-NOK", 0.1).await;
		assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
		server.await.unwrap();
	}

	#[tokio::test]
	async fn test_rejected_order_is_server_error() {
		let (client, server) = authenticated(vec![response(
			"400 Bad Request",
			&[],
			r#"{"error":"insufficient funds"}"#,
		)])
		.await;

		let result = client.market_buy("BTC-NOK", 1.0, 1000.0).await;
		match result {
			Err(ClientError::Server(msg)) => assert!(msg.contains("insufficient funds")),
			other => panic!("expected server error, got {:?}", other),
		}
		server.await.unwrap();
	}

	#[tokio::test]
	async fn test_get_order_uses_bearer_token() {
		let (client, server) = authenticated(vec![response(
			"200 OK",
			&[],
			r#"{"id":"abc123","status":"FILLED"}"#,
		)])
		.await;

		let order = client.get_order("abc123").await.unwrap();
		assert_eq!(order.id, "abc123");
		assert_eq!(order.extra["status"], "FILLED");

		let requests = server.await.unwrap();
		let request = &requests[1];
		assert_eq!(request.method, "GET");
		assert_eq!(request.path, "/accounts/acc-1/orders/abc123");
		assert_eq!(request.header("authorization"), Some("Bearer tok-1"));
	}
}
