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

use crate::types::{
	ContentId, ContentResponse, FetchResponse, StoredFile, UploadEntry, UploadRequest,
	UploadResponse,
};
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use thiserror::Error;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Network error: {0}")]
	Network(String),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Server error: {0}")]
	Server(String),
}

/// Client for the remote blob store and its upload index
///
/// Every request carries the configured token as a bearer credential.
/// The token is opaque to the client; it is neither validated nor rotated.
#[derive(Clone)]
pub struct StorageClient {
	base_url: String,
	token: String,
	client: ReqwestClient,
}

impl StorageClient {
	/// Create a new client with the default timeout
	pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
		Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
	}

	/// Create a new client with a custom request timeout
	pub fn with_timeout(
		base_url: impl Into<String>,
		token: impl Into<String>,
		timeout: Duration,
	) -> Result<Self, ClientError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			base_url: base_url.into().trim_end_matches('/').to_string(),
			token: token.into(),
			client,
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Upload a set of files, returning the content id of the new upload
	pub async fn put_files(&self, files: Vec<StoredFile>) -> Result<ContentId, ClientError> {
		let url = format!("{}/upload", self.base_url);

		let response = self
			.client
			.post(&url)
			.bearer_auth(&self.token)
			.json(&UploadRequest { files })
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		if !response.status().is_success() {
			let status = response.status();
			let error_text = response
				.text()
				.await
				.unwrap_or_else(|_| format!("HTTP {}", status));
			return Err(ClientError::Server(format!("{}: {}", status, error_text)));
		}

		let upload: UploadResponse = response
			.json()
			.await
			.map_err(|e| ClientError::Serialization(format!("Failed to parse response: {}", e)))?;

		Ok(upload.cid)
	}

	/// Retrieve the files of an upload
	///
	/// A non-success status is not an error here: it is reported as
	/// `ok = false` so the caller can tell it apart from a transport failure.
	pub async fn get_content(&self, cid: &ContentId) -> Result<FetchResponse, ClientError> {
		let url = format!("{}/content/{}", self.base_url, cid);

		let response = self
			.client
			.get(&url)
			.bearer_auth(&self.token)
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		if !response.status().is_success() {
			return Ok(FetchResponse::not_ok());
		}

		let content: ContentResponse = response
			.json()
			.await
			.map_err(|e| ClientError::Serialization(format!("Failed to parse response: {}", e)))?;

		Ok(FetchResponse {
			ok: true,
			files: content.files,
		})
	}

	/// List the most recent uploads, most recent first
	pub async fn list_uploads(&self, size: usize) -> Result<Vec<UploadEntry>, ClientError> {
		let url = format!("{}/user/uploads", self.base_url);

		let response = self
			.client
			.get(&url)
			.bearer_auth(&self.token)
			.query(&[("size", size)])
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		if !response.status().is_success() {
			let status = response.status();
			let error_text = response
				.text()
				.await
				.unwrap_or_else(|_| format!("HTTP {}", status));
			return Err(ClientError::Server(format!("{}: {}", status, error_text)));
		}

		let uploads: Vec<UploadEntry> = response
			.json()
			.await
			.map_err(|e| ClientError::Serialization(format!("Failed to parse response: {}", e)))?;

		Ok(uploads)
	}

	/// Check store health
	pub async fn health_check(&self) -> Result<bool, ClientError> {
		let url = format!("{}/health", self.base_url);

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		Ok(response.status().is_success())
	}
}

#[cfg(test)]
mod tests {
	use tokio::{
		io::{AsyncReadExt, AsyncWriteExt},
		net::TcpListener,
		task::JoinHandle,
	};

	use super::*;

	/// Serve one canned HTTP response on a local port
	///
	/// Resolves to the raw request (head and body) the client sent.
	async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let base_url = format!("http://{}", listener.local_addr().unwrap());
		let response = format!(
			"HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
			status,
			body.len(),
			body
		);

		let handle = tokio::spawn(async move {
			let (mut socket, _) = listener.accept().await.unwrap();
			let mut request = Vec::new();
			let mut buf = [0u8; 1024];

			let head_end = loop {
				let n = socket.read(&mut buf).await.unwrap();
				assert!(n > 0, "connection closed before request head");
				request.extend_from_slice(&buf[..n]);
				if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
					break pos + 4;
				}
			};

			let head = String::from_utf8_lossy(&request[..head_end]).to_lowercase();
			let content_length = head
				.lines()
				.find_map(|line| line.strip_prefix("content-length:"))
				.map(|v| v.trim().parse::<usize>().unwrap())
				.unwrap_or(0);
			while request.len() < head_end + content_length {
				let n = socket.read(&mut buf).await.unwrap();
				assert!(n > 0, "connection closed before request body");
				request.extend_from_slice(&buf[..n]);
			}

			socket.write_all(response.as_bytes()).await.unwrap();
			socket.shutdown().await.unwrap();
			String::from_utf8(request).unwrap()
		});

		(base_url, handle)
	}

	fn request_line(request: &str) -> &str {
		request.lines().next().unwrap()
	}

	fn has_bearer(request: &str, token: &str) -> bool {
		request
			.lines()
			.any(|line| line.eq_ignore_ascii_case(&format!("authorization: Bearer {}", token)))
	}

	#[test]
	fn test_client_creation() {
		let client = StorageClient::new("http://localhost:8080/", "token").unwrap();
		assert_eq!(client.base_url(), "http://localhost:8080");
	}

	#[tokio::test]
	async fn test_unreachable_store_is_network_error() {
		let client = StorageClient::with_timeout(
			"http://127.0.0.1:1",
			"token",
			Duration::from_millis(500),
		)
		.unwrap();

		let result = client.list_uploads(1).await;
		assert!(matches!(result, Err(ClientError::Network(_))));

		let result = client.get_content(&ContentId::new("bafy")).await;
		assert!(matches!(result, Err(ClientError::Network(_))));
	}

	#[tokio::test]
	async fn test_get_content_not_found_is_not_ok() {
		let (base_url, server) = serve_once("404 Not Found", "not found").await;
		let client = StorageClient::new(base_url, "secret").unwrap();

		let response = client.get_content(&ContentId::new("bafy")).await.unwrap();
		assert!(!response.ok);
		assert!(response.files.is_none());

		let request = server.await.unwrap();
		assert_eq!(request_line(&request), "GET /content/bafy HTTP/1.1");
		assert!(has_bearer(&request, "secret"));
	}

	#[tokio::test]
	async fn test_get_content_returns_files() {
		let (base_url, server) = serve_once(
			"200 OK",
			r#"{"files":[{"name":"guild-1","content":"{\"proposals\":[],\"userWallets\":{}}"}]}"#,
		)
		.await;
		let client = StorageClient::new(base_url, "secret").unwrap();

		let response = client.get_content(&ContentId::new("bafy")).await.unwrap();
		assert!(response.ok);
		let files = response.files.unwrap();
		assert_eq!(files.len(), 1);
		assert_eq!(files[0].name, "guild-1");
		assert_eq!(files[0].content, r#"{"proposals":[],"userWallets":{}}"#);
		server.await.unwrap();
	}

	#[tokio::test]
	async fn test_list_uploads_sends_size() {
		let (base_url, server) =
			serve_once("200 OK", r#"[{"cid":"bafy2","name":"guild-1"},{"cid":"bafy1"}]"#).await;
		let client = StorageClient::new(base_url, "secret").unwrap();

		let uploads = client.list_uploads(2).await.unwrap();
		assert_eq!(uploads.len(), 2);
		assert_eq!(uploads[0].cid.as_str(), "bafy2");
		assert_eq!(uploads[0].name.as_deref(), Some("guild-1"));
		assert_eq!(uploads[1].cid.as_str(), "bafy1");

		let request = server.await.unwrap();
		assert_eq!(request_line(&request), "GET /user/uploads?size=2 HTTP/1.1");
		assert!(has_bearer(&request, "secret"));
	}

	#[tokio::test]
	async fn test_list_uploads_server_error() {
		let (base_url, server) = serve_once("500 Internal Server Error", "boom").await;
		let client = StorageClient::new(base_url, "secret").unwrap();

		let result = client.list_uploads(1).await;
		match result {
			Err(ClientError::Server(msg)) => assert!(msg.contains("500")),
			other => panic!("expected server error, got {:?}", other),
		}
		server.await.unwrap();
	}

	#[tokio::test]
	async fn test_put_files_posts_upload() {
		let (base_url, server) = serve_once("200 OK", r#"{"cid":"bafy9"}"#).await;
		let client = StorageClient::new(base_url, "secret").unwrap();

		let cid = client
			.put_files(vec![StoredFile::new("guild-1", "{}")])
			.await
			.unwrap();
		assert_eq!(cid.as_str(), "bafy9");

		let request = server.await.unwrap();
		assert_eq!(request_line(&request), "POST /upload HTTP/1.1");
		assert!(has_bearer(&request, "secret"));
		assert!(request.ends_with(r#"{"files":[{"name":"guild-1","content":"{}"}]}"#));
	}

	#[tokio::test]
	async fn test_put_files_rejected() {
		let (base_url, server) = serve_once("503 Service Unavailable", "read-only").await;
		let client = StorageClient::new(base_url, "secret").unwrap();

		let result = client.put_files(vec![StoredFile::new("guild-1", "{}")]).await;
		assert!(matches!(result, Err(ClientError::Server(_))));
		server.await.unwrap();
	}
}
