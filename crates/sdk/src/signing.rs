// Copyright 2025 chenjjiaa
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

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Authorization scheme for signed requests
pub const SIGNATURE_SCHEME: &str = "NBX-HMAC-SHA256";

/// Error types for signing operations
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
	#[error("Invalid secret: {0}")]
	InvalidSecret(String),
	#[error("Signing error: {0}")]
	Signing(String),
}

/// Sign a request
///
/// Message format: `{timestamp}{METHOD}{path}{body}`, HMAC-SHA256 keyed with
/// the base64-decoded secret, output base64 encoded.
pub fn sign_request(
	secret: &str,
	timestamp: &str,
	method: &str,
	path: &str,
	body: &str,
) -> Result<String, SigningError> {
	let secret_bytes = STANDARD
		.decode(secret)
		.map_err(|e| SigningError::InvalidSecret(format!("not valid base64: {}", e)))?;

	let mut mac = HmacSha256::new_from_slice(&secret_bytes)
		.map_err(|e| SigningError::Signing(e.to_string()))?;
	mac.update(format!("{}{}{}{}", timestamp, method, path, body).as_bytes());

	Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Value of the `Authorization` header for a signed request
pub fn authorization_header(passphrase: &str, signature: &str) -> String {
	format!("{} {}:{}", SIGNATURE_SCHEME, passphrase, signature)
}
