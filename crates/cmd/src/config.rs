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

use std::{fmt, time::Duration};

use nbx_sdk::Credentials;
use serde::Deserialize;

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log directory component name
pub const LOG_COMPONENT_NAME: &str = "nbx-order";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = false;

// Exchange configuration constants
/// Prefix shared by every exchange environment variable (`NBX_ACCOUNT_ID`, `NBX_KEY`, ...)
pub const ENV_PREFIX: &str = "NBX";

/// Default API endpoint (can be overridden by NBX_API_URL)
pub const DEFAULT_API_URL: &str = nbx_sdk::DEFAULT_BASE_URL;

/// Default request timeout in seconds (can be overridden by NBX_TIMEOUT_SECS)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Read-only snapshot of the process environment, taken once at startup
///
/// Missing credentials are not an error here; the exchange rejects them
/// during authentication.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
	/// NBX_ACCOUNT_ID
	#[serde(default)]
	pub account_id: String,
	/// NBX_KEY
	#[serde(default, rename = "key")]
	pub key_id: String,
	/// NBX_SECRET
	#[serde(default)]
	secret: String,
	/// NBX_PASSPHRASE
	#[serde(default)]
	passphrase: String,
	/// NBX_API_URL
	#[serde(default = "default_api_url")]
	pub api_url: String,
	/// NBX_TIMEOUT_SECS
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
}

fn default_api_url() -> String {
	DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
	DEFAULT_TIMEOUT_SECS
}

impl AppConfig {
	/// Load configuration from `.env` and `NBX_*` environment variables
	pub fn from_env() -> Result<Self, config::ConfigError> {
		dotenv::dotenv().ok();
		Self::from_source(config::Environment::with_prefix(ENV_PREFIX))
	}

	/// Load configuration from an explicit environment source
	pub fn from_source(env: config::Environment) -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder().add_source(env).build()?;

		cfg.try_deserialize()
	}

	pub fn credentials(&self) -> Credentials {
		Credentials::new(
			self.account_id.clone(),
			self.key_id.clone(),
			self.secret.clone(),
			self.passphrase.clone(),
		)
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}
}

impl fmt::Debug for AppConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AppConfig")
			.field("account_id", &self.account_id)
			.field("key_id", &self.key_id)
			.field("api_url", &self.api_url)
			.field("timeout_secs", &self.timeout_secs)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn env(vars: &[(&str, &str)]) -> config::Environment {
		let map: config::Map<String, String> = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		config::Environment::with_prefix(ENV_PREFIX).source(Some(map))
	}

	#[test]
	fn test_loads_credentials_from_environment() {
		let config = AppConfig::from_source(env(&[
			("NBX_ACCOUNT_ID", "acc-1"),
			("NBX_KEY", "key-1"),
			("NBX_SECRET", "c2VjcmV0"),
			("NBX_PASSPHRASE", "hunter2"),
		]))
		.unwrap();

		let credentials = config.credentials();
		assert_eq!(credentials.account_id, "acc-1");
		assert_eq!(credentials.key_id, "key-1");
		assert_eq!(credentials.secret(), "c2VjcmV0");
		assert_eq!(credentials.passphrase(), "hunter2");
		assert_eq!(config.api_url, DEFAULT_API_URL);
		assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
	}

	#[test]
	fn test_missing_credentials_are_not_an_error() {
		let config = AppConfig::from_source(env(&[])).unwrap();
		assert!(config.account_id.is_empty());
		assert!(config.credentials().secret().is_empty());
	}

	#[test]
	fn test_overrides() {
		let config = AppConfig::from_source(env(&[
			("NBX_API_URL", "http://localhost:8080"),
			("NBX_TIMEOUT_SECS", "5"),
		]))
		.unwrap();
		assert_eq!(config.api_url, "http://localhost:8080");
		assert_eq!(config.timeout(), Duration::from_secs(5));
	}

	#[test]
	fn test_debug_omits_secrets() {
		let config = AppConfig::from_source(env(&[
			("NBX_SECRET", "c2VjcmV0"),
			("NBX_PASSPHRASE", "hunter2"),
		]))
		.unwrap();
		let rendered = format!("{:?}", config);
		assert!(!rendered.contains("c2VjcmV0"));
		assert!(!rendered.contains("hunter2"));
	}
}
