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

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
	Buy,
	Sell,
}

impl fmt::Display for Side {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Side::Buy => f.write_str("buy"),
			Side::Sell => f.write_str("sell"),
		}
	}
}

/// Lifetime of the session token requested during authentication.
///
/// Signed requests carry a millisecond timestamp; the window bounds how long
/// the resulting token (and therefore the replay horizon) stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NonceWindow {
	#[default]
	#[serde(rename = "1m")]
	Minute,
	#[serde(rename = "1h")]
	Hour,
	#[serde(rename = "1d")]
	Day,
}

/// API credentials for authenticated requests
///
/// Secret and passphrase are redacted from the `Debug` output.
#[derive(Clone, Default)]
pub struct Credentials {
	pub account_id: String,
	pub key_id: String,
	secret: String,
	passphrase: String,
}

impl Credentials {
	pub fn new(
		account_id: impl Into<String>,
		key_id: impl Into<String>,
		secret: impl Into<String>,
		passphrase: impl Into<String>,
	) -> Self {
		Self {
			account_id: account_id.into(),
			key_id: key_id.into(),
			secret: secret.into(),
			passphrase: passphrase.into(),
		}
	}

	/// Base64-encoded API secret
	pub fn secret(&self) -> &str {
		&self.secret
	}

	pub fn passphrase(&self) -> &str {
		&self.passphrase
	}
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials")
			.field("account_id", &self.account_id)
			.field("key_id", &self.key_id)
			.field("secret", &"<redacted>")
			.field("passphrase", &"<redacted>")
			.finish()
	}
}

/// Body of the token request sent by `Client::authenticate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
	#[serde(rename = "expiresIn")]
	pub expires_in: NonceWindow,
}

/// Session token issued for a signed token request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
	pub token: String,
}

/// Execution type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionType {
	Market,
	Limit,
}

/// What the exchange reserves while a market order executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FreezeType {
	Amount,
	Quantity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freeze {
	#[serde(rename = "type")]
	pub freeze_type: FreezeType,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
	#[serde(rename = "type")]
	pub execution_type: ExecutionType,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub freeze: Option<Freeze>,
}

/// Request to place an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
	/// Market identifier (e.g., "BTC-NOK")
	pub market: String,
	/// Asset quantity; for market buys this is the ceiling, omitted when unbounded
	#[serde(skip_serializing_if = "Option::is_none")]
	pub quantity: Option<String>,
	pub side: Side,
	pub execution: Execution,
}

impl CreateOrderRequest {
	/// Market buy spending `fiat_amount`, capped at `max_quantity` units of the
	/// asset. A ceiling of zero leaves the quantity open.
	pub fn market_buy(market: impl Into<String>, max_quantity: f64, fiat_amount: f64) -> Self {
		Self {
			market: market.into(),
			quantity: (max_quantity > 0.0).then(|| format_decimal(max_quantity)),
			side: Side::Buy,
			execution: Execution {
				execution_type: ExecutionType::Market,
				freeze: Some(Freeze {
					freeze_type: FreezeType::Amount,
					value: Some(format_decimal(fiat_amount)),
				}),
			},
		}
	}

	/// Market sell of exactly `quantity` units of the asset
	pub fn market_sell(market: impl Into<String>, quantity: f64) -> Self {
		Self {
			market: market.into(),
			quantity: Some(format_decimal(quantity)),
			side: Side::Sell,
			execution: Execution {
				execution_type: ExecutionType::Market,
				freeze: None,
			},
		}
	}
}

/// Order information as reported by the exchange
///
/// Only `id` is required. The other fields are kept as the exchange sent
/// them, and anything not named here (status, fills, execution details) is
/// preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub market: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub side: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub quantity: Option<String>,
	#[serde(
		rename = "createdAt",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub created_at: Option<String>,
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

fn format_decimal(value: f64) -> String {
	value.to_string()
}
