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

use nbx_sdk::Side;
use thiserror::Error;

/// Buy ceilings per base asset, in units of the asset
pub const DEFAULT_MAX_QUANTITIES: &[(&str, f64)] =
	&[("BTC", 1.0), ("LTC", 100.0), ("ATOM", 1000.0)];

/// Error types for command-line order parameters
#[derive(Debug, Error, PartialEq)]
pub enum UsageError {
	#[error("arguments 'side' and 'market' are required")]
	MissingArguments,
	#[error("argument 'fiatAmount' must be greater than zero for a buy order")]
	InvalidFiatAmount,
	#[error("argument 'quantity' must be greater than zero for a sell order")]
	InvalidQuantity,
	#[error("invalid side '{0}', must be 'buy' or 'sell'")]
	InvalidSide(String),
	#[error("argument 'maxQuantity' must not be negative")]
	InvalidMaxQuantity,
}

/// A validated market order, ready to be dispatched
#[derive(Debug, Clone, PartialEq)]
pub enum OrderRequest {
	/// Spend `fiat_amount`, buying at most `max_quantity` (zero: no ceiling)
	Buy {
		market: String,
		fiat_amount: f64,
		max_quantity: f64,
	},
	/// Sell exactly `quantity`
	Sell { market: String, quantity: f64 },
}

impl OrderRequest {
	/// Validate raw command-line parameters
	///
	/// Rules are checked in order and the first failure is returned:
	/// 1. side and market are non-empty
	/// 2. a buy has a fiat amount > 0
	/// 3. a sell has a quantity > 0
	/// 4. side is exactly "buy" or "sell"
	/// 5. an explicit max quantity is >= 0
	pub fn from_params(
		side: &str,
		market: &str,
		fiat_amount: Option<f64>,
		quantity: Option<f64>,
		max_quantity: Option<f64>,
	) -> Result<Self, UsageError> {
		if side.is_empty() || market.is_empty() {
			return Err(UsageError::MissingArguments);
		}

		// `!(x > 0.0)` also rejects NaN
		if side == "buy" && !(fiat_amount.unwrap_or(0.0) > 0.0) {
			return Err(UsageError::InvalidFiatAmount);
		}

		if side == "sell" && !(quantity.unwrap_or(0.0) > 0.0) {
			return Err(UsageError::InvalidQuantity);
		}

		if side != "buy" && side != "sell" {
			return Err(UsageError::InvalidSide(side.to_string()));
		}

		if let Some(max) = max_quantity
			&& !(max >= 0.0)
		{
			return Err(UsageError::InvalidMaxQuantity);
		}

		let market = market.to_string();
		match (side, fiat_amount, quantity) {
			("buy", Some(fiat_amount), _) => {
				let max_quantity = max_quantity.unwrap_or_else(|| default_max_quantity(&market));
				Ok(OrderRequest::Buy {
					market,
					fiat_amount,
					max_quantity,
				})
			}
			("sell", _, Some(quantity)) => Ok(OrderRequest::Sell { market, quantity }),
			// Rules 2-4 leave no other combination
			_ => Err(UsageError::InvalidSide(side.to_string())),
		}
	}

	pub fn side(&self) -> Side {
		match self {
			OrderRequest::Buy { .. } => Side::Buy,
			OrderRequest::Sell { .. } => Side::Sell,
		}
	}

	pub fn market(&self) -> &str {
		match self {
			OrderRequest::Buy { market, .. } | OrderRequest::Sell { market, .. } => market,
		}
	}
}

/// Base asset of a market symbol, e.g. `BTC` for `BTC-NOK`
pub fn base_asset(market: &str) -> &str {
	market.split('-').next().unwrap_or(market)
}

/// Built-in buy ceiling for the market's base asset, zero when unknown
pub fn default_max_quantity(market: &str) -> f64 {
	let asset = base_asset(market);
	DEFAULT_MAX_QUANTITIES
		.iter()
		.find(|(name, _)| *name == asset)
		.map(|(_, max)| *max)
		.unwrap_or(0.0)
}
