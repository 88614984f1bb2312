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

//! Order dispatcher
//!
//! Runs the single-order pipeline against an exchange:
//! authenticate → place (buy or sell) → fetch the resulting order.
//!
//! Every step is awaited before the next one starts and the first failure
//! ends the run. Nothing is retried.

use async_trait::async_trait;
use nbx_sdk::{Client, ClientError, Credentials, NonceWindow, Order, Side};
use thiserror::Error;
use tracing::{error, info};

use crate::order::OrderRequest;

/// Error types for dispatching an order to the exchange
#[derive(Debug, Error)]
pub enum DispatchError {
	#[error("Failed to authenticate: {0}")]
	Authenticate(#[source] ClientError),
	#[error("Failed to place {side} order: {source}")]
	PlaceOrder {
		side: Side,
		#[source]
		source: ClientError,
	},
	#[error("Failed to retrieve order {order_id}: {source}")]
	RetrieveOrder {
		order_id: String,
		#[source]
		source: ClientError,
	},
}

/// Exchange capabilities the dispatcher needs
///
/// Implemented by [`nbx_sdk::Client`]; tests plug in a stand-in.
#[async_trait]
pub trait Exchange: Send {
	async fn authenticate(
		&mut self,
		credentials: &Credentials,
		nonce_window: NonceWindow,
	) -> Result<(), ClientError>;

	/// Returns the ID of the placed order
	async fn market_buy(
		&mut self,
		market: &str,
		max_quantity: f64,
		fiat_amount: f64,
	) -> Result<String, ClientError>;

	/// Returns the ID of the placed order
	async fn market_sell(&mut self, market: &str, quantity: f64) -> Result<String, ClientError>;

	async fn get_order(&mut self, order_id: &str) -> Result<Order, ClientError>;
}

#[async_trait]
impl Exchange for Client {
	async fn authenticate(
		&mut self,
		credentials: &Credentials,
		nonce_window: NonceWindow,
	) -> Result<(), ClientError> {
		Client::authenticate(self, credentials, nonce_window).await
	}

	async fn market_buy(
		&mut self,
		market: &str,
		max_quantity: f64,
		fiat_amount: f64,
	) -> Result<String, ClientError> {
		Client::market_buy(self, market, max_quantity, fiat_amount).await
	}

	async fn market_sell(&mut self, market: &str, quantity: f64) -> Result<String, ClientError> {
		Client::market_sell(self, market, quantity).await
	}

	async fn get_order(&mut self, order_id: &str) -> Result<Order, ClientError> {
		Client::get_order(self, order_id).await
	}
}

/// Places one order per call to [`Dispatcher::dispatch`]
pub struct Dispatcher<E> {
	exchange: E,
	credentials: Credentials,
	nonce_window: NonceWindow,
}

impl<E: Exchange> Dispatcher<E> {
	pub fn new(exchange: E, credentials: Credentials, nonce_window: NonceWindow) -> Self {
		Self {
			exchange,
			credentials,
			nonce_window,
		}
	}

	pub fn exchange(&self) -> &E {
		&self.exchange
	}

	pub fn into_exchange(self) -> E {
		self.exchange
	}

	/// Authenticate, place `request`, and return the order as the exchange
	/// reports it
	pub async fn dispatch(&mut self, request: &OrderRequest) -> Result<Order, DispatchError> {
		self.exchange
			.authenticate(&self.credentials, self.nonce_window)
			.await
			.map_err(|e| {
				error!(target: "dispatcher", "Authentication failed: {}", e);
				DispatchError::Authenticate(e)
			})?;
		info!(target: "dispatcher", account_id = %self.credentials.account_id, "Authenticated");

		let side = request.side();
		let placed = match request {
			OrderRequest::Buy {
				market,
				fiat_amount,
				max_quantity,
			} => {
				info!(
					target: "dispatcher",
					%market, fiat_amount, max_quantity, "Placing market buy"
				);
				self.exchange
					.market_buy(market, *max_quantity, *fiat_amount)
					.await
			}
			OrderRequest::Sell { market, quantity } => {
				info!(target: "dispatcher", %market, quantity, "Placing market sell");
				self.exchange.market_sell(market, *quantity).await
			}
		};
		let order_id = placed.map_err(|source| {
			error!(target: "dispatcher", "Failed to place {} order: {}", side, source);
			DispatchError::PlaceOrder { side, source }
		})?;
		info!(target: "dispatcher", %order_id, "Order placed");

		let order = self
			.exchange
			.get_order(&order_id)
			.await
			.map_err(|source| {
				error!(target: "dispatcher", %order_id, "Failed to retrieve order: {}", source);
				DispatchError::RetrieveOrder {
					order_id: order_id.clone(),
					source,
				}
			})?;

		Ok(order)
	}
}
