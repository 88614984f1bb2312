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

//! NBX order CLI
//!
//! Places a single market order on NBX and prints the resulting order:
//! parse → validate → authenticate → place → fetch → print.
//!
//! The exchange is reached through the [`Exchange`] trait so the pipeline can
//! run against a stand-in without network access.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod order;

pub use cli::Cli;
pub use config::AppConfig;
pub use dispatcher::{DispatchError, Dispatcher, Exchange};
pub use error::OrderError;
pub use order::{OrderRequest, UsageError};

use nbx_sdk::Order;

/// Place a validated order and fetch the result
///
/// Validation happens earlier, in [`Cli::order_request`], so that a usage
/// error is reported before logging or configuration is set up.
pub async fn execute<E: Exchange>(
	request: &OrderRequest,
	dispatcher: &mut Dispatcher<E>,
) -> Result<Order, OrderError> {
	Ok(dispatcher.dispatch(request).await?)
}

/// Pretty JSON rendering of an order for stdout
pub fn render_order(order: &Order) -> Result<String, serde_json::Error> {
	serde_json::to_string_pretty(order)
}
