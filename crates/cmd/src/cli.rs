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

use std::ffi::OsString;

use clap::{CommandFactory, Parser, error::ErrorKind};

use crate::order::{OrderRequest, UsageError};

const AFTER_HELP: &str = "\
Environment Variables:
  NBX_ACCOUNT_ID    Your NBX account ID
  NBX_KEY           Your NBX API key
  NBX_SECRET        Your NBX API secret
  NBX_PASSPHRASE    Your NBX API passphrase

Examples:
  nbx-order --side=buy --market=BTC-NOK --fiatAmount=30000
  nbx-order --side=sell --market=BTC-NOK --quantity=0.1";

/// Command-line arguments
///
/// Side and market are plain strings so that missing or unknown values are
/// reported by [`OrderRequest::from_params`] rather than by clap.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "nbx-order")]
#[command(about = "Place a single market order on NBX and print the result")]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
	/// Order side: 'buy' or 'sell' (required)
	#[arg(long, default_value = "")]
	pub side: String,

	/// Market symbol, e.g. BTC-NOK (required)
	#[arg(long, default_value = "")]
	pub market: String,

	/// Fiat amount to spend for a buy order (required for 'buy')
	#[arg(long = "fiatAmount", allow_negative_numbers = true)]
	pub fiat_amount: Option<f64>,

	/// Exact amount to sell (required for 'sell')
	#[arg(long, allow_negative_numbers = true)]
	pub quantity: Option<f64>,

	/// Most units of the asset a buy may fill; 0 for no ceiling
	/// (default: built-in ceiling for BTC, LTC and ATOM, otherwise 0)
	#[arg(long = "maxQuantity", allow_negative_numbers = true)]
	pub max_quantity: Option<f64>,
}

impl Cli {
	/// Validate the arguments into an order
	pub fn order_request(&self) -> Result<OrderRequest, UsageError> {
		OrderRequest::from_params(
			&self.side,
			&self.market,
			self.fiat_amount,
			self.quantity,
			self.max_quantity,
		)
	}

	/// Rendered help text
	pub fn usage() -> String {
		Cli::command().render_help().to_string()
	}
}

/// Rewrite single-dash long flags (`-side=buy`, `-market BTC-NOK`) to the
/// double-dash form clap expects
///
/// Only names of declared long flags are rewritten, so negative numbers
/// pass through untouched. Arguments after `--` are left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
	I: IntoIterator<Item = T>,
	T: Into<OsString>,
{
	let command = Cli::command();
	let long_flags: Vec<&str> = command
		.get_arguments()
		.filter_map(|arg| arg.get_long())
		.collect();

	let mut passthrough = false;
	args.into_iter()
		.map(Into::into)
		.map(|arg| {
			if passthrough {
				return arg;
			}
			if arg == "--" {
				passthrough = true;
				return arg;
			}
			let is_long_flag = arg
				.to_str()
				.and_then(single_dash_flag_name)
				.is_some_and(|name| long_flags.contains(&name));
			if is_long_flag {
				let mut rewritten = OsString::from("-");
				rewritten.push(&arg);
				rewritten
			} else {
				arg
			}
		})
		.collect()
}

fn single_dash_flag_name(arg: &str) -> Option<&str> {
	let flag = arg.strip_prefix('-')?;
	if flag.starts_with('-') {
		return None;
	}
	Some(flag.split_once('=').map_or(flag, |(name, _)| name))
}

/// Process exit code for an argument parsing error
///
/// Help and version requests succeed; every other parse error is a usage
/// error.
pub fn exit_code(err: &clap::Error) -> u8 {
	match err.kind() {
		ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
		_ => 1,
	}
}
