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

//! NBX order CLI entry point
//!
//! Exit codes: 0 on success or `-h`, 1 on any usage, authentication,
//! placement or retrieval failure.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use nbx_sdk::{Client, NonceWindow};
use tracing::{error, info};

use nbx_order::{
	AppConfig, Cli, Dispatcher, OrderError, OrderRequest, cli, error::FAILURE_EXIT_CODE,
	logging::init_logging, render_order,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	let cli = match Cli::try_parse_from(cli::normalize_args(std::env::args_os())) {
		Ok(cli) => cli,
		Err(e) => {
			let _ = e.print();
			return ExitCode::from(cli::exit_code(&e));
		}
	};

	// Usage errors are reported before logging or configuration is set up
	let request = match cli.order_request() {
		Ok(request) => request,
		Err(e) => return report(OrderError::Usage(e)),
	};

	match run(&request).await {
		Ok(code) => code,
		Err(e) => {
			eprintln!("Error: {:#}", e);
			ExitCode::from(FAILURE_EXIT_CODE)
		}
	}
}

async fn run(request: &OrderRequest) -> Result<ExitCode> {
	init_logging()?;

	let config = AppConfig::from_env().context("Failed to load configuration")?;
	info!(target: "cli", api_url = %config.api_url, "Starting nbx-order");

	let client = Client::with_config(config.api_url.clone(), config.timeout())
		.context("Failed to create exchange client")?;
	let mut dispatcher = Dispatcher::new(client, config.credentials(), NonceWindow::Minute);

	match nbx_order::execute(request, &mut dispatcher).await {
		Ok(order) => {
			println!("{}", render_order(&order).context("Failed to render order")?);
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => Ok(report(e)),
	}
}

fn report(err: OrderError) -> ExitCode {
	match &err {
		OrderError::Usage(e) => {
			eprintln!("Error: {}\n", e);
			eprintln!("{}", Cli::usage());
		}
		OrderError::Dispatch(e) => {
			error!(target: "cli", "{}", e);
			eprintln!("{}", e);
		}
	}
	ExitCode::from(err.exit_code())
}
