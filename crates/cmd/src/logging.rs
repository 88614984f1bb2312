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

//! Logging initialization for the order CLI
//!
//! Standard output carries the order printed at the end of a run, so log
//! records go to a file and, optionally, to stderr.
//!
//! # Configuration
//!
//! - `RUST_LOG`: Log level filter (default: `info`)
//!   - Can be set per module: `RUST_LOG=nbx_order=debug,nbx_sdk=debug`
//!
//! - `LOG_DIR`: Root directory for log files (default: `{project_root}/logs`)
//!   - Log files are created in `{LOG_DIR}/nbx-order/`
//!
//! - `LOG_TO_CONSOLE`: Also write to stderr (default: `false`)
//!   - Set to `true`, `1`, or `yes` to enable
//!
//! # Log File Format
//!
//! - Rotation: one file per day (UTC), e.g. `nbx-order.2026-01-03.log`
//! - Format: UTC timestamp, thread ID, log level, target, message

use std::{
	env,
	path::{Path, PathBuf},
	sync::OnceLock,
};

use anyhow::{Context, Result};
use tracing::debug;
use tracing_appender::{
	non_blocking,
	rolling::{self, Rotation},
};
use tracing_subscriber::{
	EnvFilter, fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt,
};

use crate::config::{DEFAULT_LOG_LEVEL, DEFAULT_LOG_TO_CONSOLE, LOG_COMPONENT_NAME};

// Flushes the non-blocking writer when the process exits
static LOG_GUARD: OnceLock<non_blocking::WorkerGuard> = OnceLock::new();

/// Find project root directory by walking up from current location
///
/// 1. Walk up from CARGO_MANIFEST_DIR to the workspace root
/// 2. Walk up from the current directory to the nearest Cargo.toml
/// 3. Fall back to the current directory
fn find_project_root() -> PathBuf {
	if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
		let manifest_path = Path::new(&manifest_dir);
		for dir in manifest_path.ancestors() {
			let cargo_toml = dir.join("Cargo.toml");
			if let Ok(content) = std::fs::read_to_string(&cargo_toml)
				&& content.contains("[workspace]")
			{
				return dir.to_path_buf();
			}
		}
		return manifest_path.to_path_buf();
	}

	let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
	current_dir
		.ancestors()
		.find(|dir| dir.join("Cargo.toml").exists())
		.map(Path::to_path_buf)
		.unwrap_or(current_dir)
}

/// Log root directory from `LOG_DIR`, or `{project_root}/logs`
fn get_log_root() -> PathBuf {
	env::var("LOG_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|_| find_project_root().join("logs"))
}

fn log_to_console_enabled(value: Option<&str>) -> bool {
	value
		.map(|v| v == "true" || v == "1" || v == "yes")
		.unwrap_or(DEFAULT_LOG_TO_CONSOLE)
}

/// Daily-rolling file writer, `{component}.{date}.log`
fn setup_file_logging(log_dir: &Path) -> Result<non_blocking::NonBlocking> {
	std::fs::create_dir_all(log_dir)
		.with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

	let file_appender = rolling::RollingFileAppender::builder()
		.rotation(Rotation::DAILY)
		.filename_prefix(LOG_COMPONENT_NAME.to_string())
		.filename_suffix(".log")
		.build(log_dir)
		.with_context(|| {
			format!(
				"Failed to create rolling file appender in {}",
				log_dir.display()
			)
		})?;

	let (file_writer, guard) = non_blocking(file_appender);
	LOG_GUARD.set(guard).ok();

	Ok(file_writer)
}

/// File writer, or `None` with a warning on stderr when `log_dir` is unusable
fn file_writer_or_warn(log_dir: &Path) -> Option<non_blocking::NonBlocking> {
	match setup_file_logging(log_dir) {
		Ok(writer) => Some(writer),
		Err(e) => {
			eprintln!("Warning: file logging disabled: {:#}", e);
			None
		}
	}
}

/// Initialize logging with file output and optional stderr output
///
/// File output is skipped when the log directory cannot be created.
pub fn init_logging() -> Result<()> {
	dotenv::dotenv().ok();

	let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

	let log_dir = get_log_root().join(LOG_COMPONENT_NAME);
	let file_writer = file_writer_or_warn(&log_dir);

	let log_to_console = log_to_console_enabled(env::var("LOG_TO_CONSOLE").ok().as_deref());

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

	let file_enabled = file_writer.is_some();
	let file_layer = file_writer.map(|writer| {
		fmt::layer()
			.with_writer(writer)
			.with_timer(fmt::time::UtcTime::rfc_3339())
			.with_thread_ids(true)
			.with_target(true)
			.with_ansi(false)
	});

	let console_layer = log_to_console.then(|| {
		fmt::layer()
			.with_writer(std::io::stderr)
			.with_timer(fmt::time::UtcTime::rfc_3339())
			.with_thread_ids(true)
			.with_target(true)
			.with_ansi(true)
	});

	Registry::default()
		.with(filter)
		.with(file_layer)
		.with(console_layer)
		.try_init()
		.context("Failed to install tracing subscriber")?;

	debug!(target: "cli", "Log level: {}", log_level);
	if file_enabled {
		debug!(target: "cli", "Log directory: {}", log_dir.display());
	}

	Ok(())
}
