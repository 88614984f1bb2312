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

use thiserror::Error;

use crate::{dispatcher::DispatchError, order::UsageError};

/// Exit code for every failed run
pub const FAILURE_EXIT_CODE: u8 = 1;

/// Error types for a single CLI run
///
/// Usage errors are detected before any network call; dispatch errors come
/// from the exchange. Both end the process with [`FAILURE_EXIT_CODE`].
#[derive(Debug, Error)]
pub enum OrderError {
	#[error(transparent)]
	Usage(#[from] UsageError),
	#[error(transparent)]
	Dispatch(#[from] DispatchError),
}

impl OrderError {
	pub fn exit_code(&self) -> u8 {
		FAILURE_EXIT_CODE
	}
}
