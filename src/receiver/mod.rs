// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Settlement receiver
//!
//! This module provides the settlement orchestrator, the swap-then-stake hook
//! executor that it delegates to, and their configuration.

mod config;
mod executor;
mod guard;
mod settlement;

pub use config::{
    HookConfig, MinOutputPolicy, DEFAULT_SWAP_DEADLINE_SECS, ENV_ENCODING, ENV_MIN_AMOUNT_OUT,
    ENV_REFERRAL, ENV_SWAP_DEADLINE_SECS,
};
pub use executor::HookExecutor;
pub use guard::{Entered, ReentrancyGuard};
pub use settlement::CctpReceiver;
