//! OpenTelemetry span helpers for settlement operations
//!
//! Span names are static and attributes are structured, so a collector can
//! group settlements without parsing messages. The receiver creates these
//! internally; they are public for callers that wrap settlement in their own
//! instrumentation.
//!
//! # Example
//!
//! ```rust,no_run
//! use cctp_hook_receiver::spans;
//! use alloy_primitives::Address;
//!
//! let span = spans::receive_usdc(&Address::ZERO, 56, 248, 65);
//! let _guard = span.enter();
//! // custom settlement logic here
//! ```

use alloy_primitives::{Address, U256};
use tracing::Span;

use crate::error::ReceiverError;
use crate::protocol::DomainId;

/// Create span for a full `receive_usdc` call.
///
/// Parent: caller's span
/// Children: cctp_hook_receiver.execute_hook
#[inline]
pub fn receive_usdc(
    custody: &Address,
    hook_data_len: usize,
    message_len: usize,
    attestation_len: usize,
) -> Span {
    tracing::info_span!(
        "cctp_hook_receiver.receive_usdc",
        custody = %custody,
        hook_data_len_bytes = hook_data_len,
        message_len_bytes = message_len,
        attestation_len_bytes = attestation_len,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for the swap-then-stake hook.
///
/// Parent: cctp_hook_receiver.receive_usdc
/// Children: swap, stake and deliver spans
#[inline]
pub fn execute_hook(recipient: &Address, amount: &U256, source_domain: u32) -> Span {
    tracing::info_span!(
        "cctp_hook_receiver.execute_hook",
        recipient = %recipient,
        amount = %amount,
        source_domain = %DomainId::describe(source_domain),
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for the swap venue call.
#[inline]
pub fn swap(venue: &Address, amount_in: &U256, amount_out_min: &U256, hops: usize) -> Span {
    tracing::debug_span!(
        "cctp_hook_receiver.swap",
        venue = %venue,
        amount_in = %amount_in,
        amount_out_min = %amount_out_min,
        hops = hops,
    )
}

/// Create span for the staking submission.
#[inline]
pub fn stake(staking: &Address, amount: &U256) -> Span {
    tracing::debug_span!(
        "cctp_hook_receiver.stake",
        staking = %staking,
        amount = %amount,
    )
}

/// Create span for the derivative transfer to the hook recipient.
#[inline]
pub fn deliver(token: &Address, recipient: &Address, amount: &U256) -> Span {
    tracing::debug_span!(
        "cctp_hook_receiver.deliver",
        token = %token,
        recipient = %recipient,
        amount = %amount,
    )
}

/// Record error attributes on the current span.
///
/// Follows OpenTelemetry semantic conventions: `error.type` carries the
/// variant name, `error.message` the rendered error.
pub fn record_error(error: &ReceiverError) {
    let current_span = Span::current();
    current_span.record("error.type", error.kind());
    current_span.record("error.message", error.to_string());
    current_span.record("otel.status_code", "ERROR");

    if let Some(source) = std::error::Error::source(error) {
        current_span.record("error.source", source.to_string());
    }
}
